//! File classification for the per-directory passes.

use std::path::Path;

use crate::app_config::AppConfig;
use crate::mime::MimeProbe;

/// Exactly one category per file, checked in priority order: PDF extension,
/// AUX extension, sidecar extension or prefix, audio MIME, everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Pdf,
    Aux,
    Sidecar,
    Audio,
    Other,
}

/// Lowercased extension including the leading dot, or empty when absent.
pub fn ext_of(name: &str) -> String {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!(".{}", ext.to_lowercase()),
        None => String::new(),
    }
}

/// Extension with the original case preserved (sidecar targets keep it).
pub fn ext_raw_of(name: &str) -> String {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!(".{ext}"),
        None => String::new(),
    }
}

/// Filename without its final extension.
pub fn stem_of(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

/// Case-insensitive sidecar prefix match on the stem: exact equality,
/// prefix followed by a separator, or prefix followed by any non-alphabetic
/// character when the stem is longer (so `cover1` matches but `coverage`
/// does not).
pub fn is_sidecar_by_prefix(name: &str, prefixes: &[String]) -> bool {
    let stem = stem_of(name).to_lowercase();
    for prefix in prefixes {
        let p = prefix.to_lowercase();
        if stem == p {
            return true;
        }
        if [' ', '-', '_', '.']
            .iter()
            .any(|sep| stem.starts_with(&format!("{p}{sep}")))
        {
            return true;
        }
        if stem.len() > p.len() && stem.starts_with(p.as_str()) {
            if let Some(next) = stem[p.len()..].chars().next() {
                if !next.is_alphabetic() {
                    return true;
                }
            }
        }
    }
    false
}

pub fn classify(dir: &Path, name: &str, cfg: &AppConfig, probe: &dyn MimeProbe) -> FileCategory {
    let ext = ext_of(name);
    if cfg.pdf_exts.contains(&ext) {
        return FileCategory::Pdf;
    }
    if cfg.aux_exts.contains(&ext) {
        return FileCategory::Aux;
    }
    if cfg.sidecar_exts.contains(&ext) || is_sidecar_by_prefix(name, &cfg.sidecar_prefixes) {
        return FileCategory::Sidecar;
    }
    if probe.is_audio(&dir.join(name)) {
        return FileCategory::Audio;
    }
    FileCategory::Other
}
