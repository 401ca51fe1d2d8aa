//! Canonical renaming of album-related files (the PDF and CUE/LOG passes).

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use lazy_static::lazy_static;
use regex::Regex;

use super::classify::ext_of;
use super::dedupe::{self, file_mtime};
use super::pdf_meta::{self, PdfMetadata};
use super::Context;
use crate::report::{ActionKind, RunReport, ACTION_PREFIX_WIDTH};

lazy_static! {
    static ref ILLEGAL_CHARS_RE: Regex = Regex::new(r#"[<>:"/\\|?*\x00]"#).unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Replaces characters that are illegal in filenames with ` - `, collapses
/// whitespace runs and trims the ends.
pub fn sanitize_filename_component(s: &str) -> String {
    let replaced = ILLEGAL_CHARS_RE.replace_all(s, " - ");
    WHITESPACE_RE.replace_all(&replaced, " ").trim().to_string()
}

/// First free path for `base_name + ext` in `dir`. On collision, ` - 2`,
/// ` - 3`, … suffixes are tried in order. Existence is checked at call
/// time, so renames earlier in the same pass are observed.
pub fn unique_target_path(dir: &Path, base_name: &str, ext: &str) -> PathBuf {
    let plain = dir.join(format!("{base_name}{ext}"));
    if !plain.exists() {
        return plain;
    }
    let mut suffix = 2u32;
    loop {
        let candidate = dir.join(format!("{base_name} - {suffix}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        suffix += 1;
    }
}

/// Deduplicates one album-related category (PDFs, or CUE/LOG) inside `dir`
/// and renames the survivors to their canonical name: folder name plus
/// sanitized author/title when PDF metadata is in play, plain folder name
/// otherwise.
pub fn process_album_files(
    ctx: &Context,
    report: &mut RunReport,
    dir: &Path,
    files: &[String],
    exts: &BTreeSet<String>,
    use_pdf_meta: bool,
) {
    let selected: Vec<String> = files
        .iter()
        .filter(|name| exts.contains(&ext_of(name)))
        .cloned()
        .collect();
    if selected.is_empty() {
        return;
    }

    let ext_list: Vec<&str> = exts.iter().map(|s| s.as_str()).collect();
    ctx.out.info(
        2,
        &format!("Found files ({}): {:?}", ext_list.join(", "), selected),
    );

    let survivors = dedupe::dedupe_by_checksum(ctx, report, dir, &selected, 4);
    let folder_name = folder_name_of(dir);

    let mut meta_named: Vec<(String, String)> = Vec::new();
    let mut standard_named: Vec<(String, SystemTime)> = Vec::new();

    for name in &survivors {
        let path = dir.join(name);
        let meta = if use_pdf_meta {
            pdf_meta::read_pdf_metadata(&path)
        } else {
            PdfMetadata::default()
        };
        if use_pdf_meta && !meta.is_empty() {
            let mut parts = vec![folder_name.clone()];
            if let Some(author) = &meta.author {
                parts.push(sanitize_filename_component(author));
            }
            if let Some(title) = &meta.title {
                parts.push(sanitize_filename_component(title));
            }
            meta_named.push((name.clone(), parts.join(" - ")));
        } else {
            let mtime = file_mtime(&path).unwrap_or(SystemTime::UNIX_EPOCH);
            standard_named.push((name.clone(), mtime));
        }
    }

    for (name, base_name) in &meta_named {
        rename_to_base(ctx, report, dir, name, base_name);
    }

    // ascending mtime keeps collision suffixes stable across runs
    standard_named.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    for (name, _) in &standard_named {
        rename_to_base(ctx, report, dir, name, &folder_name);
    }
}

fn rename_to_base(ctx: &Context, report: &mut RunReport, dir: &Path, name: &str, base_name: &str) {
    let ext = ext_of(name);
    let src = dir.join(name);
    let plain = dir.join(format!("{base_name}{ext}"));
    if src == plain {
        ctx.out.info(4, &format!("{name} remains as {name}"));
        return;
    }

    let target = unique_target_path(dir, base_name, &ext);
    let target_name = target
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(base_name)
        .to_string();
    ctx.record_action(
        report,
        ActionKind::Rename,
        format!(
            "{:<width$}[{}] -> [{}]",
            "Rename Album Related:",
            name,
            target_name,
            width = ACTION_PREFIX_WIDTH
        ),
        4,
    );
    if !ctx.dry_run {
        if let Err(err) = fs::rename(&src, &target) {
            ctx.out.warn(
                6,
                &format!(
                    "error renaming [{}] -> [{}]: {}",
                    src.display(),
                    target.display(),
                    err
                ),
            );
        }
    }
}

fn folder_name_of(dir: &Path) -> String {
    let abs = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    abs.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| abs.display().to_string())
}
