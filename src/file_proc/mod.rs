//! The per-directory pipeline: classification, deduplication and renaming.

pub mod classify;
pub mod dedupe;
pub mod pairer;
pub mod pdf_meta;
pub mod renamer;
pub mod track;

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::app_config::AppConfig;
use crate::mime::MimeProbe;
use crate::report::{ActionKind, Output, RunReport};

/// Everything a directory pass needs, built once at startup. The config is
/// immutable and the MIME probe is the strategy selected by the caller, so
/// passes have no hidden global state.
pub struct Context<'a> {
    pub cfg: &'a AppConfig,
    pub dry_run: bool,
    pub probe: &'a dyn MimeProbe,
    pub out: Output,
}

impl Context<'_> {
    /// Formats, echoes and records one mutating action (performed or
    /// previewed).
    pub fn record_action(
        &self,
        report: &mut RunReport,
        kind: ActionKind,
        msg: String,
        indent: usize,
    ) {
        let prefix = if self.dry_run { "[DRY]" } else { "[DO ]" };
        let entry = format!("{prefix} {msg}");
        self.out.action(indent, &entry);
        report.record(kind, entry, self.dry_run);
    }
}

/// Immediate plain files of `dir` (no subdirectories), sorted by name.
pub fn list_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Runs the three passes over one directory: PDFs, then CUE/LOG, then the
/// generic dedup plus audio/sidecar pairing. The directory is re-listed
/// between passes because each pass must observe the mutations of the
/// previous one.
pub fn process_directory(ctx: &Context, dir: &Path) -> RunReport {
    let mut report = RunReport::default();
    ctx.out
        .brief(&format!("\n=== Processing directory: {}", dir.display()));

    let files = match list_files(dir) {
        Ok(files) => files,
        Err(err) => {
            ctx.out
                .warn(2, &format!("error listing {}: {}", dir.display(), err));
            return report;
        }
    };
    if files.is_empty() {
        ctx.out.info(2, "No files in this directory.");
        return report;
    }

    renamer::process_album_files(ctx, &mut report, dir, &files, &ctx.cfg.pdf_exts, true);

    match list_files(dir) {
        Ok(files) => {
            renamer::process_album_files(ctx, &mut report, dir, &files, &ctx.cfg.aux_exts, false)
        }
        Err(err) => {
            ctx.out
                .warn(2, &format!("error listing {}: {}", dir.display(), err));
            return report;
        }
    }

    match list_files(dir) {
        Ok(files) => pairer::process_audio_and_sidecars(ctx, &mut report, dir, &files),
        Err(err) => {
            ctx.out
                .warn(2, &format!("error listing {}: {}", dir.display(), err));
        }
    }

    report
}

// keep = descend; dot-directories are pruned before recursion and
// symlinked directories are never followed (follow_links stays off)
fn keep_dir_entry(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    !entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Processes `root` alone, or the whole tree top-down (parent before
/// children) in recursive mode. Per-directory reports are merged into one.
pub fn process_root(ctx: &Context, root: &Path, recursive: bool) -> RunReport {
    if !recursive {
        return process_directory(ctx, root);
    }

    let mut report = RunReport::default();
    let walker = WalkDir::new(root).into_iter().filter_entry(keep_dir_entry);
    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => {
                report.merge(process_directory(ctx, entry.path()));
            }
            Ok(_) => {}
            Err(err) => {
                ctx.out.warn(0, &format!("error walking tree: {err}"));
                debug!("walk error under {}: {}", root.display(), err);
            }
        }
    }
    report
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::Path;

    use filetime::FileTime;

    use super::Context;
    use crate::app_config::AppConfig;
    use crate::mime::ExtensionProbe;
    use crate::report::Output;

    static EXT_PROBE: ExtensionProbe = ExtensionProbe;

    /// Context over the extension-only probe with silent output, so tests
    /// never depend on file content sniffing or clutter the test log.
    pub fn ctx(cfg: &AppConfig, dry_run: bool) -> Context<'_> {
        Context {
            cfg,
            dry_run,
            probe: &EXT_PROBE,
            out: Output::new(0),
        }
    }

    pub fn write(dir: &Path, name: &str, content: &[u8]) {
        fs::write(dir.join(name), content).unwrap();
    }

    pub fn set_mtime(dir: &Path, name: &str, secs: i64) {
        filetime::set_file_mtime(dir.join(name), FileTime::from_unix_time(secs, 0)).unwrap();
    }
}
