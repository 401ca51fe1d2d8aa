//! Audio/sidecar pairing: the third per-directory pass.
//!
//! Audio files are grouped by parsed track number and one canonical file is
//! chosen per track. Audio files themselves are never renamed here; only
//! sidecars are retargeted to the canonical stem. Whether duplicate-named
//! audio siblings with distinct content should also be touched is left as
//! is: they remain untouched.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use super::classify::{classify, ext_raw_of, stem_of, FileCategory};
use super::dedupe::{self, file_mtime};
use super::track::extract_track_info;
use super::{list_files, Context};
use crate::report::{ActionKind, RunReport, ACTION_PREFIX_WIDTH};

pub fn process_audio_and_sidecars(
    ctx: &Context,
    report: &mut RunReport,
    dir: &Path,
    files: &[String],
) {
    // checksum dedup of everything that is not PDF/AUX/sidecar
    let generic: Vec<String> = files
        .iter()
        .filter(|name| {
            !matches!(
                classify(dir, name, ctx.cfg, ctx.probe),
                FileCategory::Pdf | FileCategory::Aux | FileCategory::Sidecar
            )
        })
        .cloned()
        .collect();
    dedupe::dedupe_by_checksum(ctx, report, dir, &generic, 2);

    // re-list: the dedup above may have removed files
    let remaining = match list_files(dir) {
        Ok(names) => names,
        Err(err) => {
            ctx.out
                .warn(2, &format!("error listing {}: {}", dir.display(), err));
            return;
        }
    };

    let mut audio_files: Vec<String> = Vec::new();
    let mut sidecar_files: Vec<String> = Vec::new();
    for name in &remaining {
        match classify(dir, name, ctx.cfg, ctx.probe) {
            FileCategory::Pdf | FileCategory::Aux => {}
            FileCategory::Sidecar => sidecar_files.push(name.clone()),
            category => {
                if ctx.cfg.ignore_no_space && !name.contains(' ') {
                    ctx.out
                        .info(4, &format!("Ignoring (no space in filename): {name}"));
                } else if category == FileCategory::Audio {
                    audio_files.push(name.clone());
                } else {
                    sidecar_files.push(name.clone());
                }
            }
        }
    }

    ctx.out.info(2, &format!("Audio files: {audio_files:?}"));
    ctx.out
        .info(2, &format!("Sidecar candidates: {sidecar_files:?}"));

    let mut track_map: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for name in &audio_files {
        match extract_track_info(name, ctx.cfg.ignore_no_space) {
            Some((track, _)) => track_map.entry(track).or_default().push(name.clone()),
            None => ctx
                .out
                .info(4, &format!("Ignoring audio without track pattern: {name}")),
        }
    }

    let mut canonical_by_track: BTreeMap<u32, String> = BTreeMap::new();
    for (track, group) in &track_map {
        ctx.out
            .info(2, &format!("Track {track:02} - group: {group:?}"));
        if let Some(keep) = dedupe::preferred_by_mtime(dir, group) {
            ctx.out.info(
                4,
                &format!("Track {track:02}: canonical file for naming: [{keep}]"),
            );
            canonical_by_track.insert(*track, keep);
        }
    }

    for name in &sidecar_files {
        let Some((track, _)) = extract_track_info(name, ctx.cfg.ignore_no_space) else {
            ctx.out
                .info(4, &format!("Ignoring file without track pattern: [{name}]"));
            continue;
        };
        let Some(canonical) = canonical_by_track.get(&track) else {
            ctx.out.info(
                4,
                &format!("No canonical audio file for track [{track:02}], ignoring: [{name}]"),
            );
            continue;
        };
        retarget_sidecar(ctx, report, dir, name, canonical);
    }
}

/// Moves one sidecar next to the canonical audio file of its track. The
/// target keeps the sidecar's extension (original case); conflicts are
/// settled by mtime: a strictly older target is replaced, otherwise the
/// source is considered superseded and deleted.
fn retarget_sidecar(ctx: &Context, report: &mut RunReport, dir: &Path, name: &str, canonical: &str) {
    let target_name = format!("{}{}", stem_of(canonical), ext_raw_of(name));
    let src = dir.join(name);
    let target = dir.join(&target_name);

    if src == target {
        ctx.out
            .info(6, &format!("Sidecar [{name}] already has the target name."));
        return;
    }

    if target.exists() {
        let target_mtime = file_mtime(&target).unwrap_or(SystemTime::UNIX_EPOCH);
        let src_mtime = file_mtime(&src).unwrap_or(SystemTime::UNIX_EPOCH);
        if target_mtime < src_mtime {
            ctx.record_action(
                report,
                ActionKind::ReplacedSidecar,
                format!("Replace older target [{target_name}] with [{name}]"),
                6,
            );
            if !ctx.dry_run {
                if let Err(err) = fs::rename(&src, &target) {
                    ctx.out.warn(
                        8,
                        &format!("error replacing [{name}] -> [{target_name}]: {err}"),
                    );
                }
            }
        } else {
            ctx.record_action(
                report,
                ActionKind::RemovedSidecar,
                format!(
                    "{:<width$}[{}], newer target [{}]",
                    "Delete Sidecar:",
                    name,
                    target_name,
                    width = ACTION_PREFIX_WIDTH
                ),
                6,
            );
            if !ctx.dry_run {
                if let Err(err) = fs::remove_file(&src) {
                    ctx.out.warn(8, &format!("error deleting [{name}]: {err}"));
                }
            }
        }
    } else {
        ctx.record_action(
            report,
            ActionKind::RenamedSidecar,
            format!(
                "{:<width$}[{}] -> [{}]",
                "Rename Sidecar:",
                name,
                target_name,
                width = ACTION_PREFIX_WIDTH
            ),
            6,
        );
        if !ctx.dry_run {
            if let Err(err) = fs::rename(&src, &target) {
                ctx.out.warn(
                    8,
                    &format!("error renaming [{name}] -> [{target_name}]: {err}"),
                );
            }
        }
    }
}
