//! Content-hash deduplication within one directory and one category pass.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::time::SystemTime;

use tracing::debug;

use super::Context;
use crate::report::{ActionKind, RunReport};

const HASH_CHUNK: usize = 8192;

/// Streaming blake3 of the full file content, as lowercase hex.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; HASH_CHUNK];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

pub fn file_mtime(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Picks the newest file; equal mtimes fall back to the lexicographically
/// smallest name, so repeated runs on identical input agree.
pub fn preferred_by_mtime(dir: &Path, names: &[String]) -> Option<String> {
    let mut best: Option<(SystemTime, &String)> = None;
    for name in names {
        let mtime = file_mtime(&dir.join(name)).unwrap_or(SystemTime::UNIX_EPOCH);
        best = match best {
            None => Some((mtime, name)),
            Some((best_mtime, best_name)) => {
                if mtime > best_mtime || (mtime == best_mtime && name < best_name) {
                    Some((mtime, name))
                } else {
                    Some((best_mtime, best_name))
                }
            }
        };
    }
    best.map(|(_, name)| name.clone())
}

/// Hashes `candidates`, removes all but the preferred file of every
/// duplicate group, and returns the surviving names. Files whose content
/// cannot be read are warned about and kept as unique survivors.
///
/// Grouping is keyed through a BTreeMap so the action order is identical
/// across runs regardless of hash values.
pub fn dedupe_by_checksum(
    ctx: &Context,
    report: &mut RunReport,
    dir: &Path,
    candidates: &[String],
    indent: usize,
) -> Vec<String> {
    let mut by_hash: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut survivors: Vec<String> = Vec::new();

    for name in candidates {
        match hash_file(&dir.join(name)) {
            Ok(hash) => by_hash.entry(hash).or_default().push(name.clone()),
            Err(err) => {
                ctx.out
                    .warn(indent + 2, &format!("could not hash [{name}]: {err}"));
                survivors.push(name.clone());
            }
        }
    }

    for (hash, group) in &by_hash {
        if group.len() == 1 {
            survivors.push(group[0].clone());
            continue;
        }
        let keep = match preferred_by_mtime(dir, group) {
            Some(keep) => keep,
            None => continue,
        };
        debug!("duplicate group {}..: keeping [{}]", &hash[..12], keep);
        ctx.out.info(
            indent,
            &format!("Checksum duplicate group: {group:?} -> keep: [{keep}]"),
        );
        for name in group {
            if *name == keep {
                continue;
            }
            ctx.record_action(
                report,
                ActionKind::RemovedDuplicate,
                format!("Remove duplicate (checksum) [{name}]"),
                indent + 2,
            );
            if !ctx.dry_run {
                if let Err(err) = fs::remove_file(dir.join(name)) {
                    ctx.out
                        .warn(indent + 4, &format!("error removing [{name}]: {err}"));
                }
            }
        }
        survivors.push(keep);
    }

    survivors
}
