use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml::Value;
use tracing::debug;

/// A config key that was present but carried the wrong TOML type. The key
/// is skipped; every other valid key still merges.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigFieldError {
    #[error("'{0}' must be a boolean")]
    ExpectedBool(&'static str),

    #[error("'{0}' must be a list of strings")]
    ExpectedStringList(&'static str),
}

/// Resolved configuration, built once at startup and passed by reference
/// into the processing pipeline.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ignore_no_space: bool,
    pub dry_run_default: bool,
    pub recursive_default: bool,
    pub pdf_exts: BTreeSet<String>,
    pub aux_exts: BTreeSet<String>,
    pub sidecar_exts: BTreeSet<String>,
    pub sidecar_prefixes: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ignore_no_space: true,
            dry_run_default: true,
            recursive_default: false,
            pdf_exts: ext_set(&[".pdf"]),
            aux_exts: ext_set(&[".cue", ".log"]),
            sidecar_exts: ext_set(&[".lrc", ".txt"]),
            sidecar_prefixes: ["cover", "albumart", "folder", "front", "back", "poster"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

fn ext_set(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Lowercases and prepends the dot when the config gave a bare extension.
pub fn normalize_ext(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}

/// Config file candidates, in lookup order: the explicit `--config` path,
/// the repo-local `./config.toml`, then the user config directory.
pub fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = explicit {
        candidates.push(path.to_path_buf());
    }
    candidates.push(PathBuf::from("config.toml"));
    if let Some(base) = dirs::config_dir() {
        candidates.push(base.join("rename-music").join("config.toml"));
    }
    candidates
}

/// Loads the first usable candidate on top of the defaults. A candidate
/// that cannot be read or parsed is skipped in favour of the next one;
/// type-invalid keys inside a usable candidate are skipped while the
/// remaining keys merge. Every problem goes to stderr regardless of
/// verbosity, so a rejected config never passes silently.
pub fn load(explicit: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    let (cfg, path, issues) = load_with_issues(explicit);
    for issue in &issues {
        eprintln!("[WARN] {issue}");
    }
    (cfg, path)
}

/// Like [`load`], but returns the problems instead of printing them.
pub fn load_with_issues(explicit: Option<&Path>) -> (AppConfig, Option<PathBuf>, Vec<String>) {
    let mut cfg = AppConfig::default();
    let mut issues = Vec::new();
    for path in candidate_paths(explicit) {
        if !path.is_file() {
            continue;
        }
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                issues.push(format!("failed to read config {}: {}", path.display(), err));
                continue;
            }
        };
        let table = match text.parse::<toml::Table>() {
            Ok(table) => table,
            Err(err) => {
                issues.push(format!(
                    "failed to parse TOML config {}: {}",
                    path.display(),
                    err
                ));
                continue;
            }
        };
        for issue in merge_table(&mut cfg, &table) {
            issues.push(format!("config {}: {}", path.display(), issue));
        }
        debug!("merged configuration from {}", path.display());
        return (cfg, Some(path), issues);
    }
    (cfg, None, issues)
}

/// Merges recognized keys from `table` into `cfg`, returning one error per
/// type-mismatched key. Unknown keys are ignored.
pub fn merge_table(cfg: &mut AppConfig, table: &toml::Table) -> Vec<ConfigFieldError> {
    let mut errors = Vec::new();

    merge_bool(table, "ignore_no_space", &mut cfg.ignore_no_space, &mut errors);
    merge_bool(table, "dry_run_default", &mut cfg.dry_run_default, &mut errors);
    merge_bool(table, "recursive_default", &mut cfg.recursive_default, &mut errors);

    merge_ext_set(table, "pdf_exts", &mut cfg.pdf_exts, &mut errors);
    merge_ext_set(table, "aux_exts", &mut cfg.aux_exts, &mut errors);
    merge_ext_set(table, "sidecar_exts", &mut cfg.sidecar_exts, &mut errors);

    merge_string_list(table, "sidecar_prefixes", &mut cfg.sidecar_prefixes, &mut errors);

    errors
}

fn merge_bool(
    table: &toml::Table,
    key: &'static str,
    slot: &mut bool,
    errors: &mut Vec<ConfigFieldError>,
) {
    match table.get(key) {
        Some(Value::Boolean(value)) => *slot = *value,
        Some(_) => errors.push(ConfigFieldError::ExpectedBool(key)),
        None => {}
    }
}

fn merge_ext_set(
    table: &toml::Table,
    key: &'static str,
    slot: &mut BTreeSet<String>,
    errors: &mut Vec<ConfigFieldError>,
) {
    match table.get(key) {
        Some(value) => match string_list(value) {
            Some(list) => *slot = list.iter().map(|s| normalize_ext(s)).collect(),
            None => errors.push(ConfigFieldError::ExpectedStringList(key)),
        },
        None => {}
    }
}

fn merge_string_list(
    table: &toml::Table,
    key: &'static str,
    slot: &mut Vec<String>,
    errors: &mut Vec<ConfigFieldError>,
) {
    match table.get(key) {
        Some(value) => match string_list(value) {
            Some(list) => *slot = list.iter().map(|s| s.to_lowercase()).collect(),
            None => errors.push(ConfigFieldError::ExpectedStringList(key)),
        },
        None => {}
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    let Value::Array(items) = value else {
        return None;
    };
    items
        .iter()
        .map(|item| item.as_str().map(str::to_owned))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_shipped_extension_sets() {
        let cfg = AppConfig::default();
        assert!(cfg.ignore_no_space);
        assert!(cfg.dry_run_default);
        assert!(!cfg.recursive_default);
        assert!(cfg.pdf_exts.contains(".pdf"));
        assert!(cfg.aux_exts.contains(".cue"));
        assert!(cfg.aux_exts.contains(".log"));
        assert!(cfg.sidecar_exts.contains(".lrc"));
        assert!(cfg.sidecar_prefixes.contains(&"cover".to_string()));
    }

    #[test]
    fn merge_accepts_valid_keys_and_normalizes_extensions() {
        let table: toml::Table = r#"
            ignore_no_space = false
            recursive_default = true
            pdf_exts = ["pdf", ".PDF"]
            sidecar_prefixes = ["Cover", "scan"]
        "#
        .parse()
        .unwrap();

        let mut cfg = AppConfig::default();
        let errors = merge_table(&mut cfg, &table);

        assert!(errors.is_empty());
        assert!(!cfg.ignore_no_space);
        assert!(cfg.recursive_default);
        assert_eq!(cfg.pdf_exts, ext_set(&[".pdf"]));
        assert_eq!(cfg.sidecar_prefixes, vec!["cover", "scan"]);
    }

    #[test]
    fn type_mismatch_is_reported_but_valid_keys_still_merge() {
        let table: toml::Table = r#"
            dry_run_default = "yes"
            aux_exts = [".cue", 7]
            sidecar_exts = [".lrc"]
        "#
        .parse()
        .unwrap();

        let mut cfg = AppConfig::default();
        let errors = merge_table(&mut cfg, &table);

        assert_eq!(
            errors,
            vec![
                ConfigFieldError::ExpectedBool("dry_run_default"),
                ConfigFieldError::ExpectedStringList("aux_exts"),
            ]
        );
        // invalid keys keep their defaults
        assert!(cfg.dry_run_default);
        assert!(cfg.aux_exts.contains(".log"));
        // valid key merged
        assert_eq!(cfg.sidecar_exts, ext_set(&[".lrc"]));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let table: toml::Table = "some_future_key = 1".parse().unwrap();
        let mut cfg = AppConfig::default();
        assert!(merge_table(&mut cfg, &table).is_empty());
    }

    #[test]
    fn unparseable_candidate_is_reported_and_defaults_survive() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "not = [valid toml").unwrap();

        let (cfg, _, issues) = load_with_issues(Some(&bad));

        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("parse"), "{}", issues[0]);
        assert!(cfg.dry_run_default);
        assert!(cfg.aux_exts.contains(".cue"));
    }

    #[test]
    fn type_invalid_keys_in_a_loaded_file_are_reported() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("config.toml");
        fs::write(&file, "dry_run_default = \"yes\"\nrecursive_default = true\n").unwrap();

        let (cfg, path, issues) = load_with_issues(Some(&file));

        assert_eq!(path, Some(file));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("dry_run_default"), "{}", issues[0]);
        // the invalid key keeps its default, the valid one merges
        assert!(cfg.dry_run_default);
        assert!(cfg.recursive_default);
    }

    #[test]
    fn explicit_config_path_is_first_candidate() {
        let candidates = candidate_paths(Some(Path::new("/tmp/custom.toml")));
        assert_eq!(candidates[0], PathBuf::from("/tmp/custom.toml"));
        assert_eq!(candidates[1], PathBuf::from("config.toml"));
    }
}
