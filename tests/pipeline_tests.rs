//! End-to-end tests of the per-directory pipeline: the three passes, the
//! dry-run guarantees and apply-mode idempotence.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use filetime::FileTime;
use tempfile::tempdir;

use rename_music::file_proc::{self, Context};
use rename_music::mime::ExtensionProbe;
use rename_music::report::{Output, RunReport};
use rename_music::AppConfig;

static EXT_PROBE: ExtensionProbe = ExtensionProbe;

fn run(dir: &Path, dry_run: bool) -> RunReport {
    let cfg = AppConfig::default();
    let ctx = Context {
        cfg: &cfg,
        dry_run,
        probe: &EXT_PROBE,
        out: Output::new(0),
    };
    file_proc::process_directory(&ctx, dir)
}

fn write(dir: &Path, name: &str, content: &[u8]) {
    fs::write(dir.join(name), content).unwrap();
}

fn set_mtime(dir: &Path, name: &str, secs: i64) {
    filetime::set_file_mtime(dir.join(name), FileTime::from_unix_time(secs, 0)).unwrap();
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

/// An album folder exercising all three passes: a duplicated PDF, a
/// duplicated CUE, a duplicated audio track and a misnamed lyrics sidecar.
fn populate_album(dir: &Path) {
    write(dir, "scan1.pdf", b"%PDF-like booklet bytes");
    write(dir, "scan2.pdf", b"%PDF-like booklet bytes");
    write(dir, "rip.cue", b"FILE \"Album.wav\" WAVE");
    write(dir, "rip (1).cue", b"FILE \"Album.wav\" WAVE");
    write(dir, "01 First Song.mp3", b"first track audio");
    write(dir, "01 First Song (copy).mp3", b"first track audio");
    write(dir, "02 Second Song.mp3", b"second track audio");
    write(dir, "01 lyrics.lrc", b"[00:01] first words");

    set_mtime(dir, "scan1.pdf", 2_000);
    set_mtime(dir, "scan2.pdf", 1_000);
    set_mtime(dir, "rip.cue", 2_000);
    set_mtime(dir, "rip (1).cue", 1_000);
    set_mtime(dir, "01 First Song.mp3", 2_000);
    set_mtime(dir, "01 First Song (copy).mp3", 1_000);
    set_mtime(dir, "02 Second Song.mp3", 2_000);
    set_mtime(dir, "01 lyrics.lrc", 1_500);
}

#[test]
fn apply_mode_normalizes_the_whole_folder() {
    let root = tempdir().unwrap();
    let dir = root.path().join("Live Album");
    fs::create_dir(&dir).unwrap();
    populate_album(&dir);

    let report = run(&dir, false);

    let names = file_names(&dir);
    let expected: BTreeSet<String> = [
        "Live Album.pdf",
        "Live Album.cue",
        "01 First Song.mp3",
        "01 First Song.lrc",
        "02 Second Song.mp3",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(names, expected);

    // one duplicate per category
    assert_eq!(report.removed_duplicates, 3);
    // pdf + cue canonical renames
    assert_eq!(report.renames, 2);
    assert_eq!(report.renamed_sidecars, 1);
}

#[test]
fn dry_run_never_mutates_and_is_deterministic() {
    let root = tempdir().unwrap();
    let dir = root.path().join("Preview Album");
    fs::create_dir(&dir).unwrap();
    populate_album(&dir);

    let before = file_names(&dir);
    let first = run(&dir, true);
    assert_eq!(file_names(&dir), before);

    let second = run(&dir, true);
    assert_eq!(file_names(&dir), before);

    let first_entries: Vec<&str> = first.actions.iter().map(|a| a.entry.as_str()).collect();
    let second_entries: Vec<&str> = second.actions.iter().map(|a| a.entry.as_str()).collect();
    assert_eq!(first_entries, second_entries);
    assert!(first.actions.iter().all(|a| a.previewed));
    assert!(first.total_actions() > 0);
}

#[test]
fn second_apply_run_is_a_no_op() {
    let root = tempdir().unwrap();
    let dir = root.path().join("Stable Album");
    fs::create_dir(&dir).unwrap();
    populate_album(&dir);

    let first = run(&dir, false);
    assert!(first.total_actions() > 0);

    let after_first = file_names(&dir);
    let second = run(&dir, false);

    assert_eq!(second.total_actions(), 0);
    assert_eq!(file_names(&dir), after_first);
}

#[test]
fn passes_run_in_order_and_observe_prior_mutations() {
    let root = tempdir().unwrap();
    let dir = root.path().join("Order Album");
    fs::create_dir(&dir).unwrap();

    // a cue already holding the canonical name, plus a newer duplicate:
    // dedup must pick the newer one first, then rename it back into place
    write(&dir, "Order Album.cue", b"cue payload");
    write(&dir, "newer copy.cue", b"cue payload");
    set_mtime(&dir, "Order Album.cue", 1_000);
    set_mtime(&dir, "newer copy.cue", 2_000);

    let report = run(&dir, false);

    let names = file_names(&dir);
    assert!(names.contains("Order Album.cue"));
    assert_eq!(names.len(), 1);
    assert_eq!(report.removed_duplicates, 1);
    assert_eq!(report.renames, 1);
}

#[test]
fn config_extension_sets_drive_the_passes() {
    let root = tempdir().unwrap();
    let dir = root.path().join("Custom");
    fs::create_dir(&dir).unwrap();
    write(&dir, "notes.nfo", b"release notes");

    let mut cfg = AppConfig::default();
    cfg.aux_exts = [".nfo".to_string()].into_iter().collect();
    let ctx = Context {
        cfg: &cfg,
        dry_run: false,
        probe: &EXT_PROBE,
        out: Output::new(0),
    };
    let report = file_proc::process_directory(&ctx, &dir);

    assert!(dir.join("Custom.nfo").exists());
    assert_eq!(report.renames, 1);
}
