//! Action records and user-facing output.
//!
//! Every mutating operation (performed or previewed) becomes an
//! [`ActionRecord`] inside a [`RunReport`]. Each directory-processing call
//! returns its own report and the caller merges them, so there is no
//! process-global state to reset between runs or between tests.

/// Column the action detail starts at, so the summary lines up.
pub const ACTION_PREFIX_WIDTH: usize = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    RemovedDuplicate,
    Rename,
    RenamedSidecar,
    ReplacedSidecar,
    RemovedSidecar,
}

/// One filesystem mutation, as shown in the final numbered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub kind: ActionKind,
    pub entry: String,
    pub previewed: bool,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub actions: Vec<ActionRecord>,
    pub removed_duplicates: usize,
    pub renames: usize,
    pub replacements: usize,
    pub removed_sidecars: usize,
    pub renamed_sidecars: usize,
}

impl RunReport {
    pub fn record(&mut self, kind: ActionKind, entry: String, previewed: bool) {
        match kind {
            ActionKind::RemovedDuplicate => self.removed_duplicates += 1,
            ActionKind::Rename => self.renames += 1,
            ActionKind::RenamedSidecar => self.renamed_sidecars += 1,
            ActionKind::ReplacedSidecar => self.replacements += 1,
            ActionKind::RemovedSidecar => self.removed_sidecars += 1,
        }
        self.actions.push(ActionRecord {
            kind,
            entry,
            previewed,
        });
    }

    pub fn total_actions(&self) -> usize {
        self.actions.len()
    }

    pub fn merge(&mut self, other: RunReport) {
        self.removed_duplicates += other.removed_duplicates;
        self.renames += other.renames;
        self.replacements += other.replacements;
        self.removed_sidecars += other.removed_sidecars;
        self.renamed_sidecars += other.renamed_sidecars;
        self.actions.extend(other.actions);
    }
}

/// Verbosity-gated progress output. Warnings and informational lines share
/// stdout with the action report; `-v` shows actions and warnings, `-vv`
/// adds the INFO trace.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    verbose: u8,
}

impl Output {
    pub fn new(verbose: u8) -> Self {
        Self { verbose }
    }

    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Always printed, regardless of verbosity.
    pub fn brief(&self, msg: &str) {
        println!("{msg}");
    }

    pub fn info(&self, indent: usize, msg: &str) {
        if self.verbose >= 2 {
            println!("{:indent$}[INFO] {msg}", "");
        }
    }

    pub fn warn(&self, indent: usize, msg: &str) {
        if self.verbose >= 1 {
            println!("{:indent$}[WARN] {msg}", "");
        }
    }

    /// Echoes an already-formatted action entry at `-v` and above.
    pub fn action(&self, indent: usize, entry: &str) {
        if self.verbose >= 1 {
            println!("{:indent$}{entry}", "");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_bumps_the_matching_counter() {
        let mut report = RunReport::default();
        report.record(ActionKind::RemovedDuplicate, "[DRY] x".into(), true);
        report.record(ActionKind::RenamedSidecar, "[DRY] y".into(), true);
        report.record(ActionKind::RenamedSidecar, "[DRY] z".into(), true);

        assert_eq!(report.removed_duplicates, 1);
        assert_eq!(report.renamed_sidecars, 2);
        assert_eq!(report.total_actions(), 3);
    }

    #[test]
    fn merge_accumulates_counters_and_preserves_entry_order() {
        let mut first = RunReport::default();
        first.record(ActionKind::Rename, "a".into(), false);

        let mut second = RunReport::default();
        second.record(ActionKind::ReplacedSidecar, "b".into(), false);
        second.record(ActionKind::RemovedSidecar, "c".into(), false);

        first.merge(second);
        assert_eq!(first.renames, 1);
        assert_eq!(first.replacements, 1);
        assert_eq!(first.removed_sidecars, 1);
        let entries: Vec<&str> = first.actions.iter().map(|a| a.entry.as_str()).collect();
        assert_eq!(entries, vec!["a", "b", "c"]);
    }
}
