//! The run-scoped mapping from local catalog keys to remote issue numbers.

use std::collections::BTreeMap;

use crate::identifiers::{IssueNumber, SpecKey};

/// Mapping from local [`SpecKey`] to the [`IssueNumber`] the tracker assigned
/// at creation time.
///
/// Starts empty and grows monotonically: exactly one entry per successfully
/// created specification, written by the creation pass and read-only during
/// the annotation pass. Never persisted; each run starts from scratch.
#[derive(Debug, Default)]
pub struct ResolutionMap {
    entries: BTreeMap<SpecKey, IssueNumber>,
}

impl ResolutionMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the issue number assigned to `key`.
    ///
    /// Each key is recorded exactly once per run; the creation pass visits
    /// every catalog entry a single time.
    pub fn record(&mut self, key: SpecKey, issue: IssueNumber) {
        self.entries.insert(key, issue);
    }

    /// Returns the issue number for `key`, if one has been recorded.
    pub fn get(&self, key: &SpecKey) -> Option<IssueNumber> {
        self.entries.get(key).copied()
    }

    /// Returns `true` if an issue number has been recorded for `key`.
    pub fn contains(&self, key: &SpecKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entry has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
