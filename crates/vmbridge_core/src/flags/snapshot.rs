//! Owned copies of the registry's flag names.
//!
//! # Invariants
//! - Boolean entries precede integer entries.
//! - Within one kind, entries keep registration order.
//! - A snapshot never carries values, only names and kinds.
//! - A snapshot is move-only; releasing it consumes it.

use crate::flags::record::FlagKind;
use serde::Serialize;

/// One `(name, kind)` pair of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagEntry {
    pub name: String,
    pub kind: FlagKind,
}

impl FlagEntry {
    pub fn new(name: impl Into<String>, kind: FlagKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Numeric kind tag (`0` = bool, `1` = int).
    pub fn tag(&self) -> i32 {
        self.kind.tag()
    }
}

/// Independently owned list of flag names and kinds.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlagSnapshot {
    entries: Vec<FlagEntry>,
}

impl FlagSnapshot {
    pub(crate) fn from_entries(entries: Vec<FlagEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FlagEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlagEntry> {
        self.entries.iter()
    }

    pub fn count(&self, kind: FlagKind) -> usize {
        self.entries.iter().filter(|entry| entry.kind == kind).count()
    }

    /// Names in snapshot order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Kind tags in snapshot order.
    pub fn tags(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.iter().map(FlagEntry::tag)
    }

    /// Releases every copied name; returns how many entries were freed.
    pub fn release(self) -> usize {
        let released = self.entries.len();
        drop(self);
        released
    }

    pub fn into_entries(self) -> Vec<FlagEntry> {
        self.entries
    }
}

impl IntoIterator for FlagSnapshot {
    type Item = FlagEntry;
    type IntoIter = std::vec::IntoIter<FlagEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a FlagSnapshot {
    type Item = &'a FlagEntry;
    type IntoIter = std::slice::Iter<'a, FlagEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
