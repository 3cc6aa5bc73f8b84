//! Message catalog building.
//!
//! `CatalogBuilder` merges every occurrence of a message id into a single
//! `MessageEntry`. Entries are kept in a `BTreeMap` keyed by id, and each
//! entry's locations in a `BTreeSet`, so the finished `Catalog` is sorted
//! deterministically no matter in which order scanners delivered records.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::record::ExtractionRecord;

/// Where a message was found.
///
/// Ordering is by path first, then by line *number*: `a.py:9` sorts before
/// `a.py:10`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub source_path: String,
    pub line: usize,
}

impl Location {
    pub fn new(source_path: impl Into<String>, line: usize) -> Self {
        Self {
            source_path: source_path.into(),
            line,
        }
    }
}

/// All occurrences of one message id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    pub message_id: String,
    pub default_text: Option<String>,
    pub locations: BTreeSet<Location>,
}

impl MessageEntry {
    fn new(message_id: String) -> Self {
        Self {
            message_id,
            default_text: None,
            locations: BTreeSet::new(),
        }
    }

    /// Merge a default text seen at another occurrence.
    ///
    /// The first non-empty default wins. An empty default is only kept when
    /// nothing better has been seen yet.
    fn merge_default(&mut self, default_text: String) {
        match &self.default_text {
            Some(current) if !current.is_empty() => {}
            Some(_) if default_text.is_empty() => {}
            _ => self.default_text = Some(default_text),
        }
    }
}

/// The finished, sorted catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<MessageEntry>,
}

impl Catalog {
    /// Entries sorted by message id (case-sensitive, code point order).
    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    pub fn get(&self, message_id: &str) -> Option<&MessageEntry> {
        self.entries
            .binary_search_by(|entry| entry.message_id.as_str().cmp(message_id))
            .ok()
            .map(|index| &self.entries[index])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of distinct locations across all entries.
    pub fn location_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.locations.len()).sum()
    }
}

impl IntoIterator for Catalog {
    type Item = MessageEntry;
    type IntoIter = std::vec::IntoIter<MessageEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Accumulates records into message entries for a single extraction run.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: BTreeMap<String, MessageEntry>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record.
    ///
    /// Records with an empty message id are dropped: the empty id is reserved
    /// for the POT header. Adding the same record twice leaves a single location.
    pub fn add(&mut self, record: ExtractionRecord) {
        let ExtractionRecord {
            message_id,
            default_text,
            has_mapping,
            source_path,
            line,
        } = record;

        let message_id = message_id.into_text();
        if message_id.is_empty() {
            return;
        }

        let entry = self
            .entries
            .entry(message_id)
            .or_insert_with_key(|id| MessageEntry::new(id.clone()));

        if let Some(default_text) = default_text {
            // A mapping with an empty default is a placeholder call, not a default.
            if !(has_mapping && default_text.is_empty()) {
                entry.merge_default(default_text.into_text());
            }
        }

        entry.locations.insert(Location::new(source_path, line));
    }

    pub fn extend<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = ExtractionRecord>,
    {
        for record in records {
            self.add(record);
        }
    }

    pub fn build(self) -> Catalog {
        Catalog {
            entries: self.entries.into_values().collect(),
        }
    }
}

/// Build a catalog from a sequence of records in one go.
pub fn build<I>(records: I) -> Catalog
where
    I: IntoIterator<Item = ExtractionRecord>,
{
    let mut builder = CatalogBuilder::new();
    builder.extend(records);
    builder.build()
}
