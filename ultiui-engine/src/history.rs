//! Bounded, deduplicating history of log entries.

use std::collections::VecDeque;
use std::time::Duration;

use ultiui_types::{LogEntry, LogStats, LogType, Timestamp};

use crate::error::{InputError, Result};
use crate::signature::Extraction;

/// Default number of entries kept in the history buffer.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// A [`LogEntry`] plus the activity sequence used to break `last_seen` ties.
#[derive(Debug, Clone)]
struct Slot {
    entry: LogEntry,
    seq: u64,
}

/// What a call to [`HistoryBuffer::record`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    /// The line collapsed into an existing entry.
    Merged { occurrence_count: u64 },
    /// A new entry was created, possibly pushing out the oldest one.
    Inserted { evicted: Option<LogEntry> },
}

/// Ordered, bounded store of deduplicated log entries.
///
/// Entries are kept sorted by `last_seen` ascending, ties broken by the
/// order in which they were last touched, so the most recently active entry
/// is always at the back and the eviction candidate always at the front.
///
/// The buffer itself is not synchronized; [`LogIngestor`](crate::LogIngestor)
/// wraps it in a lock.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    slots: VecDeque<Slot>,
    capacity: usize,
    next_seq: u64,
    revision: u64,
}

impl HistoryBuffer {
    /// Create an empty buffer holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(InputError::ZeroCapacity);
        }
        Ok(Self {
            slots: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
            next_seq: 0,
            revision: 0,
        })
    }

    /// Record one normalized line observed at `timestamp`.
    ///
    /// The line merges into the most recently active entry carrying the same
    /// non-empty signature if that entry's `last_seen` is within `window` of
    /// `timestamp`. Otherwise a new entry is created.
    pub fn record(
        &mut self,
        raw_message: &str,
        extraction: Extraction,
        timestamp: Timestamp,
        window: Duration,
    ) -> Recorded {
        self.revision += 1;
        let seq = self.bump_seq();

        if let Some(index) = self.find_mergeable(&extraction.signature, timestamp, window) {
            if let Some(mut slot) = self.slots.remove(index) {
                slot.entry.occurrence_count += 1;
                slot.entry.last_seen = slot.entry.last_seen.max(timestamp);
                slot.entry.parameters = extraction.parameters;
                slot.seq = seq;
                let occurrence_count = slot.entry.occurrence_count;
                self.insert_sorted(slot);
                return Recorded::Merged { occurrence_count };
            }
        }

        let evicted = if self.slots.len() >= self.capacity {
            self.slots.pop_front().map(|slot| slot.entry)
        } else {
            None
        };

        self.insert_sorted(Slot {
            entry: LogEntry {
                timestamp,
                raw_message: raw_message.to_string(),
                signature: extraction.signature,
                parameters: extraction.parameters,
                kind: extraction.kind,
                occurrence_count: 1,
                first_seen: timestamp,
                last_seen: timestamp,
            },
            seq,
        });

        Recorded::Inserted { evicted }
    }

    /// Back-to-front scan: the first hit is the most recently active entry
    /// with this signature. Older duplicates behind it are never merged into.
    fn find_mergeable(&self, signature: &str, timestamp: Timestamp, window: Duration) -> Option<usize> {
        if signature.is_empty() {
            return None;
        }
        let index = self
            .slots
            .iter()
            .rposition(|slot| slot.entry.signature == signature)?;
        let last_seen = self.slots[index].entry.last_seen;
        (last_seen.abs_diff(timestamp) <= window).then_some(index)
    }

    /// `slot.seq` must be greater than every sequence already stored.
    fn insert_sorted(&mut self, slot: Slot) {
        let last_seen = slot.entry.last_seen;
        let at = self.slots.partition_point(|s| s.entry.last_seen <= last_seen);
        self.slots.insert(at, slot);
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Up to `n` entries, most recent `last_seen` first.
    pub fn recent(&self, n: usize) -> Result<Vec<LogEntry>> {
        if n == 0 {
            return Err(InputError::ZeroCount);
        }
        Ok(self.iter_recent().take(n).cloned().collect())
    }

    /// Like [`recent`](Self::recent), restricted to one category.
    pub fn recent_of_type(&self, kind: LogType, n: usize) -> Result<Vec<LogEntry>> {
        if n == 0 {
            return Err(InputError::ZeroCount);
        }
        Ok(self
            .iter_recent()
            .filter(|entry| entry.kind == kind)
            .take(n)
            .cloned()
            .collect())
    }

    /// Entries from most to least recently active.
    pub fn iter_recent(&self) -> impl Iterator<Item = &LogEntry> {
        self.slots.iter().rev().map(|slot| &slot.entry)
    }

    /// Drop every entry whose `last_seen` is strictly before `cutoff`.
    pub fn expire_before(&mut self, cutoff: Timestamp) -> usize {
        let keep_from = self.slots.partition_point(|s| s.entry.last_seen < cutoff);
        if keep_from > 0 {
            self.slots.drain(..keep_from);
            self.revision += 1;
        }
        keep_from
    }

    /// Per-category counts and collapsed line total.
    pub fn stats(&self) -> LogStats {
        let mut stats = LogStats {
            entries: self.slots.len(),
            capacity: self.capacity,
            ..LogStats::default()
        };
        for slot in &self.slots {
            match slot.entry.kind {
                LogType::Info => stats.info += 1,
                LogType::Warning => stats.warning += 1,
                LogType::Error => stats.error += 1,
                LogType::Unknown => stats.unknown += 1,
            }
            stats.total_occurrences += slot.entry.occurrence_count;
        }
        stats
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Counter bumped by every mutation. Lets pollers detect changes
    /// without diffing entries.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn clear(&mut self) {
        if !self.slots.is_empty() {
            self.slots.clear();
            self.revision += 1;
        }
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self {
            slots: VecDeque::new(),
            capacity: DEFAULT_HISTORY_CAPACITY,
            next_seq: 0,
            revision: 0,
        }
    }
}
