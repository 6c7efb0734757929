//! Log ingestion: normalize, deduplicate and store raw lines.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use ultiui_types::{LogEntry, LogRecord, LogStats, LogType, Timestamp};

use crate::error::Result;
use crate::history::{HistoryBuffer, Recorded};
use crate::record::to_record;
use crate::signature;

/// Default span within which repeats of a signature collapse.
pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(60);

/// Outcome of ingesting a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    /// A new entry was created.
    New,
    /// The line collapsed into an existing entry.
    Merged { occurrence_count: u64 },
}

/// Shared handle for feeding raw log lines into the history buffer.
///
/// Cloning is cheap and every clone writes to the same buffer. Each call
/// holds the write lock for the whole normalize-merge-evict step, so
/// readers never observe a half-applied update.
///
/// # Example
///
/// ```rust
/// use ultiui_engine::LogIngestor;
/// use ultiui_types::Timestamp;
///
/// let ingestor = LogIngestor::default();
/// ingestor.ingest("Nozzle temp 210C", Timestamp::from_secs(0));
/// ingestor.ingest("Nozzle temp 215C", Timestamp::from_secs(1));
///
/// let recent = ingestor.recent(10).unwrap();
/// assert_eq!(recent.len(), 1);
/// assert_eq!(recent[0].occurrence_count, 2);
/// ```
#[derive(Clone)]
pub struct LogIngestor {
    buffer: Arc<RwLock<HistoryBuffer>>,
    dedup_window: Duration,
}

impl LogIngestor {
    /// Create an ingestor with its own buffer.
    pub fn new(capacity: usize, dedup_window: Duration) -> Result<Self> {
        Ok(Self {
            buffer: Arc::new(RwLock::new(HistoryBuffer::new(capacity)?)),
            dedup_window,
        })
    }

    /// Ingest one raw line observed at `timestamp`.
    pub fn ingest(&self, raw_message: &str, timestamp: Timestamp) -> Ingested {
        let extraction = signature::extract(raw_message);
        let mut buffer = self.buffer.write();
        self.apply(&mut buffer, raw_message, extraction, timestamp)
    }

    /// Ingest many lines under a single lock acquisition, in order.
    ///
    /// Returns the number of lines that created new entries.
    pub fn ingest_batch<I, S>(&self, lines: I) -> usize
    where
        I: IntoIterator<Item = (S, Timestamp)>,
        S: AsRef<str>,
    {
        let prepared: Vec<_> = lines
            .into_iter()
            .map(|(line, ts)| {
                let extraction = signature::extract(line.as_ref());
                (line, extraction, ts)
            })
            .collect();

        let mut buffer = self.buffer.write();
        let mut created = 0;
        for (line, extraction, ts) in prepared {
            if self.apply(&mut buffer, line.as_ref(), extraction, ts) == Ingested::New {
                created += 1;
            }
        }
        created
    }

    fn apply(
        &self,
        buffer: &mut HistoryBuffer,
        raw_message: &str,
        extraction: signature::Extraction,
        timestamp: Timestamp,
    ) -> Ingested {
        tracing::trace!(signature = %extraction.signature, kind = %extraction.kind, "ingest");
        match buffer.record(raw_message, extraction, timestamp, self.dedup_window) {
            Recorded::Merged { occurrence_count } => Ingested::Merged { occurrence_count },
            Recorded::Inserted { evicted } => {
                if let Some(evicted) = evicted {
                    tracing::debug!(
                        signature = %evicted.signature,
                        last_seen = evicted.last_seen.as_millis(),
                        occurrences = evicted.occurrence_count,
                        "history full, evicted oldest entry"
                    );
                }
                Ingested::New
            }
        }
    }

    /// Up to `n` entries, most recent first.
    pub fn recent(&self, n: usize) -> Result<Vec<LogEntry>> {
        self.buffer.read().recent(n)
    }

    /// Up to `n` entries of one category, most recent first.
    pub fn recent_of_type(&self, kind: LogType, n: usize) -> Result<Vec<LogEntry>> {
        self.buffer.read().recent_of_type(kind, n)
    }

    /// [`recent`](Self::recent) in serialized form.
    pub fn records(&self, n: usize) -> Result<Vec<LogRecord>> {
        let buffer = self.buffer.read();
        let entries = buffer.recent(n)?;
        Ok(entries.iter().map(to_record).collect())
    }

    /// Remove entries not seen since `cutoff`. Returns how many were dropped.
    pub fn expire_before(&self, cutoff: Timestamp) -> usize {
        let removed = self.buffer.write().expire_before(cutoff);
        if removed > 0 {
            tracing::debug!(removed, cutoff = cutoff.as_millis(), "expired stale log entries");
        }
        removed
    }

    pub fn stats(&self) -> LogStats {
        self.buffer.read().stats()
    }

    pub fn len(&self) -> usize {
        self.buffer.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.read().capacity()
    }

    pub fn dedup_window(&self) -> Duration {
        self.dedup_window
    }

    /// See [`HistoryBuffer::revision`].
    pub fn revision(&self) -> u64 {
        self.buffer.read().revision()
    }

    pub fn clear(&self) {
        self.buffer.write().clear();
    }
}

impl Default for LogIngestor {
    fn default() -> Self {
        Self {
            buffer: Arc::new(RwLock::new(HistoryBuffer::default())),
            dedup_window: DEFAULT_DEDUP_WINDOW,
        }
    }
}

impl std::fmt::Debug for LogIngestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let buffer = self.buffer.read();
        f.debug_struct("LogIngestor")
            .field("len", &buffer.len())
            .field("capacity", &buffer.capacity())
            .field("dedup_window", &self.dedup_window)
            .finish()
    }
}
