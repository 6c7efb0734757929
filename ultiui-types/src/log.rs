//! Log entry types produced by the ingestion pipeline.

use crate::Timestamp;

/// Severity category of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogType {
    Info,
    Warning,
    Error,
    /// Empty or unparseable message.
    Unknown,
}

impl LogType {
    /// All variants, in display order.
    pub const ALL: [LogType; 4] = [
        LogType::Error,
        LogType::Warning,
        LogType::Info,
        LogType::Unknown,
    ];

    /// Lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Info => "info",
            LogType::Warning => "warning",
            LogType::Error => "error",
            LogType::Unknown => "unknown",
        }
    }
}

impl core::fmt::Display for LogType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for LogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(LogType::Info),
            "warning" | "warn" => Ok(LogType::Warning),
            "error" => Ok(LogType::Error),
            "unknown" => Ok(LogType::Unknown),
            other => Err(format!("unknown log type: {}", other)),
        }
    }
}

/// A deduplicated log entry held in the history buffer.
///
/// Repeated lines that share a signature inside the dedup window collapse
/// into one entry: `occurrence_count` grows, `last_seen` advances and
/// `parameters` track the latest occurrence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    /// When the first collapsed line was observed.
    pub timestamp: Timestamp,
    /// Text of the first collapsed line, as received.
    pub raw_message: String,
    /// Normalized template used as the dedup key.
    pub signature: String,
    /// Variable tokens of the most recent occurrence, in order of appearance.
    pub parameters: Vec<String>,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: LogType,
    pub occurrence_count: u64,
    pub first_seen: Timestamp,
    pub last_seen: Timestamp,
}

/// Serialized view of a [`LogEntry`] for API consumers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogRecord {
    /// `last_seen` formatted as `YYYY-MM-DD HH:MM:SS` (UTC).
    pub formatted_time: String,
    pub type_id: LogType,
    /// Latest concrete message (signature with current parameters filled in).
    pub message: String,
    pub parameters: Vec<String>,
    pub signature: String,
    pub occurrence_count: u64,
    pub first_seen: Timestamp,
    pub last_seen: Timestamp,
}

/// Aggregate counters over the history buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogStats {
    /// Entries currently held.
    pub entries: usize,
    pub capacity: usize,
    pub info: usize,
    pub warning: usize,
    pub error: usize,
    pub unknown: usize,
    /// Raw lines collapsed into the current entries.
    pub total_occurrences: u64,
}

impl LogStats {
    /// Entry count for one category.
    pub fn count(&self, kind: LogType) -> usize {
        match kind {
            LogType::Info => self.info,
            LogType::Warning => self.warning,
            LogType::Error => self.error,
            LogType::Unknown => self.unknown,
        }
    }
}
