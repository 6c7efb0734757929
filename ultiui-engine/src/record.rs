//! Conversion of history entries into their serialized form.

use chrono::DateTime;
use ultiui_types::{LogEntry, LogRecord, Timestamp};

use crate::signature;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS` in UTC.
///
/// Values chrono cannot represent fall back to the raw millisecond count.
pub fn format_time(timestamp: Timestamp) -> String {
    match DateTime::from_timestamp_millis(timestamp.as_millis()) {
        Some(dt) => dt.format(TIME_FORMAT).to_string(),
        None => timestamp.as_millis().to_string(),
    }
}

/// Build the API view of an entry. `message` is the latest concrete line.
pub fn to_record(entry: &LogEntry) -> LogRecord {
    LogRecord {
        formatted_time: format_time(entry.last_seen),
        type_id: entry.kind,
        message: signature::render(&entry.signature, &entry.parameters),
        parameters: entry.parameters.clone(),
        signature: entry.signature.clone(),
        occurrence_count: entry.occurrence_count,
        first_seen: entry.first_seen,
        last_seen: entry.last_seen,
    }
}
