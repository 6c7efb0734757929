//! The printer's event history (`/api/v1/history/events`).
//!
//! Each event is a message template with positional `{0}`, `{1}` …
//! placeholders and a list of parameters:
//!
//! ```json
//! [{"time": "2024-01-05T10:22:01Z", "type_id": 131072,
//!   "message": "Print job {0} finished", "parameters": ["benchy"]}]
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use ultiui_types::Timestamp;

/// One event as served by the printer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrinterEvent {
    pub time: String,
    pub message: String,
    #[serde(default)]
    pub type_id: Option<Value>,
    #[serde(default)]
    pub parameters: Vec<Value>,
}

impl PrinterEvent {
    /// Event time, accepting RFC 3339 or a naive ISO time taken as UTC.
    pub fn timestamp(&self) -> Option<Timestamp> {
        let time = self.time.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(time) {
            return Some(Timestamp::from_millis(dt.timestamp_millis()));
        }
        NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Timestamp::from_millis(naive.and_utc().timestamp_millis()))
    }

    /// The message with its positional placeholders filled in.
    pub fn render(&self) -> String {
        let mut message = self.message.clone();
        for (i, param) in self.parameters.iter().enumerate() {
            let value = match param {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            message = message.replace(&format!("{{{}}}", i), &value);
        }
        message
    }
}

/// Parse an event history document into `(message, timestamp)` pairs,
/// oldest first. Events with an unreadable time are skipped.
pub fn parse_events(json: &str) -> Result<Vec<(String, Timestamp)>> {
    let events: Vec<PrinterEvent> =
        serde_json::from_str(json).context("Failed to parse event history")?;

    let mut lines: Vec<(String, Timestamp)> = events
        .iter()
        .filter_map(|event| match event.timestamp() {
            Some(ts) => Some((event.render(), ts)),
            None => {
                tracing::warn!(time = %event.time, "skipping event with unreadable time");
                None
            }
        })
        .collect();
    lines.sort_by_key(|(_, ts)| *ts);
    Ok(lines)
}
