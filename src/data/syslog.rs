//! Printer system log lines.
//!
//! The printer serves a classic BSD-style syslog:
//!
//! ```text
//! Jan  5 10:22:01 ultimakersystem-ccbdd30037a1 PrinterService[1234]:WAR - Hotend 0 not detected
//! └──── time ───┘ └──────── host ────────────┘ └──────────── message ──────────────────────┘
//! ```
//!
//! The line carries no year, so callers supply one.

use chrono::{NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use ultiui_types::Timestamp;

static SYSLOG_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z][a-z]{2})\s+(\d{1,2})\s+(\d{2}:\d{2}:\d{2})\s+(\S+)\s+(.+)$")
        .expect("syslog pattern is valid")
});

/// One parsed syslog line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyslogLine {
    pub timestamp: Timestamp,
    pub host: String,
    pub message: String,
}

/// Parse a syslog line, interpreting its time as UTC in `year`.
///
/// Returns `None` for lines that do not follow the format (continuation
/// lines, blank lines, impossible dates).
pub fn parse_syslog_line(line: &str, year: i32) -> Option<SyslogLine> {
    let caps = SYSLOG_LINE.captures(line.trim_end())?;
    let stamp = format!("{} {} {} {}", year, &caps[1], &caps[2], &caps[3]);
    let naive = NaiveDateTime::parse_from_str(&stamp, "%Y %b %d %H:%M:%S").ok()?;

    Some(SyslogLine {
        timestamp: Timestamp::from_millis(Utc.from_utc_datetime(&naive).timestamp_millis()),
        host: caps[4].to_string(),
        message: caps[5].to_string(),
    })
}
