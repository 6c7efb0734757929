//! Raw printer data and the parsers that turn it into engine input.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "60s", "500ms")
//! - [`syslog`]: System log lines as served by the printer's `/var/log/syslog`
//! - [`events`]: The printer's event history JSON
//! - [`probe_report`]: Active-leveling probe reports
//! - [`flow_file`]: Recorded temperature/flow samples
//!
//! ## Data Flow
//!
//! ```text
//! syslog / events JSON ──▶ (message, Timestamp) ──▶ LogIngestor::ingest
//! probe report JSON    ──▶ Vec<ProbePoint>       ──▶ LevelingAnalyzer::analyze
//! flow JSON            ──▶ Vec<FlowSample>       ──▶ summarize / FlowRecorder
//! ```

pub mod duration;
pub mod events;
pub mod flow_file;
pub mod probe_report;
pub mod syslog;

pub use duration::{format_duration, parse_duration};
pub use events::{parse_events, PrinterEvent};
pub use flow_file::parse_flow_samples;
pub use probe_report::parse_probe_report;
pub use syslog::{parse_syslog_line, SyslogLine};
