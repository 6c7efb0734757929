//! # ultiui
//!
//! Command-line tool and library for processing telemetry from networked
//! 3D printers: deduplicating system logs, judging bed leveling from probe
//! reports and summarizing recorded temperature/flow series.
//!
//! The processing itself lives in [`ultiui_engine`]. This crate adds the
//! pieces around it:
//!
//! ```text
//! ┌────────────┐    ┌──────────┐    ┌────────────────────┐
//! │ LineSource │───▶│  Poller  │───▶│  TelemetryEngine   │
//! │ file/chan/ │    │ (format) │    │ logs · leveling ·  │
//! │ stream     │    └──────────┘    │ flow · tolerance   │
//! └────────────┘                    └─────────┬──────────┘
//!       data::parse_* ────────────────────────┘
//! ```
//!
//! - **[`source`]**: [`LineSource`] implementations for a tailed file, a
//!   channel and any async byte stream
//! - **[`data`]**: parsers for syslog lines, event history, probe reports and
//!   flow samples
//! - **[`poller`]**: background task feeding a source into the engine
//! - **[`config`]**: layered [`Settings`] (file + `ULTIUI_*` environment)
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Deduplicate a syslog dump
//! ultiui logs syslog.txt --year 2024 --recent 20
//!
//! # Judge a probe report against 0.15 mm
//! ultiui leveling probe_report.json --tolerance 0.15
//!
//! # Follow a live log
//! ultiui watch /var/log/syslog --interval 2s
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use ultiui::{ChannelSource, LineFormat, Poller};
//! use ultiui_engine::TelemetryEngine;
//!
//! let engine = TelemetryEngine::new();
//! let (tx, source) = ChannelSource::create("printer", 64);
//! let mut poller = Poller::new(Box::new(source), LineFormat::Plain, engine.clone());
//!
//! tx.try_send("Print job started".to_string()).unwrap();
//! poller.poll_once();
//! assert_eq!(engine.logs().len(), 1);
//! ```
//!
//! ### As a library with a stream source
//!
//! ```no_run
//! use std::io::Cursor;
//! use ultiui::{LineFormat, Poller, StreamSource};
//! use ultiui_engine::TelemetryEngine;
//!
//! # tokio_test::block_on(async {
//! let data = b"Jan  5 10:22:01 printer Print job started\n";
//! let source = StreamSource::spawn(Cursor::new(data.to_vec()), "example");
//! let handle = Poller::new(
//!     Box::new(source),
//!     LineFormat::Syslog { year: 2024 },
//!     TelemetryEngine::new(),
//! )
//! .start();
//! handle.shutdown().await;
//! # });
//! ```

pub mod config;
pub mod data;
pub mod poller;
pub mod source;

pub use config::Settings;
pub use data::{
    parse_duration, parse_events, parse_flow_samples, parse_probe_report, parse_syslog_line,
    PrinterEvent, SyslogLine,
};
pub use poller::{LineFormat, PollStats, Poller, PollerHandle, MIN_POLL_INTERVAL};
pub use source::{ChannelSource, FileSource, LineSource, StreamSource};
