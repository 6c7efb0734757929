//! # ultiui-engine
//!
//! Telemetry processing for networked 3D printers: log deduplication, bed
//! leveling analysis and flow/temperature summaries.
//!
//! Every component is a cheap, clonable handle over shared state, so the
//! same engine can be handed to a background poller and to request
//! handlers at once.
//!
//! ## Quick Start
//!
//! ```rust
//! use ultiui_engine::TelemetryEngine;
//! use ultiui_types::{FlowSample, Timestamp};
//!
//! let engine = TelemetryEngine::new();
//!
//! // Repeats of the same template collapse into one entry
//! engine.logs().ingest("Nozzle temp 210C", Timestamp::from_secs(0));
//! engine.logs().ingest("Nozzle temp 215C", Timestamp::from_secs(2));
//! engine.logs().ingest("Bed temp 60C", Timestamp::from_secs(3));
//! assert_eq!(engine.logs().len(), 2);
//!
//! // Flow samples are summarized and downsampled on demand
//! let samples: Vec<_> = (0..100)
//!     .map(|i| FlowSample::new(Timestamp::from_secs(i), Some(210.0), Some(1.0)))
//!     .collect();
//! let summary = engine.summarize(&samples, None, 10).unwrap();
//! assert_eq!(summary.downsampled_series.len(), 10);
//! ```
//!
//! ## Components
//!
//! - [`LogIngestor`]: normalizes lines into signatures and deduplicates them
//!   in a bounded [`HistoryBuffer`]
//! - [`LevelingAnalyzer`]: statistics and a level verdict over a probe grid
//! - [`FlowStatsAggregator`] and [`FlowRecorder`]: windowed series summaries
//! - [`ToleranceThresholdStore`]: the shared, atomically updated threshold
//! - [`AlertTracker`]: active alerts, resolution and suppression of re-raises

mod alerts;
mod engine;
mod error;
mod flow;
mod history;
mod ingest;
mod leveling;
mod record;
pub mod signature;
mod tolerance;

pub use alerts::{
    AlertTracker, Raised, ALERT_REFRESH_INTERVAL, DEFAULT_ALERT_HISTORY_CAPACITY,
    DEFAULT_ALERT_MAX_AGE, RESOLVE_SUPPRESSION,
};
pub use engine::{TelemetryEngine, TelemetryEngineBuilder};
pub use error::{InputError, Result};
pub use flow::{summarize, FlowRecorder, FlowStatsAggregator, DEFAULT_FLOW_CAPACITY};
pub use history::{HistoryBuffer, Recorded, DEFAULT_HISTORY_CAPACITY};
pub use ingest::{Ingested, LogIngestor, DEFAULT_DEDUP_WINDOW};
pub use leveling::{analyze_with_threshold, LevelingAnalyzer};
pub use record::{format_time, to_record};
pub use tolerance::{ToleranceThresholdStore, DEFAULT_TOLERANCE_MM, MAX_TOLERANCE_MM};

// Re-export types for convenience
pub use ultiui_types::{
    Alert, FlowSample, FlowSummary, LevelingReport, LogEntry, LogRecord, LogStats, LogType,
    ProbePoint, TimeWindow, Timestamp,
};
