//! The `TelemetryEngine` facade wiring every component to shared state.

use std::time::Duration;

use ultiui_types::{FlowSample, FlowSummary, LevelingReport, ProbePoint, TimeWindow};

use crate::alerts::{AlertTracker, DEFAULT_ALERT_HISTORY_CAPACITY};
use crate::error::Result;
use crate::flow::{FlowRecorder, FlowStatsAggregator, DEFAULT_FLOW_CAPACITY};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::ingest::{LogIngestor, DEFAULT_DEDUP_WINDOW};
use crate::leveling::LevelingAnalyzer;
use crate::tolerance::{ToleranceThresholdStore, DEFAULT_TOLERANCE_MM};

/// One process-wide set of telemetry components.
///
/// The analyzer holds the same tolerance store the engine exposes, so a
/// `tolerance().set(..)` is visible to the next `analyze` call. Clone is
/// cheap and every clone shares state.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use ultiui_engine::TelemetryEngine;
/// use ultiui_types::{ProbePoint, Timestamp};
///
/// let engine = TelemetryEngine::builder()
///     .history_capacity(500)
///     .dedup_window(Duration::from_secs(30))
///     .tolerance(0.15)
///     .build()
///     .unwrap();
///
/// engine.logs().ingest("Bed temp 60C", Timestamp::from_secs(0));
///
/// let report = engine
///     .analyze(&[ProbePoint::new(0.0, 0.0, 0.1), ProbePoint::new(10.0, 0.0, -0.1)])
///     .unwrap();
/// assert!(report.is_level);
/// ```
#[derive(Debug, Clone)]
pub struct TelemetryEngine {
    logs: LogIngestor,
    tolerance: ToleranceThresholdStore,
    leveling: LevelingAnalyzer,
    flow: FlowStatsAggregator,
    recorder: FlowRecorder,
    alerts: AlertTracker,
}

impl TelemetryEngine {
    /// Engine with every default: 1000 entries, 60 s window, 0.1 mm.
    pub fn new() -> Self {
        let tolerance = ToleranceThresholdStore::default();
        Self {
            logs: LogIngestor::default(),
            leveling: LevelingAnalyzer::new(tolerance.clone()),
            tolerance,
            flow: FlowStatsAggregator::new(),
            recorder: FlowRecorder::default(),
            alerts: AlertTracker::default(),
        }
    }

    pub fn builder() -> TelemetryEngineBuilder {
        TelemetryEngineBuilder::new()
    }

    pub fn logs(&self) -> &LogIngestor {
        &self.logs
    }

    pub fn tolerance(&self) -> &ToleranceThresholdStore {
        &self.tolerance
    }

    pub fn leveling(&self) -> &LevelingAnalyzer {
        &self.leveling
    }

    pub fn flow(&self) -> &FlowStatsAggregator {
        &self.flow
    }

    pub fn recorder(&self) -> &FlowRecorder {
        &self.recorder
    }

    pub fn alerts(&self) -> &AlertTracker {
        &self.alerts
    }

    /// Shorthand for `leveling().analyze(points)`.
    pub fn analyze(&self, points: &[ProbePoint]) -> Result<LevelingReport> {
        self.leveling.analyze(points)
    }

    /// Shorthand for `flow().summarize(samples, window, max_points)`.
    pub fn summarize(
        &self,
        samples: &[FlowSample],
        window: Option<TimeWindow>,
        max_points: usize,
    ) -> Result<FlowSummary> {
        self.flow.summarize(samples, window, max_points)
    }

    /// Summarize whatever the recorder currently holds.
    pub fn summarize_recorded(
        &self,
        window: Option<TimeWindow>,
        max_points: usize,
    ) -> Result<FlowSummary> {
        self.flow.summarize(&self.recorder.snapshot(), window, max_points)
    }
}

impl Default for TelemetryEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`TelemetryEngine`].
#[derive(Debug, Default)]
pub struct TelemetryEngineBuilder {
    history_capacity: Option<usize>,
    dedup_window: Option<Duration>,
    tolerance: Option<f64>,
    flow_capacity: Option<usize>,
    alert_history_capacity: Option<usize>,
}

impl TelemetryEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of log entries kept. Defaults to 1000.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    /// Span within which repeated lines collapse. Defaults to 60 seconds.
    pub fn dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = Some(window);
        self
    }

    /// Initial tolerance threshold in millimeters. Defaults to 0.1.
    pub fn tolerance(mut self, mm: f64) -> Self {
        self.tolerance = Some(mm);
        self
    }

    /// Samples retained by the flow recorder. Defaults to 3600.
    pub fn flow_capacity(mut self, capacity: usize) -> Self {
        self.flow_capacity = Some(capacity);
        self
    }

    /// Alert history entries kept. Defaults to 1000.
    pub fn alert_history_capacity(mut self, capacity: usize) -> Self {
        self.alert_history_capacity = Some(capacity);
        self
    }

    /// Build the engine, validating every setting.
    pub fn build(self) -> Result<TelemetryEngine> {
        let tolerance =
            ToleranceThresholdStore::new(self.tolerance.unwrap_or(DEFAULT_TOLERANCE_MM))?;
        let logs = LogIngestor::new(
            self.history_capacity.unwrap_or(DEFAULT_HISTORY_CAPACITY),
            self.dedup_window.unwrap_or(DEFAULT_DEDUP_WINDOW),
        )?;
        let recorder = FlowRecorder::new(self.flow_capacity.unwrap_or(DEFAULT_FLOW_CAPACITY))?;
        let alerts = AlertTracker::new(
            self.alert_history_capacity.unwrap_or(DEFAULT_ALERT_HISTORY_CAPACITY),
        )?;

        Ok(TelemetryEngine {
            logs,
            leveling: LevelingAnalyzer::new(tolerance.clone()),
            tolerance,
            flow: FlowStatsAggregator::new(),
            recorder,
            alerts,
        })
    }
}
