//! Temperature and flow time-series types.

use crate::Timestamp;

/// One sensor tick. A metric is `None` when the sensor was unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowSample {
    pub timestamp: Timestamp,
    #[cfg_attr(feature = "serde", serde(default))]
    pub temperature: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flow_rate: Option<f64>,
}

impl FlowSample {
    pub const fn new(timestamp: Timestamp, temperature: Option<f64>, flow_rate: Option<f64>) -> Self {
        Self {
            timestamp,
            temperature,
            flow_rate,
        }
    }

    /// Value of one metric at this tick.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::FlowRate => self.flow_rate,
        }
    }
}

/// The metrics carried by a [`FlowSample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Metric {
    Temperature,
    FlowRate,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Temperature, Metric::FlowRate];
}

/// Inclusive time range used to select samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeWindow {
    pub const fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// True if `t` lies within `[start, end]`.
    pub fn contains(&self, t: Timestamp) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Summary statistics for one metric. Absent values are excluded;
/// when every value is absent, `min`/`max`/`avg` are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricSummary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub count_valid: usize,
}

/// Windowed summary of a flow/temperature series.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowSummary {
    pub window_start: Option<Timestamp>,
    pub window_end: Option<Timestamp>,
    /// Samples inside the window, before downsampling.
    pub sample_count: usize,
    pub temperature: MetricSummary,
    pub flow_rate: MetricSummary,
    /// At most `max_points` samples, ordered by timestamp.
    pub downsampled_series: Vec<FlowSample>,
}

impl FlowSummary {
    /// Summary for one metric.
    pub fn metric(&self, metric: Metric) -> &MetricSummary {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::FlowRate => &self.flow_rate,
        }
    }
}
