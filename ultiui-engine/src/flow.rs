//! Temperature and flow-rate summaries.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use ultiui_types::{FlowSample, FlowSummary, Metric, MetricSummary, TimeWindow, Timestamp};

use crate::error::{InputError, Result};

/// Default number of samples kept by a [`FlowRecorder`] (one hour at 1 Hz).
pub const DEFAULT_FLOW_CAPACITY: usize = 3600;

/// Stateless summarizer for flow/temperature series.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowStatsAggregator;

impl FlowStatsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// See [`summarize`].
    pub fn summarize(
        &self,
        samples: &[FlowSample],
        window: Option<TimeWindow>,
        max_points: usize,
    ) -> Result<FlowSummary> {
        summarize(samples, window, max_points)
    }
}

/// Summarize `samples`, optionally restricted to an inclusive `window`.
///
/// Samples are stably sorted by timestamp first. Absent and non-finite
/// metric values are left out of the statistics. The returned series has at
/// most `max_points` samples: a short series is returned as-is, a longer one
/// is split into `max_points` equal index buckets, each represented by its
/// last timestamp and the mean of its present values.
pub fn summarize(
    samples: &[FlowSample],
    window: Option<TimeWindow>,
    max_points: usize,
) -> Result<FlowSummary> {
    if max_points == 0 {
        return Err(InputError::ZeroMaxPoints);
    }
    if let Some(w) = window {
        if w.start > w.end {
            return Err(InputError::InvalidWindow {
                start: w.start.as_millis(),
                end: w.end.as_millis(),
            });
        }
    }

    let mut selected: Vec<FlowSample> = samples
        .iter()
        .filter(|s| window.map_or(true, |w| w.contains(s.timestamp)))
        .copied()
        .collect();
    selected.sort_by_key(|s| s.timestamp);

    let (window_start, window_end) = match window {
        Some(w) => (Some(w.start), Some(w.end)),
        None => (
            selected.first().map(|s| s.timestamp),
            selected.last().map(|s| s.timestamp),
        ),
    };

    Ok(FlowSummary {
        window_start,
        window_end,
        sample_count: selected.len(),
        temperature: summarize_metric(&selected, Metric::Temperature),
        flow_rate: summarize_metric(&selected, Metric::FlowRate),
        downsampled_series: downsample(selected, max_points),
    })
}

fn summarize_metric(samples: &[FlowSample], metric: Metric) -> MetricSummary {
    let mut summary = MetricSummary::default();
    let mut sum = 0.0;

    for value in present_values(samples, metric) {
        summary.min = Some(summary.min.map_or(value, |m: f64| m.min(value)));
        summary.max = Some(summary.max.map_or(value, |m: f64| m.max(value)));
        sum += value;
        summary.count_valid += 1;
    }

    if summary.count_valid > 0 {
        summary.avg = Some(sum / summary.count_valid as f64);
    }
    summary
}

fn present_values(samples: &[FlowSample], metric: Metric) -> impl Iterator<Item = f64> + '_ {
    samples
        .iter()
        .filter_map(move |s| s.get(metric))
        .filter(|v| v.is_finite())
}

fn mean_of(samples: &[FlowSample], metric: Metric) -> Option<f64> {
    let (sum, count) = present_values(samples, metric).fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

fn downsample(series: Vec<FlowSample>, max_points: usize) -> Vec<FlowSample> {
    let len = series.len();
    if len <= max_points {
        return series;
    }

    (0..max_points)
        .filter_map(|i| {
            let bucket = &series[i * len / max_points..(i + 1) * len / max_points];
            let last = bucket.last()?;
            Some(FlowSample {
                timestamp: last.timestamp,
                temperature: mean_of(bucket, Metric::Temperature),
                flow_rate: mean_of(bucket, Metric::FlowRate),
            })
        })
        .collect()
}

/// Bounded rolling buffer of recent samples, shared between the poller
/// that appends and the handlers that summarize.
#[derive(Clone)]
pub struct FlowRecorder {
    samples: Arc<RwLock<VecDeque<FlowSample>>>,
    capacity: usize,
}

impl FlowRecorder {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(InputError::ZeroCapacity);
        }
        Ok(Self {
            samples: Arc::new(RwLock::new(VecDeque::with_capacity(capacity.min(4096)))),
            capacity,
        })
    }

    /// Append a sample, dropping the oldest one when full.
    pub fn record(&self, sample: FlowSample) {
        let mut samples = self.samples.write();
        if samples.len() >= self.capacity {
            samples.pop_front();
        }
        samples.push_back(sample);
    }

    /// Append many samples under one lock.
    pub fn extend<I: IntoIterator<Item = FlowSample>>(&self, iter: I) {
        let mut samples = self.samples.write();
        for sample in iter {
            if samples.len() >= self.capacity {
                samples.pop_front();
            }
            samples.push_back(sample);
        }
    }

    /// Owned copy of the buffered samples, in arrival order.
    pub fn snapshot(&self) -> Vec<FlowSample> {
        self.samples.read().iter().copied().collect()
    }

    /// Samples recorded at or after `since`.
    pub fn since(&self, since: Timestamp) -> Vec<FlowSample> {
        self.samples
            .read()
            .iter()
            .filter(|s| s.timestamp >= since)
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.samples.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.samples.write().clear();
    }
}

impl Default for FlowRecorder {
    fn default() -> Self {
        Self {
            samples: Arc::new(RwLock::new(VecDeque::new())),
            capacity: DEFAULT_FLOW_CAPACITY,
        }
    }
}

impl std::fmt::Debug for FlowRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowRecorder")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
