//! Background ingestion of raw log lines.
//!
//! ```text
//! LineSource ──poll()──▶ LineFormat::parse ──▶ LogIngestor::ingest
//!      ▲                                              │
//!      └──────────── every `interval` ────────────────┘
//! ```

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use ultiui_engine::{TelemetryEngine, Timestamp};

use crate::data::{format_duration, parse_syslog_line, PrinterEvent};
use crate::source::LineSource;

/// Shortest interval a poller will tick at.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// How raw lines are turned into `(message, timestamp)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    /// BSD syslog lines; the year is not part of the line.
    Syslog { year: i32 },
    /// One printer event JSON object per line.
    Events,
    /// Bare messages, stamped with the time they were read.
    Plain,
}

impl LineFormat {
    /// Parse one line. `None` means the line should be skipped.
    pub fn parse(&self, line: &str, now: Timestamp) -> Option<(String, Timestamp)> {
        match self {
            LineFormat::Syslog { year } => {
                parse_syslog_line(line, *year).map(|l| (l.message, l.timestamp))
            }
            LineFormat::Events => {
                let event: PrinterEvent = serde_json::from_str(line).ok()?;
                let ts = event.timestamp()?;
                Some((event.render(), ts))
            }
            LineFormat::Plain => Some((line.to_string(), now)),
        }
    }
}

/// Counters for one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub lines: usize,
    pub ingested: usize,
    pub skipped: usize,
}

/// Polls a [`LineSource`] and feeds the engine's log ingestor.
#[derive(Debug)]
pub struct Poller {
    source: Box<dyn LineSource>,
    format: LineFormat,
    engine: TelemetryEngine,
    interval: Duration,
    reported_error: Option<String>,
}

impl Poller {
    /// Create a poller with a one second interval.
    pub fn new(source: Box<dyn LineSource>, format: LineFormat, engine: TelemetryEngine) -> Self {
        Self {
            source,
            format,
            engine,
            interval: Duration::from_secs(1),
            reported_error: None,
        }
    }

    /// Set the polling interval, raised to at least [`MIN_POLL_INTERVAL`].
    pub fn interval(mut self, interval: Duration) -> Self {
        if interval < MIN_POLL_INTERVAL {
            tracing::warn!(
                requested = %format_duration(interval),
                "poll interval too short, using {}",
                format_duration(MIN_POLL_INTERVAL)
            );
        }
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.interval
    }

    /// Poll the source once and ingest everything it returned.
    pub fn poll_once(&mut self) -> PollStats {
        let lines = self.source.poll();
        self.report_source_error();

        let now = Timestamp::now();
        let mut skipped = 0;
        let parsed: Vec<(String, Timestamp)> = lines
            .iter()
            .filter_map(|line| {
                let parsed = self.format.parse(line, now);
                if parsed.is_none() {
                    tracing::debug!(line = %line, "skipping unparseable line");
                    skipped += 1;
                }
                parsed
            })
            .collect();

        let ingested = parsed.len();
        if ingested > 0 {
            self.engine.logs().ingest_batch(parsed);
        }

        PollStats {
            lines: lines.len(),
            ingested,
            skipped,
        }
    }

    fn report_source_error(&mut self) {
        let current = self.source.error().map(str::to_string);
        if current != self.reported_error {
            if let Some(err) = &current {
                tracing::warn!(source = self.source.description(), "{}", err);
            }
            self.reported_error = current;
        }
    }

    /// Run the poller on a background tokio task.
    ///
    /// Returns a handle that can be used to stop it.
    pub fn start(mut self) -> PollerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            tracing::info!(
                source = self.source.description(),
                interval = %format_duration(self.interval),
                "poller started"
            );
            let mut interval_timer = tokio::time::interval(self.interval);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let stats = self.poll_once();
                        if stats.lines > 0 {
                            tracing::debug!(?stats, "poll cycle");
                        }
                    }
                    _ = stop_rx.changed() => {
                        if *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::info!(source = self.source.description(), "poller stopped");
        });

        PollerHandle { stop_tx, task }
    }
}

/// Handle for controlling a running [`Poller`].
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// True once the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the poller to stop after its current cycle.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop the poller and wait for its task to finish.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!("poller task failed: {}", e);
        }
    }
}
