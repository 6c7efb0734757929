use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use ultiui::{
    parse_duration, parse_events, parse_flow_samples, parse_probe_report, parse_syslog_line,
    FileSource, LineFormat, LineSource, Poller, Settings, StreamSource,
};
use ultiui_engine::{FlowSummary, LogType, TelemetryEngine, TimeWindow, Timestamp};

#[derive(Parser, Debug)]
#[command(name = "ultiui")]
#[command(about = "Telemetry processing for networked 3D printers")]
struct Args {
    /// Configuration file (defaults to ./ultiui.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deduplicate a log file and print the most recent entries
    Logs {
        /// Log file to read
        file: PathBuf,

        /// Input format
        #[arg(short, long, value_enum, default_value_t = Format::Syslog)]
        format: Format,

        /// Number of entries to print (defaults to the configured value)
        #[arg(short, long)]
        recent: Option<usize>,

        /// Year for syslog timestamps (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,

        /// Only print entries of this type (info, warning, error, unknown)
        #[arg(short = 't', long = "type")]
        kind: Option<LogType>,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze a probe report and judge whether the bed is level
    Leveling {
        /// Probe report JSON
        file: PathBuf,

        /// Tolerance in millimeters (defaults to the configured value)
        #[arg(long)]
        tolerance: Option<f64>,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize recorded temperature and flow samples
    Flow {
        /// Flow sample JSON
        file: PathBuf,

        /// Points in the downsampled series (defaults to the configured value)
        #[arg(short = 'k', long)]
        max_points: Option<usize>,

        /// Window start in epoch milliseconds
        #[arg(long)]
        start: Option<i64>,

        /// Window end in epoch milliseconds
        #[arg(long)]
        end: Option<i64>,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Follow a live log and print recent entries whenever they change
    Watch {
        /// Log file to tail
        #[arg(conflicts_with = "stdin", required_unless_present = "stdin")]
        file: Option<PathBuf>,

        /// Read lines from stdin instead of a file
        #[arg(long)]
        stdin: bool,

        /// Input format
        #[arg(short, long, value_enum, default_value_t = Format::Syslog)]
        format: Format,

        /// Poll interval (e.g., "1s", "500ms")
        #[arg(short, long, default_value = "1s")]
        interval: String,

        /// Number of entries to print (defaults to the configured value)
        #[arg(short, long)]
        recent: Option<usize>,

        /// Year for syslog timestamps (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Syslog,
    Events,
    Plain,
}

impl Format {
    fn line_format(self, year: Option<i32>) -> LineFormat {
        match self {
            Format::Syslog => LineFormat::Syslog {
                year: year.unwrap_or_else(current_year),
            },
            Format::Events => LineFormat::Events,
            Format::Plain => LineFormat::Plain,
        }
    }
}

fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Utc::now().year()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ultiui=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;
    let engine = settings.build_engine()?;

    match args.command {
        Command::Logs {
            file,
            format,
            recent,
            year,
            kind,
            output,
        } => run_logs(
            &engine,
            &file,
            format.line_format(year),
            recent.unwrap_or(settings.recent),
            kind,
            output.as_deref(),
        ),
        Command::Leveling {
            file,
            tolerance,
            output,
        } => run_leveling(&engine, &file, tolerance, output.as_deref()),
        Command::Flow {
            file,
            max_points,
            start,
            end,
            output,
        } => {
            let window = match (start, end) {
                (None, None) => None,
                (start, end) => Some(TimeWindow::new(
                    Timestamp::from_millis(start.unwrap_or(i64::MIN)),
                    Timestamp::from_millis(end.unwrap_or(i64::MAX)),
                )),
            };
            run_flow(
                &engine,
                &file,
                window,
                max_points.unwrap_or(settings.flow_max_points),
                output.as_deref(),
            )
        }
        Command::Watch {
            file,
            stdin,
            format,
            interval,
            recent,
            year,
        } => {
            let interval = parse_interval(&interval)?;
            run_watch(
                engine,
                file,
                stdin,
                format.line_format(year),
                interval,
                recent.unwrap_or(settings.recent),
            )
        }
    }
}

/// Ingest a whole log file, then export the most recent records.
fn run_logs(
    engine: &TelemetryEngine,
    path: &Path,
    format: LineFormat,
    recent: usize,
    kind: Option<LogType>,
    output: Option<&Path>,
) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let lines: Vec<(String, Timestamp)> = match format {
        LineFormat::Events => parse_events(&content)?,
        LineFormat::Syslog { year } => {
            let parsed: Vec<_> = content
                .lines()
                .filter_map(|line| parse_syslog_line(line, year))
                .map(|l| (l.message, l.timestamp))
                .collect();
            let skipped = content.lines().filter(|l| !l.trim().is_empty()).count() - parsed.len();
            if skipped > 0 {
                tracing::warn!(skipped, "skipped lines that are not syslog formatted");
            }
            parsed
        }
        LineFormat::Plain => {
            let now = Timestamp::now();
            content
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| (l.to_string(), now))
                .collect()
        }
    };

    let new_entries = engine.logs().ingest_batch(lines);
    tracing::info!(
        entries = new_entries,
        stats = ?engine.logs().stats(),
        "ingested {}",
        path.display()
    );

    let entries = match kind {
        Some(kind) => engine.logs().recent_of_type(kind, recent)?,
        None => engine.logs().recent(recent)?,
    };
    let records: Vec<_> = entries.iter().map(ultiui_engine::to_record).collect();
    write_json(&records, output)
}

fn run_leveling(
    engine: &TelemetryEngine,
    path: &Path,
    tolerance: Option<f64>,
    output: Option<&Path>,
) -> Result<()> {
    if let Some(mm) = tolerance {
        engine
            .tolerance()
            .set(mm)
            .with_context(|| format!("Invalid tolerance: {}", mm))?;
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let points = parse_probe_report(&content)?;
    let report = engine.analyze(&points)?;

    if !report.is_level {
        tracing::info!(
            max_abs_deviation = report.max_abs_deviation,
            tolerance = report.tolerance_threshold,
            "bed is not level"
        );
    }
    write_json(&report, output)
}

fn run_flow(
    engine: &TelemetryEngine,
    path: &Path,
    window: Option<TimeWindow>,
    max_points: usize,
    output: Option<&Path>,
) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let summary = summarize_flow_file(engine, &content, window, max_points)?;
    write_json(&summary, output)
}

/// Summarize every sample in a flow file. The recorder's capacity does not
/// apply here; it only bounds live recording.
fn summarize_flow_file(
    engine: &TelemetryEngine,
    json: &str,
    window: Option<TimeWindow>,
    max_points: usize,
) -> Result<FlowSummary> {
    let samples = parse_flow_samples(json)?;
    tracing::debug!(samples = samples.len(), "summarizing flow file");
    Ok(engine.summarize(&samples, window, max_points)?)
}

/// Parse a `--interval` value, which must be positive.
fn parse_interval(value: &str) -> Result<Duration> {
    let interval =
        parse_duration(value).with_context(|| format!("Invalid interval: {}", value))?;
    if interval.is_zero() {
        bail!("Interval must be greater than zero: {}", value);
    }
    Ok(interval)
}

/// Follow a file or stdin until Ctrl-C, printing records on every change.
fn run_watch(
    engine: TelemetryEngine,
    file: Option<PathBuf>,
    stdin: bool,
    format: LineFormat,
    interval: Duration,
    recent: usize,
) -> Result<()> {
    if recent == 0 {
        bail!("--recent must be at least 1");
    }

    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let source: Box<dyn LineSource> = match (file, stdin) {
            (_, true) => Box::new(StreamSource::spawn(tokio::io::stdin(), "stdin")),
            (Some(path), false) => Box::new(FileSource::new(path)),
            (None, false) => bail!("Either a file or --stdin is required"),
        };

        let handle = Poller::new(source, format, engine.clone())
            .interval(interval)
            .start();

        let mut ticker = tokio::time::interval(interval);
        let mut last_revision = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let revision = engine.logs().revision();
                    if last_revision != Some(revision) {
                        last_revision = Some(revision);
                        let records = engine.logs().records(recent)?;
                        write_json(&records, None)?;
                    }
                }
                result = tokio::signal::ctrl_c() => {
                    result.context("Failed to listen for Ctrl-C")?;
                    break;
                }
            }
        }

        handle.shutdown().await;
        Ok::<(), anyhow::Error>(())
    })
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;

    match output {
        Some(path) => {
            let mut file = fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            writeln!(file, "{}", json)?;
            tracing::info!("wrote {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            writeln!(lock, "{}", json)?;
        }
    }
    Ok(())
}
