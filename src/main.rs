//! # AMON Ground
//!
//! Headless host for the AMON ground-station dashboard.
//!
//! Drives the chart tick, telemetry and link polls and the mission clock from
//! tokio timers, and talks to the local ground backend for serial link control.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use amon_ground::chart::renderer::ChartRenderer;
use amon_ground::chart::surface::{RecordingSurface, Size, Surface};
use amon_ground::chart::svg::render_svg;
use amon_ground::config::{Config, LoggingConfig};
use amon_ground::dashboard::clock::{local_clock, MissionClock};
use amon_ground::dashboard::state::{DashboardState, SeriesValues};
use amon_ground::dashboard::synthetic::SyntheticSignal;
use amon_ground::error::Result as DashboardResult;
use amon_ground::telemetry::client::{BackendClient, LinkStatus};
use amon_ground::telemetry::generation::{fetch_tagged, Generation, Tagged};
use amon_ground::telemetry::snapshot::{Attitude, TelemetrySnapshot};

/// Configuration file used when `--config` is not given and it exists
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Log file prefix for the daily rolling sink
const LOG_FILE_PREFIX: &str = "amon-ground.log";

/// Number of chart ticks between status log messages
const LOG_INTERVAL_TICKS: u64 = 500;

/// Capacity of the poll result channels
const POLL_CHANNEL_CAPACITY: usize = 8;

/// Host subcommands
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Run the dashboard loop until Ctrl+C
    Run,
    /// List serial ports known to the backend
    Ports,
    /// Open the serial link
    Connect { port: String, baud_rate: u32 },
    /// Close the serial link
    Disconnect,
    /// Ping the drone through the link
    Ping,
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    command: Command,
    config: Option<PathBuf>,
}

fn usage() -> &'static str {
    "usage: amon-ground [--config <path>] [run | ports | connect <port> <baud> | disconnect | ping]"
}

/// Parse command line arguments (without the program name)
fn parse_args<I>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let mut config = None;
    let mut positional = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().context("--config requires a path")?;
                config = Some(PathBuf::from(path));
            }
            "--help" | "-h" => bail!("{}", usage()),
            _ => positional.push(arg),
        }
    }

    let command = match positional.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["run"] => Command::Run,
        ["ports"] => Command::Ports,
        ["disconnect"] => Command::Disconnect,
        ["ping"] => Command::Ping,
        ["connect", port, baud] => Command::Connect {
            port: (*port).to_string(),
            baud_rate: baud
                .parse()
                .with_context(|| format!("invalid baud rate '{}'", baud))?,
        },
        other => bail!("unexpected arguments {:?}\n{}", other, usage()),
    };

    Ok(Args { command, config })
}

/// Load the configuration named on the command line, the default file, or
/// the built-in defaults, in that order.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("failed to load config from {}", DEFAULT_CONFIG_PATH)),
        None => Ok(Config::builtin()),
    }
}

/// Initialize logging. The returned guard must live until exit so the file
/// sink flushes.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    if logging.dir.is_empty() {
        registry.init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&logging.dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    registry
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
    Some(guard)
}

/// Main entry point for AMON Ground
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Parse arguments and load configuration
///    - Set up logging (stdout, plus a daily log file when configured)
///    - Build the backend client
///
/// 2. **Command**
///    - `ports`, `connect`, `disconnect`, `ping`: one backend request, then exit
///    - `run`: the dashboard loop (see [`run_dashboard`])
///
/// # Errors
///
/// Returns error if:
/// - Arguments or configuration are invalid
/// - A one-shot backend request fails
#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let config = load_config(args.config.as_deref())?;
    let _log_guard = init_logging(&config.logging);

    info!("AMON Ground v{} starting...", env!("CARGO_PKG_VERSION"));

    let client = BackendClient::new(
        &config.backend.url,
        Duration::from_millis(config.backend.timeout_ms),
    )?;
    info!("Ground backend at {}", client.base_url());

    match args.command {
        Command::Run => run_dashboard(&config, client).await?,
        Command::Ports => {
            let ports = client.ports().await?;
            if let Some(error) = &ports.error {
                warn!("Backend cannot list ports: {}", error);
            }
            if ports.ports.is_empty() {
                info!("No serial ports found");
            }
            for port in &ports.ports {
                let marker = if *port == ports.connection_port { " (connected)" } else { "" };
                info!("Port {}{}", port, marker);
            }
            info!("Status: {}", ports.connection_status);
        }
        Command::Connect { port, baud_rate } => {
            let status = client.connect(&port, baud_rate).await?;
            info!("{}", status.describe());
        }
        Command::Disconnect => {
            let status = client.disconnect().await?;
            info!("{}", status.describe());
        }
        Command::Ping => {
            client.ping().await?;
            info!("Ping sent");
        }
    }

    Ok(())
}

/// Values for one chart tick and where they came from
#[derive(Debug)]
struct ChartFeed {
    values: SeriesValues,
    attitude: Attitude,
    live: bool,
}

/// Link and telemetry state the run loop reacts to
#[derive(Debug, Default)]
struct HostState {
    generation: Generation,
    latest: Option<TelemetrySnapshot>,
    link: LinkStatus,
    mission: MissionClock,
}

impl HostState {
    /// Live telemetry while the drone reports a telemetry rate, the synthetic
    /// signal otherwise.
    fn chart_feed(&self, synthetic: &mut SyntheticSignal) -> ChartFeed {
        match self.latest.as_ref().filter(|s| s.is_drone_online()) {
            Some(snapshot) => ChartFeed {
                values: snapshot.series_values(),
                attitude: snapshot.orientation,
                live: true,
            },
            None => ChartFeed {
                values: synthetic.next_values(),
                attitude: synthetic.attitude(),
                live: false,
            },
        }
    }

    /// Applies a finished telemetry poll. Stale results are dropped; a failed
    /// poll clears the last snapshot so charts never repeat frozen values.
    fn apply_telemetry(&mut self, tagged: Tagged<DashboardResult<TelemetrySnapshot>>, now: Instant) {
        match tagged.accept(&self.generation) {
            Some(Ok(snapshot)) => {
                update_mission_clock(&mut self.mission, &snapshot, now);
                debug!(
                    state = %snapshot.flight_state,
                    tlm_rate = snapshot.tlm_rate,
                    "Telemetry received"
                );
                debug!("Readouts: {}", format_readouts(&snapshot));
                self.latest = Some(snapshot);
            }
            Some(Err(e)) => {
                warn!("Telemetry poll failed: {}", e);
                self.latest = None;
                self.mission.stop(now);
            }
            None => debug!("Dropped telemetry from a previous generation"),
        }
    }

    /// Applies a finished link poll. An unreachable backend counts as offline.
    /// When the link drops, in-flight telemetry belongs to the old session and
    /// the mission clock starts over.
    fn apply_link_status(&mut self, result: DashboardResult<LinkStatus>) {
        let status = result.unwrap_or_else(|e| {
            warn!("Link status poll failed: {}", e);
            LinkStatus::default()
        });

        if status != self.link {
            info!("{}", status.describe());
        }
        if self.link.is_online() && !status.is_online() {
            self.generation.advance();
            self.latest = None;
            self.mission.reset();
        }
        self.link = status;
    }
}

/// Single-line form of the dashboard readouts.
fn format_readouts(snapshot: &TelemetrySnapshot) -> String {
    snapshot
        .readouts()
        .iter()
        .map(|r| format!("{}={}", r.label, r.text))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run the dashboard loop until Ctrl+C.
///
/// The chart tick feeds live telemetry while the drone reports a telemetry
/// rate and the synthetic signal otherwise. Polls run as spawned tasks and
/// report back over channels, so a slow backend never delays a chart tick.
async fn run_dashboard(config: &Config, client: BackendClient) -> Result<()> {
    let surface_size = Size::new(config.render.width, config.render.height);
    let renderer = ChartRenderer::new(config.render.style());
    let mut dashboard = DashboardState::from_specs(
        config.chart_specs(),
        config.dashboard.buffer_len,
        renderer,
        |_| RecordingSurface::new(surface_size),
    )?;
    info!(
        "Dashboard ready: {} charts, {} samples per series",
        dashboard.charts().len(),
        config.dashboard.buffer_len
    );

    let mut synthetic = SyntheticSignal::new(config.dashboard.chart_hz);
    let mut host = HostState::default();
    let mut telemetry_in_flight = false;
    let mut link_in_flight = false;

    let (telemetry_tx, mut telemetry_rx) =
        mpsc::channel::<Tagged<DashboardResult<TelemetrySnapshot>>>(POLL_CHANNEL_CAPACITY);
    let (link_tx, mut link_rx) = mpsc::channel::<DashboardResult<LinkStatus>>(POLL_CHANNEL_CAPACITY);

    let mut chart_interval = interval(config.dashboard.chart_interval());
    chart_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut telemetry_interval = interval(Duration::from_millis(config.dashboard.telemetry_poll_ms));
    let mut link_interval = interval(Duration::from_millis(config.dashboard.link_poll_ms));
    let mut clock_interval = interval(Duration::from_millis(config.dashboard.clock_tick_ms));

    info!("Starting chart loop at {}Hz", config.dashboard.chart_hz);
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            _ = chart_interval.tick() => {
                let feed = host.chart_feed(&mut synthetic);
                dashboard.tick(&feed.values);

                let (roll, pitch, yaw) = feed.attitude.to_radians();
                trace!(roll, pitch, yaw, "Attitude feed (rad)");

                if dashboard.ticks() % LOG_INTERVAL_TICKS == 0 {
                    let source = if feed.live { "live" } else { "synthetic" };
                    info!("Rendered {} ticks ({} data)", dashboard.ticks(), source);
                }
            }

            _ = telemetry_interval.tick(), if !telemetry_in_flight => {
                telemetry_in_flight = true;
                let client = client.clone();
                let drone = config.dashboard.drone.clone();
                let tx = telemetry_tx.clone();
                let sent_in = host.generation.current();
                tokio::spawn(async move {
                    let tagged = fetch_tagged(&client, &drone, sent_in).await;
                    let _ = tx.send(tagged).await;
                });
            }

            Some(tagged) = telemetry_rx.recv() => {
                telemetry_in_flight = false;
                host.apply_telemetry(tagged, Instant::now());
            }

            _ = link_interval.tick(), if !link_in_flight => {
                link_in_flight = true;
                let client = client.clone();
                let tx = link_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(client.status().await).await;
                });
            }

            Some(result) = link_rx.recv() => {
                link_in_flight = false;
                host.apply_link_status(result);
            }

            _ = clock_interval.tick() => {
                debug!(
                    "Clock {} | mission {} | {}",
                    local_clock(),
                    host.mission.display(Instant::now()),
                    host.link.describe()
                );
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total chart ticks: {}", dashboard.ticks());
                break;
            }
        }
    }

    if !config.render.snapshot_dir.is_empty() {
        dashboard.redraw_all();
        write_snapshots(&dashboard, Path::new(&config.render.snapshot_dir))?;
    }

    Ok(())
}

/// The mission clock runs while the drone reports telemetry.
fn update_mission_clock(mission: &mut MissionClock, snapshot: &TelemetrySnapshot, now: Instant) {
    if snapshot.is_drone_online() != mission.is_running() {
        mission.toggle(now);
    }
}

/// Write the last frame of every chart as `<chart id>.svg` into `dir`.
fn write_snapshots(dashboard: &DashboardState<RecordingSurface>, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create snapshot dir {}", dir.display()))?;

    for chart in dashboard.charts() {
        let surface = chart.surface();
        let svg = render_svg(surface.commands(), surface.logical_size())?;
        let path = dir.join(format!("{}.svg", chart.spec().id));
        std::fs::write(&path, svg)
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!("Wrote snapshot {}", path.display());
    }

    info!("Wrote {} chart snapshots to {}", dashboard.charts().len(), dir.display());
    Ok(())
}
