use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use sysdash::collector::SysinfoCollector;
use sysdash::config::{AppConfig, LoggingConfig};
use sysdash::dashboard::Dashboard;
use sysdash::input;
use sysdash::render::Theme;
use sysdash::sampler::{Sampler, SnapshotReceiver, snapshot_channel};
use sysdash::terminal::TerminalGuard;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .with_context(|| format!("invalid logging.level {:?}", logging.level))?;
    let writer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::sink),
    };
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let app_config = AppConfig::load()?;
    init_logging(&app_config.logging)?;
    let theme = app_config.theme()?;
    let sampler_config = app_config.sampler_config();
    let period = sampler_config.period;

    let (snapshot_tx, snapshot_rx) = snapshot_channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let sampler_handle = Sampler::new(Arc::new(SysinfoCollector::new()), sampler_config)
        .spawn(snapshot_tx, shutdown_rx);

    let result = run_dashboard(&app_config, theme, snapshot_rx).await;

    let _ = shutdown_tx.send(());
    match tokio::time::timeout(period, sampler_handle).await {
        Ok(Ok(stats)) => tracing::info!(
            produced = stats.produced,
            skipped = stats.skipped,
            "sampler stopped"
        ),
        Ok(Err(e)) => tracing::warn!(error = %e, "sampler task failed"),
        Err(_) => tracing::warn!("sampler did not stop within one period"),
    }

    result
}

async fn run_dashboard(
    app_config: &AppConfig,
    theme: Theme,
    snapshot_rx: SnapshotReceiver,
) -> Result<()> {
    let (guard, terminal) = TerminalGuard::acquire().context("render surface unavailable")?;

    let (input_tx, input_rx) = input::input_channel();
    let reader = input::spawn_reader(input_tx.clone(), app_config.poll_interval())
        .context("starting input reader")?;
    let signal_task = tokio::spawn(input::forward_shutdown_signal(input_tx));

    let mut dashboard = Dashboard::new(terminal, theme);
    let result = dashboard.run(snapshot_rx, input_rx).await;
    tracing::debug!(state = ?dashboard.state(), "dashboard loop ended");

    signal_task.abort();
    // Release the surface before any error is printed.
    drop(dashboard);
    drop(guard);

    // The receiver is gone, so the reader notices within one poll interval.
    if tokio::task::spawn_blocking(move || reader.join())
        .await
        .map_or(true, |joined| joined.is_err())
    {
        tracing::warn!("input reader did not exit cleanly");
    }

    result.context("dashboard failed")
}
