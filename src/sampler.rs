// Background sampler: one snapshot per tick, handed to the dashboard through a
// single-slot watch channel (a newer snapshot overwrites an unread one).

use crate::collector::{CollectError, MetricsCollector, ROOT_MOUNT};
use crate::snapshot::{MetricSnapshot, SnapshotError};
use chrono::Local;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tracing::Instrument;

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(2);

pub type SnapshotSender = watch::Sender<Option<MetricSnapshot>>;
pub type SnapshotReceiver = watch::Receiver<Option<MetricSnapshot>>;

/// Latest-wins delivery slot; starts empty until the first successful tick.
pub fn snapshot_channel() -> (SnapshotSender, SnapshotReceiver) {
    watch::channel(None)
}

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("{operation} failed: {source}")]
    Collect {
        operation: &'static str,
        #[source]
        source: CollectError,
    },
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("collector task join: {0}")]
    Join(String),
}

impl SampleError {
    pub fn operation(&self) -> &'static str {
        match self {
            SampleError::Collect { operation, .. } => operation,
            SampleError::Snapshot(_) => "build_snapshot",
            SampleError::Join(_) => "spawn_blocking",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub period: Duration,
    /// Consecutive failed ticks before the source is logged as unavailable.
    pub unavailable_after: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            unavailable_after: 5,
        }
    }
}

/// Counters returned when the sampler loop exits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SamplerStats {
    pub produced: u64,
    pub skipped: u64,
}

pub struct Sampler<C> {
    collector: Arc<C>,
    config: SamplerConfig,
}

impl<C: MetricsCollector + 'static> Sampler<C> {
    pub fn new(collector: Arc<C>, config: SamplerConfig) -> Self {
        Self { collector, config }
    }

    pub fn spawn(
        self,
        sink: SnapshotSender,
        shutdown_rx: oneshot::Receiver<()>,
    ) -> JoinHandle<SamplerStats> {
        let sampler_span = tracing::debug_span!(
            "sampler",
            period_ms = self.config.period.as_millis() as u64
        );
        tokio::spawn(self.run(sink, shutdown_rx).instrument(sampler_span))
    }

    /// Ticks until `shutdown_rx` fires (or its sender is dropped) or every receiver
    /// of `sink` is gone. Collection failures skip the tick and never end the loop.
    ///
    /// The first tick comes one full period after start, so the CPU reading covers a
    /// whole period instead of the microseconds since the collector was built.
    pub async fn run(
        self,
        sink: SnapshotSender,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) -> SamplerStats {
        let period = self.config.period;
        let mut tick = interval_at(Instant::now() + period, period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut stats = SamplerStats::default();
        let mut consecutive_failures: u32 = 0;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => {
                    tracing::debug!("Sampler shutting down");
                    break;
                }
                _ = sink.closed() => {
                    tracing::debug!("Snapshot receiver gone; sampler exiting");
                    break;
                }
                _ = tick.tick() => {
                    let snapshot = match self.sample_once().await {
                        Ok(s) => s,
                        Err(e) => {
                            stats.skipped += 1;
                            consecutive_failures = consecutive_failures.saturating_add(1);
                            tracing::warn!(
                                error = %e,
                                operation = e.operation(),
                                "sample skipped"
                            );
                            if consecutive_failures == self.config.unavailable_after {
                                tracing::error!(
                                    consecutive_failures,
                                    "metrics source unavailable; dashboard is showing stale data"
                                );
                            }
                            continue;
                        }
                    };

                    if consecutive_failures > 0 {
                        tracing::info!(consecutive_failures, "metrics source recovered");
                        consecutive_failures = 0;
                    }

                    tracing::debug!(
                        cpu = snapshot.cpu_percent(),
                        memory = snapshot.memory_percent(),
                        disk = snapshot.disk_percent(),
                        "snapshot produced"
                    );
                    if sink.send(Some(snapshot)).is_err() {
                        tracing::debug!("Snapshot receiver gone; sampler exiting");
                        break;
                    }
                    stats.produced += 1;
                }
            }
        }
        stats
    }

    /// Queries the collector once on the blocking pool and packages the readings.
    pub async fn sample_once(&self) -> Result<MetricSnapshot, SampleError> {
        let collector = self.collector.clone();
        let (cpu, memory, disk) = tokio::task::spawn_blocking(move || {
            let cpu = collector
                .sample_cpu_percent()
                .map_err(|source| SampleError::Collect {
                    operation: "sample_cpu_percent",
                    source,
                })?;
            let memory = collector
                .sample_memory_percent()
                .map_err(|source| SampleError::Collect {
                    operation: "sample_memory_percent",
                    source,
                })?;
            let disk = collector
                .sample_disk_percent(Path::new(ROOT_MOUNT))
                .map_err(|source| SampleError::Collect {
                    operation: "sample_disk_percent",
                    source,
                })?;
            Ok::<_, SampleError>((cpu, memory, disk))
        })
        .await
        .map_err(|e| SampleError::Join(e.to_string()))??;

        Ok(MetricSnapshot::new(cpu, memory, disk, Local::now())?)
    }
}
