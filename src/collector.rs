// Point-in-time utilization queries backed by sysinfo

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use sysinfo::{Disks, System};
use thiserror::Error;

/// Mount point whose usage is reported as "disk".
pub const ROOT_MOUNT: &str = "/";

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("no filesystem mounted at {0}")]
    MountNotFound(PathBuf),
    #[error("{0} reports zero total capacity")]
    EmptyCapacity(&'static str),
    #[error("sysinfo lock poisoned: {0}")]
    LockPoisoned(String),
    #[error("{metric} reading unavailable: {reason}")]
    InvalidReading {
        metric: &'static str,
        reason: String,
    },
}

/// Source of utilization percentages.
///
/// Calls are synchronous and bounded; implementations must be safe to call from
/// any thread without outside coordination.
pub trait MetricsCollector: Send + Sync {
    fn sample_cpu_percent(&self) -> Result<f64, CollectError>;
    fn sample_memory_percent(&self) -> Result<f64, CollectError>;
    fn sample_disk_percent(&self, mount_point: &Path) -> Result<f64, CollectError>;
}

pub struct SysinfoCollector {
    sys: Mutex<System>,
    disks: Mutex<Disks>,
}

impl Default for SysinfoCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoCollector {
    pub fn new() -> Self {
        let mut sys = System::new();
        // CPU usage is a delta between refreshes. This is the baseline; the sampler's
        // first tick is one period later, so that reading covers a full period.
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        Self {
            sys: Mutex::new(sys),
            disks: Mutex::new(Disks::new_with_refreshed_list()),
        }
    }
}

impl MetricsCollector for SysinfoCollector {
    fn sample_cpu_percent(&self) -> Result<f64, CollectError> {
        let mut sys = self
            .sys
            .lock()
            .map_err(|e| CollectError::LockPoisoned(e.to_string()))?;
        sys.refresh_cpu_usage();
        if sys.cpus().is_empty() {
            return Err(CollectError::InvalidReading {
                metric: "cpu",
                reason: "no CPUs reported".into(),
            });
        }
        Ok(sys.global_cpu_usage() as f64)
    }

    fn sample_memory_percent(&self) -> Result<f64, CollectError> {
        let mut sys = self
            .sys
            .lock()
            .map_err(|e| CollectError::LockPoisoned(e.to_string()))?;
        sys.refresh_memory();
        let total = sys.total_memory();
        let used = total.saturating_sub(sys.available_memory());
        used_percent("memory", used, total)
    }

    fn sample_disk_percent(&self, mount_point: &Path) -> Result<f64, CollectError> {
        let mut disks = self
            .disks
            .lock()
            .map_err(|e| CollectError::LockPoisoned(e.to_string()))?;
        disks.refresh(true);
        let disk = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == mount_point)
            .ok_or_else(|| CollectError::MountNotFound(mount_point.to_path_buf()))?;
        let total = disk.total_space();
        let used = total.saturating_sub(disk.available_space());
        used_percent("disk", used, total)
    }
}

pub fn used_percent(metric: &'static str, used: u64, total: u64) -> Result<f64, CollectError> {
    if total == 0 {
        return Err(CollectError::EmptyCapacity(metric));
    }
    Ok(used as f64 / total as f64 * 100.0)
}
