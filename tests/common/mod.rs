// Shared test helpers

#![allow(dead_code)]

use chrono::{DateTime, Duration, Local, TimeZone};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use sysdash::collector::{CollectError, MetricsCollector};
use sysdash::snapshot::MetricSnapshot;
use tui::buffer::Buffer;

/// Collector that replays scripted CPU readings, then keeps returning `steady`.
/// Memory and disk mirror whatever CPU returned on the same tick.
pub struct ScriptedCollector {
    cpu: Mutex<VecDeque<Result<f64, CollectError>>>,
    steady: f64,
    last: Mutex<f64>,
    pub calls: AtomicU64,
}

impl ScriptedCollector {
    pub fn new(script: Vec<Result<f64, CollectError>>, steady: f64) -> Self {
        Self {
            cpu: Mutex::new(script.into()),
            steady,
            last: Mutex::new(steady),
            calls: AtomicU64::new(0),
        }
    }

    pub fn steady(value: f64) -> Self {
        Self::new(vec![], value)
    }

    fn last_cpu(&self) -> f64 {
        *self.last.lock().unwrap()
    }
}

impl MetricsCollector for ScriptedCollector {
    fn sample_cpu_percent(&self) -> Result<f64, CollectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reading = self
            .cpu
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(self.steady));
        if let Ok(value) = &reading {
            *self.last.lock().unwrap() = *value;
        }
        reading
    }

    fn sample_memory_percent(&self) -> Result<f64, CollectError> {
        Ok(self.last_cpu())
    }

    fn sample_disk_percent(&self, _mount_point: &Path) -> Result<f64, CollectError> {
        Ok(self.last_cpu())
    }
}

pub fn transient_error() -> CollectError {
    CollectError::InvalidReading {
        metric: "cpu",
        reason: "temporarily unavailable".into(),
    }
}

/// Snapshot with all three fields equal to `value`, captured `seq` seconds after a fixed origin.
pub fn uniform_snapshot(value: f64, seq: i64) -> MetricSnapshot {
    MetricSnapshot::new(value, value, value, capture_origin() + Duration::seconds(seq)).unwrap()
}

pub fn capture_origin() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

/// Rows of a test backend buffer as plain strings.
pub fn buffer_lines(buffer: &Buffer) -> Vec<String> {
    let area = buffer.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buffer.get(x, y).symbol.as_str())
                .collect::<String>()
        })
        .collect()
}

pub fn screen_text(buffer: &Buffer) -> String {
    buffer_lines(buffer).join("\n")
}

/// Collector that always answers with the same three readings.
pub struct FixedCollector {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

impl MetricsCollector for FixedCollector {
    fn sample_cpu_percent(&self) -> Result<f64, CollectError> {
        Ok(self.cpu)
    }

    fn sample_memory_percent(&self) -> Result<f64, CollectError> {
        Ok(self.memory)
    }

    fn sample_disk_percent(&self, _mount_point: &Path) -> Result<f64, CollectError> {
        Ok(self.disk)
    }
}
