use chrono::{DateTime, Local};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("{field} reading is not a finite number: {value}")]
    NotFinite { field: &'static str, value: f64 },
}

/// One point-in-time reading of the three utilization percentages.
///
/// Built only through [`MetricSnapshot::new`], which clamps every field into
/// `[0, 100]`; there are no setters, so a snapshot never changes after capture.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSnapshot {
    cpu_percent: f64,
    memory_percent: f64,
    disk_percent: f64,
    captured_at: DateTime<Local>,
}

impl MetricSnapshot {
    pub fn new(
        cpu_percent: f64,
        memory_percent: f64,
        disk_percent: f64,
        captured_at: DateTime<Local>,
    ) -> Result<Self, SnapshotError> {
        Ok(Self {
            cpu_percent: percent("cpu", cpu_percent)?,
            memory_percent: percent("memory", memory_percent)?,
            disk_percent: percent("disk", disk_percent)?,
            captured_at,
        })
    }

    pub fn cpu_percent(&self) -> f64 {
        self.cpu_percent
    }

    pub fn memory_percent(&self) -> f64 {
        self.memory_percent
    }

    pub fn disk_percent(&self) -> f64 {
        self.disk_percent
    }

    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }
}

fn percent(field: &'static str, value: f64) -> Result<f64, SnapshotError> {
    if !value.is_finite() {
        return Err(SnapshotError::NotFinite { field, value });
    }
    Ok(value.clamp(0.0, 100.0))
}

/// What the dashboard currently shows. Replaced wholesale, never patched field by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DisplayState {
    #[default]
    NoData,
    Showing(MetricSnapshot),
}

impl DisplayState {
    pub fn snapshot(&self) -> Option<&MetricSnapshot> {
        match self {
            DisplayState::NoData => None,
            DisplayState::Showing(snapshot) => Some(snapshot),
        }
    }
}

impl From<MetricSnapshot> for DisplayState {
    fn from(snapshot: MetricSnapshot) -> Self {
        DisplayState::Showing(snapshot)
    }
}
