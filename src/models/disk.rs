use crate::models::level::Level;
use serde::Serialize;

/// Unclassified volume as reported by a disk sub-probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDisk {
    pub device: String,
    pub free: u64,
    pub total: u64,
}

impl RawDisk {
    pub fn new(device: impl Into<String>, free: u64, total: u64) -> Self {
        Self {
            device: device.into(),
            free,
            total,
        }
    }

    /// Free space as a percentage of total, rounded to one decimal.
    /// A zero-sized volume reports 0.
    pub fn free_pct(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let pct = self.free as f64 / self.total as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskRecord {
    pub device: String,
    pub free_bytes: u64,
    pub total_bytes: u64,
    pub free_pct: f64,
    pub level: Level,
}
