use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod disk;
pub mod level;
pub mod report;
pub mod service;

pub use disk::{DiskRecord, RawDisk};
pub use level::Level;
pub use report::{CollectionReport, ReportSummary};
pub use service::{RawService, ServiceRecord, ServiceStatus};

/// OS display name written in place of the caption when a host failed outright.
pub const OS_ERROR_MARKER: &str = "ERROR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reachability {
    pub reachable: bool,
    pub latency_ms: Option<u64>,
}

impl Reachability {
    pub fn reachable(latency_ms: u64) -> Self {
        Self {
            reachable: true,
            latency_ms: Some(latency_ms),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            latency_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsInfo {
    pub caption: String,
    pub boot_time: DateTime<Utc>,
}

impl OsInfo {
    /// Whole days between boot and `now`. A boot time in the future counts as 0.
    pub fn uptime_days(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = now.signed_duration_since(self.boot_time);
        elapsed.num_days().max(0) as u64
    }
}

/// Everything one probe pass learned about a host, before classification.
#[derive(Debug, Clone)]
pub struct HostSnapshot {
    pub host: String,
    pub reachability: Reachability,
    pub os: OsInfo,
    pub disks: Vec<RawDisk>,
    pub services: Vec<RawService>,
}

/// One row of the result schema. Built once per host per run.
///
/// Optional fields are `None` when the value was never collected, which is
/// different from a collected zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostResult {
    pub host: String,
    pub reachable: bool,
    pub latency_ms: Option<u64>,
    pub os: String,
    pub uptime_days: u64,
    pub min_free_pct: Option<f64>,
    pub disk_warn_count: Option<usize>,
    pub disk_crit_count: Option<usize>,
    pub svc_warn_count: Option<usize>,
    pub svc_crit_count: Option<usize>,
    pub disks: Vec<DiskRecord>,
    pub services: Vec<ServiceRecord>,
    pub collected_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HostResult {
    /// Placeholder for a host whose probe failed outright.
    pub fn failed(host: &str, error: impl Into<String>, collected_at: DateTime<Utc>) -> Self {
        Self {
            host: host.to_string(),
            reachable: false,
            latency_ms: None,
            os: OS_ERROR_MARKER.to_string(),
            uptime_days: 0,
            min_free_pct: None,
            disk_warn_count: None,
            disk_crit_count: None,
            svc_warn_count: None,
            svc_crit_count: None,
            disks: Vec::new(),
            services: Vec::new(),
            collected_at,
            error: Some(error.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Worst severity found on this host. Failed and unreachable hosts are `Crit`.
    pub fn worst_level(&self) -> Level {
        if self.is_failed() || !self.reachable {
            return Level::Crit;
        }
        self.disks
            .iter()
            .map(|d| d.level)
            .chain(self.services.iter().map(|s| s.level))
            .max()
            .unwrap_or(Level::Ok)
    }
}
