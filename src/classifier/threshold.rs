use crate::models::{Level, ServiceStatus};

/// Disk free-space cutoffs, in percent. `crit_pct` is expected to be below `warn_pct`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub warn_pct: f64,
    pub crit_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warn_pct: 15.0,
            crit_pct: 5.0,
        }
    }
}

impl Thresholds {
    pub fn classify_disk(&self, free_pct: f64) -> Level {
        classify_disk_free_pct(free_pct, self.warn_pct, self.crit_pct)
    }
}

/// Strictly-below comparison: a value equal to a threshold is not flagged.
pub fn classify_disk_free_pct(pct: f64, warn_threshold: f64, crit_threshold: f64) -> Level {
    if pct < crit_threshold {
        Level::Crit
    } else if pct < warn_threshold {
        Level::Warn
    } else {
        Level::Ok
    }
}

pub fn classify_service_status(status: &ServiceStatus) -> Level {
    match status {
        ServiceStatus::Running => Level::Ok,
        ServiceStatus::Stopped => Level::Crit,
        ServiceStatus::NotFound | ServiceStatus::Other(_) => Level::Warn,
    }
}
