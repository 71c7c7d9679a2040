use crate::models::{HostResult, Level};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The single artifact a collection run hands to renderers.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub title: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub warn_pct: f64,
    pub crit_pct: f64,
    pub summary: ReportSummary,
    pub hosts: Vec<HostResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub failed: usize,
    pub unreachable: usize,
    pub warn: usize,
    pub crit: usize,
}

impl ReportSummary {
    pub fn from_hosts(hosts: &[HostResult]) -> Self {
        let mut summary = ReportSummary {
            total: hosts.len(),
            ..Default::default()
        };
        for host in hosts {
            if host.is_failed() {
                summary.failed += 1;
            } else if !host.reachable {
                summary.unreachable += 1;
            }
            match host.worst_level() {
                Level::Warn => summary.warn += 1,
                Level::Crit => summary.crit += 1,
                Level::Ok => {}
            }
        }
        summary
    }
}

impl CollectionReport {
    pub fn new(
        title: &str,
        started_at: DateTime<Utc>,
        warn_pct: f64,
        crit_pct: f64,
        hosts: Vec<HostResult>,
    ) -> Self {
        Self {
            title: title.to_string(),
            started_at,
            finished_at: Utc::now(),
            warn_pct,
            crit_pct,
            summary: ReportSummary::from_hosts(&hosts),
            hosts,
        }
    }
}
