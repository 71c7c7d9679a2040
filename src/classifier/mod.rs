use crate::models::{DiskRecord, HostResult, HostSnapshot, Level, RawDisk, RawService, ServiceRecord};
use chrono::{DateTime, Utc};

pub mod threshold;

pub use threshold::{classify_disk_free_pct, classify_service_status, Thresholds};

pub fn classify_disks(disks: &[RawDisk], thresholds: &Thresholds) -> Vec<DiskRecord> {
    disks
        .iter()
        .map(|disk| {
            let free_pct = disk.free_pct();
            DiskRecord {
                device: disk.device.clone(),
                free_bytes: disk.free,
                total_bytes: disk.total,
                free_pct,
                level: thresholds.classify_disk(free_pct),
            }
        })
        .collect()
}

pub fn classify_services(services: &[RawService]) -> Vec<ServiceRecord> {
    services
        .iter()
        .map(|service| ServiceRecord {
            name: service.name.clone(),
            status: service.status.clone(),
            level: classify_service_status(&service.status),
        })
        .collect()
}

/// Lowest free percentage across disks, `None` when there are none.
pub fn min_free_pct(disks: &[DiskRecord]) -> Option<f64> {
    disks.iter().map(|d| d.free_pct).reduce(f64::min)
}

fn count_level<'a>(levels: impl Iterator<Item = &'a Level>, wanted: Level) -> usize {
    levels.filter(|level| **level == wanted).count()
}

/// Classifies a snapshot and assembles the host's result row.
pub fn classify(snapshot: HostSnapshot, thresholds: &Thresholds, now: DateTime<Utc>) -> HostResult {
    let disks = classify_disks(&snapshot.disks, thresholds);
    let services = classify_services(&snapshot.services);

    HostResult {
        host: snapshot.host,
        reachable: snapshot.reachability.reachable,
        latency_ms: snapshot.reachability.latency_ms,
        os: snapshot.os.caption.clone(),
        uptime_days: snapshot.os.uptime_days(now),
        min_free_pct: min_free_pct(&disks),
        disk_warn_count: Some(count_level(disks.iter().map(|d| &d.level), Level::Warn)),
        disk_crit_count: Some(count_level(disks.iter().map(|d| &d.level), Level::Crit)),
        svc_warn_count: Some(count_level(services.iter().map(|s| &s.level), Level::Warn)),
        svc_crit_count: Some(count_level(services.iter().map(|s| &s.level), Level::Crit)),
        disks,
        services,
        collected_at: now,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OsInfo, Reachability, ServiceStatus};
    use chrono::Duration;

    const GB: u64 = 1_000_000_000;

    fn snapshot(disks: Vec<RawDisk>, services: Vec<RawService>) -> HostSnapshot {
        HostSnapshot {
            host: "localhost".to_string(),
            reachability: Reachability::reachable(0),
            os: OsInfo {
                caption: "Fedora Linux 40".to_string(),
                boot_time: Utc::now() - Duration::days(3) - Duration::minutes(5),
            },
            disks,
            services,
        }
    }

    fn service(name: &str, status: ServiceStatus) -> RawService {
        RawService {
            name: name.to_string(),
            status,
        }
    }

    #[test]
    fn test_disks_classified_against_thresholds() {
        let thresholds = Thresholds {
            warn_pct: 15.0,
            crit_pct: 5.0,
        };
        let disks = classify_disks(
            &[
                RawDisk::new("/", 3 * GB, 100 * GB),
                RawDisk::new("/var", 10 * GB, 100 * GB),
                RawDisk::new("/home", 60 * GB, 100 * GB),
            ],
            &thresholds,
        );

        assert_eq!(disks[0].free_pct, 3.0);
        assert_eq!(disks[0].level, Level::Crit);
        assert_eq!(disks[1].free_pct, 10.0);
        assert_eq!(disks[1].level, Level::Warn);
        assert_eq!(disks[2].level, Level::Ok);
        assert_eq!(min_free_pct(&disks), Some(3.0));
    }

    #[test]
    fn test_min_free_pct_absent_without_disks() {
        assert_eq!(min_free_pct(&[]), None);
    }

    #[test]
    fn test_rollup_counts() {
        let now = Utc::now();
        let result = classify(
            snapshot(
                vec![RawDisk::new("/", 4 * GB, 100 * GB), RawDisk::new("/data", 12 * GB, 100 * GB)],
                vec![
                    service("NoSuchSvc123", ServiceStatus::NotFound),
                    service("sshd", ServiceStatus::Running),
                ],
            ),
            &Thresholds::default(),
            now,
        );

        assert_eq!(result.disk_crit_count, Some(1));
        assert_eq!(result.disk_warn_count, Some(1));
        assert_eq!(result.svc_warn_count, Some(1));
        assert_eq!(result.svc_crit_count, Some(0));
        assert_eq!(result.min_free_pct, Some(4.0));
        assert_eq!(result.uptime_days, 3);
        assert_eq!(result.collected_at, now);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_service_order_is_preserved() {
        let result = classify(
            snapshot(
                Vec::new(),
                vec![
                    service("zebra", ServiceStatus::Stopped),
                    service("alpha", ServiceStatus::Running),
                    service("mid", ServiceStatus::Other("reloading".into())),
                ],
            ),
            &Thresholds::default(),
            Utc::now(),
        );

        let names: Vec<&str> = result.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["zebra", "alpha", "mid"]);
        assert_eq!(result.svc_crit_count, Some(1));
        assert_eq!(result.svc_warn_count, Some(1));
        assert_eq!(result.min_free_pct, None);
        assert_eq!(result.disk_warn_count, Some(0));
    }
}
