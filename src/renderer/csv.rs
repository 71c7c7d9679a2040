use crate::models::{CollectionReport, HostResult};

const HEADER: [&str; 14] = [
    "host",
    "reachable",
    "latency_ms",
    "os",
    "uptime_days",
    "min_free_pct",
    "disk_warn",
    "disk_crit",
    "svc_warn",
    "svc_crit",
    "disks",
    "services",
    "collected_at",
    "error",
];

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn row(host: &HostResult) -> Vec<String> {
    let disks = host
        .disks
        .iter()
        .map(|d| format!("{}={}%", d.device, d.free_pct))
        .collect::<Vec<_>>()
        .join(";");
    let services = host
        .services
        .iter()
        .map(|s| format!("{}={}", s.name, s.status))
        .collect::<Vec<_>>()
        .join(";");

    vec![
        host.host.clone(),
        host.reachable.to_string(),
        optional(host.latency_ms),
        host.os.clone(),
        host.uptime_days.to_string(),
        optional(host.min_free_pct),
        optional(host.disk_warn_count),
        optional(host.disk_crit_count),
        optional(host.svc_warn_count),
        optional(host.svc_crit_count),
        disks,
        services,
        host.collected_at.to_rfc3339(),
        host.error.clone().unwrap_or_default(),
    ]
}

/// Flat export, one row per host. Absent values are empty cells.
pub fn render(report: &CollectionReport) -> String {
    let mut out = String::new();
    out.push_str(&HEADER.join(","));
    out.push('\n');
    for host in &report.hosts {
        let fields: Vec<String> = row(host).iter().map(|f| escape(f)).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiskRecord, Level, ServiceRecord, ServiceStatus};
    use chrono::Utc;

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_render_rows() {
        let mut healthy = HostResult::failed("web01", "", Utc::now());
        healthy.reachable = true;
        healthy.latency_ms = Some(4);
        healthy.os = "Ubuntu 22.04.4 LTS".to_string();
        healthy.uptime_days = 12;
        healthy.min_free_pct = Some(42.5);
        healthy.disk_warn_count = Some(0);
        healthy.disk_crit_count = Some(0);
        healthy.svc_warn_count = Some(1);
        healthy.svc_crit_count = Some(0);
        healthy.error = None;
        healthy.disks.push(DiskRecord {
            device: "/".to_string(),
            free_bytes: 425,
            total_bytes: 1000,
            free_pct: 42.5,
            level: Level::Ok,
        });
        healthy.services.push(ServiceRecord {
            name: "sshd".to_string(),
            status: ServiceStatus::Running,
            level: Level::Ok,
        });
        healthy.services.push(ServiceRecord {
            name: "cron".to_string(),
            status: ServiceStatus::NotFound,
            level: Level::Warn,
        });

        let report = CollectionReport::new(
            "t",
            Utc::now(),
            15.0,
            5.0,
            vec![healthy, HostResult::failed("db01", "refused, twice", Utc::now())],
        );
        let csv = render(&report);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("host,reachable,latency_ms,os"));
        assert!(lines[1].starts_with("web01,true,4,Ubuntu 22.04.4 LTS,12,42.5,0,0,1,0,/=42.5%,sshd=running;cron=not-found,"));
        assert!(lines[2].starts_with("db01,false,,ERROR,0,,,,,,,,"));
        assert!(lines[2].ends_with(",\"refused, twice\""));
    }
}
