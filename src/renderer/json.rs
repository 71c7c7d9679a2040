use anyhow::{Context, Result};

use crate::models::CollectionReport;

/// Nested export: keeps every disk and service record.
pub fn render(report: &CollectionReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HostResult;
    use chrono::Utc;

    #[test]
    fn test_json_keeps_absent_values_null() {
        let report = CollectionReport::new(
            "Nightly",
            Utc::now(),
            15.0,
            5.0,
            vec![HostResult::failed("db01", "ssh exited with 255", Utc::now())],
        );
        let value: serde_json::Value = serde_json::from_str(&render(&report).unwrap()).unwrap();

        assert_eq!(value["title"], "Nightly");
        assert_eq!(value["summary"]["failed"], 1);
        let host = &value["hosts"][0];
        assert_eq!(host["host"], "db01");
        assert_eq!(host["reachable"], false);
        assert!(host["latency_ms"].is_null());
        assert_eq!(host["os"], "ERROR");
        assert_eq!(host["disks"].as_array().unwrap().len(), 0);
    }
}
