use crate::error::{ProbeError, ProbeResult};
use crate::models::OsInfo;
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use std::time::Instant;
use sysinfo::System as SysInfo;

/// Shell-free remote command printing both files `parse_os_info` needs.
pub const REMOTE_OS_COMMAND: [&str; 3] = ["cat", "/etc/os-release", "/proc/stat"];

pub fn collect_local() -> ProbeResult<OsInfo> {
    let start = Instant::now();
    let caption = SysInfo::long_os_version()
        .or_else(SysInfo::name)
        .ok_or_else(|| ProbeError::Unavailable("local OS name is unavailable".to_string()))?;
    let boot_time = boot_time_from_epoch(SysInfo::boot_time())?;
    debug!("collect_local (os) took: {} ms", start.elapsed().as_millis());
    Ok(OsInfo { caption, boot_time })
}

/// Reads `PRETTY_NAME` (falling back to `NAME VERSION`) and the `btime` line out of
/// concatenated `/etc/os-release` and `/proc/stat` contents.
pub fn parse_os_info(output: &str) -> ProbeResult<OsInfo> {
    let mut pretty_name = None;
    let mut name = None;
    let mut version = None;
    let mut btime = None;

    for line in output.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("PRETTY_NAME=") {
            pretty_name = Some(unquote(value));
        } else if let Some(value) = line.strip_prefix("NAME=") {
            name = Some(unquote(value));
        } else if let Some(value) = line.strip_prefix("VERSION=") {
            version = Some(unquote(value));
        } else if let Some(value) = line.strip_prefix("btime ") {
            btime = value.trim().parse::<u64>().ok();
        }
    }

    let caption = pretty_name
        .filter(|caption| !caption.is_empty())
        .or_else(|| match (name, version) {
            (Some(name), Some(version)) => Some(format!("{} {}", name, version)),
            (Some(name), None) => Some(name),
            _ => None,
        })
        .ok_or_else(|| ProbeError::parse("os-release", "no PRETTY_NAME or NAME entry"))?;

    let btime = btime.ok_or_else(|| ProbeError::parse("/proc/stat", "no btime entry"))?;

    Ok(OsInfo {
        caption,
        boot_time: boot_time_from_epoch(btime)?,
    })
}

fn boot_time_from_epoch(secs: u64) -> ProbeResult<DateTime<Utc>> {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .ok_or_else(|| ProbeError::parse("boot time", format!("{} is out of range", secs)))
}

fn unquote(value: &str) -> String {
    value.trim().trim_matches('"').trim_matches('\'').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OS_RELEASE: &str = "PRETTY_NAME=\"Ubuntu 22.04.4 LTS\"\nNAME=\"Ubuntu\"\nVERSION_ID=\"22.04\"\nVERSION=\"22.04.4 LTS (Jammy Jellyfish)\"\nID=ubuntu\n";
    const PROC_STAT: &str = "cpu  2255 34 2290 22625563 6290 127 456 0 0 0\nintr 114930548 113199788 3 0 5 263 0 4\nctxt 1990473\nbtime 1710072000\nprocesses 2915\n";

    #[test]
    fn test_parse_os_info() {
        let info = parse_os_info(&format!("{}{}", OS_RELEASE, PROC_STAT)).unwrap();
        assert_eq!(info.caption, "Ubuntu 22.04.4 LTS");
        assert_eq!(info.boot_time, Utc.timestamp_opt(1_710_072_000, 0).unwrap());
    }

    #[test]
    fn test_parse_falls_back_to_name_and_version() {
        let output = format!("NAME=Alpine Linux\nVERSION='3.19'\n{}", PROC_STAT);
        let info = parse_os_info(&output).unwrap();
        assert_eq!(info.caption, "Alpine Linux 3.19");
    }

    #[test]
    fn test_parse_requires_boot_time() {
        let err = parse_os_info(OS_RELEASE).unwrap_err();
        assert!(err.to_string().contains("btime"));
    }

    #[test]
    fn test_parse_requires_os_name() {
        assert!(parse_os_info(PROC_STAT).is_err());
    }
}
