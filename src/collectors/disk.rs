use crate::error::{ProbeError, ProbeResult};
use crate::models::RawDisk;
use log::debug;
use std::time::Instant;
use sysinfo::Disks as SysInfoDisks;

/// Local-only, POSIX-format listing with byte sizes and filesystem types.
pub const REMOTE_DISK_COMMAND: [&str; 5] = ["df", "-P", "-T", "-l", "-B1"];

/// Filesystem types that are never fixed local storage: network shares,
/// optical media and memory-backed or virtual mounts.
const EXCLUDED_FILESYSTEMS: [&str; 22] = [
    "tmpfs", "devtmpfs", "ramfs", "squashfs", "overlay", "proc", "sysfs", "cgroup", "cgroup2",
    "devpts", "efivarfs", "autofs", "iso9660", "udf", "nfs", "nfs4", "cifs", "smbfs", "smb3",
    "sshfs", "fuse.sshfs", "9p",
];

pub fn is_fixed_filesystem(fs_type: &str) -> bool {
    let fs_type = fs_type.to_lowercase();
    !EXCLUDED_FILESYSTEMS.contains(&fs_type.as_str())
}

pub fn collect_local() -> Vec<RawDisk> {
    let start = Instant::now();
    let disks = SysInfoDisks::new_with_refreshed_list();
    let mut result = Vec::new();

    for disk in disks.list() {
        let fs_type = disk.file_system().to_string_lossy();
        if disk.is_removable() || !is_fixed_filesystem(&fs_type) {
            continue;
        }
        if let Some(mount_str) = disk.mount_point().to_str() {
            result.push(RawDisk::new(mount_str, disk.available_space(), disk.total_space()));
        }
    }

    debug!("collect_local (disks) took: {} ms", start.elapsed().as_millis());
    result
}

/// Parses `df -P -T -B1` output in listing order.
pub fn parse_df(output: &str) -> ProbeResult<Vec<RawDisk>> {
    let mut lines = output.lines();
    let header = lines
        .next()
        .ok_or_else(|| ProbeError::parse("df", "empty output"))?;
    if !header.starts_with("Filesystem") {
        return Err(ProbeError::parse("df", format!("unexpected header '{}'", header)));
    }

    let mut disks = Vec::new();
    for line in lines.filter(|line| !line.trim().is_empty()) {
        // Filesystem Type 1-blocks Used Available Capacity Mounted-on (may contain spaces)
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < 7 {
            return Err(ProbeError::parse("df", format!("short line '{}'", line)));
        }
        if !is_fixed_filesystem(columns[1]) {
            continue;
        }
        let total = columns[2]
            .parse::<u64>()
            .map_err(|e| ProbeError::parse("df", format!("size '{}': {}", columns[2], e)))?;
        let free = columns[4]
            .parse::<u64>()
            .map_err(|e| ProbeError::parse("df", format!("available '{}': {}", columns[4], e)))?;
        let mount_point = columns[6..].join(" ");
        disks.push(RawDisk::new(mount_point, free, total));
    }
    Ok(disks)
}
