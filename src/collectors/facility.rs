use async_trait::async_trait;
use std::time::Duration;

use crate::collectors::{command, disk, os, service};
use crate::error::{ProbeError, ProbeResult};
use crate::models::{OsInfo, RawDisk, ServiceStatus};

/// Where the OS, disk and service sub-probes of one host are executed.
#[async_trait]
pub trait HostFacility: Send + Sync {
    fn describe(&self) -> String;

    async fn os_info(&self) -> ProbeResult<OsInfo>;

    /// Fixed/local volumes only.
    async fn fixed_disks(&self) -> ProbeResult<Vec<RawDisk>>;

    async fn service_status(&self, name: &str) -> ProbeResult<ServiceStatus>;
}

/// Queries this machine through sysinfo and the local service manager.
#[derive(Debug, Default)]
pub struct LocalFacility;

#[async_trait]
impl HostFacility for LocalFacility {
    fn describe(&self) -> String {
        "local".to_string()
    }

    async fn os_info(&self) -> ProbeResult<OsInfo> {
        tokio::task::spawn_blocking(os::collect_local)
            .await
            .map_err(|e| ProbeError::Task(e.to_string()))?
    }

    async fn fixed_disks(&self) -> ProbeResult<Vec<RawDisk>> {
        tokio::task::spawn_blocking(disk::collect_local)
            .await
            .map_err(|e| ProbeError::Task(e.to_string()))
    }

    async fn service_status(&self, name: &str) -> ProbeResult<ServiceStatus> {
        let output = command::run("systemctl", &service::systemctl_args(name))
            .await?
            .into_stdout("systemctl")?;
        service::parse_systemctl_show(&output)
    }
}

/// Runs the same queries on another host over non-interactive ssh.
/// Authentication is whatever the invoking user's ssh setup already provides.
#[derive(Debug, Clone)]
pub struct RemoteFacility {
    address: String,
    ssh_user: Option<String>,
    connect_timeout: Duration,
}

impl RemoteFacility {
    pub fn new(address: &str, ssh_user: Option<&str>, connect_timeout: Duration) -> Self {
        Self {
            address: address.to_string(),
            ssh_user: ssh_user.map(str::to_string),
            connect_timeout,
        }
    }

    pub fn destination(&self) -> String {
        match &self.ssh_user {
            Some(user) => format!("{}@{}", user, self.address),
            None => self.address.clone(),
        }
    }

    pub fn ssh_args<S: AsRef<str>>(&self, remote_command: &[S]) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)),
            self.destination(),
        ];
        args.extend(remote_command.iter().map(|part| part.as_ref().to_string()));
        args
    }

    async fn exec<S: AsRef<str> + Sync>(&self, remote_command: &[S]) -> ProbeResult<String> {
        command::run("ssh", &self.ssh_args(remote_command))
            .await?
            .into_stdout("ssh")
    }
}

#[async_trait]
impl HostFacility for RemoteFacility {
    fn describe(&self) -> String {
        format!("ssh {}", self.destination())
    }

    async fn os_info(&self) -> ProbeResult<OsInfo> {
        let output = self.exec(&os::REMOTE_OS_COMMAND).await?;
        os::parse_os_info(&output)
    }

    async fn fixed_disks(&self) -> ProbeResult<Vec<RawDisk>> {
        let output = self.exec(&disk::REMOTE_DISK_COMMAND).await?;
        disk::parse_df(&output)
    }

    async fn service_status(&self, name: &str) -> ProbeResult<ServiceStatus> {
        let mut remote_command = vec!["systemctl".to_string()];
        remote_command.extend(service::systemctl_args(name));
        let output = self.exec(&remote_command).await?;
        service::parse_systemctl_show(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_args() {
        let facility = RemoteFacility::new("web01", Some("ops"), Duration::from_secs(15));
        let args = facility.ssh_args(&disk::REMOTE_DISK_COMMAND);
        assert_eq!(
            args,
            vec![
                "-o", "BatchMode=yes", "-o", "ConnectTimeout=15", "ops@web01", "df", "-P", "-T", "-l",
                "-B1"
            ]
        );
        assert_eq!(facility.describe(), "ssh ops@web01");
    }

    #[test]
    fn test_destination_without_user() {
        let facility = RemoteFacility::new("10.0.0.7", None, Duration::from_millis(200));
        assert_eq!(facility.destination(), "10.0.0.7");
        assert!(facility.ssh_args(&["true"]).contains(&"ConnectTimeout=1".to_string()));
    }
}
