use async_trait::async_trait;
use log::{debug, warn};
use std::future::Future;
use std::time::{Duration, Instant};
use sysinfo::System as SysInfo;
use tokio::time;

use crate::collectors::facility::{HostFacility, LocalFacility, RemoteFacility};
use crate::collectors::reachability::{self, ReachabilitySettings};
use crate::collectors::service;
use crate::collectors::target::{ExecutionContext, Target};
use crate::config::ProbeConfig;
use crate::error::{ProbeError, ProbeResult};
use crate::models::{HostSnapshot, RawDisk, RawService, ServiceStatus};

/// Produces a raw snapshot of one host. An `Err` means the host failed outright.
#[async_trait]
pub trait HostProbe: Send + Sync {
    async fn probe(&self, host: &str, services: &[String]) -> ProbeResult<HostSnapshot>;
}

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub reachability: ReachabilitySettings,
    pub command_timeout: Duration,
    pub ssh_user: Option<String>,
}

impl From<&ProbeConfig> for ProbeSettings {
    fn from(config: &ProbeConfig) -> Self {
        Self {
            reachability: ReachabilitySettings {
                method: config.reachability,
                tcp_port: config.tcp_port,
                timeout: config.ping_timeout(),
            },
            command_timeout: config.command_timeout(),
            ssh_user: config.ssh_user().map(str::to_string),
        }
    }
}

/// The production probe: routes each host to the local machine or to ssh.
pub struct SystemProbe {
    settings: ProbeSettings,
    local_name: Option<String>,
}

impl SystemProbe {
    pub fn new(settings: ProbeSettings) -> Self {
        Self {
            settings,
            local_name: SysInfo::host_name(),
        }
    }

    fn facility_for(&self, target: &Target) -> Box<dyn HostFacility> {
        match target.context {
            ExecutionContext::Local => Box::new(LocalFacility),
            ExecutionContext::Remote => Box::new(RemoteFacility::new(
                &target.address,
                self.settings.ssh_user.as_deref(),
                self.settings.command_timeout,
            )),
        }
    }
}

#[async_trait]
impl HostProbe for SystemProbe {
    async fn probe(&self, host: &str, services: &[String]) -> ProbeResult<HostSnapshot> {
        let target = Target::resolve(host, self.local_name.as_deref());
        let facility = self.facility_for(&target);
        debug!("Probing {} via {}", target.host, facility.describe());
        probe_target(&target, facility.as_ref(), &self.settings, services).await
    }
}

async fn with_timeout<T, F>(what: String, limit: Duration, fut: F) -> ProbeResult<T>
where
    F: Future<Output = ProbeResult<T>>,
{
    match time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::timeout(what, limit)),
    }
}

/// Runs the four sub-probes of one target concurrently.
///
/// Reachability and individual service lookups degrade to data values. A disk
/// listing error degrades to no disks. OS failures and any query timeout fail the
/// whole host, and stop the remaining sub-probes.
pub async fn probe_target(
    target: &Target,
    facility: &dyn HostFacility,
    settings: &ProbeSettings,
    services: &[String],
) -> ProbeResult<HostSnapshot> {
    let start = Instant::now();
    let limit = settings.command_timeout;
    let host = target.host.as_str();

    let reachability_probe = async {
        Ok::<_, ProbeError>(reachability::check(&target.address, &settings.reachability).await)
    };

    let os_probe = with_timeout(format!("OS query on {}", host), limit, facility.os_info());

    let disk_probe = async {
        match with_timeout(format!("disk query on {}", host), limit, facility.fixed_disks()).await {
            Ok(disks) => Ok(disks),
            Err(e) if e.is_timeout() => Err(e),
            Err(e) => {
                warn!("Disk enumeration on {} failed: {}", host, e);
                Ok(Vec::<RawDisk>::new())
            }
        }
    };

    let service_probe = lookup_services(host, facility, services, limit);

    let (reachability, os, disks, services) =
        tokio::try_join!(reachability_probe, os_probe, disk_probe, service_probe)?;

    debug!("probe of {} took: {} ms", host, start.elapsed().as_millis());

    Ok(HostSnapshot {
        host: host.to_string(),
        reachability,
        os,
        disks,
        services,
    })
}

/// Looks up every configured service in order. A failed lookup is recorded as
/// not-found and the remaining names are still queried.
async fn lookup_services(
    host: &str,
    facility: &dyn HostFacility,
    services: &[String],
    limit: Duration,
) -> ProbeResult<Vec<RawService>> {
    let mut result = Vec::with_capacity(services.len());

    for name in services {
        let status = if !service::is_valid_service_name(name) {
            warn!("Skipping invalid service name '{}' on {}", name, host);
            ServiceStatus::NotFound
        } else {
            let what = format!("service '{}' lookup on {}", name, host);
            match with_timeout(what, limit, facility.service_status(name)).await {
                Ok(status) => status,
                Err(e) if e.is_timeout() => return Err(e),
                Err(e) => {
                    warn!("Service '{}' lookup on {} failed: {}", name, host, e);
                    ServiceStatus::NotFound
                }
            }
        };
        result.push(RawService {
            name: name.clone(),
            status,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReachabilityMethod;
    use crate::models::OsInfo;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeFacility {
        os_fails: bool,
        disks_fail: bool,
        slow_disks: bool,
        lookups: AtomicUsize,
    }

    impl FakeFacility {
        fn healthy() -> Self {
            Self {
                os_fails: false,
                disks_fail: false,
                slow_disks: false,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl HostFacility for FakeFacility {
        fn describe(&self) -> String {
            "fake".to_string()
        }

        async fn os_info(&self) -> ProbeResult<OsInfo> {
            if self.os_fails {
                return Err(ProbeError::Unavailable("RPC server is unavailable".to_string()));
            }
            Ok(OsInfo {
                caption: "Debian GNU/Linux 12 (bookworm)".to_string(),
                boot_time: Utc::now(),
            })
        }

        async fn fixed_disks(&self) -> ProbeResult<Vec<RawDisk>> {
            if self.slow_disks {
                time::sleep(Duration::from_secs(5)).await;
            }
            if self.disks_fail {
                return Err(ProbeError::parse("df", "empty output"));
            }
            Ok(vec![RawDisk::new("/", 10, 100)])
        }

        async fn service_status(&self, name: &str) -> ProbeResult<ServiceStatus> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            match name {
                "sshd" => Ok(ServiceStatus::Running),
                "broken" => Err(ProbeError::Unavailable("bus error".to_string())),
                _ => Ok(ServiceStatus::NotFound),
            }
        }
    }

    fn settings(command_timeout: Duration) -> ProbeSettings {
        ProbeSettings {
            reachability: ReachabilitySettings {
                method: ReachabilityMethod::Tcp,
                tcp_port: 9,
                timeout: Duration::from_millis(200),
            },
            command_timeout,
            ssh_user: None,
        }
    }

    fn remote_target() -> Target {
        Target::resolve("no-such-host.invalid", None)
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_service_failures_are_isolated() {
        let facility = FakeFacility::healthy();
        let snapshot = probe_target(
            &remote_target(),
            &facility,
            &settings(Duration::from_secs(5)),
            &names(&["broken", "sshd", "NoSuchSvc123"]),
        )
        .await
        .unwrap();

        assert_eq!(facility.lookups.load(Ordering::SeqCst), 3);
        let statuses: Vec<(&str, &ServiceStatus)> = snapshot
            .services
            .iter()
            .map(|s| (s.name.as_str(), &s.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("broken", &ServiceStatus::NotFound),
                ("sshd", &ServiceStatus::Running),
                ("NoSuchSvc123", &ServiceStatus::NotFound),
            ]
        );
        assert!(!snapshot.reachability.reachable);
        assert_eq!(snapshot.reachability.latency_ms, None);
    }

    #[tokio::test]
    async fn test_invalid_service_name_is_not_queried() {
        let facility = FakeFacility::healthy();
        let snapshot = probe_target(
            &remote_target(),
            &facility,
            &settings(Duration::from_secs(5)),
            &names(&["sshd; reboot"]),
        )
        .await
        .unwrap();

        assert_eq!(facility.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(snapshot.services[0].status, ServiceStatus::NotFound);
    }

    #[tokio::test]
    async fn test_os_failure_fails_host() {
        let facility = FakeFacility {
            os_fails: true,
            ..FakeFacility::healthy()
        };
        let err = probe_target(&remote_target(), &facility, &settings(Duration::from_secs(5)), &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("RPC server is unavailable"));
    }

    #[tokio::test]
    async fn test_disk_error_degrades_to_no_disks() {
        let facility = FakeFacility {
            disks_fail: true,
            ..FakeFacility::healthy()
        };
        let snapshot =
            probe_target(&remote_target(), &facility, &settings(Duration::from_secs(5)), &[])
                .await
                .unwrap();
        assert!(snapshot.disks.is_empty());
    }

    #[tokio::test]
    async fn test_disk_timeout_fails_host() {
        let facility = FakeFacility {
            slow_disks: true,
            ..FakeFacility::healthy()
        };
        let err = probe_target(&remote_target(), &facility, &settings(Duration::from_millis(100)), &[])
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().starts_with("disk query on no-such-host.invalid"));
    }
}
