use chrono::Utc;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::time;

use crate::classifier::{self, Thresholds};
use crate::collectors::probe::HostProbe;
use crate::config::AppConfig;
use crate::error::{ProbeError, ProbeResult};
use crate::models::HostResult;

/// What one collection run probes and how.
#[derive(Debug, Clone)]
pub struct CollectionPlan {
    pub hosts: Vec<String>,
    pub services: Vec<String>,
    pub thresholds: Thresholds,
    pub concurrency: usize,
    pub host_timeout: Duration,
}

impl CollectionPlan {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            hosts: config.targets.hosts.clone(),
            services: config.targets.services.clone(),
            thresholds: config.thresholds(),
            concurrency: config.probe.concurrency,
            host_timeout: config.probe.host_timeout(),
        }
    }
}

async fn probe_host(
    probe: &dyn HostProbe,
    host: &str,
    services: &[String],
    thresholds: &Thresholds,
    host_timeout: Duration,
) -> ProbeResult<HostResult> {
    let snapshot = match time::timeout(host_timeout, probe.probe(host, services)).await {
        Ok(result) => result?,
        Err(_) => return Err(ProbeError::timeout(format!("probe of {}", host), host_timeout)),
    };
    Ok(classifier::classify(snapshot, thresholds, Utc::now()))
}

/// Probes every host of the plan with at most `concurrency` hosts in flight.
///
/// Returns exactly one result per configured host, in configured order. A host
/// that fails outright (error, deadline or panic) gets a degraded record.
pub async fn collect_host_results(probe: Arc<dyn HostProbe>, plan: &CollectionPlan) -> Vec<HostResult> {
    let start = Instant::now();
    let semaphore = Arc::new(Semaphore::new(plan.concurrency.max(1)));
    let services: Arc<[String]> = plan.services.clone().into();

    let mut handles = Vec::with_capacity(plan.hosts.len());
    for host in &plan.hosts {
        let probe = Arc::clone(&probe);
        let semaphore = Arc::clone(&semaphore);
        let services = Arc::clone(&services);
        let host = host.clone();
        let thresholds = plan.thresholds;
        let host_timeout = plan.host_timeout;

        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| ProbeError::Task(e.to_string()))?;
            probe_host(probe.as_ref(), &host, &services, &thresholds, host_timeout).await
        }));
    }

    // Handles are awaited in spawn order, so slot i always belongs to host i.
    let mut results = Vec::with_capacity(handles.len());
    for (host, handle) in plan.hosts.iter().zip(handles) {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(ProbeError::Task(e.to_string())),
        };
        let result = match outcome {
            Ok(result) => {
                debug!("{} collected: reachable={} os={}", host, result.reachable, result.os);
                result
            }
            Err(e) => {
                error!("Host {} failed: {}", host, e);
                HostResult::failed(host, e.to_string(), Utc::now())
            }
        };
        results.push(result);
    }

    info!(
        "Collected {} host(s) in {} ms",
        results.len(),
        start.elapsed().as_millis()
    );
    results
}
