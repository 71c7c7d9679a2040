pub mod classifier;
pub mod collectors;
pub mod config;
pub mod error;
pub mod models;
pub mod renderer;

use anyhow::{Context, Result};
use chrono::Utc;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use crate::collectors::{collect_host_results, CollectionPlan, HostProbe, ProbeSettings, SystemProbe};
use crate::config::AppConfig;
use crate::models::CollectionReport;
use crate::renderer::ReportFormat;

/// What a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: CollectionReport,
    pub artifacts: Vec<PathBuf>,
}

/// One collection pass over the configured hosts using the system probe.
pub async fn run(config: &AppConfig) -> Result<RunOutcome> {
    let probe = Arc::new(SystemProbe::new(ProbeSettings::from(&config.probe)));
    run_with_probe(config, probe).await
}

/// Same as [`run`] with a caller supplied probe.
pub async fn run_with_probe(config: &AppConfig, probe: Arc<dyn HostProbe>) -> Result<RunOutcome> {
    match execute(config, probe).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            error!("Run error: {e:#}");
            // Print chain of error causes
            for cause in e.chain().skip(1) {
                error!("Caused by: {cause}");
            }
            Err(e).context("Run failed")
        }
    }
}

async fn execute(config: &AppConfig, probe: Arc<dyn HostProbe>) -> Result<RunOutcome> {
    let formats = config
        .report
        .formats
        .iter()
        .map(|name| ReportFormat::parse(name))
        .collect::<Result<Vec<_>>>()?;

    // Output problems are fatal and must surface before any host is touched.
    let output_dir = PathBuf::from(&config.report.output_dir);
    renderer::prepare_output_dir(&output_dir)?;

    let plan = CollectionPlan::from_config(config);
    if plan.thresholds.crit_pct >= plan.thresholds.warn_pct {
        warn!(
            "crit_pct ({}) is not below warn_pct ({}); no disk will be classified warn",
            plan.thresholds.crit_pct, plan.thresholds.warn_pct
        );
    }
    let started_at = Utc::now();
    info!(
        "Run started: {} host(s), {} service(s) per host, thresholds warn<{}% crit<{}%",
        plan.hosts.len(),
        plan.services.len(),
        plan.thresholds.warn_pct,
        plan.thresholds.crit_pct
    );

    let hosts = collect_host_results(probe, &plan).await;
    let report = CollectionReport::new(
        &config.report.title,
        started_at,
        plan.thresholds.warn_pct,
        plan.thresholds.crit_pct,
        hosts,
    );

    let summary = &report.summary;
    info!(
        "{} host(s): {} failed, {} unreachable, {} warn, {} crit",
        summary.total, summary.failed, summary.unreachable, summary.warn, summary.crit
    );

    let artifacts = renderer::write_reports(
        &report,
        &output_dir,
        &config.report.file_prefix,
        &formats,
    )?;

    let written: Vec<String> = artifacts.iter().map(|p| p.display().to_string()).collect();
    info!("Run completed: {}", written.join(", "));

    Ok(RunOutcome { report, artifacts })
}
