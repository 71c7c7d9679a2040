use anyhow::{bail, Context, Result};
use chrono::Local;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::CollectionReport;

pub(crate) mod colours;
pub mod csv;
pub mod html;
pub mod json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Csv,
    Json,
}

impl ReportFormat {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "html" => Ok(ReportFormat::Html),
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => bail!("Unknown report format '{}'", other),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }

    pub fn render(&self, report: &CollectionReport) -> Result<String> {
        match self {
            ReportFormat::Html => Ok(html::render(report)),
            ReportFormat::Csv => Ok(csv::render(report)),
            ReportFormat::Json => json::render(report),
        }
    }
}

/// Creates the output directory, failing before any probing happens.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .context(format!("Failed to create output directory {}", dir.display()))?;
    debug!("Output directory {} ready", dir.display());
    Ok(())
}

/// Writes one `<prefix>_<YYYYmmdd_HHMMSS>.<ext>` file per format and returns their paths.
pub fn write_reports(
    report: &CollectionReport,
    dir: &Path,
    prefix: &str,
    formats: &[ReportFormat],
) -> Result<Vec<PathBuf>> {
    let stamp = report
        .started_at
        .with_timezone(&Local)
        .format("%Y%m%d_%H%M%S");

    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let path = dir.join(format!("{}_{}.{}", prefix, stamp, format.extension()));
        let content = format.render(report)?;
        fs::write(&path, content)
            .context(format!("Failed to write report to {}", path.display()))?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
