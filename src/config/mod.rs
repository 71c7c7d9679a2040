use anyhow::{bail, Context, Result};
use config::{Config, File, FileFormat};
use log::{debug, info, LevelFilter};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::classifier::Thresholds;

pub const DEFAULT_CONFIG_FILE: &str = "hostreport.ini";

/// Accepts either a real list or a comma separated string, which is all INI can express.
fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrString {
        List(Vec<String>),
        Text(String),
    }

    let items = match ListOrString::deserialize(deserializer)? {
        ListOrString::List(items) => items,
        ListOrString::Text(text) => text.split(',').map(str::to_string).collect(),
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReachabilityMethod {
    Ping,
    Tcp,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub output_dir: String,
    pub file_prefix: String,
    #[serde(deserialize_with = "deserialize_list")]
    pub formats: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Infrastructure Health Report".to_string(),
            output_dir: "reports".to_string(),
            file_prefix: "host_report".to_string(),
            formats: vec!["html".to_string(), "csv".to_string(), "json".to_string()],
        }
    }
}

/// `hosts` has no fallback: a file without it is rejected.
#[derive(Debug, Deserialize, Clone)]
pub struct TargetsConfig {
    #[serde(deserialize_with = "deserialize_list")]
    pub hosts: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub services: Vec<String>,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["localhost".to_string()],
            services: vec!["sshd".to_string(), "cron".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub warn_pct: f64,
    pub crit_pct: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            warn_pct: thresholds.warn_pct,
            crit_pct: thresholds.crit_pct,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProbeConfig {
    pub concurrency: usize,
    pub reachability: ReachabilityMethod,
    pub tcp_port: u16,
    pub ping_timeout_secs: u64,
    pub command_timeout_secs: u64,
    pub host_timeout_secs: u64,
    pub ssh_user: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            reachability: ReachabilityMethod::Ping,
            tcp_port: 22,
            ping_timeout_secs: 2,
            command_timeout_secs: 15,
            host_timeout_secs: 60,
            ssh_user: String::new(),
        }
    }
}

impl ProbeConfig {
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn host_timeout(&self) -> Duration {
        Duration::from_secs(self.host_timeout_secs)
    }

    pub fn ssh_user(&self) -> Option<&str> {
        let user = self.ssh_user.trim();
        (!user.is_empty()).then_some(user)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: String::new(),
        }
    }
}

impl LoggingConfig {
    pub fn file(&self) -> Option<PathBuf> {
        let file = self.file.trim();
        (!file.is_empty()).then(|| PathBuf::from(file))
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub report: ReportConfig,
    pub targets: TargetsConfig,
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

const KNOWN_FORMATS: [&str; 3] = ["html", "csv", "json"];

impl AppConfig {
    pub fn get_log_level(&self) -> LevelFilter {
        parse_level(&self.logging.level)
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            warn_pct: self.thresholds.warn_pct,
            crit_pct: self.thresholds.crit_pct,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();
        debug!("Loading configuration from {}", config_path.display());

        let config = Config::builder()
            .add_source(File::from(config_path).format(FileFormat::Ini))
            .build()
            .context(format!("Failed to load config from {}", config_path.display()))?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize config")?;

        app_config
            .validate()
            .context(format!("Invalid configuration in {}", config_path.display()))?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.targets.hosts.is_empty() {
            bail!("[targets] hosts must list at least one host");
        }
        if self.probe.concurrency == 0 {
            bail!("[probe] concurrency must be at least 1");
        }
        for (key, secs) in [
            ("ping_timeout_secs", self.probe.ping_timeout_secs),
            ("command_timeout_secs", self.probe.command_timeout_secs),
            ("host_timeout_secs", self.probe.host_timeout_secs),
        ] {
            if secs == 0 {
                bail!("[probe] {} must be at least 1", key);
            }
        }
        if self.report.formats.is_empty() {
            bail!("[report] formats must name at least one of html, csv, json");
        }
        for format in &self.report.formats {
            if !KNOWN_FORMATS.contains(&format.to_lowercase().as_str()) {
                bail!("[report] unknown format '{}'", format);
            }
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_path = path.as_ref();

        let mut config_str = String::new();

        config_str.push_str(&format!(
            "[report]\ntitle = {}\noutput_dir = {}\nfile_prefix = {}\nformats = {}\n\n",
            self.report.title,
            self.report.output_dir,
            self.report.file_prefix,
            self.report.formats.join(", ")
        ));

        config_str.push_str(&format!(
            "[targets]\nhosts = {}\nservices = {}\n\n",
            self.targets.hosts.join(", "),
            self.targets.services.join(", ")
        ));

        config_str.push_str(&format!(
            "[thresholds]\nwarn_pct = {}\ncrit_pct = {}\n\n",
            self.thresholds.warn_pct, self.thresholds.crit_pct
        ));

        let reachability = match self.probe.reachability {
            ReachabilityMethod::Ping => "ping",
            ReachabilityMethod::Tcp => "tcp",
        };
        config_str.push_str(&format!(
            "[probe]\nconcurrency = {}\nreachability = {}\ntcp_port = {}\nping_timeout_secs = {}\ncommand_timeout_secs = {}\nhost_timeout_secs = {}\nssh_user = {}\n\n",
            self.probe.concurrency,
            reachability,
            self.probe.tcp_port,
            self.probe.ping_timeout_secs,
            self.probe.command_timeout_secs,
            self.probe.host_timeout_secs,
            self.probe.ssh_user
        ));

        config_str.push_str(&format!(
            "[logging]\nlevel = {}\nfile = {}\n",
            self.logging.level, self.logging.file
        ));

        fs::write(config_path, config_str)
            .context(format!("Failed to save config to {}", config_path.display()))?;

        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}

pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info, // Default to Info if invalid
    }
}
