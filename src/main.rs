use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use env_logger::{Builder, Target, WriteStyle};
use hostreport::config::{self, AppConfig, DEFAULT_CONFIG_FILE};
use std::fs::OpenOptions;

fn cli() -> Command {
    Command::new("hostreport")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Polls hosts for reachability, uptime, disk space and service status and writes reports")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value(DEFAULT_CONFIG_FILE),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Override [report] output_dir"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Override [logging] level (trace, debug, info, warn, error, off)"),
        )
        .arg(
            Arg::new("init-config")
                .long("init-config")
                .value_name("FILE")
                .help("Write a default configuration file and exit")
                .action(ArgAction::Set),
        )
}

fn init_logging(config: &AppConfig, level_override: Option<&String>) -> Result<()> {
    let level = match level_override {
        Some(level) => config::parse_level(level),
        None => config.get_log_level(),
    };

    let mut builder = Builder::new();
    builder.filter_level(level).format_timestamp_secs();

    match config.logging.file() {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .context(format!("Failed to open log file {}", path.display()))?;
            builder.write_style(WriteStyle::Never).target(Target::Pipe(Box::new(file)));
        }
        None => {
            builder.write_style(WriteStyle::Auto);
        }
    }

    builder.init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    if let Some(path) = matches.get_one::<String>("init-config") {
        return AppConfig::default().save(path);
    }

    // Configuration errors are fatal: nothing is probed or written.
    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_FILE);
    let mut config = AppConfig::from_file(config_path)?;
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        config.report.output_dir = dir.clone();
    }

    init_logging(&config, matches.get_one::<String>("log-level"))?;

    hostreport::run(&config).await?;
    Ok(())
}
