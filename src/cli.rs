//! Command-line interface for vidrate.
//!
//! This module handles CLI argument parsing and the maintenance subcommands
//! (inspecting settings, checking rules against a URL, backup import/export,
//! watching the settings file).

use crate::broker::SettingsBroker;
use crate::import_export::{export_settings, import_settings};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vidrate_config::{Settings, should_apply};

/// vidrate - video playback speed control engine
#[derive(Parser)]
#[command(name = "vidrate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Settings file to operate on (default: the XDG settings path)
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the effective settings as YAML
    Show,

    /// Check whether speed control would apply to a URL
    Check {
        /// URL to evaluate against the configured rules
        url: String,
    },

    /// Write a settings backup as JSON (stdout unless a path is given)
    Export {
        /// Destination file
        path: Option<PathBuf>,
    },

    /// Replace the settings with a backup file ("-" reads stdin)
    Import {
        /// Backup file to read
        path: PathBuf,
    },

    /// Reset all settings to defaults
    Reset {
        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Watch the settings file and report reloads until interrupted
    Watch {
        /// Also report the rule decision for this URL after each reload
        #[arg(long, value_name = "URL")]
        url: Option<String>,
    },
}

/// Execute the parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(Settings::settings_path);

    match cli.command {
        None | Some(Commands::Show) => show(&settings_path),
        Some(Commands::Check { url }) => check(&settings_path, &url),
        Some(Commands::Export { path }) => export(&settings_path, path.as_deref()),
        Some(Commands::Import { path }) => import(settings_path, &path),
        Some(Commands::Reset { yes }) => reset(settings_path, yes),
        Some(Commands::Watch { url }) => watch(settings_path, url),
    }
}

fn show(settings_path: &Path) -> Result<()> {
    let settings = Settings::load_from(settings_path)?;
    print!("{}", serde_yaml_ng::to_string(&settings)?);
    Ok(())
}

fn check(settings_path: &Path, url: &str) -> Result<()> {
    let settings = Settings::load_from(settings_path)?;
    if should_apply(url, &settings) {
        println!("speed control applies to {url}");
    } else {
        println!("speed control does not apply to {url}");
    }
    Ok(())
}

fn export(settings_path: &Path, destination: Option<&Path>) -> Result<()> {
    let settings = Settings::load_from(settings_path)?;
    let document = export_settings(&settings);
    match destination {
        Some(path) => {
            fs::write(path, &document)
                .with_context(|| format!("Failed to write backup to {}", path.display()))?;
            println!("settings exported to {}", path.display());
        }
        None => println!("{document}"),
    }
    Ok(())
}

fn import(settings_path: PathBuf, backup_path: &Path) -> Result<()> {
    let document = if backup_path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read backup from stdin")?;
        buffer
    } else {
        fs::read_to_string(backup_path)
            .with_context(|| format!("Failed to read backup {}", backup_path.display()))?
    };

    let settings = import_settings(&document)?;
    let mut broker = SettingsBroker::open(settings_path)?;
    broker.save(settings)?;

    let applied = broker.get();
    println!(
        "settings imported: {} include rule(s), {} exclude rule(s), default speed {}x",
        applied.include_rules.len(),
        applied.exclude_rules.len(),
        applied.default_speed
    );
    Ok(())
}

fn reset(settings_path: PathBuf, yes: bool) -> Result<()> {
    if !yes {
        bail!("this discards all settings; pass --yes to confirm");
    }
    let mut broker = SettingsBroker::open(settings_path)?;
    broker.reset()?;
    println!("settings reset to defaults");
    Ok(())
}

fn watch(settings_path: PathBuf, url: Option<String>) -> Result<()> {
    let mut broker = SettingsBroker::open_watched(settings_path, 250)?;
    report_decision(&broker, url.as_deref());

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async {
        println!("watching settings for changes, Ctrl+C to stop");
        loop {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    result.context("Failed to listen for Ctrl+C")?;
                    return Ok(());
                }
                _ = tokio::time::sleep(Duration::from_millis(500)) => {
                    if broker.poll_external_reload() {
                        println!("settings reloaded");
                        report_decision(&broker, url.as_deref());
                    }
                }
            }
        }
    })
}

fn report_decision(broker: &SettingsBroker, url: Option<&str>) {
    let Some(url) = url else { return };
    let settings = broker.get();
    let verdict = if should_apply(url, &settings) {
        "applies"
    } else {
        "does not apply"
    };
    println!(
        "speed control {verdict} to {url} (default speed {}x)",
        settings.default_speed
    );
}
