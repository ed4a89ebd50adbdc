pub mod cli;
pub mod credentials;
pub mod toml_config;

use crate::config::toml_config::{TomlConfig, DEFAULT_API_BASE_URL};
use crate::core::ConfigProvider;
use std::time::Duration;
#[cfg(feature = "cli")]
use {
    crate::utils::error::Result,
    crate::utils::validation::{validate_path, validate_url, Validate},
    clap::Parser,
    serde::{Deserialize, Serialize},
};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "update-price")]
#[command(about = "Update App Store Connect price schedules from a CSV manifest")]
pub struct CliConfig {
    /// App Store Connect API token; minted from APPSTORE_* variables when omitted
    #[arg(long)]
    pub token: Option<String>,

    /// Path to the CSV file with price schedule data
    #[arg(long, default_value = "app-price-schedule.csv")]
    pub csv: String,

    /// Optional TOML file with API settings and price tiers
    #[arg(long)]
    pub config: Option<String>,

    /// Override the App Store Connect API base URL
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Print each payload before sending it
    #[arg(long)]
    pub debug: bool,

    /// Print the payloads without making any API request
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 命令列參數優先於 TOML 設定
    pub fn settings(&self, file: &TomlConfig) -> SyncSettings {
        SyncSettings {
            api_base_url: self
                .api_base_url
                .clone()
                .or_else(|| file.api_base_url().map(str::to_string))
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            request_timeout: file.request_timeout_seconds().map(Duration::from_secs),
            debug: self.debug,
            dry_run: self.dry_run,
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("csv", &self.csv)?;
        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }
        if let Some(base_url) = &self.api_base_url {
            validate_url("api_base_url", base_url)?;
        }
        Ok(())
    }
}

/// Runtime settings after merging the command line with the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub api_base_url: String,
    pub request_timeout: Option<Duration>,
    pub debug: bool,
    pub dry_run: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: None,
            debug: false,
            dry_run: false,
        }
    }
}

impl ConfigProvider for SyncSettings {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    fn debug(&self) -> bool {
        self.debug
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}
