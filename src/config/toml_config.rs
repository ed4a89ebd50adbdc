use crate::config::credentials::AuthConfig;
use crate::core::price_point::TierTable;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_API_BASE_URL: &str = "https://api.appstoreconnect.apple.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub api: Option<ApiConfig>,
    pub auth: Option<AuthConfig>,
    pub price_tiers: Option<HashMap<String, HashMap<String, String>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub request_timeout_seconds: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${APPSTORE_KEY_ID})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn api_base_url(&self) -> Option<&str> {
        self.api.as_ref().and_then(|api| api.base_url.as_deref())
    }

    pub fn request_timeout_seconds(&self) -> Option<u64> {
        self.api.as_ref().and_then(|api| api.request_timeout_seconds)
    }

    pub fn tier_table(&self) -> Result<TierTable> {
        match &self.price_tiers {
            Some(tables) => TierTable::from_config(tables),
            None => Ok(TierTable::new()),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(base_url) = self.api_base_url() {
            validate_url("api.base_url", base_url)?;
        }
        if let Some(timeout) = self.request_timeout_seconds() {
            validate_range("api.request_timeout_seconds", timeout, 1, 600)?;
        }
        if let Some(auth) = &self.auth {
            auth.validate()?;
        }
        self.tier_table()?;
        Ok(())
    }
}
