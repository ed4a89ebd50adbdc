use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_required_field, Validate};
use serde::{Deserialize, Serialize};
use std::env;

pub const ISSUER_ID_VAR: &str = "APPSTORE_ISSUER_ID";
pub const KEY_ID_VAR: &str = "APPSTORE_KEY_ID";
pub const PRIVATE_KEY_PATH_VAR: &str = "APPSTORE_PRIVATE_KEY_PATH";

/// App Store Connect API key material, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub issuer_id: String,
    pub key_id: String,
    pub private_key_path: String,
}

impl AuthConfig {
    pub fn new(
        issuer_id: impl Into<String>,
        key_id: impl Into<String>,
        private_key_path: impl Into<String>,
    ) -> Self {
        Self {
            issuer_id: issuer_id.into(),
            key_id: key_id.into(),
            private_key_path: private_key_path.into(),
        }
    }

    /// 從 APPSTORE_* 環境變數建立
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let issuer_id = read(ISSUER_ID_VAR);
        let key_id = read(KEY_ID_VAR);
        let private_key_path = read(PRIVATE_KEY_PATH_VAR);

        Ok(Self {
            issuer_id: validate_required_field(ISSUER_ID_VAR, &issuer_id)?.clone(),
            key_id: validate_required_field(KEY_ID_VAR, &key_id)?.clone(),
            private_key_path: validate_required_field(PRIVATE_KEY_PATH_VAR, &private_key_path)?
                .clone(),
        })
    }
}

impl Validate for AuthConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("auth.issuer_id", &self.issuer_id)?;
        validate_non_empty_string("auth.key_id", &self.key_id)?;
        validate_path("auth.private_key_path", &self.private_key_path)?;
        Ok(())
    }
}
