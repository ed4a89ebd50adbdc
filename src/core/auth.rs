use crate::config::credentials::AuthConfig;
use crate::domain::ports::TokenProvider;
use crate::utils::error::{Result, SyncError};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

pub const TOKEN_AUDIENCE: &str = "appstoreconnect-v1";
pub const TOKEN_LIFETIME_MINUTES: i64 = 20;

/// A bearer token handed over on the command line.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Result<String> {
        if self.0.trim().is_empty() {
            return Err(SyncError::AuthError {
                message: "Bearer token is empty".to_string(),
            });
        }
        Ok(self.0.trim().to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub exp: i64,
    pub aud: String,
}

/// Mints ES256 tokens from an App Store Connect API key.
pub struct JwtTokenProvider {
    issuer_id: String,
    key_id: String,
    key: EncodingKey,
}

impl std::fmt::Debug for JwtTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenProvider")
            .field("issuer_id", &self.issuer_id)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl JwtTokenProvider {
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let pem = std::fs::read(&config.private_key_path).map_err(|e| SyncError::AuthError {
            message: format!(
                "Cannot read private key file at {}: {}",
                config.private_key_path, e
            ),
        })?;
        Self::from_pem(&config.issuer_id, &config.key_id, &pem)
    }

    pub fn from_pem(issuer_id: &str, key_id: &str, pem: &[u8]) -> Result<Self> {
        let key = EncodingKey::from_ec_pem(pem).map_err(|e| SyncError::AuthError {
            message: format!("Private key is not a PKCS#8 EC key: {}", e),
        })?;
        Ok(Self {
            issuer_id: issuer_id.to_string(),
            key_id: key_id.to_string(),
            key,
        })
    }

    pub fn claims(&self) -> Claims {
        Claims {
            iss: self.issuer_id.clone(),
            exp: (Utc::now() + Duration::minutes(TOKEN_LIFETIME_MINUTES)).timestamp(),
            aud: TOKEN_AUDIENCE.to_string(),
        }
    }
}

impl TokenProvider for JwtTokenProvider {
    fn bearer_token(&self) -> Result<String> {
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_id.clone());
        header.typ = Some("JWT".to_string());

        let token = encode(&header, &self.claims(), &self.key)?;
        tracing::debug!(
            "🔑 Minted API token for key {} (valid {} minutes)",
            self.key_id,
            TOKEN_LIFETIME_MINUTES
        );
        Ok(token)
    }
}
