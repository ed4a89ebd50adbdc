use crate::utils::error::{Result, SyncError};
use reqwest::Client;
use serde_json::Value;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub id: String,
    pub name: String,
    pub bundle_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InAppPurchaseInfo {
    pub id: String,
    pub name: String,
    pub product_id: String,
}

/// Lists the app and in-app purchase ids a manifest can refer to.
pub struct ItemDirectory {
    base_url: String,
    client: Client,
}

impl ItemDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub async fn fetch_apps(&self, token: &str) -> Result<Vec<AppInfo>> {
        let url = format!("{}/v1/apps", self.base_url);
        let data = self
            .get(&url, token, &[("fields[apps]", "name,bundleId")])
            .await?;

        Ok(resources(&data)
            .map(|app| AppInfo {
                id: string_field(app, "id"),
                name: attribute(app, "name"),
                bundle_id: attribute(app, "bundleId"),
            })
            .collect())
    }

    pub async fn fetch_in_app_purchases(
        &self,
        token: &str,
        app_id: &str,
    ) -> Result<Vec<InAppPurchaseInfo>> {
        let url = format!("{}/v1/apps/{}/inAppPurchasesV2", self.base_url, app_id);
        let data = self.get(&url, token, &[("limit", "200")]).await?;

        Ok(resources(&data)
            .map(|iap| InAppPurchaseInfo {
                id: string_field(iap, "id"),
                name: attribute(iap, "name"),
                product_id: attribute(iap, "productId"),
            })
            .collect())
    }

    /// 輸出與 manifest 相同用途的 CSV 行：先列 App，再列各 App 的 IAP
    pub async fn listing(&self, token: &str) -> Result<Vec<String>> {
        let apps = self.fetch_apps(token).await?;
        let mut lines: Vec<String> = apps
            .iter()
            .map(|app| format!("{},{},{}", app.name, app.bundle_id, app.id))
            .collect();

        for app in &apps {
            match self.fetch_in_app_purchases(token, &app.id).await {
                Ok(iaps) => lines.extend(iaps.iter().map(|iap| {
                    format!("{},{},{},{}", iap.name, iap.product_id, iap.id, app.name)
                })),
                Err(e) => {
                    tracing::warn!("⚠️ Error fetching in-app purchases for app {}: {}", app.id, e)
                }
            }
        }

        Ok(lines)
    }

    async fn get(&self, url: &str, token: &str, query: &[(&str, &str)]) -> Result<Value> {
        tracing::debug!("Making API request to: {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

fn resources(data: &Value) -> impl Iterator<Item = &Value> {
    data.get("data")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn string_field(resource: &Value, key: &str) -> String {
    resource
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN)
        .to_string()
}

fn attribute(resource: &Value, key: &str) -> String {
    resource
        .get("attributes")
        .and_then(|attributes| attributes.get(key))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN)
        .to_string()
}
