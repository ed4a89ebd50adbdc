use crate::core::price_point::resolve_price_point;
use crate::domain::model::{PriceScheduleItem, SubmissionResult};
use crate::domain::ports::{ConfigProvider, PriceTierCatalog, ScheduleSubmitter};
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};

/// Builds the JSON:API body of a price-schedule create request.
///
/// Every entry becomes one `manualPrices` reference plus one `included`
/// price resource with a local id `${price-N}`. The first territory of the
/// item is used as the base territory.
pub fn build_payload(item: &PriceScheduleItem, catalog: &dyn PriceTierCatalog) -> Result<Value> {
    let item_type = item.item_type;
    let base_territory = item
        .territory_prices
        .first()
        .map(|t| t.territory.clone())
        .ok_or_else(|| SyncError::ConfigError {
            message: format!("{} {} has no prices", item_type, item.item_id),
        })?;

    let mut manual_prices = Vec::new();
    let mut included = Vec::new();

    let entries = item
        .territory_prices
        .iter()
        .flat_map(|t| t.entries.iter().map(move |e| (t.territory.as_str(), e)));

    for (index, (territory, entry)) in entries.enumerate() {
        let price_point_id =
            resolve_price_point(catalog, &item.item_id, territory, &entry.price_point)?;
        let price_id = format!("${{price-{}}}", index);

        manual_prices.push(json!({
            "type": item_type.prices_type(),
            "id": price_id,
        }));

        let mut relationships = Map::new();
        relationships.insert(
            item_type.price_point_type().to_string(),
            json!({
                "data": {
                    "type": item_type.price_points_type(),
                    "id": price_point_id,
                }
            }),
        );

        let mut price = Map::new();
        price.insert("id".to_string(), Value::String(price_id));
        price.insert(
            "type".to_string(),
            Value::String(item_type.prices_type().to_string()),
        );

        let mut attributes = Map::new();
        if let Some(start) = entry.start_date {
            attributes.insert("startDate".to_string(), Value::String(start.to_string()));
        }
        if let Some(end) = entry.end_date {
            attributes.insert("endDate".to_string(), Value::String(end.to_string()));
        }
        if !attributes.is_empty() {
            price.insert("attributes".to_string(), Value::Object(attributes));
        }
        price.insert("relationships".to_string(), Value::Object(relationships));

        included.push(Value::Object(price));
    }

    let mut relationships = Map::new();
    relationships.insert(
        item_type.product_type().to_string(),
        json!({
            "data": {
                "type": item_type.products_type(),
                "id": item.item_id,
            }
        }),
    );
    relationships.insert(
        "baseTerritory".to_string(),
        json!({
            "data": {
                "type": "territories",
                "id": base_territory,
            }
        }),
    );
    relationships.insert(
        "manualPrices".to_string(),
        json!({ "data": manual_prices }),
    );

    Ok(json!({
        "data": {
            "type": item_type.schedule_type(),
            "relationships": relationships,
        },
        "included": included,
    }))
}

pub struct ApiScheduleSubmitter<C: ConfigProvider, T: PriceTierCatalog> {
    config: C,
    catalog: T,
    client: Client,
}

impl<C: ConfigProvider, T: PriceTierCatalog> ApiScheduleSubmitter<C, T> {
    pub fn new(config: C, catalog: T) -> Self {
        Self {
            config,
            catalog,
            client: Client::new(),
        }
    }

    fn endpoint(&self, item: &PriceScheduleItem) -> String {
        format!(
            "{}{}",
            self.config.api_base_url().trim_end_matches('/'),
            item.item_type.endpoint_path()
        )
    }

    async fn post(&self, item: &PriceScheduleItem, token: &str, payload: &Value) -> Result<()> {
        let endpoint = self.endpoint(item);
        tracing::debug!("Making API request to: {}", endpoint);

        let mut request = self
            .client
            .post(&endpoint)
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .json(payload);

        if let Some(timeout) = self.config.request_timeout() {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SyncError::ApiError {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl<C: ConfigProvider, T: PriceTierCatalog> ScheduleSubmitter for ApiScheduleSubmitter<C, T> {
    async fn submit(&self, item: &PriceScheduleItem, token: &str) -> SubmissionResult {
        tracing::info!(
            "🚀 Processing {} {} ({}) with {} prices",
            item.item_type,
            item.item_id,
            item.memo,
            item.entry_count()
        );

        let payload = match build_payload(item, &self.catalog) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("❌ Could not build payload for {}: {}", item.item_id, e);
                return SubmissionResult::failure(item, e.to_string());
            }
        };

        if self.config.debug() || self.config.dry_run() {
            let pretty = serde_json::to_string_pretty(&payload).unwrap_or_default();
            if self.config.dry_run() {
                println!("🔍 Dry run: payload for {} {}:", item.item_type, item.item_id);
                println!("{}", pretty);
                return SubmissionResult::dry_run(item);
            }
            tracing::info!("🔍 Payload for {} {}:\n{}", item.item_type, item.item_id, pretty);
        }

        match self.post(item, token, &payload).await {
            Ok(()) => {
                tracing::info!(
                    "✅ Successfully updated price schedule for {} {}",
                    item.item_type,
                    item.item_id
                );
                SubmissionResult::success(item)
            }
            Err(e) => {
                tracing::error!(
                    "❌ Failed to update price schedule for {} {}: {}",
                    item.item_type,
                    item.item_id,
                    e
                );
                SubmissionResult::failure(item, e.to_string())
            }
        }
    }
}
