use crate::domain::model::{PriceAmount, PricePointSource};
use crate::domain::ports::PriceTierCatalog;
use crate::utils::error::{Result, SyncError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The (item, territory, tier) triple a price-point identifier stands for.
///
/// Field order is part of the wire format: App Store Connect expects
/// `{"s":..,"t":..,"p":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePointKey {
    #[serde(rename = "s")]
    pub item_id: String,
    #[serde(rename = "t")]
    pub territory: String,
    #[serde(rename = "p")]
    pub tier: String,
}

impl PricePointKey {
    pub fn new(
        item_id: impl Into<String>,
        territory: impl Into<String>,
        tier: impl Into<String>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            territory: territory.into(),
            tier: tier.into(),
        }
    }
}

pub struct PricePointCodec;

impl PricePointCodec {
    /// Compact JSON, then base64url without padding.
    pub fn encode(key: &PricePointKey) -> String {
        let json = Self::to_json(key);
        URL_SAFE_NO_PAD.encode(json.as_bytes())
    }

    pub fn to_json(key: &PricePointKey) -> String {
        // 保持 s, t, p 的順序並處理跳脫字元
        format!(
            r#"{{"s":{},"t":{},"p":{}}}"#,
            Value::String(key.item_id.clone()),
            Value::String(key.territory.clone()),
            Value::String(key.tier.clone()),
        )
    }

    pub fn decode(id: &str) -> Result<PricePointKey> {
        let invalid = |reason: String| SyncError::InvalidPricePointId {
            id: id.to_string(),
            reason,
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(id.trim_end_matches('='))
            .map_err(|e| invalid(format!("not base64url: {}", e)))?;
        serde_json::from_slice(&bytes).map_err(|e| invalid(format!("not a price point: {}", e)))
    }
}

/// Price tiers read from the `[price_tiers.<TERRITORY>]` tables of the config
/// file, keyed by canonical customer price.
#[derive(Debug, Clone, Default)]
pub struct TierTable {
    tiers: HashMap<String, HashMap<String, String>>,
}

impl TierTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(tables: &HashMap<String, HashMap<String, String>>) -> Result<Self> {
        let mut table = Self::new();
        for (territory, prices) in tables {
            for (price, tier) in prices {
                let amount =
                    PriceAmount::parse(price).ok_or_else(|| SyncError::InvalidConfigValueError {
                        field: format!("price_tiers.{}", territory),
                        value: price.clone(),
                        reason: "Price must be a non-negative decimal".to_string(),
                    })?;
                table.insert(territory, &amount, tier.clone());
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, territory: &str, price: &PriceAmount, tier: impl Into<String>) {
        self.tiers
            .entry(territory.to_ascii_uppercase())
            .or_default()
            .insert(price.as_str().to_string(), tier.into());
    }

    pub fn len(&self) -> usize {
        self.tiers.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PriceTierCatalog for TierTable {
    fn tier_for(&self, territory: &str, price: &PriceAmount) -> Option<String> {
        self.tiers
            .get(territory)
            .and_then(|prices| prices.get(price.as_str()))
            .cloned()
    }
}

/// Turns a row's price-point source into the identifier sent to the API.
pub fn resolve_price_point(
    catalog: &dyn PriceTierCatalog,
    item_id: &str,
    territory: &str,
    source: &PricePointSource,
) -> Result<String> {
    match source {
        PricePointSource::Encoded(id) => Ok(id.clone()),
        PricePointSource::TierCode(code) => Ok(PricePointCodec::encode(&PricePointKey::new(
            item_id, territory, code,
        ))),
        PricePointSource::FromPrice(price) => {
            let tier = catalog.tier_for(territory, price).ok_or_else(|| {
                SyncError::UnresolvedPricePointError {
                    territory: territory.to_string(),
                    price: price.to_string(),
                }
            })?;
            Ok(PricePointCodec::encode(&PricePointKey::new(
                item_id, territory, tier,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_matches_known_identifier() {
        let key = PricePointKey::new("6447461923", "USA", "10010");

        assert_eq!(
            PricePointCodec::to_json(&key),
            r#"{"s":"6447461923","t":"USA","p":"10010"}"#
        );
        assert_eq!(
            PricePointCodec::encode(&key),
            "eyJzIjoiNjQ0NzQ2MTkyMyIsInQiOiJVU0EiLCJwIjoiMTAwMTAifQ"
        );
    }

    #[test]
    fn test_decode_inverts_encode() {
        let keys = [
            PricePointKey::new("123", "USA", "10010"),
            PricePointKey::new("6447461923", "JPN", "10120"),
            PricePointKey::new("a/b+c", "DEU", "9"),
        ];
        for key in keys {
            let id = PricePointCodec::encode(&key);
            assert!(!id.contains('='));
            assert_eq!(PricePointCodec::decode(&id).unwrap(), key);
        }
    }

    #[test]
    fn test_decode_accepts_padded_identifier() {
        let key = PricePointKey::new("1", "USA", "1");
        let padded = format!("{}==", PricePointCodec::encode(&key));
        assert_eq!(PricePointCodec::decode(&padded).unwrap(), key);
    }

    #[test]
    fn test_decode_rejects_tier_codes_and_garbage() {
        assert!(matches!(
            PricePointCodec::decode("10010"),
            Err(SyncError::InvalidPricePointId { .. })
        ));
        assert!(PricePointCodec::decode("!!!").is_err());
        // valid base64url, but not JSON
        assert!(PricePointCodec::decode("aGVsbG8").is_err());
    }

    #[test]
    fn test_resolve_from_price_uses_catalog() {
        let mut table = TierTable::new();
        table.insert("usa", &PriceAmount::parse("0.99").unwrap(), "10010");

        let id = resolve_price_point(
            &table,
            "123",
            "USA",
            &PricePointSource::FromPrice(PriceAmount::parse("0.990").unwrap()),
        )
        .unwrap();

        assert_eq!(
            PricePointCodec::decode(&id).unwrap(),
            PricePointKey::new("123", "USA", "10010")
        );
    }

    #[test]
    fn test_resolve_unknown_price_is_unresolved() {
        let table = TierTable::new();

        let err = resolve_price_point(
            &table,
            "123",
            "JPN",
            &PricePointSource::FromPrice(PriceAmount::parse("120").unwrap()),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            SyncError::UnresolvedPricePointError { territory, price }
                if territory == "JPN" && price == "120"
        ));
    }

    #[test]
    fn test_resolve_encoded_and_tier_code() {
        let table = TierTable::new();
        let encoded = PricePointCodec::encode(&PricePointKey::new("9", "FRA", "10005"));

        assert_eq!(
            resolve_price_point(&table, "123", "USA", &PricePointSource::Encoded(encoded.clone()))
                .unwrap(),
            encoded
        );

        let id = resolve_price_point(
            &table,
            "123",
            "USA",
            &PricePointSource::TierCode("10010".to_string()),
        )
        .unwrap();
        assert_eq!(
            PricePointCodec::decode(&id).unwrap(),
            PricePointKey::new("123", "USA", "10010")
        );
    }

    #[test]
    fn test_tier_table_from_config_rejects_bad_price() {
        let mut tables = HashMap::new();
        let mut usa = HashMap::new();
        usa.insert("free".to_string(), "10000".to_string());
        tables.insert("USA".to_string(), usa);

        assert!(TierTable::from_config(&tables).is_err());
    }
}
