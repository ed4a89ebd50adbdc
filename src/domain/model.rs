use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

/// One manifest line keyed by header name, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// File line number minus the header line, so blank lines still count
    pub row: usize,
    pub fields: HashMap<String, String>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }
}

/// App Store Connect territory codes (ISO 3166-1 alpha-3, Kosovo as `XKS`).
pub const TERRITORIES: &[&str] = &[
    "AFG", "AGO", "AIA", "ALB", "ARE", "ARG", "ARM", "ATG", "AUS", "AUT", "AZE", "BEL", "BEN",
    "BFA", "BGR", "BHR", "BHS", "BIH", "BLR", "BLZ", "BMU", "BOL", "BRA", "BRB", "BRN", "BTN",
    "BWA", "CAN", "CHE", "CHL", "CHN", "CIV", "CMR", "COD", "COG", "COL", "CPV", "CRI", "CYM",
    "CYP", "CZE", "DEU", "DMA", "DNK", "DOM", "DZA", "ECU", "EGY", "ESP", "EST", "FIN", "FJI",
    "FRA", "FSM", "GAB", "GBR", "GEO", "GHA", "GMB", "GNB", "GRC", "GRD", "GTM", "GUY", "HKG",
    "HND", "HRV", "HUN", "IDN", "IND", "IRL", "IRQ", "ISL", "ISR", "ITA", "JAM", "JOR", "JPN",
    "KAZ", "KEN", "KGZ", "KHM", "KNA", "KOR", "KWT", "LAO", "LBN", "LBR", "LBY", "LCA", "LKA",
    "LTU", "LUX", "LVA", "MAC", "MAR", "MDA", "MDG", "MDV", "MEX", "MKD", "MLI", "MLT", "MMR",
    "MNE", "MNG", "MOZ", "MRT", "MSR", "MUS", "MWI", "MYS", "NAM", "NER", "NGA", "NIC", "NLD",
    "NOR", "NPL", "NRU", "NZL", "OMN", "PAK", "PAN", "PER", "PHL", "PLW", "PNG", "POL", "PRT",
    "PRY", "QAT", "ROU", "RUS", "RWA", "SAU", "SEN", "SGP", "SLB", "SLE", "SLV", "SRB", "STP",
    "SUR", "SVK", "SVN", "SWE", "SWZ", "SYC", "TCA", "TCD", "THA", "TJK", "TKM", "TON", "TTO",
    "TUN", "TUR", "TWN", "TZA", "UGA", "UKR", "URY", "USA", "UZB", "VCT", "VEN", "VGB", "VNM",
    "VUT", "WSM", "XKS", "YEM", "ZAF", "ZMB", "ZWE",
];

/// `code` 必須已是大寫
pub fn is_known_territory(code: &str) -> bool {
    TERRITORIES.contains(&code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    App,
    InAppPurchase,
}

impl ItemType {
    /// 接受大小寫不同的 "apps" / "inAppPurchases"
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("apps") {
            Some(ItemType::App)
        } else if value.eq_ignore_ascii_case("inAppPurchases") {
            Some(ItemType::InAppPurchase)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::App => "apps",
            ItemType::InAppPurchase => "inAppPurchases",
        }
    }

    pub fn product_type(&self) -> &'static str {
        match self {
            ItemType::App => "app",
            ItemType::InAppPurchase => "inAppPurchase",
        }
    }

    pub fn products_type(&self) -> &'static str {
        self.as_str()
    }

    pub fn prices_type(&self) -> &'static str {
        match self {
            ItemType::App => "appPrices",
            ItemType::InAppPurchase => "inAppPurchasePrices",
        }
    }

    pub fn price_point_type(&self) -> &'static str {
        match self {
            ItemType::App => "appPricePoint",
            ItemType::InAppPurchase => "inAppPurchasePricePoint",
        }
    }

    pub fn price_points_type(&self) -> &'static str {
        match self {
            ItemType::App => "appPricePoints",
            ItemType::InAppPurchase => "inAppPurchasePricePoints",
        }
    }

    pub fn schedule_type(&self) -> &'static str {
        match self {
            ItemType::App => "appPriceSchedules",
            ItemType::InAppPurchase => "inAppPurchasePriceSchedules",
        }
    }

    pub fn endpoint_path(&self) -> &'static str {
        match self {
            ItemType::App => "/v1/appPriceSchedules",
            ItemType::InAppPurchase => "/v1/inAppPurchasePriceSchedules",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-negative customer price as written in the manifest.
///
/// The canonical form drops trailing zeros so "0.990" and "0.99" look up the
/// same price tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceAmount(String);

impl PriceAmount {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (whole, fraction) = match value.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (value, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let whole = whole.trim_start_matches('0');
        let whole = if whole.is_empty() { "0" } else { whole };
        let fraction = fraction.trim_end_matches('0');

        if fraction.is_empty() {
            Some(Self(whole.to_string()))
        } else {
            Some(Self(format!("{}.{}", whole, fraction)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PriceAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a row's price-point identifier comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricePointSource {
    /// `price_point_id` already holds an encoded identifier
    Encoded(String),
    /// `price_point_id` holds a bare catalog tier code such as `10010`
    TierCode(String),
    /// `price_point_id` is null, resolve through the price tier catalog
    FromPrice(PriceAmount),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceScheduleRow {
    pub row: usize,
    pub memo: String,
    pub item_id: String,
    pub item_type: ItemType,
    pub territory: String,
    pub price: Option<PriceAmount>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub price_point: PricePointSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceEntry {
    pub row: usize,
    pub price_point: PricePointSource,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerritoryPrices {
    pub territory: String,
    pub entries: Vec<PriceEntry>,
}

/// Every row of one app or in-app purchase, ready to become a single
/// price-schedule request. Territories keep their first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceScheduleItem {
    pub memo: String,
    pub item_id: String,
    pub item_type: ItemType,
    pub territory_prices: Vec<TerritoryPrices>,
}

impl PriceScheduleItem {
    pub fn territory(&self, code: &str) -> Option<&TerritoryPrices> {
        self.territory_prices.iter().find(|t| t.territory == code)
    }

    pub fn entry_count(&self) -> usize {
        self.territory_prices.iter().map(|t| t.entries.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub item_id: String,
    pub item_type: ItemType,
    pub memo: String,
    pub outcome: Outcome,
    pub error_detail: Option<String>,
}

impl SubmissionResult {
    pub fn success(item: &PriceScheduleItem) -> Self {
        Self::new(item, Outcome::Success, None)
    }

    pub fn failure(item: &PriceScheduleItem, detail: impl Into<String>) -> Self {
        Self::new(item, Outcome::Failure, Some(detail.into()))
    }

    pub fn dry_run(item: &PriceScheduleItem) -> Self {
        Self::new(item, Outcome::DryRun, None)
    }

    fn new(item: &PriceScheduleItem, outcome: Outcome, error_detail: Option<String>) -> Self {
        Self {
            item_id: item.item_id.clone(),
            item_type: item.item_type,
            memo: item.memo.clone(),
            outcome,
            error_detail,
        }
    }
}
