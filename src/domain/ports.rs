use crate::domain::model::{PriceAmount, PriceScheduleItem, SubmissionResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
    fn debug(&self) -> bool;
    fn dry_run(&self) -> bool;
}

/// Supplies the bearer token sent with every API call.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Result<String>;
}

/// Maps a customer price in a territory to the catalog price-tier code.
pub trait PriceTierCatalog: Send + Sync {
    fn tier_for(&self, territory: &str, price: &PriceAmount) -> Option<String>;
}

#[async_trait]
pub trait ScheduleSubmitter: Send + Sync {
    /// Never fails: every problem ends up in the returned result.
    async fn submit(&self, item: &PriceScheduleItem, token: &str) -> SubmissionResult;
}
