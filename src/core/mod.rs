pub mod auth;
pub mod directory;
pub mod engine;
pub mod grouper;
pub mod loader;
pub mod price_point;
pub mod report;
pub mod submitter;
pub mod validator;

pub use crate::domain::model::{
    ItemType, Outcome, PriceScheduleItem, PriceScheduleRow, RawRow, SubmissionResult,
};
pub use crate::domain::ports::{
    ConfigProvider, PriceTierCatalog, ScheduleSubmitter, Storage, TokenProvider,
};
pub use crate::utils::error::Result;
