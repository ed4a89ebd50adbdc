pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, SyncSettings};

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::core::{
    auth::{JwtTokenProvider, StaticToken},
    engine::SyncEngine,
    price_point::{PricePointCodec, PricePointKey, TierTable},
    report::SyncReport,
    submitter::ApiScheduleSubmitter,
};
pub use utils::error::{Result, SyncError};
