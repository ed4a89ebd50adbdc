use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("API request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Token signing error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: String },

    #[error("CSV file is missing required columns: {}", .columns.join(", "))]
    MissingColumnError { columns: Vec<String> },

    #[error("All {rows} manifest rows failed validation")]
    AllRowsInvalid { rows: usize },

    #[error("No price point for price {price} in territory {territory}")]
    UnresolvedPricePointError { territory: String, price: String },

    #[error("Invalid price point identifier '{id}': {reason}")]
    InvalidPricePointId { id: String, reason: String },

    #[error("Authentication error: {message}")]
    AuthError { message: String },

    #[error("API rejected request with status {status}: {body}")]
    ApiError { status: u16, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Load,
    Encoding,
    Submission,
    Configuration,
    Authentication,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::CsvError(_)
            | SyncError::IoError(_)
            | SyncError::ManifestNotFound { .. }
            | SyncError::MissingColumnError { .. }
            | SyncError::AllRowsInvalid { .. } => ErrorCategory::Load,
            SyncError::UnresolvedPricePointError { .. } | SyncError::InvalidPricePointId { .. } => {
                ErrorCategory::Encoding
            }
            SyncError::HttpError(_) | SyncError::ApiError { .. } => ErrorCategory::Submission,
            SyncError::ConfigError { .. }
            | SyncError::MissingConfigError { .. }
            | SyncError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SyncError::JwtError(_) | SyncError::AuthError { .. } => ErrorCategory::Authentication,
        }
    }

    /// 給終端使用者看的錯誤訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            SyncError::ManifestNotFound { path } => format!("{} file not found", path),
            SyncError::MissingColumnError { columns } => format!(
                "CSV file is missing required columns: {}",
                columns.join(", ")
            ),
            SyncError::AllRowsInvalid { rows } => {
                format!("None of the {} rows in the manifest are valid", rows)
            }
            SyncError::MissingConfigError { field } => {
                format!("Missing required setting: {}", field)
            }
            SyncError::ApiError { status, body } => {
                format!("App Store Connect returned {}: {}", status, body)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Load => {
                "Check the CSV path and that the header is: input,id,type,territory,price,start,end,price_point_id"
            }
            ErrorCategory::Encoding => {
                "Add the price to [price_tiers] in the config file or fill in price_point_id"
            }
            ErrorCategory::Submission => {
                "Check the token has not expired and the item ids exist in App Store Connect"
            }
            ErrorCategory::Configuration => {
                "Check the command line flags, config file and APPSTORE_* environment variables"
            }
            ErrorCategory::Authentication => {
                "Check APPSTORE_ISSUER_ID, APPSTORE_KEY_ID and that APPSTORE_PRIVATE_KEY_PATH points to the .p8 key"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
