use crate::core::price_point::PricePointCodec;
use crate::domain::model::{
    is_known_territory, ItemType, PriceAmount, PricePointSource, PriceScheduleRow, RawRow,
};
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Sentinel the manifest uses for "no value".
pub const NULL_SENTINEL: &str = "null";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    MissingField { field: &'static str },
    InvalidType { value: String },
    InvalidTerritory { value: String },
    InvalidPrice { value: String },
    InvalidDate { field: &'static str, value: String },
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErrorKind::MissingField { field } => {
                write!(f, "MissingField: '{}' is empty", field)
            }
            ValidationErrorKind::InvalidType { value } => write!(
                f,
                "InvalidTypeError: '{}' must be 'apps' or 'inAppPurchases'",
                value
            ),
            ValidationErrorKind::InvalidTerritory { value } => write!(
                f,
                "InvalidTerritory: '{}' is not a known 3-letter territory code",
                value
            ),
            ValidationErrorKind::InvalidPrice { value } if value == NULL_SENTINEL => write!(
                f,
                "InvalidPriceError: price and price_point_id are both null"
            ),
            ValidationErrorKind::InvalidPrice { value } => write!(
                f,
                "InvalidPriceError: '{}' is not a non-negative decimal",
                value
            ),
            ValidationErrorKind::InvalidDate { field, value } => write!(
                f,
                "InvalidDateError: {} '{}' is not a YYYY-MM-DD date",
                field, value
            ),
            ValidationErrorKind::InvalidDateRange { start, end } => {
                write!(f, "InvalidDateError: start {} is after end {}", start, end)
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}: {kind}")]
pub struct ValidationError {
    pub row: usize,
    pub kind: ValidationErrorKind,
}

/// Result of validating a whole manifest.
#[derive(Debug, Default)]
pub struct ValidatedRows {
    pub valid: Vec<PriceScheduleRow>,
    pub errors: Vec<ValidationError>,
}

impl ValidatedRows {
    pub fn total(&self) -> usize {
        self.valid.len() + self.errors.len()
    }

    pub fn all_failed(&self) -> bool {
        self.valid.is_empty() && !self.errors.is_empty()
    }
}

pub fn validate_rows(rows: &[RawRow]) -> ValidatedRows {
    rows.iter()
        .fold(ValidatedRows::default(), |mut acc, raw| {
            match validate_row(raw) {
                Ok(row) => acc.valid.push(row),
                Err(err) => {
                    tracing::warn!("⚠️ Skipping invalid {}", err);
                    acc.errors.push(err);
                }
            }
            acc
        })
}

pub fn validate_row(raw: &RawRow) -> Result<PriceScheduleRow, ValidationError> {
    let fail = |kind| ValidationError { row: raw.row, kind };

    let item_id = raw.get("id").trim();
    if item_id.is_empty() {
        return Err(fail(ValidationErrorKind::MissingField { field: "id" }));
    }

    let type_value = raw.get("type");
    let item_type = ItemType::parse(type_value).ok_or_else(|| {
        fail(ValidationErrorKind::InvalidType {
            value: type_value.to_string(),
        })
    })?;

    let territory = raw.get("territory").trim();
    if territory.is_empty() {
        return Err(fail(ValidationErrorKind::MissingField { field: "territory" }));
    }
    let code = territory.to_ascii_uppercase();
    if !is_known_territory(&code) {
        return Err(fail(ValidationErrorKind::InvalidTerritory {
            value: territory.to_string(),
        }));
    }
    let territory = code;

    let price_value = raw.get("price").trim();
    let price = if is_null(price_value) {
        None
    } else {
        Some(PriceAmount::parse(price_value).ok_or_else(|| {
            fail(ValidationErrorKind::InvalidPrice {
                value: price_value.to_string(),
            })
        })?)
    };

    let start_date = parse_date(raw, "start").map_err(fail)?;
    let end_date = parse_date(raw, "end").map_err(fail)?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(fail(ValidationErrorKind::InvalidDateRange { start, end }));
        }
    }

    let price_point_value = raw.get("price_point_id").trim();
    let price_point = if !is_null(price_point_value) {
        if PricePointCodec::decode(price_point_value).is_ok() {
            PricePointSource::Encoded(price_point_value.to_string())
        } else {
            PricePointSource::TierCode(price_point_value.to_string())
        }
    } else if let Some(price) = &price {
        PricePointSource::FromPrice(price.clone())
    } else {
        return Err(fail(ValidationErrorKind::InvalidPrice {
            value: NULL_SENTINEL.to_string(),
        }));
    };

    Ok(PriceScheduleRow {
        row: raw.row,
        memo: raw.get("input").trim().to_string(),
        item_id: item_id.to_string(),
        item_type,
        territory,
        price,
        start_date,
        end_date,
        price_point,
    })
}

fn is_null(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case(NULL_SENTINEL)
}

fn parse_date(raw: &RawRow, field: &'static str) -> Result<Option<NaiveDate>, ValidationErrorKind> {
    let value = raw.get(field).trim();
    if is_null(value) {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationErrorKind::InvalidDate {
            field,
            value: value.to_string(),
        })
}
