//! Shared validation utilities
//!
//! Validation never stops at the first problem: every check records into a
//! [`FieldErrors`] accumulator keyed by field name, and the command fails once
//! with all messages. The rendered map becomes `error.details` in the
//! response envelope.
//!
//! # Examples
//!
//! ```rust,ignore
//! use herdbook_server::features::shared::validation::{clean_required, FieldErrors};
//!
//! let mut errors = FieldErrors::new();
//! let name = clean_required(&mut errors, "name", command.name, 255);
//! errors.into_result()?;
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::types::BigDecimal;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::fields::Field;

/// Key for errors that do not belong to a single field
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";
pub const INVALID_NUMBER: &str = "A valid number is required.";
pub const INVALID_DATE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const NO_FILE: &str = "No file was submitted.";

pub fn max_length_message(max: usize) -> String {
    format!("Ensure this field has no more than {} characters.", max)
}

pub fn min_length_message(min: usize) -> String {
    format!("Ensure this field has at least {} characters.", min)
}

pub fn invalid_pk_message(pk: impl fmt::Display) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", pk)
}

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-message shorthand
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

fn check_max_length(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(field, max_length_message(max));
    }
}

/// Required, non-blank text; surrounding whitespace is trimmed
pub fn clean_required(
    errors: &mut FieldErrors,
    field: &str,
    value: Field<String>,
    max: usize,
) -> String {
    match value {
        Field::Missing => {
            errors.add(field, REQUIRED);
            String::new()
        },
        Field::Null => {
            errors.add(field, NULL);
            String::new()
        },
        Field::Value(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                errors.add(field, BLANK);
            } else {
                check_max_length(errors, field, trimmed, max);
            }
            trimmed.to_string()
        },
    }
}

/// Optional text that may be blank; a missing value becomes the empty string
pub fn clean_optional(
    errors: &mut FieldErrors,
    field: &str,
    value: Field<String>,
    max: usize,
) -> String {
    match value {
        Field::Missing => String::new(),
        Field::Null => {
            errors.add(field, NULL);
            String::new()
        },
        Field::Value(raw) => {
            let trimmed = raw.trim();
            check_max_length(errors, field, trimmed, max);
            trimmed.to_string()
        },
    }
}

/// A `YYYY-MM-DD` date, or `None` for null
pub fn clean_date(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<NaiveDate> {
    let raw = value?.trim();
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, INVALID_DATE);
            None
        },
    }
}

/// Decimal with at most `max_digits` digits, `decimal_places` of them after the point
///
/// Accepts a JSON string or number. Digits are counted on the value as written,
/// so `"5.000"` has three decimal places.
pub fn clean_decimal(
    errors: &mut FieldErrors,
    field: &str,
    value: &serde_json::Value,
    max_digits: u64,
    decimal_places: u64,
) -> Option<BigDecimal> {
    let raw = match value {
        serde_json::Value::Null => return None,
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => {
            errors.add(field, INVALID_NUMBER);
            return None;
        },
    };

    let Ok(decimal) = BigDecimal::from_str(&raw) else {
        errors.add(field, INVALID_NUMBER);
        return None;
    };

    let (digits, scale) = decimal.as_bigint_and_exponent();
    let digit_count = digits.magnitude().to_string().len() as u64;
    let (total, decimals) = if scale <= 0 {
        (digit_count + scale.unsigned_abs(), 0)
    } else if digit_count > scale as u64 {
        (digit_count, scale as u64)
    } else {
        (scale as u64, scale as u64)
    };
    let whole = total - decimals;
    let max_whole = max_digits - decimal_places;

    if total > max_digits {
        errors.add(
            field,
            format!("Ensure that there are no more than {} digits in total.", max_digits),
        );
    } else if decimals > decimal_places {
        errors.add(
            field,
            format!("Ensure that there are no more than {} decimal places.", decimal_places),
        );
    } else if whole > max_whole {
        errors.add(
            field,
            format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                max_whole
            ),
        );
    } else {
        return Some(decimal.with_scale(decimal_places as i64));
    }

    None
}

/// Parse a comma-separated id list such as `1,2,3`; blank items are skipped
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<i64>()
                .map_err(|_| format!("\"{}\" is not a valid integer.", item))
        })
        .collect()
}
