//! Form validation rules.
//!
//! Rules run when a form is submitted. Each rule helper returns
//! `Result<(), FieldError>`; a form collects failures into [`FieldErrors`] keyed by
//! field name, which the reducer stores in the draft so the form can show them.

use crate::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shopfront_core::persistence::RecordId;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

/// Maximum length of short text fields (names, urls, addresses)
pub const MAX_TEXT_LENGTH: usize = 255;

/// A single rule failure
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldError {
    /// Missing value
    #[error("is required")]
    Required,

    /// Text longer than allowed
    #[error("may not be greater than {max} characters")]
    TooLong {
        /// Maximum number of characters
        max: usize,
    },

    /// Amount below the minimum
    #[error("must be at least {min}")]
    BelowMinimum {
        /// Smallest accepted amount
        min: Money,
    },

    /// Malformed email address
    #[error("must be a valid email address")]
    InvalidEmail,

    /// Not a `#rrggbb` color
    #[error("must be a valid hex color")]
    InvalidColor,

    /// Date later than allowed
    #[error("must be a date before or equal to {max}")]
    DateTooLate {
        /// Latest accepted date
        max: NaiveDate,
    },

    /// Value already used by another record
    #[error("has already been taken")]
    Taken,

    /// Selected option does not exist
    #[error("is not a valid selection")]
    UnknownOption,
}

/// Rule failures of one submit attempt, in the order they were found
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    entries: Vec<(String, FieldError)>,
}

impl FieldErrors {
    /// Creates an empty error set
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Records a failure for a field
    pub fn add(&mut self, field: impl Into<String>, error: FieldError) {
        self.entries.push((field.into(), error));
    }

    /// Records the failure of a rule, if it failed
    pub fn check(&mut self, field: &str, rule: Result<(), FieldError>) {
        if let Err(error) = rule {
            self.add(field, error);
        }
    }

    /// Returns true if no rule failed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of failures
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the field has at least one failure
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == field)
    }

    /// Failures recorded for a field
    #[must_use]
    pub fn for_field(&self, field: &str) -> Vec<&FieldError> {
        self.entries
            .iter()
            .filter(|(name, _)| name == field)
            .map(|(_, error)| error)
            .collect()
    }

    /// All failures as `(field, error)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.entries.iter().map(|(name, error)| (name.as_str(), error))
    }

    /// Human readable messages, e.g. `"customer_id is required"`
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.iter().map(|(field, error)| format!("{field} {error}")).collect()
    }

    /// Removes every failure
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Non-blank text
///
/// # Errors
///
/// [`FieldError::Required`] if the text is empty or whitespace.
pub fn required_text(value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        Err(FieldError::Required)
    } else {
        Ok(())
    }
}

/// Present value
///
/// # Errors
///
/// [`FieldError::Required`] if the value is `None`.
pub const fn required<T>(value: Option<&T>) -> Result<(), FieldError> {
    match value {
        Some(_) => Ok(()),
        None => Err(FieldError::Required),
    }
}

/// Text of at most `max` characters
///
/// # Errors
///
/// [`FieldError::TooLong`] if the text has more than `max` characters.
pub fn max_length(value: &str, max: usize) -> Result<(), FieldError> {
    if value.chars().count() > max {
        Err(FieldError::TooLong { max })
    } else {
        Ok(())
    }
}

/// Amount of at least `min`
///
/// # Errors
///
/// [`FieldError::BelowMinimum`] if the amount is smaller than `min`.
pub fn min_money(value: Money, min: Money) -> Result<(), FieldError> {
    if value < min {
        Err(FieldError::BelowMinimum { min })
    } else {
        Ok(())
    }
}

/// Well-formed email address (`local@domain.tld`, no whitespace)
///
/// # Errors
///
/// [`FieldError::InvalidEmail`] if the address is malformed.
pub fn email(value: &str) -> Result<(), FieldError> {
    let Some((local, domain)) = value.split_once('@') else {
        return Err(FieldError::InvalidEmail);
    };

    let well_formed = !local.is_empty()
        && !value.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty());

    if well_formed {
        Ok(())
    } else {
        Err(FieldError::InvalidEmail)
    }
}

/// `#rrggbb` color
///
/// # Errors
///
/// [`FieldError::InvalidColor`] if the value is not `#` followed by six hex digits.
pub fn hex_color(value: &str) -> Result<(), FieldError> {
    match value.strip_prefix('#') {
        Some(hex) if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) => Ok(()),
        _ => Err(FieldError::InvalidColor),
    }
}

/// Date no later than `max`
///
/// # Errors
///
/// [`FieldError::DateTooLate`] if `value` is after `max`.
pub fn not_after(value: NaiveDate, max: NaiveDate) -> Result<(), FieldError> {
    if value > max {
        Err(FieldError::DateTooLate { max })
    } else {
        Ok(())
    }
}

/// Lookup of values that must be unique across saved records.
///
/// `column` names the indexed column (e.g. `"brands.slug"`); `except` is the
/// record being edited, whose own value never counts as taken.
pub trait UniqueIndex: Send + Sync {
    /// Returns true if another record already uses `value`
    fn is_taken(&self, column: &str, value: &str, except: Option<RecordId>) -> bool;
}

/// Value not used by another record
///
/// # Errors
///
/// [`FieldError::Taken`] if the index reports the value as taken.
pub fn unique<U>(index: &U, column: &str, value: &str, except: Option<RecordId>) -> Result<(), FieldError>
where
    U: UniqueIndex + ?Sized,
{
    if index.is_taken(column, value, except) {
        Err(FieldError::Taken)
    } else {
        Ok(())
    }
}

/// Unique index held in memory
#[derive(Debug, Default)]
pub struct InMemoryUniqueIndex {
    columns: RwLock<HashMap<String, HashMap<String, RecordId>>>,
}

impl InMemoryUniqueIndex {
    /// Creates an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry
    #[must_use]
    pub fn with_entry(self, column: &str, value: &str, record_id: RecordId) -> Self {
        self.insert(column, value, record_id);
        self
    }

    /// Records that `record_id` now uses `value` in `column`
    pub fn insert(&self, column: &str, value: &str, record_id: RecordId) {
        self.columns
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(column.to_string())
            .or_default()
            .insert(value.to_string(), record_id);
    }
}

impl UniqueIndex for InMemoryUniqueIndex {
    fn is_taken(&self, column: &str, value: &str, except: Option<RecordId>) -> bool {
        self.columns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(column)
            .and_then(|values| values.get(value))
            .is_some_and(|owner| Some(*owner) != except)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn text_rules() {
        assert_eq!(required_text("  "), Err(FieldError::Required));
        assert!(required_text("Acme").is_ok());
        assert!(max_length(&"a".repeat(255), MAX_TEXT_LENGTH).is_ok());
        assert_eq!(
            max_length(&"a".repeat(256), MAX_TEXT_LENGTH),
            Err(FieldError::TooLong { max: 255 })
        );
        assert!(max_length(&"é".repeat(255), MAX_TEXT_LENGTH).is_ok());
    }

    #[test]
    fn email_rule() {
        assert!(email("ana@example.com").is_ok());
        assert!(email("first.last@mail.example.org").is_ok());
        assert_eq!(email("ana.example.com"), Err(FieldError::InvalidEmail));
        assert_eq!(email("@example.com"), Err(FieldError::InvalidEmail));
        assert_eq!(email("ana@localhost"), Err(FieldError::InvalidEmail));
        assert_eq!(email("ana@example..com"), Err(FieldError::InvalidEmail));
        assert_eq!(email("ana @example.com"), Err(FieldError::InvalidEmail));
        assert_eq!(email("a@b@example.com"), Err(FieldError::InvalidEmail));
    }

    #[test]
    fn color_rule() {
        assert!(hex_color("#1a2B3c").is_ok());
        assert_eq!(hex_color("1a2b3c"), Err(FieldError::InvalidColor));
        assert_eq!(hex_color("#fff"), Err(FieldError::InvalidColor));
        assert_eq!(hex_color("#gggggg"), Err(FieldError::InvalidColor));
    }

    #[test]
    fn date_and_money_rules() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(not_after(today, today).is_ok());
        assert_eq!(
            not_after(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(), today),
            Err(FieldError::DateTooLate { max: today })
        );

        assert!(min_money(Money::from_major(1), Money::from_major(1)).is_ok());
        assert_eq!(
            min_money(Money::from_cents(99), Money::from_major(1)),
            Err(FieldError::BelowMinimum {
                min: Money::from_major(1)
            })
        );
    }

    #[test]
    fn unique_index_ignores_own_record() {
        let index = InMemoryUniqueIndex::new().with_entry("brands.slug", "acme", RecordId::new(1));

        assert!(index.is_taken("brands.slug", "acme", None));
        assert!(index.is_taken("brands.slug", "acme", Some(RecordId::new(2))));
        assert!(!index.is_taken("brands.slug", "acme", Some(RecordId::new(1))));
        assert!(!index.is_taken("brands.slug", "other", None));
        assert!(!index.is_taken("products.slug", "acme", None));
        assert_eq!(
            unique(&index, "brands.slug", "acme", None),
            Err(FieldError::Taken)
        );
    }

    #[test]
    fn field_errors_keep_order() {
        let mut errors = FieldErrors::new();
        errors.check("name", required_text(""));
        errors.check("url", required_text("https://acme.test"));
        errors.add("slug", FieldError::Taken);

        assert_eq!(errors.len(), 2);
        assert!(errors.has("name"));
        assert!(!errors.has("url"));
        assert_eq!(errors.for_field("slug"), vec![&FieldError::Taken]);
        assert_eq!(
            errors.messages(),
            vec!["name is required".to_string(), "slug has already been taken".to_string()]
        );
    }
}
