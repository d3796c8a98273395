//! Field validators shared by the request DTOs and the bulk importer.
//!
//! Every validator is a pure function returning [`FieldError`]; callers
//! attach the field name via [`CoreError::field`](crate::error::CoreError::field).

use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use validator::ValidateEmail;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Maximum length of usernames and first/last names.
pub const NAME_FIELD_SIZE: usize = 150;

/// Maximum length of an email address.
pub const EMAIL_FIELD_SIZE: usize = 254;

/// Maximum length of category, genre and title names.
pub const BASE_FIELD_SIZE: usize = 256;

/// Maximum length of a category or genre slug.
pub const SLUG_FIELD_SIZE: usize = 50;

/// Lowest accepted review score.
pub const MIN_SCORE: i32 = 1;

/// Highest accepted review score.
pub const MAX_SCORE: i32 = 10;

/// Usernames that collide with fixed routes and can never be registered.
pub const RESERVED_USERNAMES: &[&str] = &["me"];

/// Any single character that is not allowed in a username.
static INVALID_USERNAME_CHAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w.@+-]").expect("valid regex"));

/// A complete, valid slug.
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid regex"));

/* --------------------------------------------------------------------------
Errors
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The value contains characters outside the username charset.
    /// Holds the distinct offending characters in first-occurrence order.
    #[error("Enter a valid value. Invalid characters: {0}")]
    InvalidCharacters(String),

    #[error("Username \"{0}\" is not valid")]
    ReservedName(String),

    #[error("The year {value} cannot be later than the current year {year_now}")]
    FutureYear { value: i32, year_now: i32 },

    #[error("This field may not be blank")]
    Blank,

    #[error("Ensure this field has no more than {max} characters")]
    TooLong { max: usize },

    #[error("Enter a valid email address")]
    InvalidEmail,

    #[error("Enter a valid slug consisting of letters, numbers, underscores or hyphens")]
    InvalidSlug,

    #[error("Ensure this value is between {min} and {max}")]
    OutOfRange { min: i32, max: i32 },

    #[error("Object with slug={0} does not exist")]
    UnknownSlug(String),
}

/* --------------------------------------------------------------------------
Validators
-------------------------------------------------------------------------- */

/// Reject values containing characters outside `[\w.@+-]`.
pub fn regex_validator(value: &str) -> Result<(), FieldError> {
    let mut invalid = String::new();
    for m in INVALID_USERNAME_CHAR_RE.find_iter(value) {
        let s = m.as_str();
        if !invalid.contains(s) {
            invalid.push_str(s);
        }
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(FieldError::InvalidCharacters(invalid))
    }
}

/// Reject any of the [`RESERVED_USERNAMES`].
pub fn me_validator(value: &str) -> Result<(), FieldError> {
    reserved_name_validator(value, RESERVED_USERNAMES)
}

/// Reject `value` if it exactly matches an entry of `reserved` (case-sensitive).
pub fn reserved_name_validator(value: &str, reserved: &[&str]) -> Result<(), FieldError> {
    if reserved.contains(&value) {
        return Err(FieldError::ReservedName(value.to_string()));
    }
    Ok(())
}

/// Reject years later than the current calendar year.
///
/// "Now" is read on every call.
pub fn validate_year_not_in_future(value: i32) -> Result<i32, FieldError> {
    let year_now = chrono::Local::now().year();
    if value > year_now {
        return Err(FieldError::FutureYear { value, year_now });
    }
    Ok(value)
}

pub fn validate_not_blank(value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::Blank);
    }
    Ok(())
}

/// Length is measured in characters, not bytes.
pub fn validate_max_length(value: &str, max: usize) -> Result<(), FieldError> {
    if value.chars().count() > max {
        return Err(FieldError::TooLong { max });
    }
    Ok(())
}

/// Full username check: non-blank, bounded, charset, not reserved.
pub fn validate_username(value: &str) -> Result<(), FieldError> {
    validate_not_blank(value)?;
    validate_max_length(value, NAME_FIELD_SIZE)?;
    regex_validator(value)?;
    me_validator(value)
}

pub fn validate_email(value: &str) -> Result<(), FieldError> {
    validate_not_blank(value)?;
    validate_max_length(value, EMAIL_FIELD_SIZE)?;
    if !value.validate_email() {
        return Err(FieldError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_slug(value: &str) -> Result<(), FieldError> {
    validate_max_length(value, SLUG_FIELD_SIZE)?;
    if !SLUG_RE.is_match(value) {
        return Err(FieldError::InvalidSlug);
    }
    Ok(())
}

pub fn validate_score(value: i32) -> Result<(), FieldError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(FieldError::OutOfRange {
            min: MIN_SCORE,
            max: MAX_SCORE,
        });
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
