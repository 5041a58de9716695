//! Field-level validation shared by venue, artist and show writes.
//!
//! Length limits mirror the column sizes of the directory schema.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum length of short text columns (city, state, phone, links).
pub const SHORT_TEXT_MAX_CHARS: usize = 120;
/// Maximum length of long text columns (image links, descriptions).
pub const LONG_TEXT_MAX_CHARS: usize = 500;

const MIN_PHONE_DIGITS: usize = 7;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+().\-\s]+$").expect("valid phone regex"));
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://[^\s/$.?#][^\s]*$").expect("valid url regex"));

/// A malformed or missing inbound field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Form field name as submitted by clients.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid `{}`: {}", self.field, self.message)
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    check_length(field, value, max_chars)
}

pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(text) => check_length(field, text, max_chars),
        None => Ok(()),
    }
}

pub(crate) fn optional_url(
    field: &'static str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<(), ValidationError> {
    let Some(url) = value else {
        return Ok(());
    };
    check_length(field, url, max_chars)?;
    if !URL_RE.is_match(url) {
        return Err(ValidationError::new(field, "must be an http(s) URL"));
    }
    Ok(())
}

pub(crate) fn optional_phone(
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    let Some(phone) = value else {
        return Ok(());
    };
    check_length(field, phone, SHORT_TEXT_MAX_CHARS)?;
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if !PHONE_RE.is_match(phone) || digits < MIN_PHONE_DIGITS {
        return Err(ValidationError::new(
            field,
            format!("must contain at least {MIN_PHONE_DIGITS} digits and only phone punctuation"),
        ));
    }
    Ok(())
}

pub(crate) fn genre_list(field: &'static str, genres: &[String]) -> Result<(), ValidationError> {
    for genre in genres {
        if genre.trim().is_empty() {
            return Err(ValidationError::new(field, "genre names cannot be blank"));
        }
        check_length(field, genre, SHORT_TEXT_MAX_CHARS)?;
    }
    Ok(())
}

fn check_length(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max_chars {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(())
}
