//! South African mobile number validation and normalization.
//!
//! A number is accepted in national form (`0821234567`) or international
//! form (`+27821234567`). The digit after the prefix must be 6, 7 or 8,
//! the mobile ranges, and exactly eight digits follow it.

use crate::utils::error::{ReconError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const COUNTRY_CODE: &str = "+27";
pub const TRUNK_PREFIX: char = '0';
pub const MOBILE_FIRST_DIGITS: [char; 3] = ['6', '7', '8'];
const SUBSCRIBER_DIGITS: usize = 8;

/// Returns true iff `candidate` is a South African mobile number in
/// national or international form. No whitespace or separators are allowed.
pub fn is_valid(candidate: &str) -> bool {
    let rest = if let Some(rest) = candidate.strip_prefix(COUNTRY_CODE) {
        rest
    } else if let Some(rest) = candidate.strip_prefix(TRUNK_PREFIX) {
        rest
    } else {
        return false;
    };

    let mut chars = rest.chars();
    match chars.next() {
        Some(first) if MOBILE_FIRST_DIGITS.contains(&first) => {}
        _ => return false,
    }

    let subscriber = chars.as_str();
    subscriber.len() == SUBSCRIBER_DIGITS && subscriber.bytes().all(|b| b.is_ascii_digit())
}

/// Raw caller input, before any checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneCandidate(String);

impl PhoneCandidate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn validate(self) -> Result<ValidPhone> {
        ValidPhone::parse(&self.0)
    }
}

impl From<&str> for PhoneCandidate {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// A candidate that passed [`is_valid`]. Only obtainable through
/// [`ValidPhone::parse`], so [`normalize`] never sees malformed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPhone(String);

impl ValidPhone {
    pub fn parse(candidate: &str) -> Result<Self> {
        if is_valid(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(ReconError::InvalidPhoneNumber {
                input: candidate.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_national(&self) -> bool {
        self.0.starts_with(TRUNK_PREFIX)
    }

    pub fn normalize(&self) -> CanonicalNumber {
        normalize(self)
    }
}

/// Converts a validated number to its `+27...` form. Input already in
/// international form is returned unchanged.
pub fn normalize(phone: &ValidPhone) -> CanonicalNumber {
    match phone.0.strip_prefix(TRUNK_PREFIX) {
        Some(rest) => CanonicalNumber(format!("{}{}", COUNTRY_CODE, rest)),
        None => CanonicalNumber(phone.0.clone()),
    }
}

/// Validates and normalizes in one step.
pub fn canonicalize(candidate: &str) -> Result<CanonicalNumber> {
    ValidPhone::parse(candidate).map(|phone| phone.normalize())
}

/// International form of a valid number; the key for every lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalNumber(String);

impl CanonicalNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits only, without the leading `+` (`27821234567`).
    pub fn digits(&self) -> &str {
        self.0.trim_start_matches('+')
    }
}

impl fmt::Display for CanonicalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CanonicalNumber {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        canonicalize(&raw).map_err(serde::de::Error::custom)
    }
}
