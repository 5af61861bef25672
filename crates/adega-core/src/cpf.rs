//! # CPF Module
//!
//! Formatting and check-digit validation for the CPF (Cadastro de Pessoas
//! Físicas), the 11-digit Brazilian taxpayer identifier used as the
//! operator login.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   1 2 3 . 4 5 6 . 7 8 9 - 0 9                                          │
//! │   └───────── base ──────┘   │ │                                        │
//! │                             │ └── second check digit (weights 11..2)   │
//! │                             └──── first check digit  (weights 10..2)   │
//! │                                                                         │
//! │   check = (Σ digit × weight) × 10 mod 11, with 10 → 0                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed input never raises: `validate` answers `false` and `format`
//! leaves over-long input untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::CPF_LENGTH;

/// Removes every non-digit character.
pub fn strip_non_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Formats keystrokes progressively toward `DDD.DDD.DDD-DD`.
///
/// Partial input gets partial punctuation. Input with more than 11 digits is
/// returned unchanged.
///
/// ```rust
/// use adega_core::cpf::format;
///
/// assert_eq!(format("1234"), "123.4");
/// assert_eq!(format("1234567890"), "123.456.789-0");
/// assert_eq!(format("12345678909"), "123.456.789-09");
/// ```
pub fn format(raw: &str) -> String {
    let digits = strip_non_digits(raw);
    if digits.len() > CPF_LENGTH {
        return raw.to_string();
    }

    let mut out = String::with_capacity(CPF_LENGTH + 3);
    for (i, d) in digits.chars().enumerate() {
        match i {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {}
        }
        out.push(d);
    }
    out
}

/// Validates a CPF, ignoring punctuation.
///
/// ```rust
/// use adega_core::cpf::validate;
///
/// assert!(validate("123.456.789-09"));
/// assert!(!validate("123.456.789-00"));
/// assert!(!validate("111.111.111-11"));
/// ```
pub fn validate(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != CPF_LENGTH {
        return false;
    }

    // 000.000.000-00, 111.111.111-11, ... satisfy the checksum but are invalid
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Computes the check digit over `base`, weighting from `base.len() + 1`
/// down to 2.
fn check_digit(base: &[u32]) -> u32 {
    let top = base.len() as u32 + 1;
    let sum: u32 = base
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();

    match (sum * 10) % 11 {
        10 => 0,
        r => r,
    }
}

// =============================================================================
// Cpf Newtype
// =============================================================================

/// A CPF whose check digits have been verified.
///
/// Holds only the 11 digits; punctuation is re-applied on display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(#[ts(type = "string")] String);

impl Cpf {
    /// Parses and validates raw input.
    ///
    /// ```rust
    /// use adega_core::Cpf;
    ///
    /// let cpf = Cpf::parse("123.456.789-09").unwrap();
    /// assert_eq!(cpf.digits(), "12345678909");
    /// assert!(Cpf::parse("12345678900").is_err());
    /// ```
    pub fn parse(raw: &str) -> CoreResult<Self> {
        if !validate(raw) {
            return Err(CoreError::InvalidIdentifier);
        }
        Ok(Cpf(strip_non_digits(raw)))
    }

    /// The bare 11 digits.
    pub fn digits(&self) -> &str {
        &self.0
    }

    /// `DDD.DDD.DDD-DD`
    pub fn formatted(&self) -> String {
        format(&self.0)
    }

    /// Hides the first three and the check digits: `***.456.789-**`.
    ///
    /// Use this form in logs.
    pub fn masked(&self) -> String {
        let second = self.0.get(3..6).unwrap_or_default();
        let third = self.0.get(6..9).unwrap_or_default();
        format!("***.{}.{}-**", second, third)
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl TryFrom<String> for Cpf {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Cpf::parse(&value)
    }
}

impl From<Cpf> for String {
    fn from(cpf: Cpf) -> Self {
        cpf.formatted()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
