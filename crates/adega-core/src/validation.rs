//! # Validation Module
//!
//! Field-level validation for the register's forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── maxLength, input masks                                            │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Register commands (Rust)                                     │
//! │  ├── Presence checks  → CoreError::InsufficientInput                   │
//! │  └── THIS MODULE: format/range checks → ValidationError                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest product name or category accepted.
pub const MAX_NAME_LENGTH: usize = 120;

/// Highest unit price the product form accepts (R$ 1,000,000.00).
pub const MAX_PRICE: Money = Money::from_cents(100_000_000);

// =============================================================================
// String Validators
// =============================================================================

/// Validates the operator password.
///
/// Only the length is checked; there is no credential store behind it.
///
/// ```rust
/// use adega_core::validation::validate_password;
///
/// assert!(validate_password("segredo", 6).is_ok());
/// assert!(validate_password("12345", 6).is_err());
/// ```
pub fn validate_password(password: &str, min: usize) -> ValidationResult<()> {
    if password.chars().count() < min {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min,
        });
    }
    Ok(())
}

/// Validates a free-text label (product name, category) and returns it trimmed.
pub fn validate_label(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(value.to_string())
}

/// Validates an EAN-style barcode: 8 to 14 digits.
pub fn validate_barcode(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.len() < 8 || code.len() > 14 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain 8 to 14 digits".to_string(),
        });
    }

    Ok(code.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Parses a unit price; zero is allowed, negatives are not.
///
/// ```rust
/// use adega_core::validation::parse_price;
///
/// assert_eq!(parse_price("89.90").unwrap().cents(), 8990);
/// assert!(parse_price("-1").is_err());
/// assert!(parse_price("caro").is_err());
/// ```
pub fn parse_price(text: &str) -> ValidationResult<Money> {
    let price = Money::parse(text).map_err(|e| rename_field(e, "price"))?;

    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    if price > MAX_PRICE {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: format!("above the {} limit", MAX_PRICE),
        });
    }

    Ok(price)
}

/// Parses a stock count.
pub fn parse_stock(text: &str) -> ValidationResult<i64> {
    let text = text.trim();
    let stock: i64 = text.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "stock".to_string(),
        reason: format!("'{}' is not a whole number", text),
    })?;

    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }

    Ok(stock)
}

fn rename_field(err: ValidationError, field: &str) -> ValidationError {
    match err {
        ValidationError::Required { .. } => ValidationError::Required {
            field: field.to_string(),
        },
        ValidationError::InvalidFormat { reason, .. } => ValidationError::InvalidFormat {
            field: field.to_string(),
            reason,
        },
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("123456", 6).is_ok());
        assert_eq!(
            validate_password("abc", 6),
            Err(ValidationError::TooShort {
                field: "password".to_string(),
                min: 6
            })
        );
    }

    #[test]
    fn test_validate_label() {
        assert_eq!(
            validate_label("name", "  Vodka Premium ").unwrap(),
            "Vodka Premium"
        );
        assert!(validate_label("name", "   ").is_err());
        assert!(validate_label("category", &"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("7891234567890").is_ok());
        assert!(validate_barcode("12345").is_err());
        assert!(validate_barcode("78912345678AB").is_err());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("0").unwrap(), Money::zero());
        assert_eq!(parse_price("125,00").unwrap().cents(), 12500);
        assert!(matches!(
            parse_price("-3"),
            Err(ValidationError::Negative { .. })
        ));
        assert_eq!(parse_price("1000000").unwrap(), MAX_PRICE);
        assert!(matches!(
            parse_price("90000000000000000"),
            Err(ValidationError::InvalidFormat { field, .. }) if field == "price"
        ));
        assert!(matches!(
            parse_price("x"),
            Err(ValidationError::InvalidFormat { field, .. }) if field == "price"
        ));
    }

    #[test]
    fn test_parse_stock() {
        assert_eq!(parse_stock(" 24 ").unwrap(), 24);
        assert!(parse_stock("2.5").is_err());
        assert!(parse_stock("-1").is_err());
    }
}
