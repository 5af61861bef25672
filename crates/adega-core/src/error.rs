//! # Error Types
//!
//! Domain-specific error types for adega-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  adega-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  adega-register errors (app)                                           │
//! │  └── ApiError         - What frontend sees (serialized)                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Toast in the UI        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error is recovered locally: the operation aborts, nothing is
//! mutated, and the UI shows a notice. None of them are fatal.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// CPF is malformed or its check digits do not match.
    #[error("Invalid CPF")]
    InvalidIdentifier,

    /// A required form field was left empty.
    #[error("Missing required field: {field}")]
    InsufficientInput { field: String },

    /// Cash received does not cover the order total.
    ///
    /// ## User Workflow
    /// ```text
    /// Total: R$ 100.00
    ///      │
    ///      ▼
    /// Received: R$ 80.00
    ///      │
    ///      ▼
    /// InsufficientPayment { total: 10000, received: 8000 }
    ///      │
    ///      ▼
    /// UI shows: "Valor recebido é menor que o total"
    /// ```
    #[error("Amount received {received} is less than total {total}")]
    InsufficientPayment { total: Money, received: Money },

    /// Checkout attempted with no lines in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// No product matches the scanned/typed barcode.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The payment flow is not in a state that allows the action.
    #[error("Cannot {action} while payment is {state}")]
    InvalidPaymentState { state: String, action: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Shorthand for a missing field.
    pub fn missing(field: &str) -> Self {
        CoreError::InsufficientInput {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., non-numeric price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate barcode).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
