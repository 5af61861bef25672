//! # adega-core: Pure Business Logic for Adega POS
//!
//! This crate holds every business rule of the register as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Adega POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (React)                             │   │
//! │  │    Login ──► Dashboard ──► Orders ──► Payment ──► Receipt       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 adega-register (commands, state)                │   │
//! │  │    login, scan_barcode, add_to_cart, confirm_payment, etc.      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ adega-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │   cpf   │ │  money  │ │  cart   │ │ payment │ │ catalog │  │   │
//! │  │   │ format  │ │  Money  │ │  Cart   │ │  Flow   │ │ Product │  │   │
//! │  │   │validate │ │ parsing │ │CartLine │ │ change  │ │ search  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO TIMERS • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cpf`] - CPF (Brazilian taxpayer id) formatting and check digits
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart ledger: lines, quantities, totals
//! - [`payment`] - Card/cash/PIX details, change, payment state machine
//! - [`catalog`] - In-memory product catalog and barcode lookup
//! - [`types`] - Shared domain types (Product, PaymentMethod, Receipt)
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation
//!
//! ## Example Usage
//!
//! ```rust
//! use adega_core::cart::Cart;
//! use adega_core::cpf;
//! use adega_core::money::Money;
//! use adega_core::types::Product;
//!
//! assert!(cpf::validate("123.456.789-09"));
//! assert_eq!(cpf::format("12345678909"), "123.456.789-09");
//!
//! let wine = Product::new(1, "Vinho Tinto Reserva", "Vinhos Tintos", Money::from_cents(8990));
//! let mut cart = Cart::new();
//! cart.add_item(&wine);
//! cart.add_item(&wine);
//! assert_eq!(cart.total_price(), Money::from_cents(17980));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod cpf;
pub mod error;
pub mod money;
pub mod payment;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CheckoutSnapshot};
pub use catalog::{Catalog, ProductDraft};
pub use cpf::Cpf;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use payment::{CardDetails, PaymentDetails, PaymentFlow, PaymentStage};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of digits in a CPF.
pub const CPF_LENGTH: usize = 11;

/// Minimum operator password length accepted at login.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Stock below this level is flagged as low on the products screen.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Static PIX "copia e cola" payload shown under the QR placeholder.
pub const DEFAULT_PIX_PAYLOAD: &str = "00020126360014BR.GOV.BCB.PIX0114+5519999999999";
