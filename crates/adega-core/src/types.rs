//! # Domain Types
//!
//! Core domain types shared between the register and the UI.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  PaymentMethod  │   │    Receipt      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (u32)       │   │  Card           │   │  id (UUID)      │       │
//! │  │  name           │   │  Cash           │   │  method         │       │
//! │  │  category       │   │  Pix            │   │  lines          │       │
//! │  │  price (Money)  │   └─────────────────┘   │  total / change │       │
//! │  │  stock          │                         └─────────────────┘       │
//! │  │  barcode        │   ┌─────────────────┐                             │
//! │  └─────────────────┘   │   StockLevel    │                             │
//! │                        │  OutOfStock/Low │                             │
//! │                        │  Available      │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Reference data: the cart copies what it needs when a line is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier, unique within the catalog.
    pub id: u32,

    /// Display name shown on the order screen and receipt.
    pub name: String,

    /// Shelf category ("Vinhos Tintos", "Destilados", ...).
    pub category: String,

    /// Unit price.
    pub price: Money,

    /// Units on hand.
    pub stock: i64,

    /// EAN-13 barcode.
    pub barcode: String,
}

impl Product {
    /// Creates a product with no stock and a barcode derived from its id.
    pub fn new(id: u32, name: &str, category: &str, price: Money) -> Self {
        Product {
            id,
            name: name.to_string(),
            category: category.to_string(),
            price,
            stock: 0,
            barcode: generated_barcode(id),
        }
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_barcode(mut self, barcode: &str) -> Self {
        self.barcode = barcode.to_string();
        self
    }

    /// Stock badge for this product.
    pub fn stock_level(&self, low_threshold: i64) -> StockLevel {
        StockLevel::for_stock(self.stock, low_threshold)
    }
}

/// Barcode assigned when the operator registers a product without one:
/// the `789` (Brazil) prefix followed by the id, zero-padded to 10 digits.
///
/// ```rust
/// use adega_core::types::generated_barcode;
///
/// assert_eq!(generated_barcode(7), "7890000000007");
/// ```
pub fn generated_barcode(id: u32) -> String {
    format!("789{:010}", id)
}

// =============================================================================
// Stock Level
// =============================================================================

/// Stock badge shown next to each product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    /// Nothing on hand ("Sem estoque").
    OutOfStock,
    /// Below the low-stock threshold ("Baixo").
    Low,
    /// Comfortably stocked ("Disponível").
    Available,
}

impl StockLevel {
    /// Classifies a stock count against the low-stock threshold.
    pub fn for_stock(stock: i64, low_threshold: i64) -> Self {
        if stock <= 0 {
            StockLevel::OutOfStock
        } else if stock < low_threshold {
            StockLevel::Low
        } else {
            StockLevel::Available
        }
    }

    /// Badge text.
    pub fn label(&self) -> &'static str {
        match self {
            StockLevel::OutOfStock => "Sem estoque",
            StockLevel::Low => "Baixo",
            StockLevel::Available => "Disponível",
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays. Mutually exclusive per sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit card typed into the form.
    Card,
    /// Physical cash, change computed.
    Cash,
    /// PIX instant payment via static QR payload.
    Pix,
}

impl PaymentMethod {
    /// Label shown on the confirmation screen.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Cartão de Crédito",
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Pix => "PIX",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Pix => write!(f, "pix"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "card" | "cartao" | "cartão" => Ok(PaymentMethod::Card),
            "cash" | "dinheiro" => Ok(PaymentMethod::Cash),
            "pix" => Ok(PaymentMethod::Pix),
            other => Err(ValidationError::InvalidFormat {
                field: "payment method".to_string(),
                reason: format!("unknown method '{}', expected card, cash or pix", other),
            }),
        }
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// One line of a completed sale, frozen at payment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub product_id: u32,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Summary of an approved payment ("Pagamento Aprovado!").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Receipt identifier (UUID v4).
    pub id: String,
    pub method: PaymentMethod,
    pub lines: Vec<ReceiptLine>,
    pub total: Money,
    /// Cash handed over; `None` for card and PIX.
    pub received: Option<Money>,
    /// Change returned; zero for card and PIX.
    pub change: Money,
    #[ts(as = "String")]
    pub completed_at: DateTime<Utc>,
}

impl Receipt {
    /// Total number of units sold.
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_level_thresholds() {
        assert_eq!(StockLevel::for_stock(0, 10), StockLevel::OutOfStock);
        assert_eq!(StockLevel::for_stock(9, 10), StockLevel::Low);
        assert_eq!(StockLevel::for_stock(10, 10), StockLevel::Available);
        assert_eq!(StockLevel::for_stock(48, 10).label(), "Disponível");
    }

    #[test]
    fn test_product_builder() {
        let product = Product::new(4, "Whisky Single Malt", "Destilados", Money::from_cents(28000))
            .with_stock(8)
            .with_barcode("7891234567893");

        assert_eq!(product.barcode, "7891234567893");
        assert_eq!(product.stock_level(10), StockLevel::Low);
    }

    #[test]
    fn test_generated_barcode_is_thirteen_digits() {
        let code = generated_barcode(123);
        assert_eq!(code, "7890000000123");
        assert_eq!(code.len(), 13);
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("Dinheiro".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("PIX".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
        assert!("boleto".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payment_method_wire_format() {
        let json = serde_json::to_string(&PaymentMethod::Pix).unwrap();
        assert_eq!(json, "\"pix\"");
        assert_eq!(PaymentMethod::Card.label(), "Cartão de Crédito");
    }
}
