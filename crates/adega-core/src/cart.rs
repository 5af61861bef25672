//! # Cart Ledger
//!
//! The order being built on the Orders screen.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Click product / scan ───► add_item()         qty += 1 or new line      │
//! │  [+] / [−] buttons ──────► change_quantity()  qty += delta, ≤ 0 drops   │
//! │  Trash icon ─────────────► remove_item()      line removed              │
//! │  "Finalizar" ────────────► checkout()         snapshot or EmptyCart     │
//! │                                                                         │
//! │  Derived: total_item_count() = Σ qty                                   │
//! │           total_price()      = Σ qty × unit price  (centavos)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id`
//! - Every line has `1 <= quantity <= MAX_LINE_QUANTITY`
//! - Lines keep first-insertion order

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, ReceiptLine};

/// Largest quantity a single line can hold; further increments are ignored.
pub const MAX_LINE_QUANTITY: u32 = 9_999;

// =============================================================================
// Cart Line
// =============================================================================

/// One product's aggregated quantity within the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: u32,

    /// Product name at time of adding.
    pub name: String,

    /// Unit price at time of adding.
    pub unit_price: Money,

    /// Always at least 1.
    pub quantity: u32,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

impl From<&CartLine> for ReceiptLine {
    fn from(line: &CartLine) -> Self {
        ReceiptLine {
            product_id: line.product_id,
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total(),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of `product`.
    ///
    /// Increments the existing line, or appends a new line with quantity 1.
    pub fn add_item(&mut self, product: &Product) {
        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(1).min(MAX_LINE_QUANTITY);
            }
            None => self.lines.push(CartLine::from_product(product)),
        }
    }

    /// Adds `delta` to a line's quantity.
    ///
    /// A resulting quantity of zero or less removes the line; anything above
    /// [`MAX_LINE_QUANTITY`] is clamped to it. Unknown products are ignored.
    pub fn change_quantity(&mut self, product_id: u32, delta: i64) {
        let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) else {
            return;
        };

        let next = i64::from(line.quantity).saturating_add(delta);
        if next > 0 {
            line.quantity = u32::try_from(next)
                .unwrap_or(MAX_LINE_QUANTITY)
                .min(MAX_LINE_QUANTITY);
            return;
        }
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Removes a line unconditionally. Returns whether a line was removed.
    pub fn remove_item(&mut self, product_id: u32) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Takes the paid quantities off the cart.
    ///
    /// Lines that were added or increased after the checkout keep the
    /// unpaid remainder; everything else is dropped.
    pub fn settle(&mut self, paid: &[ReceiptLine]) {
        for sold in paid {
            self.change_quantity(sold.product_id, -i64::from(sold.quantity));
        }
    }

    /// Lines in first-insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Looks up the line for a product.
    pub fn line(&self, product_id: u32) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Sum of all line quantities.
    pub fn total_item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Sum of quantity × unit price over all lines.
    pub fn total_price(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Freezes the cart for the payment screen.
    ///
    /// ## Errors
    /// `EmptyCart` when there is nothing to pay for.
    pub fn checkout(&self) -> CoreResult<CheckoutSnapshot> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        Ok(CheckoutSnapshot {
            lines: self.lines.clone(),
            item_count: self.total_item_count(),
            total: self.total_price(),
        })
    }
}

// =============================================================================
// Checkout Snapshot
// =============================================================================

/// What the Orders screen hands to the Payment screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    pub lines: Vec<CartLine>,
    pub item_count: u32,
    pub total: Money,
}

/// Badge text for the item counter: "1 item", "3 itens".
pub fn item_label(count: u32) -> String {
    if count == 1 {
        "1 item".to_string()
    } else {
        format!("{} itens", count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
