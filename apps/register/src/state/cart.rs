//! # Cart State
//!
//! Shares the order being built on the Orders screen.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because commands and the payment
//! task (which settles the cart on approval) may touch it from different
//! threads. Operations are short and mostly writes, so a plain `Mutex`
//! rather than an `RwLock`.

use std::sync::{Arc, Mutex, PoisonError};

use adega_core::cart::item_label;
use adega_core::{Cart, CartLine, Money};
use serde::Serialize;

/// Cart contents plus the derived values the screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    /// "1 item", "3 itens"
    pub item_label: String,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    pub line_total: Money,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let item_count = cart.total_item_count();
        CartView {
            lines: cart
                .lines()
                .iter()
                .map(|line| CartLineView {
                    line: line.clone(),
                    line_total: line.line_total(),
                })
                .collect(),
            item_count,
            item_label: item_label(item_count),
            total: cart.total_price(),
        }
    }
}

/// Shared cart state.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        CartState::default()
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    /// Empties the cart.
    pub fn reset(&self) {
        self.with_cart_mut(|c| c.clear());
    }

    pub fn view(&self) -> CartView {
        self.with_cart(|c| CartView::from(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adega_core::Product;

    #[test]
    fn test_view_reports_totals() {
        let state = CartState::new();
        let ipa = Product::new(6, "Cerveja Artesanal IPA", "Cervejas", Money::from_cents(1850));

        state.with_cart_mut(|c| {
            c.add_item(&ipa);
            c.add_item(&ipa);
        });

        let view = state.view();
        assert_eq!(view.item_count, 2);
        assert_eq!(view.item_label, "2 itens");
        assert_eq!(view.total.cents(), 3700);
        assert_eq!(view.lines[0].line_total.cents(), 3700);
    }

    #[test]
    fn test_clones_share_the_cart() {
        let state = CartState::new();
        let other = state.clone();
        let wine = Product::new(1, "Vinho Tinto Reserva", "Vinhos Tintos", Money::from_cents(8990));

        other.with_cart_mut(|c| c.add_item(&wine));
        assert_eq!(state.with_cart(|c| c.len()), 1);

        state.reset();
        assert!(other.with_cart(|c| c.is_empty()));
    }

    #[test]
    fn test_line_view_serializes_flat() {
        let state = CartState::new();
        let wine = Product::new(1, "Vinho Tinto Reserva", "Vinhos Tintos", Money::from_cents(8990));
        state.with_cart_mut(|c| c.add_item(&wine));

        let json = serde_json::to_value(state.view()).unwrap();
        assert_eq!(json["lines"][0]["productId"], 1);
        assert_eq!(json["lines"][0]["lineTotal"], 8990);
        assert_eq!(json["itemLabel"], "1 item");
    }
}
