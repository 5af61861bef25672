//! # Cart Commands
//!
//! Orders screen: building the order.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Empty ──add_to_cart / scan_barcode──► Has lines                        │
//! │    ▲                                      │                             │
//! │    │                                      ├─ change_quantity(±n)        │
//! │    │                                      ├─ remove_from_cart           │
//! │    │                                      ▼                             │
//! │    └──── payment approved / clear_cart ── begin_checkout (payment.rs)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use crate::error::ApiError;
use crate::state::{CartState, CartView, CatalogState, SessionState};

pub fn get_cart(session: &SessionState, cart: &CartState) -> Result<CartView, ApiError> {
    session.require()?;
    Ok(cart.view())
}

/// Adds one unit of a catalog product (click on a product card).
pub fn add_to_cart(
    session: &SessionState,
    catalog: &CatalogState,
    cart: &CartState,
    product_id: u32,
) -> Result<CartView, ApiError> {
    session.require()?;
    debug!(product_id, "add_to_cart command");

    let product = catalog
        .with_catalog(|c| c.get(product_id).cloned())
        .ok_or_else(|| ApiError::not_found(format!("Produto não encontrado: {}", product_id)))?;

    cart.with_cart_mut(|c| c.add_item(&product));
    Ok(cart.view())
}

/// Looks up a scanned or typed barcode and adds one unit.
///
/// Blank input is ignored and returns `None`, so an accidental Enter on an
/// empty field does nothing.
pub fn scan_barcode(
    session: &SessionState,
    catalog: &CatalogState,
    cart: &CartState,
    code: &str,
) -> Result<Option<CartView>, ApiError> {
    session.require()?;

    let code = code.trim();
    if code.is_empty() {
        return Ok(None);
    }
    debug!(barcode = %code, "scan_barcode command");

    let product = catalog.with_catalog(|c| c.lookup_barcode(code).cloned())?;
    cart.with_cart_mut(|c| c.add_item(&product));
    Ok(Some(cart.view()))
}

/// The [+] / [−] buttons. Reaching zero removes the line.
pub fn change_quantity(
    session: &SessionState,
    cart: &CartState,
    product_id: u32,
    delta: i64,
) -> Result<CartView, ApiError> {
    session.require()?;
    debug!(product_id, delta, "change_quantity command");

    cart.with_cart_mut(|c| c.change_quantity(product_id, delta));
    Ok(cart.view())
}

pub fn remove_from_cart(
    session: &SessionState,
    cart: &CartState,
    product_id: u32,
) -> Result<CartView, ApiError> {
    session.require()?;
    debug!(product_id, "remove_from_cart command");

    cart.with_cart_mut(|c| c.remove_item(product_id));
    Ok(cart.view())
}

pub fn clear_cart(session: &SessionState, cart: &CartState) -> Result<CartView, ApiError> {
    session.require()?;
    debug!("clear_cart command");

    cart.reset();
    Ok(cart.view())
}
