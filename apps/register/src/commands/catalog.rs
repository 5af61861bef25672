//! # Catalog Commands
//!
//! Products screen: listing, search, registration, removal and the stock
//! summary cards.

use adega_core::catalog::ProductDraft;
use adega_core::{Money, Product, StockLevel};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{CatalogState, ConfigState, SessionState};

/// Product as shown on a catalog card, with its stock badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub stock_level: StockLevel,
    /// "Sem estoque", "Baixo", "Disponível"
    pub stock_label: &'static str,
}

impl ProductView {
    fn new(product: &Product, low_threshold: i64) -> Self {
        let stock_level = product.stock_level(low_threshold);
        ProductView {
            product: product.clone(),
            stock_level,
            stock_label: stock_level.label(),
        }
    }
}

/// Summary cards above the product grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub product_count: usize,
    pub total_units: i64,
    pub inventory_value: Money,
    pub low_stock_count: usize,
}

/// Filters the catalog by name, category or barcode. An empty term lists
/// everything.
pub fn search_products(
    session: &SessionState,
    catalog: &CatalogState,
    config: &ConfigState,
    term: &str,
) -> Result<Vec<ProductView>, ApiError> {
    session.require()?;
    debug!(term = %term, "search_products command");

    let threshold = config.get().catalog.low_stock_threshold;
    Ok(catalog.with_catalog(|c| {
        c.search(term)
            .into_iter()
            .map(|p| ProductView::new(p, threshold))
            .collect()
    }))
}

/// Validates the "Novo Produto" form and adds the product.
pub fn register_product(
    session: &SessionState,
    catalog: &CatalogState,
    config: &ConfigState,
    draft: &ProductDraft,
) -> Result<ProductView, ApiError> {
    session.require()?;

    let product = catalog.with_catalog_mut(|c| c.register(draft))?;
    info!(id = product.id, name = %product.name, barcode = %product.barcode, "Product registered");

    Ok(ProductView::new(
        &product,
        config.get().catalog.low_stock_threshold,
    ))
}

pub fn remove_product(
    session: &SessionState,
    catalog: &CatalogState,
    product_id: u32,
) -> Result<(), ApiError> {
    session.require()?;

    if !catalog.with_catalog_mut(|c| c.remove(product_id)) {
        return Err(ApiError::not_found(format!(
            "Produto não encontrado: {}",
            product_id
        )));
    }

    info!(id = product_id, "Product removed");
    Ok(())
}

pub fn inventory_summary(
    session: &SessionState,
    catalog: &CatalogState,
    config: &ConfigState,
) -> Result<InventorySummary, ApiError> {
    session.require()?;

    let threshold = config.get().catalog.low_stock_threshold;
    Ok(catalog.with_catalog(|c| InventorySummary {
        product_count: c.len(),
        total_units: c.total_units(),
        inventory_value: c.inventory_value(),
        low_stock_count: c.low_stock(threshold).len(),
    }))
}
