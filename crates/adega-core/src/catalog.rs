//! # Catalog Module
//!
//! In-memory product catalog: the Products screen and barcode lookup.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  search("vinho")        name / category contain term (any case)        │
//! │                         or barcode contains term                       │
//! │  lookup_barcode(code)   exact barcode match → Product                  │
//! │  register(draft)        form text → validated Product                  │
//! │  remove(id)             drops a product                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{generated_barcode, Product, StockLevel};
use crate::validation::{parse_price, parse_stock, validate_barcode, validate_label};

// =============================================================================
// Product Draft
// =============================================================================

/// The "Novo Produto" form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: String,
    /// Optional; generated from the id when left blank.
    #[serde(default)]
    pub barcode: String,
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    /// The shop's starting assortment.
    pub fn seeded() -> Self {
        let products = vec![
            Product::new(1, "Vinho Tinto Reserva", "Vinhos Tintos", Money::from_cents(8990))
                .with_stock(24)
                .with_barcode("7891234567890"),
            Product::new(2, "Vinho Branco Seco", "Vinhos Brancos", Money::from_cents(6500))
                .with_stock(18)
                .with_barcode("7891234567891"),
            Product::new(3, "Espumante Brut", "Espumantes", Money::from_cents(12500))
                .with_stock(12)
                .with_barcode("7891234567892"),
            Product::new(4, "Whisky Single Malt", "Destilados", Money::from_cents(28000))
                .with_stock(8)
                .with_barcode("7891234567893"),
            Product::new(5, "Vodka Premium", "Destilados", Money::from_cents(9500))
                .with_stock(15)
                .with_barcode("7891234567894"),
            Product::new(6, "Cerveja Artesanal IPA", "Cervejas", Money::from_cents(1850))
                .with_stock(48)
                .with_barcode("7891234567895"),
        ];
        Catalog { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Filters the catalog for the search box. An empty term matches
    /// everything.
    pub fn search(&self, term: &str) -> Vec<&Product> {
        let term = term.trim();
        let needle = term.to_lowercase();

        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
                    || p.barcode.contains(term)
            })
            .collect()
    }

    /// Finds the product carrying exactly this barcode.
    ///
    /// ## Errors
    /// `ProductNotFound` when no product matches.
    pub fn lookup_barcode(&self, code: &str) -> CoreResult<&Product> {
        let code = code.trim();
        self.products
            .iter()
            .find(|p| p.barcode == code)
            .ok_or_else(|| CoreError::ProductNotFound(code.to_string()))
    }

    /// Validates the form and adds the product.
    ///
    /// ## Errors
    /// - `InsufficientInput` when name, category, price or stock is blank
    /// - `Validation` for unparseable or negative numbers, a malformed
    ///   barcode, or a barcode already in use
    pub fn register(&mut self, draft: &ProductDraft) -> CoreResult<Product> {
        let required = [
            ("name", &draft.name),
            ("category", &draft.category),
            ("price", &draft.price),
            ("stock", &draft.stock),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(CoreError::missing(field));
        }

        let name = validate_label("name", &draft.name)?;
        let category = validate_label("category", &draft.category)?;
        let price = parse_price(&draft.price)?;
        let stock = parse_stock(&draft.stock)?;

        let id = self.next_id();
        let barcode = if draft.barcode.trim().is_empty() {
            generated_barcode(id)
        } else {
            validate_barcode(&draft.barcode)?
        };

        if self.products.iter().any(|p| p.barcode == barcode) {
            return Err(ValidationError::Duplicate {
                field: "barcode".to_string(),
                value: barcode,
            }
            .into());
        }

        let product = Product {
            id,
            name,
            category,
            price,
            stock,
            barcode,
        };
        self.products.push(product.clone());
        Ok(product)
    }

    /// Removes a product. Returns whether it existed.
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        self.products.len() != before
    }

    /// Catalog size + 1, skipping ids still taken after deletions.
    fn next_id(&self) -> u32 {
        let mut id = u32::try_from(self.products.len()).unwrap_or(u32::MAX).saturating_add(1);
        while self.get(id).is_some() {
            id = id.saturating_add(1);
        }
        id
    }

    /// Σ price × stock over products with stock on hand.
    pub fn inventory_value(&self) -> Money {
        self.products
            .iter()
            .filter(|p| p.stock > 0)
            .map(|p| Money::from_cents(p.price.cents().saturating_mul(p.stock)))
            .sum()
    }

    /// Σ stock.
    pub fn total_units(&self) -> i64 {
        self.products
            .iter()
            .fold(0i64, |acc, p| acc.saturating_add(p.stock.max(0)))
    }

    /// Products below the threshold but not yet out.
    pub fn low_stock(&self, threshold: i64) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.stock_level(threshold) == StockLevel::Low)
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
