//! Read-only product catalog lookup.
//!
//! The order form only ever reads from the catalog: it resolves a selected
//! product to its current price and lists products for the product select.

use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A product as the order form sees it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Product identifier
    pub id: ProductId,
    /// Product name for display
    pub name: String,
    /// Current unit price
    pub price: Money,
}

/// Product lookup used by the order form.
///
/// Lookups are synchronous and never fail; a missing product is `None`.
pub trait ProductCatalog: Send + Sync {
    /// Looks up a product by id
    fn find_by_id(&self, id: ProductId) -> Option<CatalogEntry>;

    /// `(id, name)` pairs for the product select, sorted by name
    fn options(&self) -> Vec<(ProductId, String)>;
}

/// Catalog held in memory
///
/// # Example
///
/// ```
/// use shopfront_admin::catalog::{InMemoryCatalog, ProductCatalog};
/// use shopfront_admin::ids::ProductId;
/// use shopfront_admin::money::Money;
///
/// let catalog = InMemoryCatalog::new()
///     .with_product(ProductId::new(1), "Grinder", Money::from_major(10));
///
/// assert_eq!(catalog.find_by_id(ProductId::new(1)).map(|p| p.price), Some(Money::from_major(10)));
/// assert!(catalog.find_by_id(ProductId::new(2)).is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    products: BTreeMap<ProductId, CatalogEntry>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog
    #[must_use]
    pub const fn new() -> Self {
        Self {
            products: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) a product
    #[must_use]
    pub fn with_product(mut self, id: ProductId, name: impl Into<String>, price: Money) -> Self {
        self.insert(id, name, price);
        self
    }

    /// Adds (or replaces) a product in place
    pub fn insert(&mut self, id: ProductId, name: impl Into<String>, price: Money) {
        self.products.insert(
            id,
            CatalogEntry {
                id,
                name: name.into(),
                price,
            },
        );
    }

    /// Number of products
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns true if the catalog has no products
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn find_by_id(&self, id: ProductId) -> Option<CatalogEntry> {
        self.products.get(&id).cloned()
    }

    fn options(&self) -> Vec<(ProductId, String)> {
        let mut options: Vec<_> = self
            .products
            .values()
            .map(|entry| (entry.id, entry.name.clone()))
            .collect();
        options.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        options
    }
}
