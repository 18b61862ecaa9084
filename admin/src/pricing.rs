//! Order line pricing.
//!
//! Three pure recomputations keep the derived money fields of an order
//! consistent with what the user edits:
//!
//! | Edit                      | Recomputed                            |
//! |---------------------------|---------------------------------------|
//! | product selected on line  | [`on_product_selected`]: unit + total |
//! | quantity changed on line  | [`on_quantity_changed`]: line total   |
//! | any line mutation         | [`on_line_set_changed`]: order total  |
//!
//! None of them fail. A missing product leaves the line unpriced, and a missing
//! price or quantity counts as zero, so a half-filled draft stays editable.
//!
//! The unit price is a snapshot taken when the product is selected. Later catalog
//! price changes do not reach lines that were already priced.

use crate::catalog::ProductCatalog;
use crate::ids::{LineId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// One product/quantity entry of an order, with its derived prices
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Line key
    pub id: LineId,
    /// Selected product (`None` until selected)
    pub product_id: Option<ProductId>,
    /// Quantity (defaults to 1)
    pub quantity: Option<u32>,
    /// Unit price snapshot taken at selection time
    pub unit_price: Option<Money>,
    /// Line total
    pub total_price: Option<Money>,
}

impl OrderLine {
    /// Creates an empty line with quantity 1
    #[must_use]
    pub const fn new(id: LineId) -> Self {
        Self {
            id,
            product_id: None,
            quantity: Some(1),
            unit_price: None,
            total_price: None,
        }
    }

    /// Returns true if the line has both a product and a price
    #[must_use]
    pub const fn is_priced(&self) -> bool {
        self.product_id.is_some() && self.unit_price.is_some()
    }
}

/// Derived prices of a line after a product selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePricing {
    /// New unit price (`None` when the product was not found)
    pub unit_price: Option<Money>,
    /// New line total (`None` when the product was not found)
    pub total_price: Option<Money>,
}

/// Prices a line for a newly selected product.
///
/// Found: the unit price is the catalog price and the total is that price times
/// the line's quantity (1 when unset). Not found, or no product: both are `None`.
#[must_use]
pub fn on_product_selected<C>(
    line: &OrderLine,
    product_id: Option<ProductId>,
    catalog: &C,
) -> LinePricing
where
    C: ProductCatalog + ?Sized,
{
    match product_id.and_then(|id| catalog.find_by_id(id)) {
        Some(product) => {
            let quantity = line.quantity.unwrap_or(1);
            LinePricing {
                unit_price: Some(product.price),
                total_price: Some(product.price.times(quantity)),
            }
        },
        None => LinePricing {
            unit_price: None,
            total_price: None,
        },
    }
}

/// New line total after a quantity edit: `(unit price or 0) × (quantity or 0)`.
///
/// Always `Some`: once a quantity has been entered the total is a number, even
/// for a line with no product yet.
#[must_use]
pub fn on_quantity_changed(line: &OrderLine, quantity: Option<u32>) -> Option<Money> {
    let unit_price = line.unit_price.unwrap_or(Money::ZERO);
    Some(unit_price.times(quantity.unwrap_or(0)))
}

/// Order total: the sum of line totals, unpriced lines counting as zero.
#[must_use]
pub fn on_line_set_changed(lines: &[OrderLine]) -> Money {
    lines.iter().filter_map(|line| line.total_price).sum()
}
