//! Aggregates over saved orders.

use crate::money::Money;
use crate::order::types::{OrderStatus, OrderSubmission};
use serde::{Deserialize, Serialize};

/// Column sums of an order listing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Number of orders
    pub count: usize,
    /// Sum of order totals
    pub total: Money,
    /// Sum of shipping prices
    pub shipping_price: Money,
}

impl OrderSummary {
    /// Sums the listed orders
    #[must_use]
    pub fn of<'a, I>(orders: I) -> Self
    where
        I: IntoIterator<Item = &'a OrderSubmission>,
    {
        orders.into_iter().fold(Self::default(), |summary, order| Self {
            count: summary.count + 1,
            total: summary.total + order.total,
            shipping_price: summary.shipping_price + order.shipping_price,
        })
    }
}

/// Number of orders currently in `status`
#[must_use]
pub fn count_with_status<'a, I>(orders: I, status: OrderStatus) -> usize
where
    I: IntoIterator<Item = &'a OrderSubmission>,
{
    orders
        .into_iter()
        .filter(|order| order.status == status)
        .count()
}
