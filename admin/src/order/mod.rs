//! Order editing session.

pub mod reducer;
pub mod summary;
pub mod types;

pub use reducer::{OrderFormEnvironment, OrderFormReducer};
pub use summary::{OrderSummary, count_with_status};
pub use types::{
    FixedOrderNumbers, OrderDraft, OrderFormAction, OrderNumber, OrderNumbers, OrderStatus,
    OrderSubmission, RandomOrderNumbers, UnknownStatus,
};
