//! # Shopfront Admin
//!
//! Back-office editing sessions for a small shop: orders, brands, products and
//! customers. Each form is a [`Reducer`](shopfront_core::reducer::Reducer) over a
//! draft state, run by a [`Store`](shopfront_runtime::Store).
//!
//! The order form keeps its lines priced while they are edited:
//!
//! - selecting a product snapshots its current price into the line
//! - changing a quantity recomputes the line total from that snapshot
//! - any change to the set of lines recomputes the order total
//!
//! Submitting a form validates it; a valid draft is handed to a
//! [`RecordSink`](shopfront_core::persistence::RecordSink) and the outcome comes
//! back to the reducer as a `Saved` or `SaveFailed` event.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_admin::order::{OrderDraft, OrderFormAction, OrderFormEnvironment, OrderFormReducer};
//! use shopfront_runtime::Store;
//!
//! let store = Store::new(OrderDraft::new(), OrderFormReducer::new(), env);
//! store.send(OrderFormAction::OpenDraft).await?;
//! store.send(OrderFormAction::AddLine { line_id }).await?;
//! store.send(OrderFormAction::SelectProduct { line_id, product_id: Some(id) }).await?;
//! let total = store.state(|draft| draft.total).await;
//! ```

pub mod brand;
pub mod catalog;
pub mod config;
pub mod customer;
pub mod form;
pub mod ids;
pub mod money;
pub mod order;
pub mod pricing;
pub mod product;
pub mod records;
pub mod slug;
pub mod validation;

pub use catalog::{CatalogEntry, InMemoryCatalog, ProductCatalog};
pub use config::AdminConfig;
pub use form::SavedRecord;
pub use ids::{BrandId, CategoryId, CustomerId, LineId, ProductId};
pub use money::{Money, MoneyParseError};
pub use pricing::{OrderLine, on_line_set_changed, on_product_selected, on_quantity_changed};
pub use records::{InMemoryRecords, StoredRecord};
pub use slug::slugify;
pub use validation::{FieldError, FieldErrors, InMemoryUniqueIndex, UniqueIndex};
