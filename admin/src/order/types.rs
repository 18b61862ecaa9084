//! Domain types for the order form.
//!
//! An order draft moves through one editing session: open, edit header fields
//! and lines (every line edit re-prices the line and the order), submit, and then
//! either saved or failed.

use crate::form::{SavedRecord, has_unsaved_edits};
use crate::ids::{CustomerId, LineId, ProductId};
use crate::money::Money;
use crate::pricing::OrderLine;
use crate::validation::FieldErrors;
use rand::Rng;
use serde::{Deserialize, Serialize};
use shopfront_core::persistence::RecordId;
use shopfront_macros::{Action, State};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle status chosen on the order form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Received, not yet worked on
    #[default]
    Pending,
    /// Being prepared
    Processing,
    /// Delivered
    Completed,
    /// Refused or cancelled
    Declined,
}

impl OrderStatus {
    /// All statuses, in form order
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Processing,
        Self::Completed,
        Self::Declined,
    ];

    /// Lowercase name as stored
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Declined => "declined",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown order status `{0}`")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Human-facing order number, e.g. `OR-48213`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Smallest generated sequence
    pub const MIN_SEQUENCE: u32 = 10_000;
    /// Largest generated sequence
    pub const MAX_SEQUENCE: u32 = 99_999;

    /// Builds a number from a prefix and a five-digit sequence
    #[must_use]
    pub fn new(prefix: &str, sequence: u32) -> Self {
        Self(format!("{prefix}{sequence}"))
    }

    /// Returns the number as text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of numbers for new orders
pub trait OrderNumbers: Send + Sync {
    /// Number for the next opened draft
    fn next_number(&self) -> OrderNumber;
}

/// Random five-digit numbers behind a fixed prefix
#[derive(Clone, Debug)]
pub struct RandomOrderNumbers {
    prefix: String,
}

impl RandomOrderNumbers {
    /// Creates a generator with the given prefix (usually `OR-`)
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for RandomOrderNumbers {
    fn default() -> Self {
        Self::new("OR-")
    }
}

impl OrderNumbers for RandomOrderNumbers {
    fn next_number(&self) -> OrderNumber {
        let sequence =
            rand::thread_rng().gen_range(OrderNumber::MIN_SEQUENCE..=OrderNumber::MAX_SEQUENCE);
        OrderNumber::new(&self.prefix, sequence)
    }
}

/// Always hands out the same number
#[derive(Clone, Debug)]
pub struct FixedOrderNumbers(OrderNumber);

impl FixedOrderNumbers {
    /// Creates a generator returning `number`
    #[must_use]
    pub const fn new(number: OrderNumber) -> Self {
        Self(number)
    }
}

impl OrderNumbers for FixedOrderNumbers {
    fn next_number(&self) -> OrderNumber {
        self.0.clone()
    }
}

/// The order being edited
#[derive(State, Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrderDraft {
    /// Stored order being edited (`None` until first saved)
    pub record_id: Option<RecordId>,
    /// Order number (assigned when the draft is opened)
    pub number: Option<OrderNumber>,
    /// Ordering customer
    pub customer_id: Option<CustomerId>,
    /// Shipping costs
    pub shipping_price: Option<Money>,
    /// Chosen status (`Pending` when left empty)
    pub status: Option<OrderStatus>,
    /// Free-form notes
    pub notes: String,
    /// Order lines, in the order they were added
    pub lines: Vec<OrderLine>,
    /// Sum of the line totals
    pub total: Money,
    /// Failures from the last submit
    pub errors: FieldErrors,
    /// Number of accepted edits
    #[revision]
    pub revision: u64,
    /// Last successful save
    pub saved: Option<SavedRecord>,
    /// Last save failure
    pub last_error: Option<String>,
}

impl OrderDraft {
    /// Creates an empty draft
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a line by key
    #[must_use]
    pub fn line(&self, id: LineId) -> Option<&OrderLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Looks up a line by key for editing
    pub fn line_mut(&mut self, id: LineId) -> Option<&mut OrderLine> {
        self.lines.iter_mut().find(|line| line.id == id)
    }

    /// Returns true if the draft has edits newer than the last save
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        has_unsaved_edits(self.revision, self.saved.as_ref())
    }
}

/// The record handed to persistence when an order is submitted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmission {
    /// Existing record being updated (`None` when creating)
    pub record_id: Option<RecordId>,
    /// Order number
    pub number: OrderNumber,
    /// Ordering customer
    pub customer_id: CustomerId,
    /// Shipping costs
    pub shipping_price: Money,
    /// Status
    pub status: OrderStatus,
    /// Notes
    pub notes: String,
    /// Priced lines
    pub lines: Vec<OrderLine>,
    /// Sum of the line totals
    pub total: Money,
}

/// Actions of the order form
///
/// Commands are user edits. Events record the derived changes the reducer
/// applies in response, and the outcome of saving.
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum OrderFormAction {
    // ========== Commands ==========
    /// Command: Start a new order
    #[command]
    OpenDraft,

    /// Command: Start editing a stored order
    #[command]
    Load {
        /// Id of the stored order
        record_id: RecordId,
        /// Stored values
        record: OrderSubmission,
    },

    /// Command: Append an empty line
    #[command]
    AddLine {
        /// Key for the new line
        line_id: LineId,
    },

    /// Command: Remove a line
    #[command]
    RemoveLine {
        /// Line to remove
        line_id: LineId,
    },

    /// Command: Select (or clear) the product of a line
    #[command]
    SelectProduct {
        /// Edited line
        line_id: LineId,
        /// Selected product
        product_id: Option<ProductId>,
    },

    /// Command: Change the quantity of a line
    #[command]
    ChangeQuantity {
        /// Edited line
        line_id: LineId,
        /// New quantity
        quantity: Option<u32>,
    },

    /// Command: Choose the customer
    #[command]
    SetCustomer {
        /// Selected customer
        customer_id: Option<CustomerId>,
    },

    /// Command: Enter shipping costs
    #[command]
    SetShippingPrice {
        /// Shipping costs
        shipping_price: Option<Money>,
    },

    /// Command: Choose the status
    #[command]
    SetStatus {
        /// Selected status
        status: Option<OrderStatus>,
    },

    /// Command: Edit the notes
    #[command]
    SetNotes {
        /// Notes text
        notes: String,
    },

    /// Command: Validate and save the order
    #[command]
    Submit,

    // ========== Events ==========
    /// Event: A draft was opened
    #[event]
    DraftOpened {
        /// Assigned order number
        number: OrderNumber,
    },

    /// Event: An empty line was appended
    #[event]
    LineAdded {
        /// Key of the new line
        line_id: LineId,
    },

    /// Event: A line was removed
    #[event]
    LineRemoved {
        /// Key of the removed line
        line_id: LineId,
    },

    /// Event: A line was priced for a product selection
    #[event]
    LinePriced {
        /// Priced line
        line_id: LineId,
        /// Selected product
        product_id: Option<ProductId>,
        /// Unit price snapshot
        unit_price: Option<Money>,
        /// Line total
        total_price: Option<Money>,
    },

    /// Event: A line total changed after a quantity edit
    #[event]
    LineTotalChanged {
        /// Edited line
        line_id: LineId,
        /// New quantity
        quantity: Option<u32>,
        /// New line total
        total_price: Option<Money>,
    },

    /// Event: The order total was recomputed
    #[event]
    TotalRecalculated {
        /// New order total
        total: Money,
    },

    /// Event: Submit was rejected by validation
    #[event]
    ValidationFailed {
        /// Rule failures
        errors: FieldErrors,
    },

    /// Event: The submission was saved
    #[event]
    Saved {
        /// Id the order was stored under
        record_id: RecordId,
        /// Draft revision that was submitted
        revision: u64,
    },

    /// Event: Saving failed
    #[event]
    SaveFailed {
        /// Error reported by persistence
        error: String,
    },
}
