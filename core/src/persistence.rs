//! Persistence seam for validated form records.
//!
//! Forms never talk to a database. When a draft passes validation the reducer
//! returns an effect that hands the finished record to a [`RecordSink`]; the sink
//! is whatever the surrounding application persists with (an ORM, an HTTP API, or
//! an in-memory recorder in tests).
//!
//! # Example
//!
//! ```no_run
//! use shopfront_core::persistence::{RecordId, RecordSink};
//!
//! async fn save_note<S: RecordSink<String>>(sink: &S) -> Result<RecordId, Box<dyn std::error::Error>> {
//!     let id = sink.save("call the supplier".to_string()).await?;
//!     Ok(id)
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Identifier assigned to a record by the persistence layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(u64);

impl RecordId {
    /// Creates a record id from its raw value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors a sink can report when saving a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The persistence layer refused the record (constraint violation, conflict).
    #[error("record rejected: {0}")]
    Rejected(String),

    /// The persistence layer could not be reached.
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

/// Destination for validated records.
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
/// so that environments can hold `Arc<dyn RecordSink<T>>` and reducers can move a
/// clone of it into an effect.
pub trait RecordSink<T>: Send + Sync {
    /// Persist a record and return the id it was stored under.
    ///
    /// # Errors
    ///
    /// - `Rejected`: the record violates a persistence-side constraint
    /// - `Unavailable`: the backing store could not be reached
    fn save(
        &self,
        record: T,
    ) -> Pin<Box<dyn Future<Output = Result<RecordId, SinkError>> + Send + '_>>;
}
