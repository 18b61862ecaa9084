//! In-memory record storage.
//!
//! [`InMemoryRecords`] is a [`RecordSink`] keyed by [`RecordId`]: a record
//! without an id is inserted under the next free id, a record carrying an id
//! replaces the stored one.

use crate::brand::BrandRecord;
use crate::customer::CustomerRecord;
use crate::order::OrderSubmission;
use crate::product::ProductRecord;
use shopfront_core::persistence::{RecordId, RecordSink, SinkError};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};

/// A record that knows which stored record it updates
pub trait StoredRecord {
    /// Id of the stored record, `None` for a new one
    fn record_id(&self) -> Option<RecordId>;

    /// Stamps the id the record was stored under
    fn set_record_id(&mut self, id: RecordId);
}

macro_rules! stored_record {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StoredRecord for $ty {
                fn record_id(&self) -> Option<RecordId> {
                    self.record_id
                }

                fn set_record_id(&mut self, id: RecordId) {
                    self.record_id = Some(id);
                }
            }
        )*
    };
}

stored_record!(OrderSubmission, BrandRecord, ProductRecord, CustomerRecord);

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<RecordId, T>,
    next_id: u64,
}

/// Records held in memory, in id order
#[derive(Debug)]
pub struct InMemoryRecords<T> {
    table: Mutex<Table<T>>,
}

impl<T> InMemoryRecords<T> {
    /// Creates an empty store
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rows
            .len()
    }

    /// Returns true if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> InMemoryRecords<T> {
    /// Looks up a stored record
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<T> {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rows
            .get(&id)
            .cloned()
    }

    /// Snapshot of every stored record, in id order
    #[must_use]
    pub fn all(&self) -> Vec<T> {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rows
            .values()
            .cloned()
            .collect()
    }
}

impl<T> Default for InMemoryRecords<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StoredRecord + Send + 'static> RecordSink<T> for InMemoryRecords<T> {
    fn save(
        &self,
        mut record: T,
    ) -> Pin<Box<dyn Future<Output = Result<RecordId, SinkError>> + Send + '_>> {
        Box::pin(async move {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            let id = match record.record_id() {
                Some(id) if table.rows.contains_key(&id) => id,
                Some(id) => return Err(SinkError::Rejected(format!("no record with id {id}"))),
                None => {
                    let id = RecordId::new(table.next_id);
                    table.next_id += 1;
                    record.set_record_id(id);
                    id
                },
            };
            table.rows.insert(id, record);
            tracing::debug!(%id, "Stored record");
            Ok(id)
        })
    }
}
