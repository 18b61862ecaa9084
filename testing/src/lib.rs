//! # Shopfront Testing
//!
//! Testing utilities and helpers for Shopfront form reducers.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (clock, record sinks)
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use shopfront_testing::{RecordingSink, test_clock};
//! use shopfront_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_brand_submit() {
//!     let sink = Arc::new(RecordingSink::new());
//!     let store = Store::new(BrandDraft::default(), BrandFormReducer::new(), env(sink.clone()));
//!
//!     store.send(BrandFormAction::SetName { name: "Acme Tools".into() }).await?;
//!     store.send(BrandFormAction::Submit).await?.wait().await;
//!
//!     assert_eq!(sink.records()[0].slug, "acme-tools");
//! }
//! ```

use chrono::{DateTime, Utc};
use shopfront_core::environment::Clock;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use shopfront_core::persistence::{RecordId, RecordSink, SinkError};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use shopfront_testing::mocks::FixedClock;
    /// use shopfront_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// In-memory sink that keeps every record it accepts
    ///
    /// Ids are handed out sequentially starting at 1.
    ///
    /// # Example
    ///
    /// ```
    /// use shopfront_testing::mocks::RecordingSink;
    /// use shopfront_core::persistence::{RecordId, RecordSink};
    ///
    /// # tokio_test::block_on(async {
    /// let sink = RecordingSink::new();
    /// let id = sink.save("first".to_string()).await;
    /// assert_eq!(id, Ok(RecordId::new(1)));
    /// assert_eq!(sink.records(), vec!["first".to_string()]);
    /// # });
    /// ```
    #[derive(Debug)]
    pub struct RecordingSink<T> {
        records: Mutex<Vec<T>>,
        next_id: AtomicU64,
    }

    impl<T> RecordingSink<T> {
        /// Create an empty sink
        #[must_use]
        pub const fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }
        }

        /// Number of records saved so far
        #[must_use]
        pub fn len(&self) -> usize {
            self.records
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Returns true if nothing has been saved
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    impl<T: Clone> RecordingSink<T> {
        /// Snapshot of every saved record, in save order
        #[must_use]
        pub fn records(&self) -> Vec<T> {
            self.records
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl<T> Default for RecordingSink<T> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<T: Send + 'static> RecordSink<T> for RecordingSink<T> {
        fn save(
            &self,
            record: T,
        ) -> Pin<Box<dyn Future<Output = Result<RecordId, SinkError>> + Send + '_>> {
            Box::pin(async move {
                let id = RecordId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
                self.records
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(record);
                tracing::debug!(%id, "Recorded save");
                Ok(id)
            })
        }
    }

    /// Sink that fails every save with the configured error
    #[derive(Debug, Clone)]
    pub struct FailingSink {
        error: SinkError,
    }

    impl FailingSink {
        /// Sink that reports the backing store as unreachable
        #[must_use]
        pub fn unavailable(message: impl Into<String>) -> Self {
            Self {
                error: SinkError::Unavailable(message.into()),
            }
        }

        /// Sink that rejects every record
        #[must_use]
        pub fn rejecting(message: impl Into<String>) -> Self {
            Self {
                error: SinkError::Rejected(message.into()),
            }
        }
    }

    impl<T: Send + 'static> RecordSink<T> for FailingSink {
        fn save(
            &self,
            _record: T,
        ) -> Pin<Box<dyn Future<Output = Result<RecordId, SinkError>> + Send + '_>> {
            let error = self.error.clone();
            Box::pin(async move { Err(error) })
        }
    }
}

/// Reducer test harness
pub mod reducer_test;

// Re-export commonly used items
pub use mocks::{FailingSink, FixedClock, RecordingSink, test_clock};
pub use reducer_test::{ReducerTest, assertions};
