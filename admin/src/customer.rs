//! Customer editing session.
//!
//! All fields are required. The email must be unique across customers and the
//! date of birth may not lie in the future, as seen by the environment clock.

use crate::form::{SavedRecord, has_unsaved_edits};
use crate::validation::{
    FieldErrors, MAX_TEXT_LENGTH, UniqueIndex, email, max_length, not_after, required,
    required_text, unique,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shopfront_core::effect::Effect;
use shopfront_core::environment::Clock;
use shopfront_core::persistence::{RecordId, RecordSink};
use shopfront_core::reducer::Reducer;
use shopfront_core::{SmallVec, save_record, smallvec};
use shopfront_macros::{Action, State};
use shopfront_runtime::metrics::FormMetrics;
use std::sync::Arc;

/// Unique index column for customer emails
pub const EMAIL_COLUMN: &str = "customers.email";

/// A customer as persisted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Existing record being updated (`None` when creating)
    pub record_id: Option<RecordId>,
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Date of birth
    pub date_of_birth: NaiveDate,
    /// City
    pub city: String,
    /// Postal code
    pub zip_code: String,
    /// Street address
    pub address: String,
}

/// The customer being edited
#[derive(State, Clone, Debug, Default, Serialize, Deserialize)]
pub struct CustomerDraft {
    /// Record being edited (`None` for a new customer)
    pub record_id: Option<RecordId>,
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Date of birth
    pub date_of_birth: Option<NaiveDate>,
    /// City
    pub city: String,
    /// Postal code
    pub zip_code: String,
    /// Street address
    pub address: String,
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

impl CustomerDraft {
    /// Creates an empty draft
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the draft has edits newer than the last save
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        has_unsaved_edits(self.revision, self.saved.as_ref())
    }

    fn to_record(&self) -> Option<CustomerRecord> {
        Some(CustomerRecord {
            record_id: self.record_id,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            date_of_birth: self.date_of_birth?,
            city: self.city.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
            address: self.address.trim().to_string(),
        })
    }
}

/// Actions of the customer form
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CustomerFormAction {
    /// Command: Start editing an existing customer
    #[command]
    Load {
        /// Id of the stored customer
        record_id: RecordId,
        /// Stored values
        record: CustomerRecord,
    },
    /// Command: Edit the name
    #[command]
    SetName {
        /// New name
        name: String,
    },
    /// Command: Edit the email address
    #[command]
    SetEmail {
        /// New email
        email: String,
    },
    /// Command: Edit the phone number
    #[command]
    SetPhone {
        /// New phone number
        phone: String,
    },
    /// Command: Pick the date of birth
    #[command]
    SetDateOfBirth {
        /// New date
        date_of_birth: Option<NaiveDate>,
    },
    /// Command: Edit the city
    #[command]
    SetCity {
        /// New city
        city: String,
    },
    /// Command: Edit the postal code
    #[command]
    SetZipCode {
        /// New postal code
        zip_code: String,
    },
    /// Command: Edit the street address
    #[command]
    SetAddress {
        /// New address
        address: String,
    },
    /// Command: Validate and save
    #[command]
    Submit,

    /// Event: Submit was rejected by validation
    #[event]
    ValidationFailed {
        /// Rule failures
        errors: FieldErrors,
    },
    /// Event: The customer was saved
    #[event]
    Saved {
        /// Id the customer was stored under
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

/// Environment for the customer form
#[derive(Clone)]
pub struct CustomerFormEnvironment {
    /// Source of "today" for the date of birth rule
    pub clock: Arc<dyn Clock>,
    /// Email uniqueness lookup
    pub unique: Arc<dyn UniqueIndex>,
    /// Destination of saved customers
    pub customers: Arc<dyn RecordSink<CustomerRecord>>,
}

impl CustomerFormEnvironment {
    /// Creates a new customer form environment
    pub fn new(
        clock: Arc<dyn Clock>,
        unique: Arc<dyn UniqueIndex>,
        customers: Arc<dyn RecordSink<CustomerRecord>>,
    ) -> Self {
        Self {
            clock,
            unique,
            customers,
        }
    }
}

/// Reducer for the customer form
#[derive(Clone, Debug, Default)]
pub struct CustomerFormReducer;

impl CustomerFormReducer {
    /// Creates a new customer form reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate_submit(state: &CustomerDraft, env: &CustomerFormEnvironment) -> FieldErrors {
        let mut errors = FieldErrors::new();

        for (field, value) in [
            ("name", state.name.trim()),
            ("city", state.city.trim()),
            ("address", state.address.trim()),
        ] {
            errors.check(field, required_text(value));
            errors.check(field, max_length(value, MAX_TEXT_LENGTH));
        }

        let address = state.email.trim();
        errors.check("email", required_text(address));
        if !address.is_empty() {
            errors.check("email", email(address));
            errors.check(
                "email",
                unique(env.unique.as_ref(), EMAIL_COLUMN, address, state.record_id),
            );
        }

        errors.check("phone", required_text(state.phone.trim()));
        errors.check("zip_code", required_text(state.zip_code.trim()));

        errors.check("date_of_birth", required(state.date_of_birth.as_ref()));
        if let Some(born) = state.date_of_birth {
            let today = env.clock.now().date_naive();
            errors.check("date_of_birth", not_after(born, today));
        }

        errors
    }
}

impl Reducer for CustomerFormReducer {
    type State = CustomerDraft;
    type Action = CustomerFormAction;
    type Environment = CustomerFormEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(action = action.action_name(), "Customer form action");

        match action {
            CustomerFormAction::Load { record_id, record } => {
                *state = CustomerDraft {
                    record_id: Some(record_id),
                    name: record.name,
                    email: record.email,
                    phone: record.phone,
                    date_of_birth: Some(record.date_of_birth),
                    city: record.city,
                    zip_code: record.zip_code,
                    address: record.address,
                    ..CustomerDraft::new()
                };
                return SmallVec::new();
            },
            CustomerFormAction::SetName { name } => state.name = name,
            CustomerFormAction::SetEmail { email } => state.email = email,
            CustomerFormAction::SetPhone { phone } => state.phone = phone,
            CustomerFormAction::SetDateOfBirth { date_of_birth } => {
                state.date_of_birth = date_of_birth;
            },
            CustomerFormAction::SetCity { city } => state.city = city,
            CustomerFormAction::SetZipCode { zip_code } => state.zip_code = zip_code,
            CustomerFormAction::SetAddress { address } => state.address = address,
            CustomerFormAction::Submit => {
                let errors = Self::validate_submit(state, env);
                if !errors.is_empty() {
                    tracing::warn!(errors = ?errors.messages(), "Customer submit failed validation");
                    FormMetrics::record_validation_failure("customer", errors.len());
                    state.errors = errors;
                    return smallvec![Effect::None];
                }
                state.errors.clear();

                let Some(record) = state.to_record() else {
                    return smallvec![Effect::None];
                };
                let revision = state.revision();
                return smallvec![save_record! {
                    sink: env.customers,
                    record: record,
                    on_success: |record_id| {
                        FormMetrics::record_save("customer", true);
                        Some(CustomerFormAction::Saved { record_id, revision })
                    },
                    on_error: |error| {
                        FormMetrics::record_save("customer", false);
                        Some(CustomerFormAction::SaveFailed { error: error.to_string() })
                    }
                }];
            },
            CustomerFormAction::ValidationFailed { errors } => {
                state.errors = errors;
                return SmallVec::new();
            },
            CustomerFormAction::Saved {
                record_id,
                revision,
            } => {
                state.record_id = Some(record_id);
                state.saved = Some(SavedRecord {
                    record_id,
                    revision,
                });
                state.last_error = None;
                return SmallVec::new();
            },
            CustomerFormAction::SaveFailed { error } => {
                tracing::warn!(%error, "Customer save failed");
                state.last_error = Some(error);
                return SmallVec::new();
            },
        }

        state.bump_revision();
        SmallVec::new()
    }
}
