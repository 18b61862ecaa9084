//! Brand editing session.
//!
//! The slug follows the name as it is typed; on submit the name, website and
//! color are checked and the slug must not belong to another brand.

use crate::form::{SavedRecord, has_unsaved_edits};
use crate::slug::slugify;
use crate::validation::{
    FieldErrors, MAX_TEXT_LENGTH, UniqueIndex, hex_color, max_length, required_text, unique,
};
use serde::{Deserialize, Serialize};
use shopfront_core::effect::Effect;
use shopfront_core::persistence::{RecordId, RecordSink};
use shopfront_core::reducer::Reducer;
use shopfront_core::{SmallVec, save_record, smallvec};
use shopfront_macros::{Action, State};
use shopfront_runtime::metrics::FormMetrics;
use std::sync::Arc;

/// Unique index column for brand slugs
pub const SLUG_COLUMN: &str = "brands.slug";

/// A brand as persisted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandRecord {
    /// Existing record being updated (`None` when creating)
    pub record_id: Option<RecordId>,
    /// Display name
    pub name: String,
    /// URL slug derived from the name
    pub slug: String,
    /// Website
    pub url: String,
    /// Shown to customers
    pub is_visible: bool,
    /// Primary color as `#rrggbb`
    pub primary_hex: Option<String>,
    /// Rich-text description
    pub description: String,
}

/// The brand being edited
#[derive(State, Clone, Debug, Serialize, Deserialize)]
pub struct BrandDraft {
    /// Record being edited (`None` for a new brand)
    pub record_id: Option<RecordId>,
    /// Display name
    pub name: String,
    /// Slug derived from `name`
    pub slug: String,
    /// Website
    pub url: String,
    /// Shown to customers
    pub is_visible: bool,
    /// Primary color
    pub primary_hex: Option<String>,
    /// Description
    pub description: String,
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

impl BrandDraft {
    /// Creates an empty draft (visible by default)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            record_id: None,
            name: String::new(),
            slug: String::new(),
            url: String::new(),
            is_visible: true,
            primary_hex: None,
            description: String::new(),
            errors: FieldErrors::new(),
            revision: 0,
            saved: None,
            last_error: None,
        }
    }

    /// Returns true if the draft has edits newer than the last save
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        has_unsaved_edits(self.revision, self.saved.as_ref())
    }

    fn to_record(&self) -> BrandRecord {
        BrandRecord {
            record_id: self.record_id,
            name: self.name.trim().to_string(),
            slug: self.slug.clone(),
            url: self.url.trim().to_string(),
            is_visible: self.is_visible,
            primary_hex: self.primary_hex.clone(),
            description: self.description.clone(),
        }
    }
}

impl Default for BrandDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// Actions of the brand form
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BrandFormAction {
    /// Command: Start editing an existing brand
    #[command]
    Load {
        /// Id of the stored brand
        record_id: RecordId,
        /// Stored values
        record: BrandRecord,
    },

    /// Command: Edit the name
    #[command]
    SetName {
        /// New name
        name: String,
    },

    /// Command: Edit the website
    #[command]
    SetUrl {
        /// New website
        url: String,
    },

    /// Command: Toggle visibility
    #[command]
    SetVisibility {
        /// Shown to customers
        is_visible: bool,
    },

    /// Command: Pick (or clear) the primary color
    #[command]
    SetPrimaryColor {
        /// New color
        primary_hex: Option<String>,
    },

    /// Command: Edit the description
    #[command]
    SetDescription {
        /// New description
        description: String,
    },

    /// Command: Validate and save
    #[command]
    Submit,

    /// Event: The slug was derived from the name
    #[event]
    SlugDerived {
        /// New slug
        slug: String,
    },

    /// Event: Submit was rejected by validation
    #[event]
    ValidationFailed {
        /// Rule failures
        errors: FieldErrors,
    },

    /// Event: The brand was saved
    #[event]
    Saved {
        /// Id the brand was stored under
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

/// Environment for the brand form
#[derive(Clone)]
pub struct BrandFormEnvironment {
    /// Slug uniqueness lookup
    pub unique: Arc<dyn UniqueIndex>,
    /// Destination of saved brands
    pub brands: Arc<dyn RecordSink<BrandRecord>>,
}

impl BrandFormEnvironment {
    /// Creates a new brand form environment
    pub fn new(unique: Arc<dyn UniqueIndex>, brands: Arc<dyn RecordSink<BrandRecord>>) -> Self {
        Self { unique, brands }
    }
}

/// Reducer for the brand form
#[derive(Clone, Debug, Default)]
pub struct BrandFormReducer;

impl BrandFormReducer {
    /// Creates a new brand form reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate_submit(state: &BrandDraft, env: &BrandFormEnvironment) -> FieldErrors {
        let mut errors = FieldErrors::new();

        errors.check("name", required_text(&state.name));
        errors.check("name", max_length(&state.name, MAX_TEXT_LENGTH));
        if !state.slug.is_empty() {
            errors.check(
                "slug",
                unique(env.unique.as_ref(), SLUG_COLUMN, &state.slug, state.record_id),
            );
        }
        errors.check("url", required_text(&state.url));
        errors.check("url", max_length(&state.url, MAX_TEXT_LENGTH));
        if let Some(color) = &state.primary_hex {
            errors.check("primary_hex", hex_color(color));
        }

        errors
    }
}

impl Reducer for BrandFormReducer {
    type State = BrandDraft;
    type Action = BrandFormAction;
    type Environment = BrandFormEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(action = action.action_name(), "Brand form action");

        match action {
            BrandFormAction::Load { record_id, record } => {
                *state = BrandDraft {
                    record_id: Some(record_id),
                    name: record.name,
                    slug: record.slug,
                    url: record.url,
                    is_visible: record.is_visible,
                    primary_hex: record.primary_hex,
                    description: record.description,
                    ..BrandDraft::new()
                };
                SmallVec::new()
            },
            BrandFormAction::SetName { name } => {
                let slug = slugify(&name);
                state.name = name;
                state.slug = slug;
                state.bump_revision();
                SmallVec::new()
            },
            BrandFormAction::SetUrl { url } => {
                state.url = url;
                state.bump_revision();
                SmallVec::new()
            },
            BrandFormAction::SetVisibility { is_visible } => {
                state.is_visible = is_visible;
                state.bump_revision();
                SmallVec::new()
            },
            BrandFormAction::SetPrimaryColor { primary_hex } => {
                state.primary_hex = primary_hex.filter(|hex| !hex.trim().is_empty());
                state.bump_revision();
                SmallVec::new()
            },
            BrandFormAction::SetDescription { description } => {
                state.description = description;
                state.bump_revision();
                SmallVec::new()
            },
            BrandFormAction::Submit => {
                let errors = Self::validate_submit(state, env);
                if !errors.is_empty() {
                    tracing::warn!(errors = ?errors.messages(), "Brand submit failed validation");
                    FormMetrics::record_validation_failure("brand", errors.len());
                    state.errors = errors;
                    return smallvec![Effect::None];
                }
                state.errors.clear();

                let revision = state.revision();
                smallvec![save_record! {
                    sink: env.brands,
                    record: state.to_record(),
                    on_success: |record_id| {
                        FormMetrics::record_save("brand", true);
                        Some(BrandFormAction::Saved { record_id, revision })
                    },
                    on_error: |error| {
                        FormMetrics::record_save("brand", false);
                        Some(BrandFormAction::SaveFailed { error: error.to_string() })
                    }
                }]
            },
            BrandFormAction::SlugDerived { slug } => {
                state.slug = slug;
                SmallVec::new()
            },
            BrandFormAction::ValidationFailed { errors } => {
                state.errors = errors;
                SmallVec::new()
            },
            BrandFormAction::Saved {
                record_id,
                revision,
            } => {
                state.record_id = Some(record_id);
                state.saved = Some(SavedRecord {
                    record_id,
                    revision,
                });
                state.last_error = None;
                SmallVec::new()
            },
            BrandFormAction::SaveFailed { error } => {
                tracing::warn!(%error, "Brand save failed");
                state.last_error = Some(error);
                SmallVec::new()
            },
        }
    }
}
