//! Product editing session.

use crate::form::{SavedRecord, has_unsaved_edits};
use crate::ids::{BrandId, CategoryId};
use crate::money::Money;
use crate::slug::slugify;
use crate::validation::{
    FieldError, FieldErrors, MAX_TEXT_LENGTH, UniqueIndex, max_length, min_money, required,
    required_text, unique,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shopfront_core::effect::Effect;
use shopfront_core::persistence::{RecordId, RecordSink};
use shopfront_core::reducer::Reducer;
use shopfront_core::{SmallVec, save_record, smallvec};
use shopfront_macros::{Action, State};
use shopfront_runtime::metrics::FormMetrics;
use std::sync::Arc;

/// Unique index column for product names
pub const NAME_COLUMN: &str = "products.name";

/// Unique index column for product slugs
pub const SLUG_COLUMN: &str = "products.slug";

/// Lowest accepted product price
pub const MIN_PRICE: Money = Money::from_major(1);

/// How a product reaches the customer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    /// Delivered as a download
    Downloadable,
    /// Shipped physically
    Deliverable,
}

/// A product as persisted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Existing record being updated (`None` when creating)
    pub record_id: Option<RecordId>,
    /// Display name
    pub name: String,
    /// URL slug
    pub slug: String,
    /// Description
    pub description: String,
    /// Unit price
    pub price: Money,
    /// Stock keeping unit
    pub sku: String,
    /// Units in stock
    pub quantity: u32,
    /// Delivery kind
    pub kind: Option<ProductKind>,
    /// Listed in sales channels
    pub visible: bool,
    /// Featured on the storefront
    pub featured: bool,
    /// Publication date
    pub published_at: NaiveDate,
    /// Brand
    pub brand_id: BrandId,
    /// Categories
    pub category_ids: Vec<CategoryId>,
}

/// The product being edited
#[derive(State, Clone, Debug, Serialize, Deserialize)]
pub struct ProductDraft {
    /// Record being edited (`None` for a new product)
    pub record_id: Option<RecordId>,
    /// Display name
    pub name: String,
    /// Slug derived from `name`
    pub slug: String,
    /// Description
    pub description: String,
    /// Unit price
    pub price: Option<Money>,
    /// Stock keeping unit
    pub sku: String,
    /// Units in stock
    pub quantity: Option<u32>,
    /// Delivery kind
    pub kind: Option<ProductKind>,
    /// Listed in sales channels
    pub visible: bool,
    /// Featured on the storefront
    pub featured: bool,
    /// Publication date
    pub published_at: Option<NaiveDate>,
    /// Brand
    pub brand_id: Option<BrandId>,
    /// Categories
    pub category_ids: Vec<CategoryId>,
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

impl ProductDraft {
    /// Creates an empty draft (visible and featured by default)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            record_id: None,
            name: String::new(),
            slug: String::new(),
            description: String::new(),
            price: None,
            sku: String::new(),
            quantity: None,
            kind: None,
            visible: true,
            featured: true,
            published_at: None,
            brand_id: None,
            category_ids: Vec::new(),
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

    /// Builds the persisted record, if every required field is present
    fn to_record(&self) -> Option<ProductRecord> {
        Some(ProductRecord {
            record_id: self.record_id,
            name: self.name.trim().to_string(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            price: self.price?,
            sku: self.sku.trim().to_string(),
            quantity: self.quantity?,
            kind: self.kind,
            visible: self.visible,
            featured: self.featured,
            published_at: self.published_at?,
            brand_id: self.brand_id?,
            category_ids: self.category_ids.clone(),
        })
    }
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// Actions of the product form
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ProductFormAction {
    /// Command: Start editing an existing product
    #[command]
    Load {
        /// Id of the stored product
        record_id: RecordId,
        /// Stored values
        record: ProductRecord,
    },
    /// Command: Edit the name
    #[command]
    SetName {
        /// New name
        name: String,
    },
    /// Command: Edit the description
    #[command]
    SetDescription {
        /// New description
        description: String,
    },
    /// Command: Enter the price
    #[command]
    SetPrice {
        /// New price
        price: Option<Money>,
    },
    /// Command: Enter the SKU
    #[command]
    SetSku {
        /// New SKU
        sku: String,
    },
    /// Command: Enter the stock quantity
    #[command]
    SetQuantity {
        /// New quantity
        quantity: Option<u32>,
    },
    /// Command: Choose the delivery kind
    #[command]
    SetKind {
        /// New kind
        kind: Option<ProductKind>,
    },
    /// Command: Toggle visibility
    #[command]
    SetVisible {
        /// Listed in sales channels
        visible: bool,
    },
    /// Command: Toggle featured
    #[command]
    SetFeatured {
        /// Featured on the storefront
        featured: bool,
    },
    /// Command: Pick the publication date
    #[command]
    SetPublishedAt {
        /// New date
        published_at: Option<NaiveDate>,
    },
    /// Command: Choose the brand
    #[command]
    SetBrand {
        /// New brand
        brand_id: Option<BrandId>,
    },
    /// Command: Choose the categories
    #[command]
    SetCategories {
        /// New categories
        category_ids: Vec<CategoryId>,
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
    /// Event: The product was saved
    #[event]
    Saved {
        /// Id the product was stored under
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

/// Environment for the product form
#[derive(Clone)]
pub struct ProductFormEnvironment {
    /// Name and slug uniqueness lookup
    pub unique: Arc<dyn UniqueIndex>,
    /// Destination of saved products
    pub products: Arc<dyn RecordSink<ProductRecord>>,
}

impl ProductFormEnvironment {
    /// Creates a new product form environment
    pub fn new(
        unique: Arc<dyn UniqueIndex>,
        products: Arc<dyn RecordSink<ProductRecord>>,
    ) -> Self {
        Self { unique, products }
    }
}

/// Reducer for the product form
#[derive(Clone, Debug, Default)]
pub struct ProductFormReducer;

impl ProductFormReducer {
    /// Creates a new product form reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate_submit(state: &ProductDraft, env: &ProductFormEnvironment) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let index = env.unique.as_ref();
        let name = state.name.trim();

        errors.check("name", required_text(name));
        errors.check("name", max_length(name, MAX_TEXT_LENGTH));
        if !name.is_empty() {
            errors.check("name", unique(index, NAME_COLUMN, name, state.record_id));
        }

        errors.check("slug", required_text(&state.slug));
        if !state.slug.is_empty() {
            errors.check("slug", unique(index, SLUG_COLUMN, &state.slug, state.record_id));
        }

        match state.price {
            Some(price) => errors.check("price", min_money(price, MIN_PRICE)),
            None => errors.add("price", FieldError::Required),
        }
        errors.check("sku", required_text(&state.sku));
        errors.check("quantity", required(state.quantity.as_ref()));
        errors.check("published_at", required(state.published_at.as_ref()));
        errors.check("brand_id", required(state.brand_id.as_ref()));
        errors.check("category_ids", required(state.category_ids.first()));

        errors
    }
}

impl Reducer for ProductFormReducer {
    type State = ProductDraft;
    type Action = ProductFormAction;
    type Environment = ProductFormEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per form field
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(action = action.action_name(), "Product form action");

        match action {
            ProductFormAction::Load { record_id, record } => {
                *state = ProductDraft {
                    record_id: Some(record_id),
                    name: record.name,
                    slug: record.slug,
                    description: record.description,
                    price: Some(record.price),
                    sku: record.sku,
                    quantity: Some(record.quantity),
                    kind: record.kind,
                    visible: record.visible,
                    featured: record.featured,
                    published_at: Some(record.published_at),
                    brand_id: Some(record.brand_id),
                    category_ids: record.category_ids,
                    ..ProductDraft::new()
                };
                return SmallVec::new();
            },
            ProductFormAction::SetName { name } => {
                state.slug = slugify(&name);
                state.name = name;
            },
            ProductFormAction::SetDescription { description } => state.description = description,
            ProductFormAction::SetPrice { price } => state.price = price,
            ProductFormAction::SetSku { sku } => state.sku = sku,
            ProductFormAction::SetQuantity { quantity } => state.quantity = quantity,
            ProductFormAction::SetKind { kind } => state.kind = kind,
            ProductFormAction::SetVisible { visible } => state.visible = visible,
            ProductFormAction::SetFeatured { featured } => state.featured = featured,
            ProductFormAction::SetPublishedAt { published_at } => {
                state.published_at = published_at;
            },
            ProductFormAction::SetBrand { brand_id } => state.brand_id = brand_id,
            ProductFormAction::SetCategories { mut category_ids } => {
                category_ids.sort_unstable();
                category_ids.dedup();
                state.category_ids = category_ids;
            },
            ProductFormAction::Submit => {
                let errors = Self::validate_submit(state, env);
                if !errors.is_empty() {
                    tracing::warn!(errors = ?errors.messages(), "Product submit failed validation");
                    FormMetrics::record_validation_failure("product", errors.len());
                    state.errors = errors;
                    return smallvec![Effect::None];
                }
                state.errors.clear();

                let Some(record) = state.to_record() else {
                    return smallvec![Effect::None];
                };
                let revision = state.revision();
                return smallvec![save_record! {
                    sink: env.products,
                    record: record,
                    on_success: |record_id| {
                        FormMetrics::record_save("product", true);
                        Some(ProductFormAction::Saved { record_id, revision })
                    },
                    on_error: |error| {
                        FormMetrics::record_save("product", false);
                        Some(ProductFormAction::SaveFailed { error: error.to_string() })
                    }
                }];
            },
            ProductFormAction::ValidationFailed { errors } => {
                state.errors = errors;
                return SmallVec::new();
            },
            ProductFormAction::Saved {
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
            ProductFormAction::SaveFailed { error } => {
                tracing::warn!(%error, "Product save failed");
                state.last_error = Some(error);
                return SmallVec::new();
            },
        }

        // Field edits fall through to here
        state.bump_revision();
        SmallVec::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::validation::InMemoryUniqueIndex;
    use shopfront_testing::{RecordingSink, ReducerTest, assertions};

    fn test_env() -> ProductFormEnvironment {
        ProductFormEnvironment::new(
            Arc::new(
                InMemoryUniqueIndex::new()
                    .with_entry(SLUG_COLUMN, "moka-pot", RecordId::new(3))
                    .with_entry(NAME_COLUMN, "Moka Pot", RecordId::new(3)),
            ),
            Arc::new(RecordingSink::<ProductRecord>::new()),
        )
    }

    fn complete_edits(name: &str) -> Vec<ProductFormAction> {
        vec![
            ProductFormAction::SetName {
                name: name.to_string(),
            },
            ProductFormAction::SetPrice {
                price: Some(Money::from_cents(2499)),
            },
            ProductFormAction::SetSku {
                sku: "KET-001".to_string(),
            },
            ProductFormAction::SetQuantity { quantity: Some(12) },
            ProductFormAction::SetPublishedAt {
                published_at: NaiveDate::from_ymd_opt(2024, 6, 1),
            },
            ProductFormAction::SetBrand {
                brand_id: Some(BrandId::new(2)),
            },
            ProductFormAction::SetCategories {
                category_ids: vec![CategoryId::new(5), CategoryId::new(1), CategoryId::new(5)],
            },
        ]
    }

    #[test]
    fn defaults_are_visible_and_featured() {
        let draft = ProductDraft::default();
        assert!(draft.visible);
        assert!(draft.featured);
        assert!(!draft.is_dirty());
    }

    #[test]
    fn edits_derive_slug_and_track_revision() {
        ReducerTest::new(ProductFormReducer::new())
            .with_env(test_env())
            .given_state(ProductDraft::new())
            .when_actions(complete_edits("Gooseneck Kettle"))
            .then_state(|draft| {
                assert_eq!(draft.slug, "gooseneck-kettle");
                assert_eq!(draft.category_ids, vec![CategoryId::new(1), CategoryId::new(5)]);
                assert_eq!(draft.revision(), 7);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn complete_draft_submits() {
        let mut actions = complete_edits("Gooseneck Kettle");
        actions.push(ProductFormAction::Submit);

        ReducerTest::new(ProductFormReducer::new())
            .with_env(test_env())
            .given_state(ProductDraft::new())
            .when_actions(actions)
            .then_state(|draft| assert!(draft.errors.is_empty()))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn empty_draft_reports_every_required_field() {
        ReducerTest::new(ProductFormReducer::new())
            .with_env(test_env())
            .given_state(ProductDraft::new())
            .when_action(ProductFormAction::Submit)
            .then_state(|draft| {
                for field in [
                    "name",
                    "slug",
                    "price",
                    "sku",
                    "quantity",
                    "published_at",
                    "brand_id",
                    "category_ids",
                ] {
                    assert_eq!(draft.errors.for_field(field), vec![&FieldError::Required], "{field}");
                }
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn price_below_one_is_rejected() {
        let mut actions = complete_edits("Gooseneck Kettle");
        actions.push(ProductFormAction::SetPrice {
            price: Some(Money::from_cents(99)),
        });
        actions.push(ProductFormAction::Submit);

        ReducerTest::new(ProductFormReducer::new())
            .with_env(test_env())
            .given_state(ProductDraft::new())
            .when_actions(actions)
            .then_state(|draft| {
                assert_eq!(
                    draft.errors.for_field("price"),
                    vec![&FieldError::BelowMinimum { min: MIN_PRICE }]
                );
            })
            .run();
    }

    #[test]
    fn taken_name_and_slug_are_rejected() {
        let mut actions = complete_edits("Moka Pot");
        actions.push(ProductFormAction::Submit);

        ReducerTest::new(ProductFormReducer::new())
            .with_env(test_env())
            .given_state(ProductDraft::new())
            .when_actions(actions)
            .then_state(|draft| {
                assert_eq!(draft.errors.for_field("name"), vec![&FieldError::Taken]);
                assert_eq!(draft.errors.for_field("slug"), vec![&FieldError::Taken]);
            })
            .run();
    }

    #[tokio::test]
    async fn saved_record_carries_fields() {
        let sink = Arc::new(RecordingSink::<ProductRecord>::new());
        let env = ProductFormEnvironment::new(Arc::new(InMemoryUniqueIndex::new()), sink.clone());
        let reducer = ProductFormReducer::new();
        let mut draft = ProductDraft::new();

        for action in complete_edits("Gooseneck Kettle") {
            let _ = reducer.reduce(&mut draft, action, &env);
        }
        let mut effects = reducer.reduce(&mut draft, ProductFormAction::Submit, &env);
        let Some(Effect::Future(fut)) = effects.pop() else {
            unreachable!("valid submit returns a future effect");
        };
        let feedback = fut.await.unwrap();
        let _ = reducer.reduce(&mut draft, feedback, &env);

        let record = &sink.records()[0];
        assert_eq!(record.price, Money::from_cents(2499));
        assert_eq!(record.quantity, 12);
        assert!(record.visible && record.featured);
        assert_eq!(draft.saved.map(|s| s.revision), Some(7));
        assert!(!draft.is_dirty());
    }
}
