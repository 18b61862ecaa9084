//! Order form reducer.
//!
//! Every edit command is translated into the matching pricing operation; its
//! results are applied as events, and the order total is recomputed after any
//! line mutation. `Submit` validates the draft and hands an
//! [`OrderSubmission`] to the order sink.

use crate::catalog::ProductCatalog;
use crate::form::SavedRecord;
use crate::money::Money;
use crate::order::types::{
    OrderDraft, OrderFormAction, OrderNumbers, OrderStatus, OrderSubmission,
};
use crate::pricing::{OrderLine, on_line_set_changed, on_product_selected, on_quantity_changed};
use crate::validation::{FieldError, FieldErrors, min_money, required};
use shopfront_core::effect::Effect;
use shopfront_core::persistence::RecordSink;
use shopfront_core::reducer::Reducer;
use shopfront_core::{SmallVec, save_record, smallvec};
use shopfront_runtime::metrics::FormMetrics;
use std::sync::Arc;

/// Environment for the order form
#[derive(Clone)]
pub struct OrderFormEnvironment {
    /// Product lookup for line pricing
    pub catalog: Arc<dyn ProductCatalog>,
    /// Order number source
    pub numbers: Arc<dyn OrderNumbers>,
    /// Destination of submitted orders
    pub orders: Arc<dyn RecordSink<OrderSubmission>>,
}

impl OrderFormEnvironment {
    /// Creates a new order form environment
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        numbers: Arc<dyn OrderNumbers>,
        orders: Arc<dyn RecordSink<OrderSubmission>>,
    ) -> Self {
        Self {
            catalog,
            numbers,
            orders,
        }
    }
}

/// Reducer for the order form
#[derive(Clone, Debug)]
pub struct OrderFormReducer;

impl OrderFormReducer {
    /// Creates a new order form reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies an event to the draft
    ///
    /// Commands are ignored here; they are turned into events by `reduce`.
    pub fn apply_event(state: &mut OrderDraft, action: &OrderFormAction) {
        match action {
            OrderFormAction::DraftOpened { number } => {
                *state = OrderDraft {
                    number: Some(number.clone()),
                    ..OrderDraft::default()
                };
            },
            OrderFormAction::LineAdded { line_id } => {
                state.lines.push(OrderLine::new(*line_id));
            },
            OrderFormAction::LineRemoved { line_id } => {
                state.lines.retain(|line| line.id != *line_id);
            },
            OrderFormAction::LinePriced {
                line_id,
                product_id,
                unit_price,
                total_price,
            } => {
                if let Some(line) = state.line_mut(*line_id) {
                    line.product_id = *product_id;
                    line.unit_price = *unit_price;
                    line.total_price = *total_price;
                }
            },
            OrderFormAction::LineTotalChanged {
                line_id,
                quantity,
                total_price,
            } => {
                if let Some(line) = state.line_mut(*line_id) {
                    line.quantity = *quantity;
                    line.total_price = *total_price;
                }
            },
            OrderFormAction::TotalRecalculated { total } => {
                state.total = *total;
            },
            OrderFormAction::ValidationFailed { errors } => {
                state.errors.clone_from(errors);
            },
            OrderFormAction::Saved {
                record_id,
                revision,
            } => {
                state.record_id = Some(*record_id);
                state.saved = Some(SavedRecord {
                    record_id: *record_id,
                    revision: *revision,
                });
                state.last_error = None;
            },
            OrderFormAction::SaveFailed { error } => {
                state.last_error = Some(error.clone());
            },
            OrderFormAction::OpenDraft
            | OrderFormAction::Load { .. }
            | OrderFormAction::AddLine { .. }
            | OrderFormAction::RemoveLine { .. }
            | OrderFormAction::SelectProduct { .. }
            | OrderFormAction::ChangeQuantity { .. }
            | OrderFormAction::SetCustomer { .. }
            | OrderFormAction::SetShippingPrice { .. }
            | OrderFormAction::SetStatus { .. }
            | OrderFormAction::SetNotes { .. }
            | OrderFormAction::Submit => {},
        }
    }

    /// Recomputes the order total and applies it
    fn recalculate_total(state: &mut OrderDraft) {
        let total = on_line_set_changed(&state.lines);
        Self::apply_event(state, &OrderFormAction::TotalRecalculated { total });
    }

    /// Validates a submit against the current draft
    fn validate_submit(state: &OrderDraft) -> FieldErrors {
        let mut errors = FieldErrors::new();

        errors.check("customer_id", required(state.customer_id.as_ref()));
        match state.shipping_price {
            Some(price) => errors.check("shipping_price", min_money(price, Money::ZERO)),
            None => errors.check("shipping_price", required::<Money>(None)),
        }

        for (index, line) in state.lines.iter().enumerate() {
            errors.check(
                &format!("lines.{index}.product_id"),
                required(line.product_id.as_ref()),
            );
            if line.product_id.is_some() && line.unit_price.is_none() {
                errors.add(format!("lines.{index}.product_id"), FieldError::UnknownOption);
            }
            errors.check(
                &format!("lines.{index}.quantity"),
                required(line.quantity.as_ref()),
            );
        }

        errors
    }

    /// Builds the record handed to persistence
    ///
    /// Only called after `validate_submit` passed.
    fn submission(state: &OrderDraft, env: &OrderFormEnvironment) -> Option<OrderSubmission> {
        Some(OrderSubmission {
            record_id: state.record_id,
            number: state
                .number
                .clone()
                .unwrap_or_else(|| env.numbers.next_number()),
            customer_id: state.customer_id?,
            shipping_price: state.shipping_price?,
            status: state.status.unwrap_or(OrderStatus::Pending),
            notes: state.notes.clone(),
            lines: state.lines.clone(),
            total: state.total,
        })
    }
}

impl Default for OrderFormReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for OrderFormReducer {
    type State = OrderDraft;
    type Action = OrderFormAction;
    type Environment = OrderFormEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per form action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(action = action.action_name(), "Order form action");

        match action {
            // ========== Commands ==========
            OrderFormAction::OpenDraft => {
                let number = env.numbers.next_number();
                tracing::info!(%number, "Opened order draft");
                Self::apply_event(state, &OrderFormAction::DraftOpened { number });
                SmallVec::new()
            },

            OrderFormAction::Load { record_id, record } => {
                tracing::info!(%record_id, number = %record.number, "Loaded order");
                *state = OrderDraft {
                    record_id: Some(record_id),
                    number: Some(record.number),
                    customer_id: Some(record.customer_id),
                    shipping_price: Some(record.shipping_price),
                    status: Some(record.status),
                    notes: record.notes,
                    lines: record.lines,
                    ..OrderDraft::default()
                };
                Self::recalculate_total(state);
                SmallVec::new()
            },

            OrderFormAction::AddLine { line_id } => {
                if state.line(line_id).is_some() {
                    tracing::warn!(%line_id, "AddLine ignored: line already exists");
                    return SmallVec::new();
                }
                Self::apply_event(state, &OrderFormAction::LineAdded { line_id });
                Self::recalculate_total(state);
                state.bump_revision();
                SmallVec::new()
            },

            OrderFormAction::RemoveLine { line_id } => {
                if state.line(line_id).is_none() {
                    tracing::warn!(%line_id, "RemoveLine ignored: unknown line");
                    return SmallVec::new();
                }
                Self::apply_event(state, &OrderFormAction::LineRemoved { line_id });
                Self::recalculate_total(state);
                state.bump_revision();
                SmallVec::new()
            },

            OrderFormAction::SelectProduct {
                line_id,
                product_id,
            } => {
                let Some(line) = state.line(line_id) else {
                    tracing::warn!(%line_id, "SelectProduct ignored: unknown line");
                    return SmallVec::new();
                };

                let pricing = on_product_selected(line, product_id, env.catalog.as_ref());
                if product_id.is_some() && pricing.unit_price.is_none() {
                    tracing::debug!(%line_id, ?product_id, "Selected product not in catalog");
                }

                Self::apply_event(
                    state,
                    &OrderFormAction::LinePriced {
                        line_id,
                        product_id,
                        unit_price: pricing.unit_price,
                        total_price: pricing.total_price,
                    },
                );
                Self::recalculate_total(state);
                state.bump_revision();
                SmallVec::new()
            },

            OrderFormAction::ChangeQuantity { line_id, quantity } => {
                let Some(line) = state.line(line_id) else {
                    tracing::warn!(%line_id, "ChangeQuantity ignored: unknown line");
                    return SmallVec::new();
                };

                let total_price = on_quantity_changed(line, quantity);
                Self::apply_event(
                    state,
                    &OrderFormAction::LineTotalChanged {
                        line_id,
                        quantity,
                        total_price,
                    },
                );
                Self::recalculate_total(state);
                state.bump_revision();
                SmallVec::new()
            },

            OrderFormAction::SetCustomer { customer_id } => {
                state.customer_id = customer_id;
                state.bump_revision();
                SmallVec::new()
            },

            OrderFormAction::SetShippingPrice { shipping_price } => {
                state.shipping_price = shipping_price;
                state.bump_revision();
                SmallVec::new()
            },

            OrderFormAction::SetStatus { status } => {
                state.status = status;
                state.bump_revision();
                SmallVec::new()
            },

            OrderFormAction::SetNotes { notes } => {
                state.notes = notes;
                state.bump_revision();
                SmallVec::new()
            },

            OrderFormAction::Submit => {
                let errors = Self::validate_submit(state);
                if !errors.is_empty() {
                    tracing::warn!(errors = ?errors.messages(), "Order submit failed validation");
                    FormMetrics::record_validation_failure("order", errors.len());
                    Self::apply_event(state, &OrderFormAction::ValidationFailed { errors });
                    return smallvec![Effect::None];
                }
                state.errors.clear();

                let Some(submission) = Self::submission(state, env) else {
                    return smallvec![Effect::None];
                };
                if state.number.is_none() {
                    state.number = Some(submission.number.clone());
                }

                let revision = state.revision();
                tracing::info!(number = %submission.number, total = %submission.total, "Submitting order");

                smallvec![save_record! {
                    sink: env.orders,
                    record: submission,
                    on_success: |record_id| {
                        FormMetrics::record_save("order", true);
                        Some(OrderFormAction::Saved { record_id, revision })
                    },
                    on_error: |error| {
                        FormMetrics::record_save("order", false);
                        Some(OrderFormAction::SaveFailed { error: error.to_string() })
                    }
                }]
            },

            // ========== Events ==========
            OrderFormAction::SaveFailed { ref error } => {
                tracing::warn!(%error, "Order save failed");
                Self::apply_event(state, &action);
                SmallVec::new()
            },

            // Line events keep the total in line with the lines
            OrderFormAction::LineAdded { .. }
            | OrderFormAction::LineRemoved { .. }
            | OrderFormAction::LinePriced { .. }
            | OrderFormAction::LineTotalChanged { .. }
            | OrderFormAction::TotalRecalculated { .. } => {
                Self::apply_event(state, &action);
                Self::recalculate_total(state);
                SmallVec::new()
            },

            OrderFormAction::DraftOpened { .. }
            | OrderFormAction::ValidationFailed { .. }
            | OrderFormAction::Saved { .. } => {
                Self::apply_event(state, &action);
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::ids::{CustomerId, LineId, ProductId};
    use crate::order::types::{FixedOrderNumbers, OrderNumber};
    use shopfront_core::persistence::RecordId;
    use shopfront_testing::{FailingSink, RecordingSink, ReducerTest, assertions};

    const P1: ProductId = ProductId::new(1);
    const P2: ProductId = ProductId::new(2);

    fn line_a() -> LineId {
        LineId::from_uuid(uuid::Uuid::from_u128(0xA))
    }

    fn line_b() -> LineId {
        LineId::from_uuid(uuid::Uuid::from_u128(0xB))
    }

    fn test_env() -> OrderFormEnvironment {
        OrderFormEnvironment::new(
            Arc::new(
                InMemoryCatalog::new()
                    .with_product(P1, "Grinder", Money::from_major(10))
                    .with_product(P2, "Tamper", Money::from_cents(1250)),
            ),
            Arc::new(FixedOrderNumbers::new(OrderNumber::new("OR-", 12345))),
            Arc::new(RecordingSink::<OrderSubmission>::new()),
        )
    }

    fn draft_with_lines(ids: &[LineId]) -> OrderDraft {
        let mut draft = OrderDraft::new();
        draft.number = Some(OrderNumber::new("OR-", 12345));
        draft.lines = ids.iter().copied().map(OrderLine::new).collect();
        draft
    }

    fn submittable_draft() -> OrderDraft {
        let mut draft = draft_with_lines(&[line_a()]);
        draft.customer_id = Some(CustomerId::new(7));
        draft.shipping_price = Some(Money::from_major(5));
        draft.lines[0].product_id = Some(P1);
        draft.lines[0].unit_price = Some(Money::from_major(10));
        draft.lines[0].total_price = Some(Money::from_major(10));
        draft.total = Money::from_major(10);
        draft
    }

    #[test]
    fn open_draft_assigns_number() {
        ReducerTest::new(OrderFormReducer::new())
            .with_env(test_env())
            .given_state(OrderDraft::new())
            .when_action(OrderFormAction::OpenDraft)
            .then_state(|draft| {
                assert_eq!(draft.number, Some(OrderNumber::new("OR-", 12345)));
                assert!(draft.lines.is_empty());
                assert!(!draft.is_dirty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn select_product_prices_line_and_order() {
        ReducerTest::new(OrderFormReducer::new())
            .with_env(test_env())
            .given_state(draft_with_lines(&[line_a()]))
            .when_action(OrderFormAction::SelectProduct {
                line_id: line_a(),
                product_id: Some(P1),
            })
            .then_state(|draft| {
                let line = &draft.lines[0];
                assert_eq!(line.product_id, Some(P1));
                assert_eq!(line.unit_price, Some(Money::from_major(10)));
                assert_eq!(line.total_price, Some(Money::from_major(10)));
                assert_eq!(draft.total, Money::from_major(10));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn quantity_change_updates_line_and_order() {
        ReducerTest::new(OrderFormReducer::new())
            .with_env(test_env())
            .given_state(draft_with_lines(&[line_a()]))
            .when_actions(vec![
                OrderFormAction::SelectProduct {
                    line_id: line_a(),
                    product_id: Some(P1),
                },
                OrderFormAction::ChangeQuantity {
                    line_id: line_a(),
                    quantity: Some(3),
                },
            ])
            .then_state(|draft| {
                assert_eq!(draft.lines[0].quantity, Some(3));
                assert_eq!(draft.lines[0].total_price, Some(Money::from_major(30)));
                assert_eq!(draft.total, Money::from_major(30));
                assert_eq!(draft.revision(), 2);
            })
            .run();
    }

    #[test]
    fn unpriced_line_counts_zero_in_total() {
        ReducerTest::new(OrderFormReducer::new())
            .with_env(test_env())
            .given_state(draft_with_lines(&[line_a()]))
            .when_actions(vec![
                OrderFormAction::SelectProduct {
                    line_id: line_a(),
                    product_id: Some(P1),
                },
                OrderFormAction::ChangeQuantity {
                    line_id: line_a(),
                    quantity: Some(3),
                },
                OrderFormAction::AddLine { line_id: line_b() },
            ])
            .then_state(|draft| {
                assert_eq!(draft.lines.len(), 2);
                assert_eq!(draft.lines[1].total_price, None);
                assert_eq!(draft.total, Money::from_major(30));
            })
            .run();
    }

    #[test]
    fn unknown_product_then_quantity_gives_zero_total() {
        ReducerTest::new(OrderFormReducer::new())
            .with_env(test_env())
            .given_state(draft_with_lines(&[line_a()]))
            .when_actions(vec![
                OrderFormAction::SelectProduct {
                    line_id: line_a(),
                    product_id: Some(ProductId::new(404)),
                },
                OrderFormAction::ChangeQuantity {
                    line_id: line_a(),
                    quantity: Some(2),
                },
            ])
            .then_state(|draft| {
                let line = &draft.lines[0];
                assert_eq!(line.unit_price, None);
                assert_eq!(line.total_price, Some(Money::ZERO));
                assert_eq!(draft.total, Money::ZERO);
            })
            .run();
    }

    #[test]
    fn remove_line_recomputes_total() {
        ReducerTest::new(OrderFormReducer::new())
            .with_env(test_env())
            .given_state(draft_with_lines(&[line_a(), line_b()]))
            .when_actions(vec![
                OrderFormAction::SelectProduct {
                    line_id: line_a(),
                    product_id: Some(P1),
                },
                OrderFormAction::SelectProduct {
                    line_id: line_b(),
                    product_id: Some(P2),
                },
                OrderFormAction::RemoveLine { line_id: line_a() },
            ])
            .then_state(|draft| {
                assert_eq!(draft.lines.len(), 1);
                assert_eq!(draft.lines[0].id, line_b());
                assert_eq!(draft.total, Money::from_cents(1250));
            })
            .run();
    }

    #[test]
    fn unknown_line_is_ignored() {
        ReducerTest::new(OrderFormReducer::new())
            .with_env(test_env())
            .given_state(draft_with_lines(&[line_a()]))
            .when_actions(vec![
                OrderFormAction::ChangeQuantity {
                    line_id: line_b(),
                    quantity: Some(9),
                },
                OrderFormAction::SelectProduct {
                    line_id: line_b(),
                    product_id: Some(P1),
                },
                OrderFormAction::RemoveLine { line_id: line_b() },
            ])
            .then_state(|draft| {
                assert_eq!(draft.lines.len(), 1);
                assert_eq!(draft.lines[0], OrderLine::new(line_a()));
                assert_eq!(draft.total, Money::ZERO);
                assert_eq!(draft.revision(), 0);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn price_is_a_snapshot() {
        let mut catalog = InMemoryCatalog::new().with_product(P1, "Grinder", Money::from_major(10));
        let mut draft = draft_with_lines(&[line_a()]);
        let reducer = OrderFormReducer::new();

        let env = OrderFormEnvironment {
            catalog: Arc::new(catalog.clone()),
            ..test_env()
        };
        let _ = reducer.reduce(
            &mut draft,
            OrderFormAction::SelectProduct {
                line_id: line_a(),
                product_id: Some(P1),
            },
            &env,
        );

        catalog.insert(P1, "Grinder", Money::from_major(99));
        let env = OrderFormEnvironment {
            catalog: Arc::new(catalog),
            ..test_env()
        };
        let _ = reducer.reduce(
            &mut draft,
            OrderFormAction::ChangeQuantity {
                line_id: line_a(),
                quantity: Some(2),
            },
            &env,
        );

        assert_eq!(draft.lines[0].unit_price, Some(Money::from_major(10)));
        assert_eq!(draft.total, Money::from_major(20));
    }

    #[test]
    fn submit_reports_missing_fields() {
        let mut draft = draft_with_lines(&[line_a()]);
        draft.lines[0].quantity = None;

        ReducerTest::new(OrderFormReducer::new())
            .with_env(test_env())
            .given_state(draft)
            .when_action(OrderFormAction::Submit)
            .then_state(|draft| {
                assert!(draft.errors.has("customer_id"));
                assert!(draft.errors.has("shipping_price"));
                assert!(draft.errors.has("lines.0.product_id"));
                assert_eq!(
                    draft.errors.for_field("lines.0.quantity"),
                    vec![&FieldError::Required]
                );
                assert!(draft.saved.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn submit_rejects_negative_shipping() {
        let mut draft = submittable_draft();
        draft.shipping_price = Some(Money::from_cents(-1));

        ReducerTest::new(OrderFormReducer::new())
            .with_env(test_env())
            .given_state(draft)
            .when_action(OrderFormAction::Submit)
            .then_state(|draft| {
                assert_eq!(
                    draft.errors.for_field("shipping_price"),
                    vec![&FieldError::BelowMinimum { min: Money::ZERO }]
                );
            })
            .run();
    }

    #[test]
    fn valid_submit_returns_save_effect() {
        let mut draft = submittable_draft();
        draft.errors.add("customer_id", FieldError::Required);

        ReducerTest::new(OrderFormReducer::new())
            .with_env(test_env())
            .given_state(draft)
            .when_action(OrderFormAction::Submit)
            .then_state(|draft| {
                assert!(draft.errors.is_empty());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[tokio::test]
    async fn save_effect_delivers_submission() {
        let sink = Arc::new(RecordingSink::<OrderSubmission>::new());
        let env = OrderFormEnvironment {
            orders: sink.clone(),
            ..test_env()
        };
        let mut draft = submittable_draft();
        draft.revision = 4;

        let mut effects = OrderFormReducer::new().reduce(&mut draft, OrderFormAction::Submit, &env);
        let Some(Effect::Future(fut)) = effects.pop() else {
            unreachable!("valid submit returns a future effect");
        };

        let feedback = fut.await.unwrap();
        assert!(matches!(feedback, OrderFormAction::Saved { revision: 4, .. }));

        let saved = sink.records();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].status, OrderStatus::Pending);
        assert_eq!(saved[0].total, Money::from_major(10));
        assert_eq!(saved[0].number.as_str(), "OR-12345");
    }

    #[tokio::test]
    async fn failing_sink_feeds_back_save_failed() {
        let env = OrderFormEnvironment {
            orders: Arc::new(FailingSink::unavailable("database down")),
            ..test_env()
        };
        let mut draft = submittable_draft();

        let mut effects = OrderFormReducer::new().reduce(&mut draft, OrderFormAction::Submit, &env);
        let Some(Effect::Future(fut)) = effects.pop() else {
            unreachable!("valid submit returns a future effect");
        };

        assert_eq!(
            fut.await,
            Some(OrderFormAction::SaveFailed {
                error: "persistence unavailable: database down".to_string()
            })
        );
    }

    #[test]
    fn saved_marks_draft_clean() {
        let mut draft = submittable_draft();
        draft.revision = 3;
        draft.last_error = Some("timeout".to_string());

        ReducerTest::new(OrderFormReducer::new())
            .with_env(test_env())
            .given_state(draft)
            .when_action(OrderFormAction::Saved {
                record_id: RecordId::new(1),
                revision: 3,
            })
            .then_state(|draft| {
                assert!(!draft.is_dirty());
                assert!(draft.last_error.is_none());
            })
            .run();
    }

    #[test]
    fn submit_rejects_product_missing_from_catalog() {
        let mut draft = submittable_draft();
        draft.lines[0] = OrderLine::new(line_a());

        ReducerTest::new(OrderFormReducer::new())
            .with_env(test_env())
            .given_state(draft)
            .when_actions(vec![
                OrderFormAction::SelectProduct {
                    line_id: line_a(),
                    product_id: Some(ProductId::new(404)),
                },
                OrderFormAction::Submit,
            ])
            .then_state(|draft| {
                assert_eq!(
                    draft.errors.for_field("lines.0.product_id"),
                    vec![&FieldError::UnknownOption]
                );
                assert!(draft.saved.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn line_events_sent_directly_keep_total() {
        ReducerTest::new(OrderFormReducer::new())
            .with_env(test_env())
            .given_state(OrderDraft::new())
            .when_actions(vec![
                OrderFormAction::LineAdded { line_id: line_a() },
                OrderFormAction::LinePriced {
                    line_id: line_a(),
                    product_id: Some(P1),
                    unit_price: Some(Money::from_major(10)),
                    total_price: Some(Money::from_major(20)),
                },
                OrderFormAction::TotalRecalculated {
                    total: Money::from_major(999),
                },
            ])
            .then_state(|draft| {
                assert_eq!(draft.lines.len(), 1);
                assert_eq!(draft.total, Money::from_major(20));
            })
            .run();
    }

    #[test]
    fn load_restores_stored_order() {
        let stored = OrderSubmission {
            record_id: Some(RecordId::new(9)),
            number: OrderNumber::new("OR-", 55555),
            customer_id: CustomerId::new(3),
            shipping_price: Money::from_cents(450),
            status: OrderStatus::Processing,
            notes: "Gift wrap".to_string(),
            lines: submittable_draft().lines,
            total: Money::ZERO,
        };

        ReducerTest::new(OrderFormReducer::new())
            .with_env(test_env())
            .given_state(OrderDraft::new())
            .when_action(OrderFormAction::Load {
                record_id: RecordId::new(9),
                record: stored,
            })
            .then_state(|draft| {
                assert_eq!(draft.record_id, Some(RecordId::new(9)));
                assert_eq!(draft.status, Some(OrderStatus::Processing));
                assert_eq!(draft.total, Money::from_major(10));
                assert!(!draft.is_dirty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn resubmit_updates_saved_record() {
        let sink = Arc::new(RecordingSink::<OrderSubmission>::new());
        let env = OrderFormEnvironment {
            orders: sink.clone(),
            ..test_env()
        };
        let reducer = OrderFormReducer::new();
        let mut draft = submittable_draft();

        for _ in 0..2 {
            let mut effects = reducer.reduce(&mut draft, OrderFormAction::Submit, &env);
            let Some(Effect::Future(fut)) = effects.pop() else {
                unreachable!("valid submit returns a future effect");
            };
            let feedback = fut.await.unwrap();
            let _ = reducer.reduce(&mut draft, feedback, &env);
            let _ = reducer.reduce(
                &mut draft,
                OrderFormAction::SetNotes {
                    notes: "Leave at the door".to_string(),
                },
                &env,
            );
        }

        let submissions = sink.records();
        assert_eq!(submissions[0].record_id, None);
        assert_eq!(submissions[1].record_id, Some(RecordId::new(1)));
        assert_eq!(submissions[1].notes, "Leave at the door");
    }
}
