//! Given/When/Then harness for form reducers.
//!
//! A test starts from a draft (`given_state`), feeds it one or more form
//! actions (`when_action`, `when_actions`) and checks the resulting draft and
//! the effects returned for the final action.

#![allow(clippy::module_name_repetitions)]

use shopfront_core::{effect::Effect, reducer::Reducer};

/// A check run after the actions have been applied
enum Check<S, A> {
    State(Box<dyn FnOnce(&S)>),
    Effects(Box<dyn FnOnce(&[Effect<A>])>),
}

/// Runs a reducer over a draft and checks the outcome
///
/// ```ignore
/// ReducerTest::new(OrderFormReducer::new())
///     .with_env(environment())
///     .given_state(draft_with_line(line_id))
///     .when_action(OrderFormAction::ChangeQuantity { line_id, quantity: Some(3) })
///     .then_state(|draft| assert_eq!(draft.total, Money::from_cents(3000)))
///     .then_effects(|effects| assertions::assert_no_effects(effects))
///     .run();
/// ```
pub struct ReducerTest<R: Reducer> {
    reducer: R,
    env: Option<R::Environment>,
    draft: Option<R::State>,
    actions: Vec<R::Action>,
    checks: Vec<Check<R::State, R::Action>>,
}

impl<R: Reducer> ReducerTest<R> {
    /// Starts a test for `reducer`
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            env: None,
            draft: None,
            actions: Vec::new(),
            checks: Vec::new(),
        }
    }

    /// Environment handed to every `reduce` call
    #[must_use]
    pub fn with_env(mut self, env: R::Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Draft the actions start from
    #[must_use]
    pub fn given_state(mut self, draft: R::State) -> Self {
        self.draft = Some(draft);
        self
    }

    /// Applies a single action
    #[must_use]
    pub fn when_action(self, action: R::Action) -> Self {
        self.when_actions(vec![action])
    }

    /// Applies `actions` in order. Effect checks only see what the last one returned.
    #[must_use]
    pub fn when_actions(mut self, actions: Vec<R::Action>) -> Self {
        self.actions = actions;
        self
    }

    /// Checks the draft after the last action
    #[must_use]
    pub fn then_state(mut self, check: impl FnOnce(&R::State) + 'static) -> Self {
        self.checks.push(Check::State(Box::new(check)));
        self
    }

    /// Checks the effects of the last action
    #[must_use]
    pub fn then_effects(mut self, check: impl FnOnce(&[Effect<R::Action>]) + 'static) -> Self {
        self.checks.push(Check::Effects(Box::new(check)));
        self
    }

    /// Applies the actions, then runs the checks in the order they were added
    ///
    /// # Panics
    ///
    /// Panics when the draft, environment or actions are missing, or when a
    /// check fails.
    #[allow(clippy::panic)]
    pub fn run(self) {
        let Some(mut draft) = self.draft else {
            panic!("no starting draft: call given_state()");
        };
        let Some(env) = self.env else {
            panic!("no environment: call with_env()");
        };
        assert!(!self.actions.is_empty(), "no actions: call when_action()");

        let mut effects = Vec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut draft, action, &env).into_vec();
        }

        for check in self.checks {
            match check {
                Check::State(check) => check(&draft),
                Check::Effects(check) => check(&effects),
            }
        }
    }
}

/// Effect checks for `then_effects`
#[allow(clippy::panic)]
pub mod assertions {
    use shopfront_core::effect::Effect;
    use std::fmt::Debug;

    /// Every effect is a no-op
    ///
    /// # Panics
    ///
    /// Panics if an effect would do work.
    pub fn assert_no_effects<A: Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "expected only no-op effects, got {effects:?}"
        );
    }

    /// Exactly `expected` effects were returned
    ///
    /// # Panics
    ///
    /// Panics on any other count.
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "wrong number of effects");
    }

    /// At least one effect is async work, such as a save
    ///
    /// # Panics
    ///
    /// Panics if none is.
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|effect| matches!(effect, Effect::Future(_))),
            "expected a future effect"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_core::{SmallVec, smallvec};

    #[derive(Clone, Debug, Default)]
    struct Tally {
        lines: u32,
        saved: bool,
    }

    #[derive(Clone, Debug)]
    enum TallyAction {
        AddLine,
        Submit,
        Saved,
    }

    struct TallyReducer;

    impl Reducer for TallyReducer {
        type State = Tally;
        type Action = TallyAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Tally,
            action: TallyAction,
            _env: &(),
        ) -> SmallVec<[Effect<TallyAction>; 4]> {
            match action {
                TallyAction::AddLine => {
                    state.lines += 1;
                    smallvec![Effect::None]
                },
                TallyAction::Submit if state.lines > 0 => {
                    smallvec![Effect::Future(Box::pin(async { Some(TallyAction::Saved) }))]
                },
                TallyAction::Submit => SmallVec::new(),
                TallyAction::Saved => {
                    state.saved = true;
                    SmallVec::new()
                },
            }
        }
    }

    #[test]
    fn single_action_updates_draft() {
        ReducerTest::new(TallyReducer)
            .with_env(())
            .given_state(Tally::default())
            .when_action(TallyAction::AddLine)
            .then_state(|tally| assert_eq!(tally.lines, 1))
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn only_last_action_effects_are_checked() {
        ReducerTest::new(TallyReducer)
            .with_env(())
            .given_state(Tally::default())
            .when_actions(vec![TallyAction::AddLine, TallyAction::AddLine, TallyAction::Submit])
            .then_state(|tally| {
                assert_eq!(tally.lines, 2);
                assert!(!tally.saved);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    #[should_panic(expected = "no starting draft")]
    fn missing_draft_panics() {
        ReducerTest::new(TallyReducer)
            .with_env(())
            .when_action(TallyAction::AddLine)
            .run();
    }

    #[test]
    fn merged_no_ops_count_as_no_effects() {
        assertions::assert_no_effects::<TallyAction>(&[]);
        assertions::assert_no_effects::<TallyAction>(&[Effect::merge(vec![Effect::None])]);
    }
}
