//! # Shopfront Core
//!
//! Core traits and types for the Shopfront back-office.
//!
//! Every admin form (order, brand, product, customer) is modelled as an editing
//! session driven by a reducer: the form's draft is the state, each field edit is
//! an action, and derived fields (slugs, line prices, order totals) are recomputed
//! synchronously inside `reduce`. Anything that leaves the process, such as handing
//! a validated record to persistence, is returned as an [`effect::Effect`] value
//! and executed by the runtime.
//!
//! ## Core Concepts
//!
//! - **State**: the in-memory draft being edited
//! - **Action**: every input to a reducer (field edits, derived-field events, save results)
//! - **Reducer**: pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: side effect descriptions (not execution)
//! - **Environment**: injected collaborators (catalog lookup, clock, record sinks)
//!
//! ## Example
//!
//! ```ignore
//! use shopfront_core::*;
//!
//! impl Reducer for OrderFormReducer {
//!     type State = OrderDraft;
//!     type Action = OrderFormAction;
//!     type Environment = OrderFormEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut OrderDraft,
//!         action: OrderFormAction,
//!         env: &OrderFormEnvironment,
//!     ) -> SmallVec<[Effect<OrderFormAction>; 4]> {
//!         // Recompute derived fields here
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Declarative macros for building effects
pub mod effect_macros;

/// Persistence seam for validated records
pub mod persistence;

/// Reducer module - the core trait for form logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They contain all derivation and validation rules and are deterministic and testable.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for form logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The draft this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected collaborators this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for BrandFormReducer {
    ///     type State = BrandDraft;
    ///     type Action = BrandFormAction;
    ///     type Environment = BrandFormEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut BrandDraft,
    ///         action: BrandFormAction,
    ///         env: &BrandFormEnvironment,
    ///     ) -> SmallVec<[Effect<BrandFormAction>; 4]> {
    ///         match action {
    ///             BrandFormAction::SetName { name } => {
    ///                 state.slug = slugify(&name);
    ///                 state.name = name;
    ///                 SmallVec::new()
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Updates state in place (including every derived field)
        /// 2. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// The effects to be executed by the runtime (usually zero or one)
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Returns true if this effect does nothing
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    effects.iter().all(Effect::is_none)
                },
                Effect::Future(_) => false,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All collaborators a reducer reads from (time, catalogs, uniqueness indexes) are
/// abstracted behind traits and injected via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Forms use it for date rules such as "date of birth cannot be in the future".
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;

    #[derive(Debug)]
    enum NoteAction {
        Saved,
    }

    #[test]
    fn nested_none_effects_are_none() {
        let effect: Effect<NoteAction> =
            Effect::merge(vec![Effect::None, Effect::chain(vec![Effect::None])]);
        assert!(effect.is_none());
    }

    #[test]
    fn future_effect_is_not_none() {
        let effect: Effect<NoteAction> = Effect::merge(vec![
            Effect::None,
            Effect::Future(Box::pin(async { Some(NoteAction::Saved) })),
        ]);
        assert!(!effect.is_none());
        assert_eq!(format!("{effect:?}"), "Effect::Parallel([Effect::None, Effect::Future(<future>)])");
    }
}
