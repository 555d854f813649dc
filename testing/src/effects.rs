//! Resolve reducer effects without a Store
//!
//! Reducer tests often need the action an effect would feed back (the API
//! response) without spinning up a runtime.

use busway_core::{effect::Effect, reducer::Reducer};

/// Upper bound on feedback rounds in [`settle`]
pub const MAX_SETTLE_STEPS: usize = 64;

/// Execute effects in order and collect the actions they produce
///
/// Futures are awaited one after another so the result order is
/// deterministic.
pub async fn run_effects<A>(effects: impl IntoIterator<Item = Effect<A>>) -> Vec<A>
where
    A: Send + 'static,
{
    let mut actions = Vec::new();
    for effect in effects {
        if let Effect::Future(fut) = effect {
            if let Some(action) = fut.await {
                actions.push(action);
            }
        }
    }
    actions
}

/// Reduce `action`, then keep feeding produced actions back until none remain
///
/// Returns every fed-back action in the order it was reduced.
///
/// # Panics
///
/// Panics if the loop does not settle within [`MAX_SETTLE_STEPS`] rounds.
#[allow(clippy::panic)] // Test helper
pub async fn settle<R>(
    reducer: &R,
    state: &mut R::State,
    action: R::Action,
    env: &R::Environment,
) -> Vec<R::Action>
where
    R: Reducer,
    R::Action: Clone + Send + 'static,
{
    let mut log = Vec::new();
    let mut queue = vec![action];

    for _ in 0..MAX_SETTLE_STEPS {
        if queue.is_empty() {
            return log;
        }

        let mut produced = Vec::new();
        for action in queue {
            let effects = reducer.reduce(state, action, env);
            produced.extend(run_effects(effects).await);
        }

        log.extend(produced.iter().cloned());
        queue = produced;
    }

    panic!("reducer did not settle within {MAX_SETTLE_STEPS} rounds");
}
