//! Integration tests for Store action broadcasting
//!
//! A view waits on the broadcast to learn when a request it started has
//! produced its terminal action (booking confirmed, bus loaded).

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use busway_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use busway_runtime::{Store, StoreError};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    /// Start a request that takes `steps` round trips
    Request { id: u64, steps: u32 },
    /// One round trip finished
    StepCompleted { id: u64, step: u32, of: u32 },
    /// Request finished (terminal action)
    Completed { id: u64 },
}

#[derive(Debug, Clone, Default)]
struct TestState {
    completed: Vec<u64>,
    steps_seen: u32,
}

#[derive(Clone)]
struct TestEnvironment;

#[derive(Clone)]
struct TestReducer;

impl Reducer for TestReducer {
    type State = TestState;
    type Action = TestAction;
    type Environment = TestEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TestAction::Request { id, steps } => {
                smallvec![Effect::Future(Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Some(TestAction::StepCompleted { id, step: 1, of: steps })
                }))]
            },
            TestAction::StepCompleted { id, step, of } => {
                state.steps_seen += 1;
                if step < of {
                    smallvec![Effect::Future(Box::pin(async move {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        Some(TestAction::StepCompleted { id, step: step + 1, of })
                    }))]
                } else {
                    smallvec![Effect::Future(Box::pin(async move {
                        Some(TestAction::Completed { id })
                    }))]
                }
            },
            TestAction::Completed { id } => {
                state.completed.push(id);
                smallvec![Effect::None]
            },
        }
    }
}

fn new_store() -> Store<TestState, TestAction, TestEnvironment, TestReducer> {
    Store::new(TestState::default(), TestReducer, TestEnvironment)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn waits_through_multi_step_request() {
    let store = new_store();

    let result = store
        .send_and_wait_for(
            TestAction::Request { id: 7, steps: 3 },
            |action| matches!(action, TestAction::Completed { id: 7 }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(result, TestAction::Completed { id: 7 });
    // The terminal action is broadcast before it is reduced, so give the
    // feedback a moment to land.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let state = store.state(Clone::clone).await;
    assert_eq!(state.steps_seen, 3);
    assert_eq!(state.completed, vec![7]);
}

#[tokio::test]
async fn concurrent_waiters_see_their_own_terminal_action() {
    let store = Arc::new(new_store());

    let waits = (1..=5).map(|id| {
        let store = Arc::clone(&store);
        async move {
            store
                .send_and_wait_for(
                    TestAction::Request { id, steps: 2 },
                    move |action| matches!(action, TestAction::Completed { id: done } if *done == id),
                    Duration::from_secs(2),
                )
                .await
        }
    });

    let results = futures::future::join_all(waits).await;

    for (index, result) in results.into_iter().enumerate() {
        let expected = u64::try_from(index + 1).unwrap();
        assert_eq!(result.unwrap(), TestAction::Completed { id: expected });
    }
}

#[tokio::test]
async fn subscriber_sees_only_effect_actions() {
    let store = new_store();
    let mut rx = store.subscribe_actions();

    let mut handle = store
        .send(TestAction::Request { id: 1, steps: 1 })
        .await
        .unwrap();
    handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

    assert_eq!(
        rx.recv().await.unwrap(),
        TestAction::StepCompleted { id: 1, step: 1, of: 1 }
    );
    assert_eq!(rx.recv().await.unwrap(), TestAction::Completed { id: 1 });
}

#[tokio::test]
async fn teardown_mid_request_stops_the_chain() {
    let store = new_store();

    let _ = store
        .send(TestAction::Request { id: 3, steps: 5 })
        .await
        .unwrap();
    store.shutdown(Duration::from_secs(1)).await.unwrap();

    let state = store.state(Clone::clone).await;
    assert!(state.completed.is_empty());
    assert!(matches!(
        store.send(TestAction::Completed { id: 3 }).await,
        Err(StoreError::ShutdownInProgress)
    ));
}
