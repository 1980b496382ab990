//! Single-flight session initialization with many-reader waits.
//!
//! One `SessionLifecycle` exists per terminal surface, created pending at
//! surface-open time. It settles at most once — to ready or failed — and
//! every waiter observes the same outcome: waiters registered before
//! settlement are woken together, waiters registered after observe the
//! settled value immediately. A `watch` channel carries the state, so
//! settlement is a broadcast, not a queue; no waiter blocks another.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use super::{SessionError, TerminalSession};

/// Default bound for [`SessionLifecycle::wait_for_ready`].
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(8000);

#[derive(Clone)]
enum LifecycleState {
    Pending,
    Ready(Arc<dyn TerminalSession>),
    Failed(SessionError),
}

/// Coordinates one asynchronous session creation per surface.
pub struct SessionLifecycle {
    tx: watch::Sender<LifecycleState>,
}

impl SessionLifecycle {
    /// A lifecycle in the pending state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(LifecycleState::Pending);
        Self { tx }
    }

    /// Current session handle, if initialization already succeeded.
    pub fn session(&self) -> Option<Arc<dyn TerminalSession>> {
        match &*self.tx.borrow() {
            LifecycleState::Ready(session) => Some(session.clone()),
            _ => None,
        }
    }

    /// Settle to ready. The first settlement wins; later calls are ignored.
    pub fn settle_ready(&self, session: Arc<dyn TerminalSession>) {
        self.settle(LifecycleState::Ready(session));
    }

    /// Settle to failed. The first settlement wins; later calls are ignored.
    pub fn settle_failed(&self, error: SessionError) {
        self.settle(LifecycleState::Failed(error));
    }

    fn settle(&self, outcome: LifecycleState) {
        self.tx.send_if_modified(|state| {
            if matches!(state, LifecycleState::Pending) {
                *state = outcome;
                true
            } else {
                debug!("session lifecycle already settled; ignoring");
                false
            }
        });
    }

    /// Wait until the session is ready, bounded by `timeout`.
    ///
    /// Returns the handle immediately when already ready. A settled failure
    /// returns the initialization error. Timing out abandons the wait only:
    /// the initialization keeps running and a later wait still observes its
    /// outcome.
    pub async fn wait_for_ready(
        &self,
        timeout: Duration,
    ) -> Result<Arc<dyn TerminalSession>, SessionError> {
        let mut rx = self.tx.subscribe();
        let settled = tokio::time::timeout(
            timeout,
            rx.wait_for(|state| !matches!(state, LifecycleState::Pending)),
        )
        .await;

        let not_initialized = SessionError::NotInitialized(timeout.as_millis() as u64);
        match settled {
            Ok(Ok(state)) => match &*state {
                LifecycleState::Ready(session) => Ok(session.clone()),
                LifecycleState::Failed(error) => Err(error.clone()),
                // `wait_for` only returns settled states.
                LifecycleState::Pending => Err(not_initialized),
            },
            Ok(Err(_)) | Err(_) => Err(not_initialized),
        }
    }
}

impl Default for SessionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct StubSession {
        id: Uuid,
    }

    impl StubSession {
        fn new() -> Arc<Self> {
            Arc::new(Self { id: Uuid::new_v4() })
        }
    }

    impl TerminalSession for StubSession {
        fn id(&self) -> Uuid {
            self.id
        }
        fn write(&self, _text: &str) {}
        fn is_alive(&self) -> bool {
            true
        }
        fn focus(&self) {}
    }

    #[tokio::test(start_paused = true)]
    async fn wait_times_out_when_nothing_settles() {
        let lifecycle = SessionLifecycle::new();
        let started = tokio::time::Instant::now();
        let result = lifecycle.wait_for_ready(Duration::from_millis(50)).await;
        let elapsed = started.elapsed();
        assert!(matches!(result, Err(SessionError::NotInitialized(50))));
        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed < Duration::from_millis(60));
    }

    #[tokio::test]
    async fn ready_state_is_returned_immediately() {
        let lifecycle = SessionLifecycle::new();
        let session = StubSession::new();
        lifecycle.settle_ready(session.clone());
        let handle = lifecycle
            .wait_for_ready(Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(handle.id(), session.id());
        assert_eq!(lifecycle.session().unwrap().id(), session.id());
    }

    #[tokio::test]
    async fn concurrent_waiters_all_observe_the_same_handle() {
        let lifecycle = Arc::new(SessionLifecycle::new());
        let session = StubSession::new();

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let lifecycle = lifecycle.clone();
                tokio::spawn(async move {
                    lifecycle.wait_for_ready(Duration::from_secs(1)).await
                })
            })
            .collect();

        tokio::task::yield_now().await;
        lifecycle.settle_ready(session.clone());

        for waiter in waiters {
            let handle = waiter.await.unwrap().unwrap();
            assert_eq!(handle.id(), session.id());
        }
    }

    #[tokio::test]
    async fn settlement_is_exactly_once() {
        let lifecycle = SessionLifecycle::new();
        let first = StubSession::new();
        let second = StubSession::new();
        lifecycle.settle_ready(first.clone());
        lifecycle.settle_ready(second);
        lifecycle.settle_failed(SessionError::ServiceUnavailable);
        assert_eq!(lifecycle.session().unwrap().id(), first.id());
    }

    #[tokio::test]
    async fn failure_reaches_waiters_and_late_callers() {
        let lifecycle = Arc::new(SessionLifecycle::new());
        let waiter = {
            let lifecycle = lifecycle.clone();
            tokio::spawn(async move { lifecycle.wait_for_ready(Duration::from_secs(1)).await })
        };

        tokio::task::yield_now().await;
        lifecycle.settle_failed(SessionError::InitFailed("spawn failed".into()));

        assert!(matches!(
            waiter.await.unwrap(),
            Err(SessionError::InitFailed(_))
        ));
        // Late caller observes the settled failure without waiting.
        assert!(matches!(
            lifecycle.wait_for_ready(Duration::from_millis(1)).await,
            Err(SessionError::InitFailed(_))
        ));
        assert!(lifecycle.session().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_wait_can_be_retried_while_init_continues() {
        let lifecycle = Arc::new(SessionLifecycle::new());
        let session = StubSession::new();

        let first = lifecycle.wait_for_ready(Duration::from_millis(10)).await;
        assert!(matches!(first, Err(SessionError::NotInitialized(10))));

        lifecycle.settle_ready(session.clone());
        let retry = lifecycle.wait_for_ready(Duration::from_millis(10)).await;
        assert_eq!(retry.unwrap().id(), session.id());
    }
}
