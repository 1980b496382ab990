//! Terminal session boundary and lifecycle coordination.
//!
//! The session itself — process spawning, I/O, rendering — belongs to the
//! external terminal service. This module owns only the seam to it and the
//! single-flight coordination of its asynchronous creation.

mod lifecycle;

pub use lifecycle::{DEFAULT_WAIT_TIMEOUT, SessionLifecycle};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Session failure taxonomy.
///
/// `InitFailed` is fatal for the owning surface. `NotInitialized` is a wait
/// timeout only — the initialization keeps running and the wait can be
/// retried.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("terminal session initialization failed: {0}")]
    InitFailed(String),
    #[error("terminal session not initialized after {0} ms")]
    NotInitialized(u64),
    #[error("terminal service unavailable")]
    ServiceUnavailable,
}

/// Handle to a live terminal session owned by the external terminal
/// service.
pub trait TerminalSession: Send + Sync {
    /// Stable id of the session within the terminal service.
    fn id(&self) -> Uuid;

    /// Inject text into the session as if typed.
    fn write(&self, text: &str);

    /// Whether the underlying process is still running.
    fn is_alive(&self) -> bool;

    /// Move input focus to the session.
    fn focus(&self);
}

/// Creates terminal sessions. Implemented by the external terminal service.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create_session(&self) -> Result<Arc<dyn TerminalSession>, SessionError>;
}
