//! Terminal surface — composes drop resolution with the session lifecycle.
//!
//! One surface per terminal panel. The host's UI glue forwards drop events
//! and open/close notifications here; everything else (rendering, search,
//! appearance) stays on the host side.

use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, error};

use crate::config::SurfaceConfig;
use crate::host::{Notifier, VaultIndex};
use crate::payload::DropPayload;
use crate::platform::Platform;
use crate::resolver::{PathResolver, format_paths};
use crate::session::{SessionError, SessionFactory, SessionLifecycle, TerminalSession};

/// Drop-target and session coordinator for one terminal panel.
pub struct TerminalSurface {
    resolver: PathResolver,
    lifecycle: SessionLifecycle,
    factory: RwLock<Option<Arc<dyn SessionFactory>>>,
    notifier: Arc<dyn Notifier>,
    wait_timeout: Duration,
    init_attempted: AtomicBool,
    detached: AtomicBool,
}

impl TerminalSurface {
    pub fn new(
        config: SurfaceConfig,
        platform: Platform,
        vault: Arc<dyn VaultIndex>,
        factory: Option<Arc<dyn SessionFactory>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            resolver: PathResolver::new(platform, vault, &config.app_scheme),
            lifecycle: SessionLifecycle::new(),
            factory: RwLock::new(factory),
            notifier,
            wait_timeout: Duration::from_millis(config.wait_timeout_ms),
            init_attempted: AtomicBool::new(false),
            detached: AtomicBool::new(false),
        }
    }

    /// Attach the terminal service after construction. Has no effect on an
    /// initialization already in flight.
    pub fn set_factory(&self, factory: Arc<dyn SessionFactory>) {
        if let Ok(mut slot) = self.factory.write() {
            *slot = Some(factory);
        }
    }

    /// Kick off session creation through the terminal service.
    ///
    /// At most one initialization runs per surface lifetime; later calls
    /// are no-ops. Failure is fatal: the outcome settles failed, a notice
    /// is raised, and the surface detaches.
    pub async fn begin_initialization(&self) {
        if self.init_attempted.swap(true, Ordering::SeqCst) {
            return;
        }

        let result = match self.current_factory() {
            Some(factory) => factory.create_session().await,
            None => Err(SessionError::ServiceUnavailable),
        };

        match result {
            Ok(session) => {
                debug!(session = %session.id(), "terminal session ready");
                self.lifecycle.settle_ready(session);
            }
            Err(err) => {
                error!(error = %err, "terminal session initialization failed");
                self.notifier
                    .notify(&format!("Terminal initialization failed: {err}"));
                self.lifecycle.settle_failed(err);
                self.detached.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Wait for the session with the configured timeout.
    pub async fn wait_for_ready(&self) -> Result<Arc<dyn TerminalSession>, SessionError> {
        self.lifecycle.wait_for_ready(self.wait_timeout).await
    }

    /// Wait for the session with an explicit timeout.
    pub async fn wait_for_ready_within(
        &self,
        timeout: Duration,
    ) -> Result<Arc<dyn TerminalSession>, SessionError> {
        self.lifecycle.wait_for_ready(timeout).await
    }

    /// Current session handle, if initialization already succeeded.
    pub fn session(&self) -> Option<Arc<dyn TerminalSession>> {
        self.lifecycle.session()
    }

    /// Whether a fatal initialization failure tore this surface down.
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    /// Resolve a drop payload without injecting it.
    pub async fn resolve_drop_payload(&self, payload: DropPayload) -> Vec<String> {
        self.resolver.resolve(payload).await
    }

    /// Handle one drop end to end: resolve, quote, inject, focus.
    ///
    /// A payload with nothing usable raises a single notice; the payload
    /// shape goes to the diagnostic log for troubleshooting.
    pub async fn handle_drop(&self, payload: DropPayload) {
        let description = payload.describe();
        let paths = self.resolver.resolve(payload).await;
        if paths.is_empty() {
            debug!(payload = %description, "no usable path in drop payload");
            self.notifier
                .notify("No usable file path in the dropped content.");
            return;
        }

        let input = format_paths(&paths);
        debug!(input = %input, "injecting dropped paths");
        self.write_input(&input).await;
    }

    /// Write to the active session, waiting for initialization when the
    /// session is not yet ready. A failed wait discards the input — the
    /// drop is not replayed.
    async fn write_input(&self, text: &str) {
        let session = match self.lifecycle.session() {
            Some(session) => session,
            None => match self.lifecycle.wait_for_ready(self.wait_timeout).await {
                Ok(session) => session,
                Err(err) => {
                    debug!(error = %err, "dropped input discarded; session unavailable");
                    return;
                }
            },
        };

        if !session.is_alive() {
            debug!(session = %session.id(), "session no longer alive; input discarded");
            return;
        }
        session.write(text);
        session.focus();
    }

    fn current_factory(&self) -> Option<Arc<dyn SessionFactory>> {
        self.factory.read().ok()?.clone()
    }
}
