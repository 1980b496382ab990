//! Notifier trait — user-visible notices raised by the engine.

/// Surfaces a short notice in the host UI.
///
/// The engine raises exactly two notices: nothing usable in a drop payload,
/// and session initialization failure. Everything quieter goes to tracing.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}
