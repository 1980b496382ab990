//! Drop-payload resolution and session-lifecycle coordination for a
//! host-embedded terminal panel.
//!
//! Two cooperating engines, composed by [`TerminalSurface`]:
//!
//! - [`resolver::PathResolver`] turns an arbitrary drag-and-drop payload —
//!   file handles, structured items, URI lists, wiki-style links, free text
//!   — into a deduplicated list of canonical absolute filesystem paths.
//! - [`session::SessionLifecycle`] guarantees single-flight asynchronous
//!   session creation: any number of callers await the same outcome with a
//!   bounded timeout, and failure is observable exactly once.
//!
//! The host application implements the [`host`] traits (vault lookup, user
//! notices) and the [`session`] traits (session factory and handle); the
//! engine owns everything in between.

pub mod config;
pub mod host;
pub mod logging;
pub mod payload;
pub mod platform;
pub mod resolver;
pub mod session;
pub mod surface;

pub use config::SurfaceConfig;
pub use host::{Notifier, VaultIndex};
pub use payload::{DropFile, DropItem, DropItemKind, DropPayload};
pub use platform::Platform;
pub use resolver::{PathResolver, format_paths};
pub use session::{SessionError, SessionFactory, SessionLifecycle, TerminalSession};
pub use surface::TerminalSurface;
