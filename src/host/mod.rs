//! Traits the embedding host implements.
//!
//! The engine never talks to the host application directly — vault lookups
//! and user-visible notices arrive through these seams, so the core stays
//! pure and testable without a running host.

mod notify;
mod vault;

pub use notify::Notifier;
pub use vault::VaultIndex;
