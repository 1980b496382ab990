//! Surface configuration supplied by the embedding host.

use serde::Deserialize;

use crate::session::DEFAULT_WAIT_TIMEOUT;

/// Deep-link scheme resolved against the vault unless the host overrides it.
pub const DEFAULT_APP_SCHEME: &str = "vault";

/// Host-supplied knobs for one terminal surface.
///
/// Hosts typically deserialize this from their settings store; every field
/// defaults, so an empty object is a valid configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// URI scheme of the host's internal deep links (`<scheme>://…`).
    pub app_scheme: String,
    /// Milliseconds a drop waits for session initialization.
    pub wait_timeout_ms: u64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            app_scheme: DEFAULT_APP_SCHEME.to_string(),
            wait_timeout_ms: DEFAULT_WAIT_TIMEOUT.as_millis() as u64,
        }
    }
}
