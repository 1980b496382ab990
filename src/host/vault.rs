//! VaultIndex trait — the host's document index and base-path resolver.

/// Resolves vault-relative paths against the host's managed document
/// collection.
///
/// The resolver asks for the best match relative to the active document;
/// hosts typically implement that as a link-destination lookup with an
/// exact vault-path fallback. A miss is an answer, not an error.
pub trait VaultIndex: Send + Sync {
    /// Vault-relative path of the currently active document, if any.
    /// Anchors best-match lookups.
    fn active_document(&self) -> Option<String>;

    /// Best-matching file for `vault_path` relative to `active_document`,
    /// falling back to an exact vault-path lookup. Returns the matched
    /// file's vault-relative path.
    fn file_for_vault_path(&self, vault_path: &str, active_document: &str) -> Option<String>;

    /// Absolute filesystem path of the vault root.
    fn absolute_base_path(&self) -> String;
}
