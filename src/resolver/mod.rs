//! Drop-payload path resolution.
//!
//! Turns one heterogeneous drop payload into an ordered, deduplicated list
//! of canonical absolute filesystem paths. Extraction never fails: a source
//! that yields nothing is skipped, and a payload that yields nothing overall
//! resolves to an empty list for the caller to surface.

mod token;
mod uri;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::LazyLock;

use futures::future;
use regex::Regex;
use tracing::{debug, trace};

use crate::host::VaultIndex;
use crate::payload::{DropItemKind, DropPayload, HTML_TEXT, PLAIN_TEXT, URI_LIST};
use crate::platform::{Platform, starts_with_drive};

use token::{extract_tokens, normalize_token};
use uri::{app_link_target, file_uri_to_path};

/// `[[target]]`, optionally followed by `#section` and/or `|alias`.
static WIKI_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\[([^\]|#]+)(?:#[^\]|]+)?(?:\|[^\]]+)?\]\]$").expect("wiki link pattern")
});

/// Resolves drop payloads into absolute filesystem paths.
///
/// The platform and the host's internal deep-link scheme are fixed at
/// construction; one resolver serves every drop on its surface.
pub struct PathResolver {
    platform: Platform,
    vault: Arc<dyn VaultIndex>,
    scheme_prefix: String,
    uri_scan: Regex,
}

impl PathResolver {
    pub fn new(platform: Platform, vault: Arc<dyn VaultIndex>, app_scheme: &str) -> Self {
        let scheme = app_scheme.to_lowercase();
        // Scheme is escaped, so the pattern always compiles.
        let uri_scan = Regex::new(&format!(
            r#"(?:{}|file)://[^\s<>"'`]+"#,
            regex::escape(&scheme)
        ))
        .expect("uri scan pattern");
        Self {
            platform,
            vault,
            scheme_prefix: format!("{scheme}://"),
            uri_scan,
        }
    }

    /// Extract every usable path from `payload`.
    ///
    /// All sources are attempted in a fixed order — item paths, file-handle
    /// paths, entry paths, then free text — and every candidate is collected
    /// before dedup, so discovery order decides which duplicate survives.
    pub async fn resolve(&self, payload: DropPayload) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();
        let mut pending_content = Vec::new();

        let DropPayload { items, files, text } = payload;

        for item in items {
            if let Some(path) = &item.path {
                let trimmed = path.trim();
                if !trimmed.is_empty() {
                    debug!(source = "item-path", path = trimmed, "drop candidate");
                    candidates.push(trimmed.to_string());
                }
            }
            if let Some(file) = item.file {
                if let Some(path) = file.native_path() {
                    debug!(source = "item-file", path = %path, "drop candidate");
                    candidates.push(path);
                }
            }
            if let Some(entry) = &item.entry_path {
                if let Some(path) = entry_to_path(entry) {
                    debug!(source = "item-entry", path = %path, "drop candidate");
                    candidates.push(path);
                }
            }
            if item.kind == DropItemKind::String {
                if let Some(content) = item.content {
                    pending_content.push(content);
                }
            }
        }

        for file in files {
            if let Some(path) = file.native_path() {
                debug!(source = "file", path = %path, "drop candidate");
                candidates.push(path);
            }
        }

        let text = self.assemble_text(&text, pending_content).await;
        for token in extract_tokens(&text, &self.uri_scan) {
            match self.resolve_token(&token) {
                Some(path) => {
                    debug!(source = "text", token = %token, path = %path, "drop candidate");
                    candidates.push(path);
                }
                None => trace!(token = %token, "token yielded no path"),
            }
        }

        self.dedup(candidates)
    }

    /// Join every text representation and string-item content into one
    /// newline-separated block: URI-list, plain text, HTML, every other
    /// named representation, then item contents. Item retrievals run
    /// concurrently and are joined before tokenization, so latency is
    /// bounded by the slowest single retrieval. Parts are deduplicated by
    /// exact equality.
    async fn assemble_text(
        &self,
        text: &[(String, String)],
        pending_content: Vec<crate::payload::StringContent>,
    ) -> String {
        let mut parts: Vec<String> = Vec::new();

        for name in [URI_LIST, PLAIN_TEXT, HTML_TEXT] {
            if let Some(value) = text.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str()) {
                if !value.is_empty() {
                    parts.push(value.to_string());
                }
            }
        }
        for (name, value) in text {
            if name == URI_LIST || name == PLAIN_TEXT || name == HTML_TEXT {
                continue;
            }
            if !value.is_empty() {
                parts.push(value.clone());
            }
        }

        for value in future::join_all(pending_content).await.into_iter().flatten() {
            if !value.trim().is_empty() {
                parts.push(value);
            }
        }

        let mut seen = HashSet::new();
        parts.retain(|part| seen.insert(part.clone()));
        parts.join("\n")
    }

    /// Resolve one token; the first step to succeed wins.
    fn resolve_token(&self, raw: &str) -> Option<String> {
        let normalized = normalize_token(raw);
        if normalized.is_empty() {
            return None;
        }

        if let Some(target) = app_link_target(&normalized, &self.scheme_prefix) {
            return self.vault_to_absolute(&target);
        }
        if let Some(path) = file_uri_to_path(&normalized, self.platform) {
            return Some(path);
        }
        if let Some(captures) = WIKI_LINK.captures(&normalized) {
            return self.vault_to_absolute(&captures[1]);
        }
        if let Some(path) = self.vault_to_absolute(&normalized) {
            return Some(path);
        }
        // Last resort: accept an already-absolute shape verbatim, without
        // existence verification.
        if self.platform.is_absolute(&normalized) {
            return Some(normalized);
        }
        None
    }

    /// Resolve a vault-relative path through the host index and compose it
    /// with the vault base. No match means no candidate.
    fn vault_to_absolute(&self, path_like: &str) -> Option<String> {
        let cleaned = normalize_token(path_like);
        let vault_path = vault_slash_path(cleaned.trim_start_matches('/'));
        if vault_path.is_empty() {
            return None;
        }

        let active = self.vault.active_document().unwrap_or_default();
        let relative = self.vault.file_for_vault_path(&vault_path, &active)?;
        let base = self.vault.absolute_base_path();
        let joined = format!("{}/{}", base.trim_end_matches('/'), relative);
        Some(self.platform.normalize_separators(&joined))
    }

    /// Keep the first occurrence of each platform-normalized key, preserving
    /// that occurrence's original casing.
    fn dedup(&self, candidates: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for raw in candidates {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            if seen.insert(self.platform.dedup_key(trimmed)) {
                result.push(trimmed.to_string());
            }
        }
        result
    }
}

/// Quote resolved paths for keystroke injection into a shell-like session:
/// each path double-quoted with embedded double quotes escaped, joined with
/// single spaces.
pub fn format_paths(paths: &[String]) -> String {
    paths
        .iter()
        .map(|path| format!("\"{}\"", path.replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Vault paths use forward slashes with no duplicate or trailing
/// separators, whatever the source wrote.
fn vault_slash_path(value: &str) -> String {
    value
        .replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Accept a filesystem-entry `fullPath` only when it already has a
/// recognizable absolute shape. Relative entry paths cannot be resolved
/// against anything and are discarded rather than guessed.
fn entry_to_path(full_path: &str) -> Option<String> {
    let trimmed = full_path.trim();
    if trimmed.is_empty() {
        return None;
    }
    if starts_with_drive(trimmed) || trimmed.starts_with("\\\\") {
        return Some(trimmed.replace('/', "\\"));
    }
    // Drive-letter path misencoded with a POSIX-style leading slash.
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 4
        && bytes[0] == b'/'
        && bytes[1].is_ascii_alphabetic()
        && bytes[2] == b':'
        && (bytes[3] == b'/' || bytes[3] == b'\\')
    {
        return Some(trimmed[1..].replace('/', "\\"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{DropFile, DropItem, DropItemKind};

    struct StubVault {
        base: &'static str,
        files: Vec<&'static str>,
    }

    impl StubVault {
        fn new(base: &'static str, files: &[&'static str]) -> Arc<Self> {
            Arc::new(Self {
                base,
                files: files.to_vec(),
            })
        }
    }

    impl VaultIndex for StubVault {
        fn active_document(&self) -> Option<String> {
            None
        }

        fn file_for_vault_path(&self, vault_path: &str, _active: &str) -> Option<String> {
            if self.files.contains(&vault_path) {
                return Some(vault_path.to_string());
            }
            let with_extension = format!("{vault_path}.md");
            self.files
                .iter()
                .find(|file| **file == with_extension)
                .map(|file| file.to_string())
        }

        fn absolute_base_path(&self) -> String {
            self.base.to_string()
        }
    }

    fn posix_resolver(files: &[&'static str]) -> PathResolver {
        PathResolver::new(Platform::Posix, StubVault::new("/vault", files), "vault")
    }

    fn windows_resolver(files: &[&'static str]) -> PathResolver {
        PathResolver::new(
            Platform::Windows,
            StubVault::new("C:/vault", files),
            "vault",
        )
    }

    #[tokio::test]
    async fn empty_payload_resolves_to_nothing() {
        let resolver = posix_resolver(&[]);
        assert!(resolver.resolve(DropPayload::new()).await.is_empty());
    }

    #[tokio::test]
    async fn uri_list_resolves_in_order() {
        let resolver = posix_resolver(&[]);
        let payload = DropPayload::new().with_text(
            URI_LIST,
            "file:///home/u/notes/a.md\nfile:///home/u/notes/b.md",
        );
        let paths = resolver.resolve(payload).await;
        assert_eq!(paths, vec!["/home/u/notes/a.md", "/home/u/notes/b.md"]);
        assert_eq!(
            format_paths(&paths),
            "\"/home/u/notes/a.md\" \"/home/u/notes/b.md\""
        );
    }

    #[tokio::test]
    async fn native_path_and_file_uri_to_same_file_dedup_to_one() {
        let resolver = posix_resolver(&[]);
        let payload = DropPayload::new()
            .with_file(DropFile::with_path("/home/u/notes/a.md"))
            .with_text(URI_LIST, "file:///home/u/notes/a.md");
        let paths = resolver.resolve(payload).await;
        assert_eq!(paths, vec!["/home/u/notes/a.md"]);
    }

    #[tokio::test]
    async fn wiki_link_resolves_through_the_vault() {
        let resolver = posix_resolver(&["Projects/Plan.md"]);
        let payload = DropPayload::new().with_text(PLAIN_TEXT, "[[Projects/Plan]]");
        let paths = resolver.resolve(payload).await;
        assert_eq!(paths, vec!["/vault/Projects/Plan.md"]);
    }

    #[tokio::test]
    async fn wiki_link_with_section_and_alias_resolves() {
        let resolver = posix_resolver(&["Projects/Plan.md"]);
        let payload = DropPayload::new().with_text(PLAIN_TEXT, "[[Projects/Plan#Goals|the plan]]");
        assert_eq!(
            resolver.resolve(payload).await,
            vec!["/vault/Projects/Plan.md"]
        );
    }

    #[tokio::test]
    async fn wiki_link_to_missing_note_yields_nothing() {
        let resolver = posix_resolver(&[]);
        let payload = DropPayload::new().with_text(PLAIN_TEXT, "[[Nowhere]]");
        assert!(resolver.resolve(payload).await.is_empty());
    }

    #[tokio::test]
    async fn app_link_resolves_through_the_vault() {
        let resolver = posix_resolver(&["Projects/Plan.md"]);
        let payload =
            DropPayload::new().with_text(PLAIN_TEXT, "vault://open?file=Projects%2FPlan.md");
        assert_eq!(
            resolver.resolve(payload).await,
            vec!["/vault/Projects/Plan.md"]
        );
    }

    #[tokio::test]
    async fn bare_vault_relative_token_resolves() {
        let resolver = posix_resolver(&["Notes/Todo.md"]);
        let payload = DropPayload::new().with_text(PLAIN_TEXT, "Notes/Todo.md");
        assert_eq!(resolver.resolve(payload).await, vec!["/vault/Notes/Todo.md"]);
    }

    #[tokio::test]
    async fn absolute_token_outside_the_vault_is_kept_verbatim() {
        let resolver = posix_resolver(&[]);
        let payload = DropPayload::new().with_text(PLAIN_TEXT, "/etc/hosts");
        assert_eq!(resolver.resolve(payload).await, vec!["/etc/hosts"]);
    }

    #[tokio::test]
    async fn unresolvable_tokens_are_dropped_silently() {
        let resolver = posix_resolver(&[]);
        let payload =
            DropPayload::new().with_text(PLAIN_TEXT, "just some words\nhttps://example.com/x");
        assert!(resolver.resolve(payload).await.is_empty());
    }

    #[tokio::test]
    async fn string_item_contents_are_retrieved_and_tokenized() {
        let resolver = posix_resolver(&[]);
        let payload = DropPayload::new()
            .with_item(
                DropItem::new(DropItemKind::String)
                    .with_content(async { Some("file:///home/u/a.md".to_string()) }),
            )
            .with_item(
                DropItem::new(DropItemKind::String)
                    .with_content(async { Some("/home/u/b.md".to_string()) }),
            );
        let paths = resolver.resolve(payload).await;
        assert_eq!(paths, vec!["/home/u/a.md", "/home/u/b.md"]);
    }

    #[tokio::test]
    async fn failed_content_retrieval_does_not_block_other_sources() {
        let resolver = posix_resolver(&[]);
        let payload = DropPayload::new()
            .with_item(DropItem::new(DropItemKind::String).with_content(async { None }))
            .with_file(DropFile::with_path("/home/u/a.md"));
        assert_eq!(resolver.resolve(payload).await, vec!["/home/u/a.md"]);
    }

    #[tokio::test]
    async fn other_text_representations_are_scanned_after_the_named_three() {
        let resolver = posix_resolver(&[]);
        let payload = DropPayload::new()
            .with_text("application/x-custom", "file:///home/u/custom.md")
            .with_text(PLAIN_TEXT, "/home/u/plain.md");
        // Plain text is consumed first even though the custom type was
        // attached earlier.
        assert_eq!(
            resolver.resolve(payload).await,
            vec!["/home/u/plain.md", "/home/u/custom.md"]
        );
    }

    #[tokio::test]
    async fn duplicate_text_parts_collapse_before_tokenization() {
        let resolver = posix_resolver(&[]);
        let payload = DropPayload::new()
            .with_text(URI_LIST, "file:///home/u/a.md")
            .with_text("application/x-moz-url", "file:///home/u/a.md");
        assert_eq!(resolver.resolve(payload).await, vec!["/home/u/a.md"]);
    }

    #[tokio::test]
    async fn windows_dedup_is_case_insensitive_and_keeps_first_casing() {
        let resolver = windows_resolver(&[]);
        let payload = DropPayload::new()
            .with_item(DropItem::new(DropItemKind::File).with_path("C:\\Users\\Me\\Note.md"))
            .with_text(URI_LIST, "file:///c:/users/me/note.md");
        let paths = resolver.resolve(payload).await;
        assert_eq!(paths, vec!["C:\\Users\\Me\\Note.md"]);
    }

    #[tokio::test]
    async fn windows_vault_paths_use_backslashes() {
        let resolver = windows_resolver(&["Projects/Plan.md"]);
        let payload = DropPayload::new().with_text(PLAIN_TEXT, "[[Projects/Plan]]");
        assert_eq!(
            resolver.resolve(payload).await,
            vec!["C:\\vault\\Projects\\Plan.md"]
        );
    }

    #[tokio::test]
    async fn entry_paths_are_used_only_with_absolute_shapes() {
        let resolver = windows_resolver(&[]);
        let payload = DropPayload::new()
            .with_item(DropItem::new(DropItemKind::File).with_entry_path("/C:/Users/me/a.md"))
            .with_item(DropItem::new(DropItemKind::File).with_entry_path("/relative/entry"))
            .with_item(DropItem::new(DropItemKind::File).with_entry_path("\\\\server\\share\\b.md"));
        let paths = resolver.resolve(payload).await;
        assert_eq!(
            paths,
            vec!["C:\\Users\\me\\a.md", "\\\\server\\share\\b.md"]
        );
    }

    #[tokio::test]
    async fn quoted_and_encoded_tokens_normalize_before_resolution() {
        let resolver = posix_resolver(&[]);
        let payload = DropPayload::new().with_text(PLAIN_TEXT, "\"/home/u/with%20space.md\"");
        assert_eq!(
            resolver.resolve(payload).await,
            vec!["/home/u/with space.md"]
        );
    }

    #[test]
    fn format_paths_escapes_embedded_quotes() {
        let paths = vec!["/home/u/sa\"y.md".to_string()];
        let formatted = format_paths(&paths);
        assert_eq!(formatted, "\"/home/u/sa\\\"y.md\"");
        // Stripping one layer of backslash-escaped quotes reproduces the
        // original path.
        let unescaped = formatted
            .trim_matches('"')
            .replace("\\\"", "\"");
        assert_eq!(unescaped, "/home/u/sa\"y.md");
    }

    #[test]
    fn entry_path_rejects_relative_shapes() {
        assert_eq!(entry_to_path("notes/a.md"), None);
        assert_eq!(entry_to_path("/posix/absolute"), None);
        assert_eq!(entry_to_path(""), None);
        assert_eq!(
            entry_to_path("C:/Users/me/a.md"),
            Some("C:\\Users\\me\\a.md".to_string())
        );
    }
}
