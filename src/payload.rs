//! Drop payload model — the data attached to one drag-and-drop event.
//!
//! Payload shape is environment-dependent: every field a drag source may
//! attach is independently optional and probed defensively. Absence is
//! normal, not an error. No payload outlives the handling of one drop.

use futures::future::BoxFuture;
use std::future::Future;

/// MIME name of the URI-list text representation.
pub const URI_LIST: &str = "text/uri-list";
/// MIME name of the plain-text representation.
pub const PLAIN_TEXT: &str = "text/plain";
/// MIME name of the HTML representation.
pub const HTML_TEXT: &str = "text/html";

/// Host capability that lazily resolves a native path for a dropped file.
pub type PathLookup = Box<dyn FnOnce() -> Option<String> + Send>;

/// Deferred retrieval of a string-kind item's content.
pub type StringContent = BoxFuture<'static, Option<String>>;

/// A dropped file handle.
///
/// `path` is the native path the host attached directly; `lookup` is the
/// host's file-to-path capability, consulted only when the direct path is
/// absent or blank. Either or both may be missing.
#[derive(Default)]
pub struct DropFile {
    pub path: Option<String>,
    pub lookup: Option<PathLookup>,
}

impl DropFile {
    /// File with a host-attached native path.
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            lookup: None,
        }
    }

    /// File resolvable only through the host lookup capability.
    pub fn with_lookup(lookup: impl FnOnce() -> Option<String> + Send + 'static) -> Self {
        Self {
            path: None,
            lookup: Some(Box::new(lookup)),
        }
    }

    /// Native path for this file: the attached path when usable, the host
    /// lookup otherwise. Lookup failure yields no candidate.
    pub(crate) fn native_path(self) -> Option<String> {
        if let Some(path) = &self.path {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        let resolved = (self.lookup?)()?;
        let trimmed = resolved.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Kind discriminator mirroring the host's drag item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropItemKind {
    String,
    File,
}

/// One structured drag item.
pub struct DropItem {
    pub kind: DropItemKind,
    /// Raw filesystem path the host environment attached to the item.
    pub path: Option<String>,
    /// File handle behind the item, if any.
    pub file: Option<DropFile>,
    /// Filesystem-entry `fullPath`, if the item exposes an entry.
    pub entry_path: Option<String>,
    /// String content, retrievable once, for string-kind items.
    pub content: Option<StringContent>,
}

impl DropItem {
    pub fn new(kind: DropItemKind) -> Self {
        Self {
            kind,
            path: None,
            file: None,
            entry_path: None,
            content: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_file(mut self, file: DropFile) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_entry_path(mut self, entry_path: impl Into<String>) -> Self {
        self.entry_path = Some(entry_path.into());
        self
    }

    pub fn with_content<F>(mut self, content: F) -> Self
    where
        F: Future<Output = Option<String>> + Send + 'static,
    {
        self.content = Some(Box::pin(content));
        self
    }
}

/// The data attached to one drag-and-drop event.
///
/// Built by the host's drop handler, consumed by
/// [`PathResolver::resolve`](crate::resolver::PathResolver::resolve).
/// Text representations keep their attachment order.
#[derive(Default)]
pub struct DropPayload {
    pub(crate) items: Vec<DropItem>,
    pub(crate) files: Vec<DropFile>,
    pub(crate) text: Vec<(String, String)>,
}

impl DropPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, item: DropItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_file(mut self, file: DropFile) -> Self {
        self.files.push(file);
        self
    }

    /// Attach a named text representation (e.g. `text/uri-list`).
    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.text.push((name.into(), value.into()));
        self
    }

    /// First representation attached under `name`, if any.
    pub(crate) fn text_for(&self, name: &str) -> Option<&str> {
        self.text
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }

    /// Diagnostic summary of the payload shape, logged when resolution
    /// yields nothing usable. Content is elided; only structure is shown.
    pub fn describe(&self) -> String {
        let items: Vec<String> = self
            .items
            .iter()
            .map(|item| {
                format!(
                    "{{kind={:?} path={} file={} entry={} content={}}}",
                    item.kind,
                    item.path.is_some(),
                    item.file.is_some(),
                    item.entry_path.is_some(),
                    item.content.is_some(),
                )
            })
            .collect();
        let text: Vec<&str> = self.text.iter().map(|(name, _)| name.as_str()).collect();
        format!(
            "files={} items=[{}] text={:?}",
            self.files.len(),
            items.join(", "),
            text
        )
    }
}
