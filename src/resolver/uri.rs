//! URI-to-path conversion for the two recognized schemes.

use url::Url;

use crate::platform::Platform;

/// Vault-relative target of an internal app-link URI.
///
/// The first query parameter present among `file`, `path`, `linkpath` names
/// the target; a present-but-empty value rejects the token rather than
/// falling through to the next parameter.
pub(crate) fn app_link_target(uri: &str, scheme_prefix: &str) -> Option<String> {
    if !uri.to_lowercase().starts_with(scheme_prefix) {
        return None;
    }
    let url = Url::parse(uri).ok()?;
    let target = ["file", "path", "linkpath"].iter().find_map(|name| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    })?;
    if target.is_empty() {
        None
    } else {
        Some(target)
    }
}

/// Filesystem path of a `file:` URI.
///
/// The path is percent-decoded; on Windows a leading slash before a drive
/// letter is stripped, separators become backslashes, and a host component
/// makes a UNC share. Elsewhere a host component is prefixed as a `//host`
/// network path. Unparseable URIs, non-`file` schemes, and decode failures
/// yield no candidate.
pub(crate) fn file_uri_to_path(uri: &str, platform: Platform) -> Option<String> {
    if !uri.to_lowercase().starts_with("file://") {
        return None;
    }
    let url = Url::parse(uri).ok()?;
    if url.scheme() != "file" {
        return None;
    }

    let path = urlencoding::decode(url.path()).ok()?.into_owned();
    let host = url.host_str().filter(|host| !host.is_empty());

    match platform {
        Platform::Windows => {
            let bytes = path.as_bytes();
            let path = if bytes.len() >= 3
                && bytes[0] == b'/'
                && bytes[1].is_ascii_alphabetic()
                && bytes[2] == b':'
            {
                &path[1..]
            } else {
                &path[..]
            };
            let path = path.replace('/', "\\");
            match host {
                Some(host) => {
                    let path = if path.starts_with('\\') {
                        path
                    } else {
                        format!("\\{path}")
                    };
                    Some(format!("\\\\{host}{path}"))
                }
                None => Some(path),
            }
        }
        Platform::Posix => match host {
            Some(host) => Some(format!("//{host}{path}")),
            None => Some(path),
        },
    }
}
