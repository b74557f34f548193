//! Repository identity derivation.
//!
//! Two identifiers are derived from a configured URL: a short display name
//! (last path segment, `.git` stripped) and a filesystem-safe cache
//! directory token built from the host and path components. Supported URL
//! shapes: `https://host/path`, `git@host:path` (scp form), `file://path`,
//! and bare local paths.

use url::Url;

/// Maximum length of a cache directory identifier.
const CACHE_ID_MAX_LEN: usize = 96;

/// Short display name for a repository URL.
pub fn short_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed
        .rsplit(|c| c == '/' || c == ':')
        .next()
        .unwrap_or(trimmed);
    let stripped = last.strip_suffix(".git").unwrap_or(last);
    if stripped.is_empty() {
        "repo".to_string()
    } else {
        stripped.to_string()
    }
}

/// Split a URL into host and path components.
fn host_and_path(url: &str) -> (String, String) {
    if let Some(rest) = url.strip_prefix("file://") {
        return (String::new(), rest.to_string());
    }
    if url.contains("://") {
        if let Ok(parsed) = Url::parse(url) {
            return (
                parsed.host_str().unwrap_or("").to_string(),
                parsed.path().to_string(),
            );
        }
        return (String::new(), url.to_string());
    }
    // scp form: user@host:path
    if let Some(at) = url.find('@') {
        if let Some(colon) = url[at..].find(':') {
            let host = &url[at + 1..at + colon];
            let path = &url[at + colon + 1..];
            return (host.to_string(), path.to_string());
        }
    }
    // Bare local path
    (String::new(), url.to_string())
}

/// Filesystem-safe cache directory identifier for a repository URL.
pub fn cache_id(url: &str) -> String {
    let (host, path) = host_and_path(url);
    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let combined = if host.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", host, path)
    };
    let mut sanitized: String = combined
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    sanitized.truncate(CACHE_ID_MAX_LEN);
    let trimmed = sanitized.trim_matches('-');
    if trimmed.is_empty() {
        "repo".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Whether a configured URL names a local directory rather than a remote.
pub fn is_local_source(url: &str) -> bool {
    url.starts_with("file://")
        || url.starts_with('/')
        || url.starts_with("./")
        || url.starts_with("../")
        || url.starts_with("~/")
}

/// Resolve a local source URL to a filesystem path string.
pub fn local_path(url: &str) -> &str {
    url.strip_prefix("file://").unwrap_or(url)
}
