//! Repository manifest and path-safety validation.
//!
//! Repositories may carry a root-level `manifest.json` declaring instruction
//! documents. Everything in it is untrusted input: every path is validated
//! against a fail-closed rule set before it can influence the filesystem,
//! and a malformed manifest degrades to "no instructions" rather than
//! failing the sync.

use crate::error::SyncError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Repository-root manifest file name.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Declarative repository manifest (`manifest.json`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoManifest {
    /// Optional schema reference, ignored beyond deserialization
    #[serde(rename = "$schema", default)]
    pub schema: Option<String>,

    /// Relative paths of instruction documents, validated individually
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// Load a repository's manifest.
///
/// Absence of the file is not an error (returns `None`). A present but
/// unparseable manifest is logged and treated the same as absent.
pub fn load_manifest(repo_root: &Path) -> Option<RepoManifest> {
    let path = repo_root.join(MANIFEST_FILE);
    if !path.is_file() {
        return None;
    }
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), "Failed to read manifest: {}", e);
            return None;
        }
    };
    match serde_json::from_str::<RepoManifest>(&raw) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            warn!(path = %path.display(), "Invalid manifest shape, ignoring: {}", e);
            None
        }
    }
}

/// Check an artifact identity against the restricted character set.
///
/// Identities are slash-segmented logical names; anything outside
/// alphanumerics, `-`, `_`, and `/` is rejected.
pub fn is_valid_artifact_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '/')
}

/// Validate and normalize a repository-relative path string.
///
/// Rules: non-empty after trimming, relative (no leading `/`), forward
/// slashes only, no `.` or `..` segments, no doubled or trailing slashes.
/// A leading `./` is stripped, not rejected.
pub fn normalize_relative_path(raw: &str) -> Result<String, SyncError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SyncError::Validation("path is empty".to_string()));
    }
    if trimmed.contains('\\') {
        return Err(SyncError::Validation(format!(
            "path '{}' contains a backslash",
            raw
        )));
    }
    let stripped = trimmed.strip_prefix("./").unwrap_or(trimmed);
    if stripped.starts_with('/') {
        return Err(SyncError::Validation(format!(
            "path '{}' is absolute",
            raw
        )));
    }
    if stripped.is_empty() {
        return Err(SyncError::Validation("path is empty".to_string()));
    }
    for segment in stripped.split('/') {
        if segment.is_empty() {
            return Err(SyncError::Validation(format!(
                "path '{}' has an empty segment",
                raw
            )));
        }
        if segment == "." || segment == ".." {
            return Err(SyncError::Validation(format!(
                "path '{}' contains a relative segment",
                raw
            )));
        }
    }
    Ok(stripped.to_string())
}

/// Validate an instruction path: all relative-path rules plus a `.md`
/// extension with a non-empty basename.
pub fn validate_instruction_path(raw: &str) -> Result<String, SyncError> {
    let normalized = normalize_relative_path(raw)?;
    let basename = normalized.rsplit('/').next().unwrap_or(&normalized);
    match basename.strip_suffix(".md") {
        Some(stem) if !stem.is_empty() => Ok(normalized),
        _ => Err(SyncError::Validation(format!(
            "instruction path '{}' must end in .md with a non-empty basename",
            raw
        ))),
    }
}

/// Resolve a validated relative path against a repository root.
///
/// Because validation forbids absolute paths and `..` segments, the join is
/// lexically contained within the root.
pub fn resolve_within(repo_root: &Path, validated_rel: &str) -> PathBuf {
    let mut path = repo_root.to_path_buf();
    for segment in validated_rel.split('/') {
        path.push(segment);
    }
    path
}
