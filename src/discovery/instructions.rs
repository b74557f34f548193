//! Instruction discovery.
//!
//! Instructions are not tree-walked: the repository-root `manifest.json`
//! enumerates them explicitly. Each listed relative path is validated,
//! resolved inside the repository root, and checked for existence; a
//! missing file is silently omitted rather than treated as an error.

use crate::manifest::{
    is_valid_artifact_name, load_manifest, resolve_within, validate_instruction_path,
};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One discovered instruction document.
#[derive(Debug, Clone)]
pub struct InstructionInfo {
    /// Normalized relative path without the `.md` extension
    pub name: String,
    /// Absolute source path, lexically contained in the repository root
    pub path: PathBuf,
}

/// Discover instruction documents declared by a repository manifest.
pub fn discover_instructions(repo_root: &Path) -> Vec<InstructionInfo> {
    let manifest = match load_manifest(repo_root) {
        Some(manifest) => manifest,
        None => return Vec::new(),
    };
    let mut found = Vec::new();
    for raw in &manifest.instructions {
        let normalized = match validate_instruction_path(raw) {
            Ok(normalized) => normalized,
            Err(e) => {
                warn!(repo = %repo_root.display(), "Instruction path rejected: {}", e);
                continue;
            }
        };
        let path = resolve_within(repo_root, &normalized);
        if !path.is_file() {
            // Declared but absent: omit quietly, the manifest may be ahead
            // of the checked-out ref.
            continue;
        }
        let name = normalized
            .strip_suffix(".md")
            .unwrap_or(&normalized)
            .to_string();
        if !is_valid_artifact_name(&name) {
            warn!(repo = %repo_root.display(), name = %name, "Instruction name has invalid characters, skipping");
            continue;
        }
        found.push(InstructionInfo { name, path });
    }
    debug!(repo = %repo_root.display(), count = found.len(), "Instruction discovery complete");
    found
}
