//! Skill discovery.
//!
//! A skill is a directory containing a file literally named `SKILL.md`
//! under the repository's `skill`/`skills` root. The directory name is the
//! skill's identity; nesting is flattened with `-` so the identity stays a
//! single path segment when installed. A matched skill directory is not
//! descended into.

use crate::discovery::resolve_kind_root;
use crate::discovery::walker::{BoundedWalker, WalkLimits};
use crate::manifest::is_valid_artifact_name;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Marker file making a directory a skill.
pub const SKILL_FILE: &str = "SKILL.md";

/// One discovered skill.
#[derive(Debug, Clone)]
pub struct SkillInfo {
    /// Flattened identity (`category/sub` becomes `category-sub`)
    pub name: String,
    /// Absolute path of the skill directory
    pub path: PathBuf,
}

/// Discover skills under a repository root.
pub fn discover_skills(repo_root: &Path) -> Vec<SkillInfo> {
    let root = match resolve_kind_root(repo_root, "skill", "skills") {
        Some(root) => root,
        None => return Vec::new(),
    };
    let mut walker = BoundedWalker::new(WalkLimits::default());
    let mut found = Vec::new();
    walker.walk_dirs(&root, |path, rel| {
        if !path.join(SKILL_FILE).is_file() {
            return false;
        }
        match skill_identity(rel) {
            Some(name) if is_valid_artifact_name(&name) => {
                found.push(SkillInfo {
                    name,
                    path: path.to_path_buf(),
                });
            }
            Some(name) => {
                warn!(path = %path.display(), name = %name, "Skill name has invalid characters, skipping");
            }
            None => {
                warn!(path = %path.display(), "Skill path is not valid UTF-8, skipping");
            }
        }
        // Claim the directory either way so nested trees under a skill
        // (valid or not) are not scanned for more skills.
        true
    });
    debug!(root = %root.display(), count = found.len(), "Skill discovery complete");
    found
}

fn skill_identity(rel: &Path) -> Option<String> {
    let mut segments = Vec::new();
    for component in rel.components() {
        segments.push(component.as_os_str().to_str()?);
    }
    Some(segments.join("-"))
}
