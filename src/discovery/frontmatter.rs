//! Front matter extraction for markdown artifacts.
//!
//! Front matter is a fenced metadata block at the head of the file:
//!
//! ```text
//! ---
//! description: reviews pull requests
//! ---
//! body text
//! ```
//!
//! Parsing is data-only YAML. A language suffix on the opening fence
//! (`---js`, `---coffee`, ...) selects a code-evaluating engine in other
//! ecosystems; here it is treated as a plain parse failure so the artifact
//! is skipped, never evaluated.

use crate::error::SyncError;
use serde::de::DeserializeOwned;

/// Result of splitting a markdown document into front matter and body.
#[derive(Debug, Clone)]
pub struct Extracted {
    /// Parsed front matter, None when the document has no fence at all
    pub data: Option<serde_yaml::Value>,
    /// Document body with the fence removed
    pub body: String,
}

/// Split a document into front matter and body.
///
/// Returns an error for a fence with a language suffix, an unterminated
/// fence, or YAML that does not parse. A document that simply does not
/// start with `---` has no front matter and is not an error.
pub fn extract(content: &str) -> Result<Extracted, SyncError> {
    let mut lines = content.lines();
    let first = match lines.next() {
        Some(line) => line.trim_end_matches('\r'),
        None => {
            return Ok(Extracted {
                data: None,
                body: String::new(),
            })
        }
    };
    if !first.starts_with("---") {
        return Ok(Extracted {
            data: None,
            body: content.to_string(),
        });
    }
    let suffix = first[3..].trim();
    if !suffix.is_empty() {
        return Err(SyncError::Validation(format!(
            "front matter engine '{}' is not allowed",
            suffix
        )));
    }

    let mut yaml_lines: Vec<&str> = Vec::new();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut closed = false;
    for line in lines {
        if !closed && line.trim_end_matches('\r').trim_end() == "---" {
            closed = true;
            continue;
        }
        if closed {
            body_lines.push(line);
        } else {
            yaml_lines.push(line);
        }
    }
    if !closed {
        return Err(SyncError::Validation(
            "front matter fence is not terminated".to_string(),
        ));
    }

    let yaml = yaml_lines.join("\n");
    let data: serde_yaml::Value = serde_yaml::from_str(&yaml)
        .map_err(|e| SyncError::Validation(format!("front matter is not valid YAML: {}", e)))?;
    Ok(Extracted {
        data: Some(data),
        body: body_lines.join("\n"),
    })
}

/// Deserialize extracted front matter into a typed configuration.
pub fn deserialize_data<T: DeserializeOwned>(data: serde_yaml::Value) -> Result<T, SyncError> {
    serde_yaml::from_value(data)
        .map_err(|e| SyncError::Validation(format!("front matter shape rejected: {}", e)))
}
