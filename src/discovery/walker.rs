//! Bounded Tree Walker
//!
//! Repository content is untrusted input: without limits a pathological
//! tree could exhaust memory or time. Every discovery routine walks through
//! this type, which enforces a maximum depth, a maximum number of files
//! visited per walk, and a maximum per-file size checked via metadata
//! before any content is read. Hitting a limit is not an error; the walk
//! logs once and returns whatever was already found.

use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

/// Default maximum directory depth below the walk root.
pub const MAX_DEPTH: usize = 10;
/// Default maximum number of files visited in one walk.
pub const MAX_FILES: usize = 100;
/// Default maximum individual file size in bytes (256 KiB).
pub const MAX_FILE_SIZE: u64 = 256 * 1024;

/// Limits applied to a single walk.
#[derive(Debug, Clone, Copy)]
pub struct WalkLimits {
    pub max_depth: usize,
    pub max_files: usize,
    pub max_file_size: u64,
}

impl Default for WalkLimits {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_files: MAX_FILES,
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

/// Stateful bounded walker.
///
/// Counters live on the struct rather than in closures so the bounding
/// logic is testable on its own. One walker instance covers one walk.
pub struct BoundedWalker {
    limits: WalkLimits,
    files_seen: usize,
    truncated: bool,
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_ascii_lowercase();
            extensions.iter().any(|wanted| *wanted == lower)
        })
        .unwrap_or(false)
}

impl BoundedWalker {
    pub fn new(limits: WalkLimits) -> Self {
        Self {
            limits,
            files_seen: 0,
            truncated: false,
        }
    }

    /// Number of files visited so far.
    pub fn files_seen(&self) -> usize {
        self.files_seen
    }

    /// Whether a depth or count limit cut the walk short.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    fn note_truncation(&mut self, root: &Path, reason: &str) {
        if !self.truncated {
            warn!(root = %root.display(), "Bounded walk truncated: {}", reason);
            self.truncated = true;
        }
    }

    /// Visit every qualifying file under `root`.
    ///
    /// `extensions` are matched case-insensitively, without the leading dot.
    /// Hidden entries are skipped as files and as directories. The callback
    /// receives the file's path and its path relative to `root`.
    pub fn walk_files<F>(&mut self, root: &Path, extensions: &[&str], mut visit: F)
    where
        F: FnMut(&Path, &Path),
    {
        let walker = WalkDir::new(root)
            .max_depth(self.limits.max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %root.display(), "Walk error, skipping entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                if entry.depth() == self.limits.max_depth && dir_has_entries(entry.path()) {
                    self.note_truncation(root, "maximum depth reached");
                }
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }
            if self.files_seen >= self.limits.max_files {
                self.note_truncation(root, "maximum file count reached");
                return;
            }
            self.files_seen += 1;
            if !has_extension(entry.path(), extensions) {
                continue;
            }
            match entry.metadata() {
                Ok(meta) if meta.len() > self.limits.max_file_size => {
                    warn!(
                        path = %entry.path().display(),
                        size = meta.len(),
                        "File exceeds size limit, skipping"
                    );
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %entry.path().display(), "Failed to stat file, skipping: {}", e);
                    continue;
                }
            }
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            visit(entry.path(), rel);
        }
    }

    /// Visit directories under `root`, depth-first.
    ///
    /// The callback receives the directory's path and relative path and
    /// returns `true` to claim the directory, which stops descent into it.
    /// Claimed directories count against the file budget (each one is a
    /// unit of later work). The root itself is never visited.
    pub fn walk_dirs<F>(&mut self, root: &Path, mut visit: F)
    where
        F: FnMut(&Path, &Path) -> bool,
    {
        let mut iter = WalkDir::new(root)
            .max_depth(self.limits.max_depth)
            .follow_links(false)
            .into_iter();

        loop {
            let entry = match iter.next() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    warn!(root = %root.display(), "Walk error, skipping entry: {}", e);
                    continue;
                }
                None => break,
            };
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                continue;
            }
            if is_hidden(&entry) {
                iter.skip_current_dir();
                continue;
            }
            if self.files_seen >= self.limits.max_files {
                self.note_truncation(root, "maximum file count reached");
                return;
            }
            if entry.depth() == self.limits.max_depth && dir_has_entries(entry.path()) {
                self.note_truncation(root, "maximum depth reached");
            }
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if visit(entry.path(), rel) {
                self.files_seen += 1;
                iter.skip_current_dir();
            }
        }
    }
}

fn dir_has_entries(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
