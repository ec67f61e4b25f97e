//! bioprep-blacklist - Entity blacklist construction and application
//!
//! A silver-standard corpus (SSC) is automatically labeled and noisy. Some
//! of its entity mentions are words that trusted human annotators saw in
//! the gold-standard corpora (GSCs) and deliberately left unlabeled; such
//! mentions are likely mislabeled in the SSC. This crate finds them
//! ([`build`]) and rewrites their tags to `O` in a copy of the SSC
//! ([`apply`]), leaving the original corpus untouched.

pub mod apply;
pub mod builder;

pub use apply::{apply, apply_to_lines, ApplyReport};
pub use builder::{build, BlacklistParams};

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use tracing::info;

use bioprep_core::{Annotation, PrepError, Result};

/// Default filename the blacklist is persisted under
pub const BLACKLIST_FILENAME: &str = "blacklist.txt";

// ============================================================================
// Blacklist
// ============================================================================

/// A capped set of (token, tag) pairs selected for suppression
///
/// Entries are kept in descending target-corpus frequency order (ties by
/// first-seen order). The order only matters for the readability of the
/// saved file; application treats the blacklist as a set.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    entries: Vec<Annotation>,
    index: HashSet<Annotation>,
}

impl Blacklist {
    /// Build a blacklist from already ordered, deduplicated entries
    pub fn from_entries(entries: Vec<Annotation>) -> Self {
        let index = entries.iter().cloned().collect();
        Self { entries, index }
    }

    /// Entries in persistence order
    pub fn entries(&self) -> &[Annotation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// O(1) membership test
    pub fn contains(&self, ann: &Annotation) -> bool {
        self.index.contains(ann)
    }

    /// Write the blacklist to `path`, one `token\ttag` line per entry
    pub fn save(&self, path: &Path) -> Result<()> {
        info!(path = %path.display(), entries = self.len(), "writing blacklist");
        let mut file = std::fs::File::create(path).map_err(|e| PrepError::io(path, e))?;
        for entry in &self.entries {
            writeln!(file, "{}\t{}", entry.token, entry.tag).map_err(|e| PrepError::io(path, e))?;
        }
        Ok(())
    }

    /// Load a blacklist previously written by [`Blacklist::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PrepError::io(path, e))?;
        let mut entries = Vec::new();
        for line in content.lines() {
            match bioprep_conll::parse_line(line) {
                Some(ann) => entries.push(ann),
                None if line.trim().is_empty() => {}
                None => {
                    return Err(PrepError::MalformedAnnotation {
                        path: path.to_path_buf(),
                        line: line.to_string(),
                    })
                }
            }
        }
        Ok(Self::from_entries(entries))
    }
}
