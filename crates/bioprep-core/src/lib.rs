//! bioprep-core - Domain models, errors, and configuration
//!
//! This crate defines the core abstractions shared by the bioprep tools:
//! - Token/tag annotations in the BIO scheme
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{BlacklistConfig, ConfigError, PrepConfig, SplitConfig};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for corpus preparation operations
#[derive(Error, Debug)]
pub enum PrepError {
    /// Invalid combination of inputs; reported before any work is performed
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// IO error while reading or writing corpus files
    #[error("IO error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// XML error while converting an IeXML corpus
    #[error("XML error: {0}")]
    Xml(String),

    /// A standoff annotation line that cannot be parsed
    #[error("Malformed annotation in {path}: {line}")]
    MalformedAnnotation { path: PathBuf, line: String },

    /// Configuration loading/validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PrepError {
    /// Attach the offending path to a raw IO error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;

// ============================================================================
// Annotations
// ============================================================================

/// Tag given to tokens outside any entity span
pub const OUTSIDE_TAG: &str = "O";

/// Prefix marking the first token of an entity span
pub const BEGIN_PREFIX: &str = "B-";

/// Prefix marking a continuation token of an entity span
pub const INSIDE_PREFIX: &str = "I-";

/// A single (token, tag) pair from a CoNLL-style corpus
///
/// Tags follow the BIO scheme: `O` (outside), `B-<TYPE>` (beginning of an
/// entity of type TYPE), `I-<TYPE>` (continuation). Annotations are
/// immutable once read from a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
    pub token: String,
    pub tag: String,
}

impl Annotation {
    /// Create a new annotation
    pub fn new(token: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            tag: tag.into(),
        }
    }

    /// The same token with its tag forced to `O`
    ///
    /// Used for "does this token appear at all" membership checks against
    /// gold corpora, which tag every unlabeled token `O`.
    pub fn as_outside(&self) -> Annotation {
        Annotation::new(self.token.clone(), OUTSIDE_TAG)
    }

    /// True if the tag begins an entity of `entity_type` (`B-<TYPE>`)
    pub fn begins(&self, entity_type: &str) -> bool {
        self.tag.len() == BEGIN_PREFIX.len() + entity_type.len()
            && self.tag.starts_with(BEGIN_PREFIX)
            && self.tag.ends_with(entity_type)
    }

    /// True if the tag continues an entity span (`I-` prefix)
    pub fn is_continuation(&self) -> bool {
        self.tag.starts_with(INSIDE_PREFIX)
    }

    /// Token length in characters (not bytes)
    pub fn token_len(&self) -> usize {
        self.token.chars().count()
    }
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.token, self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begins_matches_exact_entity_type() {
        let ann = Annotation::new("aspirin", "B-DISO");
        assert!(ann.begins("DISO"));
        assert!(!ann.begins("DIS"));
        assert!(!ann.begins("PRGE"));
    }

    #[test]
    fn test_continuation_detection() {
        assert!(Annotation::new("flu", "I-DISO").is_continuation());
        assert!(!Annotation::new("the", "O").is_continuation());
        assert!(!Annotation::new("flu", "B-DISO").is_continuation());
    }

    #[test]
    fn test_as_outside_keeps_token() {
        let ann = Annotation::new("aspirin", "B-DISO");
        assert_eq!(ann.as_outside(), Annotation::new("aspirin", "O"));
    }

    #[test]
    fn test_token_len_counts_chars() {
        assert_eq!(Annotation::new("naïve", "O").token_len(), 5);
    }
}
