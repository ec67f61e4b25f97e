//! bioprep-standoff - Standoff corpus utilities
//!
//! A standoff corpus pairs a raw text file (`<PMID>.txt`) with a
//! character-offset annotation file (`<PMID>.ann`) whose lines read
//! `T<n>\t<LABEL> <start> <end>\t<surface text>`. This crate covers the
//! lifecycle of such corpora:
//! - [`convert`]: IeXML (CALBC) to standoff conversion
//! - [`clean`]: removing artefacts, lone files, and invalid annotations
//! - [`split`]: partitioning into train/valid/test
//! - [`prune`]: deleting documents listed in a PMID blacklist

pub mod clean;
pub mod convert;
pub mod prune;
pub mod split;

pub use clean::{clean_corpus, CleanReport};
pub use convert::{convert_corpus, ConvertReport};
pub use prune::prune_documents;
pub use split::{split_corpus, SplitReport};

use std::sync::OnceLock;

use regex::Regex;

/// Extension of the raw text half of a document
pub const TEXT_EXTENSION: &str = "txt";

/// Extension of the annotation half of a document
pub const ANN_EXTENSION: &str = "ann";

// ============================================================================
// Annotation Lines
// ============================================================================

/// One entity annotation in a `.ann` file
///
/// Offsets are character (not byte) positions into the paired `.txt`
/// file; `text` is the surface form the offsets are expected to cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandoffAnnotation {
    /// Term number (the `n` of `T<n>`)
    pub id: u32,
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

fn ann_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^T(\d+)\t(\S+) (\d+) (\d+)\t(.*)$").expect("valid regex"))
}

impl StandoffAnnotation {
    /// Parse one `.ann` line; `None` if it does not match the format
    pub fn parse(line: &str) -> Option<Self> {
        let caps = ann_line_regex().captures(line)?;
        Some(Self {
            id: caps[1].parse().ok()?,
            label: caps[2].to_string(),
            start: caps[3].parse().ok()?,
            end: caps[4].parse().ok()?,
            text: caps[5].to_string(),
        })
    }

    /// The character slice of `text_content` this annotation claims to cover
    pub fn covered(&self, text_content: &str) -> String {
        text_content
            .chars()
            .skip(self.start)
            .take(self.end.saturating_sub(self.start))
            .collect()
    }

    /// True if the annotation's surface text matches the paired text file
    pub fn is_valid_for(&self, text_content: &str) -> bool {
        self.covered(text_content) == self.text
    }
}

impl std::fmt::Display for StandoffAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "T{}\t{} {} {}\t{}",
            self.id, self.label, self.start, self.end, self.text
        )
    }
}
