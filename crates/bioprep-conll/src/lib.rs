//! bioprep-conll - CoNLL-style corpus reading and annotation indexing
//!
//! Corpora are directory trees of tab-separated annotation files
//! (`token\t...\ttag`, one token per line, BIO tag scheme, blank lines
//! between sentences). This crate walks those trees and builds the
//! in-memory indexes consumed by the blacklist subsystem:
//! - per gold corpus, a set of (token, tag) pairs for O(1) membership;
//! - for the target corpus, the ordered annotation stream plus frequency
//!   counts per (token, tag) pair.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::warn;

use bioprep_core::{Annotation, PrepError, Result};

/// File extension of annotation files inside a corpus directory
pub const ANNOTATION_EXTENSION: &str = "tsv";

// ============================================================================
// Directory Walking
// ============================================================================

/// Collect annotation files grouped per directory under `root`
///
/// Walks `root` recursively and, for every directory (the root included),
/// yields the group of `.tsv` files directly inside it. Each group
/// corresponds to one sub-corpus. Groups and their files are sorted by
/// path so that runs are deterministic; directories without annotation
/// files are omitted.
pub fn corpus_groups(root: &Path) -> Result<Vec<Vec<PathBuf>>> {
    let mut dirs = vec![root.to_path_buf()];
    let mut groups = Vec::new();

    while let Some(dir) = dirs.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|e| PrepError::io(&dir, e))?;

        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PrepError::io(&dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                subdirs.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some(ANNOTATION_EXTENSION) {
                files.push(path);
            }
        }

        if !files.is_empty() {
            files.sort();
            groups.push(files);
        }
        subdirs.sort();
        dirs.extend(subdirs);
    }

    groups.sort();
    Ok(groups)
}

// ============================================================================
// Line Parsing
// ============================================================================

/// Parse one annotation line into a (token, tag) pair
///
/// Only the first and last tab-separated fields are used; middle columns
/// (lemmas, POS tags, offsets) are ignored. Returns `None` for blank
/// lines and for ragged lines with fewer than two fields.
pub fn parse_line(line: &str) -> Option<Annotation> {
    let mut fields = line.split('\t');
    let token = fields.next()?.trim();
    let tag = fields.next_back()?.trim();
    if token.is_empty() || tag.is_empty() {
        return None;
    }
    Some(Annotation::new(token, tag))
}

/// Read the raw lines of an annotation file, blank lines included
///
/// Blank lines are insignificant when indexing but mark sentence
/// boundaries for the blacklist applicator, so callers that need them
/// read the file through this function instead of [`read_annotations`].
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| PrepError::io(path, e))?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Read all (token, tag) pairs from the files at `paths`, in order
///
/// Blank lines are skipped. Ragged lines are skipped too, but logged:
/// lenient by design, the files are machine-generated and the occasional
/// stray line should not abort a multi-hour corpus run.
pub fn read_annotations(paths: &[PathBuf]) -> Result<Vec<Annotation>> {
    let mut annotations = Vec::new();
    for path in paths {
        for line in read_lines(path)? {
            match parse_line(&line) {
                Some(ann) => annotations.push(ann),
                None => {
                    if !line.trim().is_empty() {
                        warn!(path = %path.display(), %line, "skipping malformed annotation line");
                    }
                }
            }
        }
    }
    Ok(annotations)
}

// ============================================================================
// Indexes
// ============================================================================

/// Annotation sets of a collection of gold-standard corpora
///
/// One set per sub-corpus. Bare-token membership is tested as
/// `(token, "O")` against the same sets, which works because the file
/// format tags every unlabeled token `O`.
#[derive(Debug, Default)]
pub struct GoldIndex {
    pub corpora: Vec<HashSet<Annotation>>,
}

impl GoldIndex {
    /// True if the bare token appears (tagged `O`) in at least one corpus
    pub fn token_in_any(&self, ann: &Annotation) -> bool {
        let bare = ann.as_outside();
        self.corpora.iter().any(|corpus| corpus.contains(&bare))
    }

    /// True if the exact (token, tag) pair appears in at least one corpus
    pub fn pair_in_any(&self, ann: &Annotation) -> bool {
        self.corpora.iter().any(|corpus| corpus.contains(ann))
    }
}

/// Ordered annotations and frequency counts of the target corpus
#[derive(Debug, Default)]
pub struct TargetIndex {
    /// All annotations in file-concatenation order
    pub annotations: Vec<Annotation>,

    /// Occurrence count per (token, tag) pair
    pub counts: HashMap<Annotation, usize>,
}

impl TargetIndex {
    /// How often the exact pair occurs in the target corpus
    pub fn frequency(&self, ann: &Annotation) -> usize {
        self.counts.get(ann).copied().unwrap_or(0)
    }
}

/// Index the gold corpora under `root`, one annotation set per sub-corpus
pub fn index_gold(root: &Path) -> Result<GoldIndex> {
    let mut corpora = Vec::new();
    for group in corpus_groups(root)? {
        let annotations = read_annotations(&group)?;
        corpora.push(annotations.into_iter().collect());
    }
    Ok(GoldIndex { corpora })
}

/// Index the target corpus under `root`: ordered stream plus counts
pub fn index_target(root: &Path) -> Result<TargetIndex> {
    let mut annotations = Vec::new();
    for group in corpus_groups(root)? {
        annotations.extend(read_annotations(&group)?);
    }

    let mut counts: HashMap<Annotation, usize> = HashMap::new();
    for ann in &annotations {
        *counts.entry(ann.clone()).or_insert(0) += 1;
    }

    Ok(TargetIndex {
        annotations,
        counts,
    })
}

// ============================================================================
// Tests
// ============================================================================
