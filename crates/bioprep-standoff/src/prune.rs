//! Removing blacklisted documents from a standoff corpus
//!
//! Some PMIDs overlap with evaluation sets and must not appear in
//! training data. Given a file of PMIDs (one per line), this pass deletes
//! the matching `<PMID>.txt`/`<PMID>.ann` pairs from a corpus.

use std::path::Path;

use tracing::info;

use bioprep_core::{PrepError, Result};

use crate::{ANN_EXTENSION, TEXT_EXTENSION};

/// Delete the documents listed in the PMID file at `blacklist_path`
///
/// Returns the number of documents removed. PMIDs without a matching
/// document are ignored; a missing corpus or blacklist file is fatal.
pub fn prune_documents(corpus_dir: &Path, blacklist_path: &Path) -> Result<usize> {
    if !corpus_dir.is_dir() {
        return Err(PrepError::io(
            corpus_dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "corpus directory not found"),
        ));
    }
    let pmids =
        std::fs::read_to_string(blacklist_path).map_err(|e| PrepError::io(blacklist_path, e))?;

    let mut removed = 0;
    for pmid in pmids.lines().map(str::trim).filter(|p| !p.is_empty()) {
        let txt_path = corpus_dir.join(format!("{pmid}.{TEXT_EXTENSION}"));
        let ann_path = corpus_dir.join(format!("{pmid}.{ANN_EXTENSION}"));
        if txt_path.is_file() {
            std::fs::remove_file(&txt_path).map_err(|e| PrepError::io(&txt_path, e))?;
            removed += 1;
        }
        if ann_path.is_file() {
            std::fs::remove_file(&ann_path).map_err(|e| PrepError::io(&ann_path, e))?;
        }
    }

    info!(removed, "pruned blacklisted documents");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_removes_listed_documents_only() {
        let dir = tempfile::tempdir().unwrap();
        for pmid in ["1001", "2002", "3003"] {
            fs::write(dir.path().join(format!("{pmid}.txt")), "text").unwrap();
            fs::write(dir.path().join(format!("{pmid}.ann")), "").unwrap();
        }
        let blacklist = dir.path().join("pmids.txt");
        fs::write(&blacklist, "1001\n3003\n9999\n").unwrap();

        let removed = prune_documents(dir.path(), &blacklist).unwrap();
        assert_eq!(removed, 2);
        assert!(!dir.path().join("1001.txt").exists());
        assert!(!dir.path().join("1001.ann").exists());
        assert!(dir.path().join("2002.txt").exists());
        assert!(dir.path().join("2002.ann").exists());
        assert!(!dir.path().join("3003.txt").exists());
    }

    #[test]
    fn test_missing_blacklist_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(prune_documents(dir.path(), &dir.path().join("missing.txt")).is_err());
    }
}
