//! Standoff corpus validation and cleaning
//!
//! Three passes over a corpus directory, in order:
//! 1. remove `._*` artefact files left behind by copying tools;
//! 2. remove lone `.txt`/`.ann` files whose pair is missing;
//! 3. remove document pairs whose annotation offsets do not reproduce the
//!    annotated surface text.
//!
//! All removals use the filesystem API directly; nothing is shelled out.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use bioprep_core::{PrepError, Result};

use crate::{StandoffAnnotation, ANN_EXTENSION, TEXT_EXTENSION};

/// Counts of what a cleaning run removed
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    /// `._*` artefact files removed
    pub hidden_removed: usize,

    /// Lone `.txt`/`.ann` files removed
    pub lone_removed: usize,

    /// Document pairs removed for invalid annotations
    pub invalid_removed: usize,
}

/// Validate and clean the standoff corpus at `dir`
pub fn clean_corpus(dir: &Path) -> Result<CleanReport> {
    let report = CleanReport {
        hidden_removed: remove_hidden(dir)?,
        lone_removed: remove_lone_pairs(dir)?,
        invalid_removed: remove_invalid_pairs(dir)?,
    };
    info!(
        hidden = report.hidden_removed,
        lone = report.lone_removed,
        invalid = report.invalid_removed,
        "cleaned corpus"
    );
    Ok(report)
}

/// Filenames directly inside `dir`
fn filenames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut names = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| PrepError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| PrepError::io(dir, e))?;
        if entry.path().is_file() {
            names.push(entry.path());
        }
    }
    names.sort();
    Ok(names)
}

fn remove(path: &Path) -> Result<()> {
    std::fs::remove_file(path).map_err(|e| PrepError::io(path, e))
}

/// Remove `._*` files (macOS metadata that survives file deletion)
fn remove_hidden(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for path in filenames(dir)? {
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("._"));
        if hidden {
            remove(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Remove any `.txt` or `.ann` file whose counterpart is missing
fn remove_lone_pairs(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for path in filenames(dir)? {
        let extension = path.extension().and_then(|e| e.to_str());
        let counterpart = match extension {
            Some(TEXT_EXTENSION) => path.with_extension(ANN_EXTENSION),
            Some(ANN_EXTENSION) => path.with_extension(TEXT_EXTENSION),
            _ => continue,
        };
        if !counterpart.is_file() {
            remove(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Remove document pairs with one or more invalid annotations
///
/// An annotation is invalid when the `start..end` character slice of the
/// paired text file differs from the annotation's own surface text.
fn remove_invalid_pairs(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for ann_path in filenames(dir)? {
        if ann_path.extension().and_then(|e| e.to_str()) != Some(ANN_EXTENSION) {
            continue;
        }
        let txt_path = ann_path.with_extension(TEXT_EXTENSION);
        let text = std::fs::read_to_string(&txt_path).map_err(|e| PrepError::io(&txt_path, e))?;
        let ann_content =
            std::fs::read_to_string(&ann_path).map_err(|e| PrepError::io(&ann_path, e))?;

        let mut valid = true;
        for line in ann_content.lines().filter(|l| !l.trim().is_empty()) {
            let Some(ann) = StandoffAnnotation::parse(line) else {
                warn!(path = %ann_path.display(), line, "unparseable annotation line");
                valid = false;
                break;
            };
            if !ann.is_valid_for(&text) {
                valid = false;
                break;
            }
        }

        if !valid {
            remove(&ann_path)?;
            remove(&txt_path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_removes_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "._1001.txt", "");
        write(dir.path(), "1001.txt", "aspirin");
        write(dir.path(), "1001.ann", "T1\tPRGE 0 7\taspirin\n");

        let report = clean_corpus(dir.path()).unwrap();
        assert_eq!(report.hidden_removed, 1);
        assert!(!dir.path().join("._1001.txt").exists());
        assert!(dir.path().join("1001.txt").exists());
    }

    #[test]
    fn test_removes_lone_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "1001.txt", "aspirin");
        write(dir.path(), "1001.ann", "T1\tPRGE 0 7\taspirin\n");
        write(dir.path(), "2002.txt", "no annotations here");
        write(dir.path(), "3003.ann", "T1\tDISO 0 5\tfever\n");

        let report = clean_corpus(dir.path()).unwrap();
        assert_eq!(report.lone_removed, 2);
        assert!(dir.path().join("1001.txt").exists());
        assert!(!dir.path().join("2002.txt").exists());
        assert!(!dir.path().join("3003.ann").exists());
    }

    #[test]
    fn test_removes_pairs_with_offset_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "1001.txt", "aspirin reduced fever");
        write(dir.path(), "1001.ann", "T1\tPRGE 0 7\taspirin\n");
        // offsets point at the wrong slice
        write(dir.path(), "2002.txt", "aspirin reduced fever");
        write(dir.path(), "2002.ann", "T1\tDISO 0 7\tfever\n");

        let report = clean_corpus(dir.path()).unwrap();
        assert_eq!(report.invalid_removed, 1);
        assert!(dir.path().join("1001.txt").exists());
        assert!(dir.path().join("1001.ann").exists());
        assert!(!dir.path().join("2002.txt").exists());
        assert!(!dir.path().join("2002.ann").exists());
    }

    #[test]
    fn test_valid_corpus_untouched() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "1001.txt", "aspirin reduced fever");
        write(
            dir.path(),
            "1001.ann",
            "T1\tPRGE 0 7\taspirin\nT2\tDISO 16 21\tfever\n",
        );

        let report = clean_corpus(dir.path()).unwrap();
        assert_eq!(report.hidden_removed, 0);
        assert_eq!(report.lone_removed, 0);
        assert_eq!(report.invalid_removed, 0);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(clean_corpus(&dir.path().join("missing")).is_err());
    }
}
