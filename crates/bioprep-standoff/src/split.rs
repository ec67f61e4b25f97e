//! Train/valid/test partitioning of a standoff corpus
//!
//! Documents are shuffled by stem with a fixed seed, so a corpus always
//! splits the same way, and moved (not copied) into `train/`, `valid/`
//! and `test/` subdirectories of the corpus itself.

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use bioprep_core::{PrepError, Result, SplitConfig};

use crate::{ANN_EXTENSION, TEXT_EXTENSION};

/// Number of documents moved into each partition
#[derive(Debug, Clone, Default)]
pub struct SplitReport {
    pub train: usize,
    pub valid: usize,
    pub test: usize,
}

/// Partition the corpus at `dir` into train/valid/test subdirectories
///
/// The unit of partitioning is the document stem (filename up to the
/// first `.`), so a document's `.txt` and `.ann` always land in the same
/// partition. Stems are sorted before the seeded shuffle; the partition
/// assignment depends only on the corpus contents and the seed.
pub fn split_corpus(dir: &Path, config: &SplitConfig) -> Result<SplitReport> {
    let mut stems = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| PrepError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| PrepError::io(dir, e))?;
        if !entry.path().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            let stem = name.split('.').next().unwrap_or(name).to_string();
            if !stem.is_empty() && !stems.contains(&stem) {
                stems.push(stem);
            }
        }
    }
    stems.sort();

    let mut rng = StdRng::seed_from_u64(config.seed);
    stems.shuffle(&mut rng);

    let train_end = (config.train_fraction * stems.len() as f64).floor() as usize;
    let valid_end = train_end + (config.valid_fraction * stems.len() as f64).floor() as usize;

    let report = SplitReport {
        train: move_documents(dir, &stems[..train_end], "train")?,
        valid: move_documents(dir, &stems[train_end..valid_end], "valid")?,
        test: move_documents(dir, &stems[valid_end..], "test")?,
    };

    info!(
        train = report.train,
        valid = report.valid,
        test = report.test,
        seed = config.seed,
        "split corpus"
    );
    Ok(report)
}

/// Move the `.txt`/`.ann` files of `stems` into `dir/<partition>/`
fn move_documents(dir: &Path, stems: &[String], partition: &str) -> Result<usize> {
    let destination = dir.join(partition);
    std::fs::create_dir_all(&destination).map_err(|e| PrepError::io(&destination, e))?;

    for stem in stems {
        for extension in [ANN_EXTENSION, TEXT_EXTENSION] {
            let source = dir.join(format!("{stem}.{extension}"));
            if source.is_file() {
                let target = destination.join(format!("{stem}.{extension}"));
                std::fs::rename(&source, &target).map_err(|e| PrepError::io(&source, e))?;
            }
        }
    }
    Ok(stems.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture(dir: &Path, count: usize) {
        for i in 0..count {
            fs::write(dir.join(format!("{i:04}.txt")), "text").unwrap();
            fs::write(dir.join(format!("{i:04}.ann")), "").unwrap();
        }
    }

    #[test]
    fn test_partitions_are_disjoint_and_exhaustive() {
        let dir = tempfile::tempdir().unwrap();
        fixture(dir.path(), 20);

        let report = split_corpus(dir.path(), &SplitConfig::default()).unwrap();
        // floor(0.85 * 20) = 17, floor(0.10 * 20) = 2, remainder = 1
        assert_eq!(report.train, 17);
        assert_eq!(report.valid, 2);
        assert_eq!(report.test, 1);

        // no documents left at the top level
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().is_file())
            .count();
        assert_eq!(leftovers, 0);

        // each partition holds full pairs
        for (partition, expected) in [("train", 17), ("valid", 2), ("test", 1)] {
            let files = fs::read_dir(dir.path().join(partition)).unwrap().count();
            assert_eq!(files, expected * 2, "partition {partition}");
        }
    }

    #[test]
    fn test_split_is_deterministic_for_a_seed() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        fixture(dir_a.path(), 10);
        fixture(dir_b.path(), 10);

        let config = SplitConfig::default();
        split_corpus(dir_a.path(), &config).unwrap();
        split_corpus(dir_b.path(), &config).unwrap();

        for partition in ["train", "valid", "test"] {
            let mut names_a: Vec<_> = fs::read_dir(dir_a.path().join(partition))
                .unwrap()
                .map(|e| e.unwrap().file_name())
                .collect();
            let mut names_b: Vec<_> = fs::read_dir(dir_b.path().join(partition))
                .unwrap()
                .map(|e| e.unwrap().file_name())
                .collect();
            names_a.sort();
            names_b.sort();
            assert_eq!(names_a, names_b, "partition {partition}");
        }
    }

    #[test]
    fn test_lone_text_file_still_moves() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1234.txt"), "text").unwrap();

        let report = split_corpus(dir.path(), &SplitConfig::default()).unwrap();
        assert_eq!(report.train + report.valid + report.test, 1);
    }
}
