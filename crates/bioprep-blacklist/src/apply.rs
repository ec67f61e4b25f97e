//! Blacklist application: rewriting a silver-standard corpus
//!
//! Produces a copy of the target corpus in which every singleton-token
//! annotation matching a blacklisted (token, tag) pair has its tag
//! replaced by `O`. Originals are never mutated; output goes to a fresh
//! directory suffixed `_blacklisted`. There is no transactional
//! guarantee: an interrupted run leaves some files written and others
//! not, which is acceptable for an offline batch tool that is simply
//! re-run from scratch.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use bioprep_core::{PrepError, Result, OUTSIDE_TAG};

use crate::Blacklist;

/// Directory name suffix for the rewritten corpus
pub const OUTPUT_SUFFIX: &str = "_blacklisted";

/// Summary of a blacklist application run
#[derive(Debug, Clone)]
pub struct ApplyReport {
    /// Directory the rewritten corpus was written to
    pub output_dir: PathBuf,

    /// Number of files written
    pub files_written: usize,

    /// Number of annotation lines rewritten to `O`
    pub lines_rewritten: usize,
}

/// Tag of a neighbouring line, with blank lines read as `O`
///
/// A blank line is a sentence/document boundary, so for the purpose of
/// the singleton check it behaves like an outside token.
fn neighbour_tag(line: &str) -> &str {
    if line.trim().is_empty() {
        return OUTSIDE_TAG;
    }
    line.split('\t').next_back().unwrap_or(OUTSIDE_TAG).trim()
}

/// Rewrite the lines of one annotation file
///
/// Interior lines whose neighbours are both non-continuations and whose
/// (token, tag) pair is blacklisted come back as `token\tO`; everything
/// else passes through unchanged, the first and last lines included.
/// Returns the rewritten lines and how many were changed.
pub fn apply_to_lines(blacklist: &Blacklist, lines: &[String]) -> (Vec<String>, usize) {
    let mut output: Vec<String> = lines.to_vec();
    let mut rewritten = 0;

    for i in 1..lines.len().saturating_sub(1) {
        let previous = neighbour_tag(&lines[i - 1]);
        let next = neighbour_tag(&lines[i + 1]);
        let single_token_entity = !previous.starts_with("I-") && !next.starts_with("I-");
        if !single_token_entity {
            continue;
        }

        let Some(ann) = bioprep_conll::parse_line(&lines[i]) else {
            continue;
        };
        if blacklist.contains(&ann) {
            output[i] = format!("{}\t{}", ann.token, OUTSIDE_TAG);
            rewritten += 1;
        }
    }

    (output, rewritten)
}

/// Apply `blacklist` to the corpus at `ssc_dir`, writing a rewritten copy
///
/// The output lands in `output_dir/<ssc_basename>_blacklisted/` with file
/// basenames mirroring the input. Missing input directories or unreadable
/// files abort the run.
pub fn apply(blacklist: &Blacklist, ssc_dir: &Path, output_dir: &Path) -> Result<ApplyReport> {
    let corpus_name = ssc_dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            PrepError::InvalidArguments(format!(
                "SSC path has no directory name: {}",
                ssc_dir.display()
            ))
        })?;

    // the SSC is a single corpus: its files are the first group found
    let groups = bioprep_conll::corpus_groups(ssc_dir)?;
    let files = groups.into_iter().next().unwrap_or_default();

    let destination = output_dir.join(format!("{corpus_name}{OUTPUT_SUFFIX}"));
    std::fs::create_dir_all(&destination).map_err(|e| PrepError::io(&destination, e))?;
    info!(output = %destination.display(), files = files.len(), "writing blacklisted corpus");

    let mut report = ApplyReport {
        output_dir: destination.clone(),
        files_written: 0,
        lines_rewritten: 0,
    };

    for path in &files {
        let lines = bioprep_conll::read_lines(path)?;
        let (rewritten, changed) = apply_to_lines(blacklist, &lines);

        let basename = path.file_name().ok_or_else(|| {
            PrepError::InvalidArguments(format!("annotation path has no basename: {}", path.display()))
        })?;
        let output_path = destination.join(basename);
        let mut file = std::fs::File::create(&output_path).map_err(|e| PrepError::io(&output_path, e))?;
        for line in &rewritten {
            writeln!(file, "{line}").map_err(|e| PrepError::io(&output_path, e))?;
        }

        debug!(path = %path.display(), changed, "rewrote file");
        report.files_written += 1;
        report.lines_rewritten += changed;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bioprep_core::Annotation;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn blacklist(entries: &[(&str, &str)]) -> Blacklist {
        Blacklist::from_entries(
            entries
                .iter()
                .map(|(t, g)| Annotation::new(*t, *g))
                .collect(),
        )
    }

    /// A singleton between blank lines is rewritten
    #[test]
    fn test_singleton_between_blank_lines_rewritten() {
        let input = lines(&["", "aspirin\tB-DISO", ""]);
        let bl = blacklist(&[("aspirin", "B-DISO")]);

        let (output, changed) = apply_to_lines(&bl, &input);
        assert_eq!(output, lines(&["", "aspirin\tO", ""]));
        assert_eq!(changed, 1);
    }

    #[test]
    fn test_multi_token_span_left_alone() {
        // "flu" continues the entity, so "the" is not a singleton
        let input = lines(&["caught\tO", "the\tB-DISO", "flu\tI-DISO", "today\tO"]);
        let bl = blacklist(&[("the", "B-DISO"), ("flu", "I-DISO")]);

        let (output, changed) = apply_to_lines(&bl, &input);
        assert_eq!(output, input);
        assert_eq!(changed, 0);
    }

    #[test]
    fn test_first_and_last_lines_pass_through() {
        let input = lines(&["aspirin\tB-DISO", "x\tO", "aspirin\tB-DISO"]);
        let bl = blacklist(&[("aspirin", "B-DISO")]);

        let (output, changed) = apply_to_lines(&bl, &input);
        assert_eq!(output[0], "aspirin\tB-DISO");
        assert_eq!(output[2], "aspirin\tB-DISO");
        assert_eq!(changed, 0);
    }

    #[test]
    fn test_non_blacklisted_lines_unchanged() {
        let input = lines(&["a\tO", "ibuprofen\tB-DISO", "b\tO"]);
        let bl = blacklist(&[("aspirin", "B-DISO")]);

        let (output, changed) = apply_to_lines(&bl, &input);
        assert_eq!(output, input);
        assert_eq!(changed, 0);
    }

    #[test]
    fn test_application_is_idempotent() {
        let input = lines(&["", "aspirin\tB-DISO", "x\tO", "fever\tB-DISO", ""]);
        let bl = blacklist(&[("aspirin", "B-DISO"), ("fever", "B-DISO")]);

        let (once, first_pass) = apply_to_lines(&bl, &input);
        let (twice, second_pass) = apply_to_lines(&bl, &once);
        assert_eq!(once, twice);
        assert_eq!(first_pass, 2);
        assert_eq!(second_pass, 0);
    }

    #[test]
    fn test_apply_writes_mirrored_copy() {
        let dir = tempfile::tempdir().unwrap();
        let ssc = dir.path().join("calbc");
        std::fs::create_dir_all(&ssc).unwrap();
        std::fs::write(ssc.join("123.tsv"), "\naspirin\tB-DISO\n\n").unwrap();
        let output = dir.path().join("out");

        let bl = blacklist(&[("aspirin", "B-DISO")]);
        let report = apply(&bl, &ssc, &output).unwrap();

        assert_eq!(report.files_written, 1);
        assert_eq!(report.lines_rewritten, 1);
        assert_eq!(report.output_dir, output.join("calbc_blacklisted"));

        let rewritten =
            std::fs::read_to_string(report.output_dir.join("123.tsv")).unwrap();
        assert_eq!(rewritten, "\naspirin\tO\n\n");

        // the original corpus is untouched
        let original = std::fs::read_to_string(ssc.join("123.tsv")).unwrap();
        assert_eq!(original, "\naspirin\tB-DISO\n\n");
    }

    #[test]
    fn test_apply_missing_ssc_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let bl = blacklist(&[]);
        let err = apply(&bl, &dir.path().join("missing"), dir.path()).unwrap_err();
        assert!(matches!(err, PrepError::Io { .. }));
    }
}
