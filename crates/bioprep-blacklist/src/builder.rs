//! Blacklist construction from indexed corpora
//!
//! A (token, tag) pair from the target corpus is blacklisted when it is a
//! singleton-token entity whose bare token appears unlabeled in a gold
//! corpus while the exact pair appears in none of them: a trusted
//! annotator saw the word and chose not to label it as this entity type.

use std::collections::HashSet;

use tracing::info;

use bioprep_conll::{GoldIndex, TargetIndex};
use bioprep_core::BlacklistConfig;

use crate::Blacklist;

/// Tunable parameters for blacklist construction
#[derive(Debug, Clone)]
pub struct BlacklistParams {
    /// Minimum token length (characters) for a candidate
    pub min_token_length: usize,

    /// Maximum number of entries kept, most frequent first
    pub cap: usize,
}

impl Default for BlacklistParams {
    fn default() -> Self {
        Self::from(&BlacklistConfig::default())
    }
}

impl From<&BlacklistConfig> for BlacklistParams {
    fn from(config: &BlacklistConfig) -> Self {
        Self {
            min_token_length: config.min_token_length,
            cap: config.cap,
        }
    }
}

/// Build a blacklist for `entity_type` from the indexed corpora
///
/// Scans the target annotations with a three-wide window; the first and
/// last positions carry no boundary information and are skipped, an
/// accepted edge-case loss. A position is a candidate iff its neighbours
/// are not `I-` continuations (the entity span is exactly one token wide),
/// its tag is `B-<entity_type>`, and the token is long enough.
///
/// Gold membership is existential on purpose: the bare token must appear
/// in at least one gold corpus and the exact pair in none. See the module
/// docs for the rationale.
pub fn build(
    target: &TargetIndex,
    gold: &GoldIndex,
    entity_type: &str,
    params: &BlacklistParams,
) -> Blacklist {
    let mut candidates = Vec::new();
    let mut seen = HashSet::new();

    for window in target.annotations.windows(3) {
        let (previous, current, next) = (&window[0], &window[1], &window[2]);

        let single_token_entity = !previous.is_continuation()
            && current.begins(entity_type)
            && !next.is_continuation();
        if !single_token_entity || current.token_len() < params.min_token_length {
            continue;
        }

        if gold.token_in_any(current) && !gold.pair_in_any(current) && seen.insert(current.clone())
        {
            candidates.push(current.clone());
        }
    }

    // stable sort keeps first-seen order among equal frequencies
    candidates.sort_by_key(|ann| std::cmp::Reverse(target.frequency(ann)));
    candidates.truncate(params.cap);

    info!(
        entity_type,
        entries = candidates.len(),
        "generated blacklist"
    );
    Blacklist::from_entries(candidates)
}
