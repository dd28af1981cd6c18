//! Ranking and containment filtering of common phrases.
//!
//! The stages are kept separate so each ordering rule can be checked on its
//! own. Exact ties on every documented key fall back to byte order of the
//! text, which keeps output stable across runs.

use std::cmp::Ordering;
use std::collections::HashSet;

use super::PhraseRecord;

/// Frequency descending, then character length descending.
fn by_frequency_then_length(a: &PhraseRecord, b: &PhraseRecord) -> Ordering {
    b.document_frequency
        .cmp(&a.document_frequency)
        .then_with(|| b.char_len().cmp(&a.char_len()))
        .then_with(|| a.text.cmp(&b.text))
}

/// Character length descending, then frequency descending.
fn by_length_then_frequency(a: &PhraseRecord, b: &PhraseRecord) -> Ordering {
    b.char_len()
        .cmp(&a.char_len())
        .then_with(|| b.document_frequency.cmp(&a.document_frequency))
        .then_with(|| a.text.cmp(&b.text))
}

/// Order candidates by frequency, preferring longer phrases on ties.
pub fn rank_candidates(mut phrases: Vec<PhraseRecord>) -> Vec<PhraseRecord> {
    phrases.sort_by(by_frequency_then_length);
    phrases
}

/// Longest-match-wins de-duplication.
///
/// Walks phrases from longest to shortest. Each phrase not yet removed is
/// kept, and every other phrase it contains with *exactly* the same
/// frequency is removed. A shorter phrase with a different frequency stays:
/// it occurs in captions the longer phrase does not cover.
///
/// Stops keeping phrases once `limit` are kept. The returned order is the
/// walk order (length first); pass it through [`rank_final`] for display.
#[tracing::instrument(level = "debug", skip(phrases), fields(candidates = phrases.len()))]
pub fn filter_contained(mut phrases: Vec<PhraseRecord>, limit: usize) -> Vec<PhraseRecord> {
    phrases.sort_by(by_length_then_frequency);

    let mut kept = Vec::new();
    let mut removed: HashSet<usize> = HashSet::new();

    for (i, phrase) in phrases.iter().enumerate() {
        if removed.contains(&i) {
            continue;
        }
        kept.push(phrase.clone());

        for (j, other) in phrases.iter().enumerate() {
            if j == i || other.document_frequency != phrase.document_frequency {
                continue;
            }
            if phrase.text.contains(other.text.as_str()) {
                removed.insert(j);
            }
        }

        if kept.len() >= limit {
            break;
        }
    }

    tracing::trace!(kept = kept.len(), removed = removed.len(), "containment filter done");
    kept
}

/// Final display order: frequency descending, then length descending.
pub fn rank_final(phrases: Vec<PhraseRecord>) -> Vec<PhraseRecord> {
    rank_candidates(phrases)
}
