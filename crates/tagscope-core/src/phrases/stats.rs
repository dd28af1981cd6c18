//! Document-frequency tables for candidate phrases.

use std::collections::{HashMap, HashSet};

use super::{Document, PhraseRecord};
use crate::segment;

/// Per-phrase counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhraseCount {
    /// Number of captions containing the phrase.
    pub document_frequency: usize,
    /// Occurrences summed over captions.
    ///
    /// Fed from per-caption sets, so this currently equals
    /// `document_frequency`; it never drives ranking.
    pub total_occurrences: usize,
}

/// Running counts over one pass of the corpus.
#[derive(Debug, Clone, Default)]
pub struct PhraseStats {
    counts: HashMap<String, PhraseCount>,
    documents: usize,
}

impl PhraseStats {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Segment every caption and count its substrings.
    ///
    /// Captions with empty text are skipped and not counted as documents.
    pub fn from_documents<D: Document>(documents: &[D], min_len: usize, max_len: usize) -> Self {
        let mut stats = Self::new();
        for doc in documents {
            let text = doc.raw_text();
            if text.is_empty() {
                continue;
            }
            stats.add_document(segment::segment(text, min_len, max_len));
        }
        stats
    }

    /// Fold one caption's distinct substrings into the table.
    pub fn add_document(&mut self, substrings: HashSet<String>) {
        self.documents += 1;
        for sub in substrings {
            let count = self.counts.entry(sub).or_default();
            count.document_frequency += 1;
            count.total_occurrences += 1;
        }
    }

    /// Number of captions counted.
    pub const fn documents(&self) -> usize {
        self.documents
    }

    /// Number of distinct phrases seen.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns `true` if no phrase has been counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Counters for one phrase.
    pub fn get(&self, phrase: &str) -> Option<PhraseCount> {
        self.counts.get(phrase).copied()
    }

    /// Phrases seen in at least `min_documents` captions, in no particular order.
    pub fn common(&self, min_documents: usize) -> Vec<PhraseRecord> {
        self.counts
            .iter()
            .filter(|(_, count)| count.document_frequency >= min_documents)
            .map(|(text, count)| PhraseRecord::new(text.clone(), count.document_frequency))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phrases::TextDocument;

    fn docs(texts: &[&str]) -> Vec<TextDocument> {
        texts
            .iter()
            .map(|t| TextDocument::new(*t, *t))
            .collect()
    }

    #[test]
    fn counts_each_document_once_per_phrase() {
        let stats = PhraseStats::from_documents(&docs(&["cat, cat, cat", "cat"]), 2, 15);
        let cat = stats.get("cat").unwrap();
        assert_eq!(cat.document_frequency, 2);
        assert_eq!(cat.total_occurrences, 2);
    }

    #[test]
    fn empty_captions_are_not_documents() {
        let stats = PhraseStats::from_documents(&docs(&["", "cat", ""]), 2, 15);
        assert_eq!(stats.documents(), 1);
    }

    #[test]
    fn frequencies_never_exceed_document_count() {
        let stats = PhraseStats::from_documents(
            &docs(&["blue sky, sky", "sky blue", "sky, cloud", "cloud"]),
            2,
            15,
        );
        assert_eq!(stats.documents(), 4);
        assert!(!stats.is_empty());
        for record in stats.common(1) {
            let count = stats.get(&record.text).unwrap();
            assert!(count.document_frequency <= stats.documents());
            assert!(count.total_occurrences >= count.document_frequency);
        }
        assert_eq!(stats.get("sky").unwrap().document_frequency, 3);
    }

    #[test]
    fn common_applies_threshold() {
        let stats = PhraseStats::from_documents(&docs(&["cat", "cat", "dog"]), 2, 15);
        let mut common = stats.common(2);
        common.sort_by(|a, b| a.text.cmp(&b.text));
        assert_eq!(
            common,
            vec![
                PhraseRecord::new("at", 2),
                PhraseRecord::new("ca", 2),
                PhraseRecord::new("cat", 2),
            ]
        );
    }

    #[test]
    fn add_document_accepts_precomputed_sets() {
        let mut stats = PhraseStats::new();
        stats.add_document(HashSet::from(["ab".to_string()]));
        stats.add_document(HashSet::from(["ab".to_string(), "cd".to_string()]));
        assert_eq!(stats.len(), 2);
        assert_eq!(stats.get("ab").unwrap().document_frequency, 2);
        assert!(stats.get("zz").is_none());
    }
}
