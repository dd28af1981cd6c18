//! Common phrase discovery across a caption corpus.
//!
//! Every caption is segmented into its set of candidate substrings
//! ([`crate::segment`]), the sets are folded into document-frequency counts
//! ([`PhraseStats`]), and the phrases shared by enough captions go through
//! three ranking stages ([`ranking`]):
//!
//! 1. [`ranking::rank_candidates`] orders by frequency, then length.
//! 2. [`ranking::filter_contained`] drops a phrase when a longer surviving
//!    phrase contains it *and* has exactly the same document frequency.
//! 3. [`ranking::rank_final`] restores frequency-then-length order.
//!
//! Results are recomputed from scratch on every call; nothing is cached.

pub mod ranking;
pub mod stats;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

pub use stats::{PhraseCount, PhraseStats};

/// Default minimum candidate length, in characters.
pub const DEFAULT_MIN_LEN: usize = 2;
/// Default maximum candidate length, in characters.
pub const DEFAULT_MAX_LEN: usize = 15;
/// Default number of captions a phrase must appear in.
pub const DEFAULT_MIN_DOCUMENTS: usize = 2;
/// Default cap on the number of phrases returned.
pub const DEFAULT_LIMIT: usize = 100;

/// A caption-bearing item of the corpus.
pub trait Document {
    /// Stable identifier of the item.
    fn id(&self) -> &str;
    /// The raw caption text.
    fn raw_text(&self) -> &str;
}

impl<T: Document + ?Sized> Document for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn raw_text(&self) -> &str {
        (**self).raw_text()
    }
}

/// A free-standing caption with an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TextDocument {
    /// Identifier of the caption.
    pub id: String,
    /// Caption text.
    pub text: String,
}

impl TextDocument {
    /// Create a document from an id and its caption text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

impl Document for TextDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn raw_text(&self) -> &str {
        &self.text
    }
}

/// A phrase and the number of captions it occurs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PhraseRecord {
    /// The phrase text.
    #[serde(rename = "tag")]
    pub text: String,
    /// Number of distinct captions containing the phrase.
    #[serde(rename = "count")]
    pub document_frequency: usize,
}

impl PhraseRecord {
    /// Create a record.
    pub fn new(text: impl Into<String>, document_frequency: usize) -> Self {
        Self {
            text: text.into(),
            document_frequency,
        }
    }

    /// Length of the phrase in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Tuning knobs for phrase extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PhraseOptions {
    /// Shortest candidate, in characters.
    pub min_len: usize,
    /// Longest candidate, in characters.
    pub max_len: usize,
    /// Captions a phrase must appear in to be reported.
    pub min_documents: usize,
    /// Maximum number of phrases returned.
    pub limit: usize,
}

impl Default for PhraseOptions {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
            min_documents: DEFAULT_MIN_DOCUMENTS,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PhraseOptions {
    /// Reject options that cannot produce a meaningful result.
    pub const fn validate(&self) -> AnalysisResult<()> {
        if self.min_len == 0 || self.min_len > self.max_len {
            return Err(AnalysisError::InvalidBounds {
                min_len: self.min_len,
                max_len: self.max_len,
            });
        }
        if self.min_documents == 0 {
            return Err(AnalysisError::InvalidOption {
                name: "min_documents",
            });
        }
        if self.limit == 0 {
            return Err(AnalysisError::InvalidOption { name: "limit" });
        }
        Ok(())
    }
}

/// Find the phrases shared across captions, ranked and de-duplicated.
///
/// Captions with empty text contribute nothing. A corpus with fewer than
/// `min_documents` captions always yields an empty list.
///
/// # Errors
///
/// Returns [`AnalysisError`] if `options` fail [`PhraseOptions::validate`].
#[tracing::instrument(skip(documents), fields(documents = documents.len()))]
pub fn extract_common_phrases<D: Document>(
    documents: &[D],
    options: &PhraseOptions,
) -> AnalysisResult<Vec<PhraseRecord>> {
    options.validate()?;

    let stats = PhraseStats::from_documents(documents, options.min_len, options.max_len);
    let candidates = ranking::rank_candidates(stats.common(options.min_documents));
    let candidate_count = candidates.len();

    let filtered = ranking::filter_contained(candidates, options.limit);
    let mut phrases = ranking::rank_final(filtered);
    phrases.truncate(options.limit);

    tracing::debug!(
        counted = stats.documents(),
        distinct = stats.len(),
        candidates = candidate_count,
        phrases = phrases.len(),
        "common phrases extracted"
    );
    Ok(phrases)
}
