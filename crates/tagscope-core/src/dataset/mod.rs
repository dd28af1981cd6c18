//! Caption datasets: media files paired with `.txt` captions.
//!
//! A dataset is a directory tree where each image or video may have a
//! caption file sharing its basename (`cat.png` + `cat.txt`). Items are
//! identified by their path relative to the dataset root, without the
//! extension (`pets/cat`).
//!
//! The dataset is the corpus for [`crate::phrases`]: after scanning or
//! editing, [`Dataset::common_phrases`] recomputes the shared phrases from
//! the in-memory captions without touching the filesystem.

mod edit;
mod scan;

use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisResult;
use crate::phrases::{self, Document, PhraseOptions, PhraseRecord};

pub use edit::{Position, TagMatcher};
pub use scan::{DEFAULT_IMAGE_EXTENSIONS, DEFAULT_VIDEO_EXTENSIONS, ScanOptions};

/// Kind of media an item wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image.
    Image,
    /// Video clip.
    Video,
}

/// One media file and its caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DatasetItem {
    /// Path relative to the dataset root, without extension.
    pub id: String,
    /// Media file path.
    #[schemars(with = "String")]
    pub media_path: Utf8PathBuf,
    /// Caption file path, if one exists or has been written.
    #[schemars(with = "Option<String>")]
    pub caption_path: Option<Utf8PathBuf>,
    /// Image or video.
    pub kind: MediaKind,
    /// Caption text as stored.
    pub raw_tags: String,
    /// Caption split into individual tags.
    pub tags: Vec<String>,
    /// Whether the caption changed since it was loaded or saved.
    #[serde(default)]
    pub modified: bool,
}

impl DatasetItem {
    /// Create an item, parsing `raw_tags` into tags.
    pub fn new(
        id: impl Into<String>,
        media_path: impl Into<Utf8PathBuf>,
        caption_path: Option<Utf8PathBuf>,
        kind: MediaKind,
        raw_tags: impl Into<String>,
    ) -> Self {
        let raw_tags = raw_tags.into();
        Self {
            id: id.into(),
            media_path: media_path.into(),
            caption_path,
            kind,
            tags: parse_tags(&raw_tags),
            raw_tags,
            modified: false,
        }
    }

    /// Replace the caption text, re-parse tags, and mark the item modified.
    pub fn set_raw_tags(&mut self, raw_tags: String) {
        self.tags = parse_tags(&raw_tags);
        self.raw_tags = raw_tags;
        self.modified = true;
    }

    /// Replace the tag list, rebuilding the caption text, and mark the item modified.
    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.raw_tags = tags.join(", ");
        self.tags = tags;
        self.modified = true;
    }

    /// Returns `true` if the item is a video.
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

impl Document for DatasetItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn raw_text(&self) -> &str {
        &self.raw_tags
    }
}

/// Split a caption into tags.
///
/// Line breaks act as commas; tags are trimmed and empty ones dropped.
pub fn parse_tags(content: &str) -> Vec<String> {
    content
        .replace("\r\n", ",")
        .replace('\n', ",")
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Counts describing a scanned dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DatasetSummary {
    /// Dataset root directory.
    #[schemars(with = "String")]
    pub root: Utf8PathBuf,
    /// Number of media items.
    pub total_items: usize,
    /// Number of image items.
    pub total_images: usize,
    /// Number of video items.
    pub total_videos: usize,
    /// Number of items with a caption file.
    pub captioned: usize,
    /// Number of items with unsaved caption changes.
    pub modified: usize,
}

/// An in-memory caption dataset.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    root: Utf8PathBuf,
    items: Vec<DatasetItem>,
}

impl Dataset {
    /// Build a dataset from already-loaded items.
    pub fn from_items(root: impl Into<Utf8PathBuf>, items: Vec<DatasetItem>) -> Self {
        Self {
            root: root.into(),
            items,
        }
    }

    /// Dataset root directory.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// All items, ordered by id after a scan.
    pub fn items(&self) -> &[DatasetItem] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the dataset has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids of all items.
    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    /// Look up an item by id.
    pub fn item(&self, id: &str) -> Option<&DatasetItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub(crate) fn item_mut(&mut self, id: &str) -> Option<&mut DatasetItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Items whose caption contains `phrase` as a substring.
    pub fn filter_by_tag(&self, phrase: &str) -> Vec<&DatasetItem> {
        self.items
            .iter()
            .filter(|item| item.raw_tags.contains(phrase))
            .collect()
    }

    /// Recompute the common phrases over the current captions.
    ///
    /// # Errors
    ///
    /// Returns an error if `options` are invalid.
    #[tracing::instrument(skip(self), fields(root = %self.root, items = self.items.len()))]
    pub fn common_phrases(&self, options: &PhraseOptions) -> AnalysisResult<Vec<PhraseRecord>> {
        phrases::extract_common_phrases(&self.items, options)
    }

    /// Item counts by kind and caption state.
    pub fn summary(&self) -> DatasetSummary {
        let total_videos = self.items.iter().filter(|i| i.is_video()).count();
        DatasetSummary {
            root: self.root.clone(),
            total_items: self.items.len(),
            total_images: self.items.len() - total_videos,
            total_videos,
            captioned: self
                .items
                .iter()
                .filter(|i| i.caption_path.is_some())
                .count(),
            modified: self.items.iter().filter(|i| i.modified).count(),
        }
    }
}
