//! Batch caption edits and saving.
//!
//! Edits mutate the in-memory dataset and mark items modified; nothing
//! reaches disk until [`Dataset::save_item`] or [`Dataset::save_modified`].

use camino::Utf8PathBuf;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::Dataset;
use crate::error::{DatasetError, DatasetResult};

/// Where [`Dataset::add_tag`] places the new tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Position {
    /// Before the existing caption.
    Prepend,
    /// After the existing caption.
    #[default]
    Append,
}

/// Selects tags by exact text or by regular expression.
#[derive(Debug, Clone)]
pub enum TagMatcher {
    /// The whole tag must equal this text.
    Exact(String),
    /// The tag must contain a match of this pattern.
    Pattern(Regex),
}

impl TagMatcher {
    /// Build a matcher, compiling `pattern` when `use_regex` is set.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Pattern`] if the regex does not compile.
    pub fn new(pattern: &str, use_regex: bool) -> DatasetResult<Self> {
        if use_regex {
            Ok(Self::Pattern(Regex::new(pattern)?))
        } else {
            Ok(Self::Exact(pattern.to_string()))
        }
    }

    /// Returns `true` if `tag` is selected.
    pub fn matches(&self, tag: &str) -> bool {
        match self {
            Self::Exact(text) => tag == text,
            Self::Pattern(re) => re.is_match(tag),
        }
    }

    /// Rewrite `tag`: exact matches are replaced whole, patterns replace
    /// every match inside the tag (`$1`-style groups expand).
    pub fn replace(&self, tag: &str, replacement: &str) -> String {
        match self {
            Self::Exact(text) if tag == text => replacement.to_string(),
            Self::Exact(_) => tag.to_string(),
            Self::Pattern(re) => re.replace_all(tag, replacement).into_owned(),
        }
    }
}

impl Dataset {
    fn check_ids<S: AsRef<str>>(&self, ids: &[S]) -> DatasetResult<()> {
        match ids.iter().find(|id| self.item(id.as_ref()).is_none()) {
            Some(missing) => Err(DatasetError::ItemNotFound(missing.as_ref().to_string())),
            None => Ok(()),
        }
    }

    /// Replace one item's caption text.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ItemNotFound`] for an unknown id.
    pub fn set_caption(&mut self, id: &str, raw_tags: &str) -> DatasetResult<()> {
        let item = self
            .item_mut(id)
            .ok_or_else(|| DatasetError::ItemNotFound(id.to_string()))?;
        item.set_raw_tags(raw_tags.to_string());
        Ok(())
    }

    /// Add `tag` to each selected caption. Returns the number of items edited.
    ///
    /// An empty caption becomes the tag alone; otherwise the tag is joined
    /// with `", "` at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ItemNotFound`] before editing anything if an
    /// id is unknown.
    #[tracing::instrument(skip(self, ids), fields(selected = ids.len()))]
    pub fn add_tag<S: AsRef<str>>(
        &mut self,
        ids: &[S],
        tag: &str,
        position: Position,
    ) -> DatasetResult<usize> {
        self.check_ids(ids)?;
        let mut edited = 0;
        for id in ids {
            let Some(item) = self.item_mut(id.as_ref()) else {
                continue;
            };
            let raw = if item.raw_tags.is_empty() {
                tag.to_string()
            } else {
                match position {
                    Position::Prepend => format!("{tag}, {}", item.raw_tags),
                    Position::Append => format!("{}, {tag}", item.raw_tags),
                }
            };
            item.set_raw_tags(raw);
            edited += 1;
        }
        tracing::debug!(edited, "tag added");
        Ok(edited)
    }

    /// Drop every tag selected by `matcher` from each selected caption.
    ///
    /// Remaining tags are re-joined with `", "`. Returns the number of items
    /// edited. Items where nothing matched keep their caption text and are
    /// not marked modified.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ItemNotFound`] before editing anything if an
    /// id is unknown.
    #[tracing::instrument(skip(self, ids, matcher), fields(selected = ids.len()))]
    pub fn remove_tag<S: AsRef<str>>(
        &mut self,
        ids: &[S],
        matcher: &TagMatcher,
    ) -> DatasetResult<usize> {
        self.check_ids(ids)?;
        let mut edited = 0;
        for id in ids {
            let Some(item) = self.item_mut(id.as_ref()) else {
                continue;
            };
            let kept: Vec<String> = item
                .tags
                .iter()
                .filter(|t| !matcher.matches(t))
                .cloned()
                .collect();
            if kept == item.tags {
                continue;
            }
            item.set_tags(kept);
            edited += 1;
        }
        tracing::debug!(edited, "tag removed");
        Ok(edited)
    }

    /// Rewrite the tags selected by `matcher` in each selected caption.
    ///
    /// Returns the number of items whose tags changed; the others are left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ItemNotFound`] before editing anything if an
    /// id is unknown.
    #[tracing::instrument(skip(self, ids, matcher), fields(selected = ids.len()))]
    pub fn replace_tag<S: AsRef<str>>(
        &mut self,
        ids: &[S],
        matcher: &TagMatcher,
        replacement: &str,
    ) -> DatasetResult<usize> {
        self.check_ids(ids)?;
        let mut edited = 0;
        for id in ids {
            let Some(item) = self.item_mut(id.as_ref()) else {
                continue;
            };
            let rewritten: Vec<String> = item
                .tags
                .iter()
                .map(|t| matcher.replace(t, replacement))
                .collect();
            if rewritten == item.tags {
                continue;
            }
            item.set_tags(rewritten);
            edited += 1;
        }
        tracing::debug!(edited, "tag replaced");
        Ok(edited)
    }

    /// Write one item's caption to disk and clear its modified flag.
    ///
    /// Items without a caption file get `<media stem>.txt` next to the media.
    /// Returns the caption path written.
    ///
    /// # Errors
    ///
    /// Fails for an unknown id or if the file cannot be written.
    pub fn save_item(&mut self, id: &str) -> DatasetResult<Utf8PathBuf> {
        let item = self
            .item_mut(id)
            .ok_or_else(|| DatasetError::ItemNotFound(id.to_string()))?;
        let path = item
            .caption_path
            .clone()
            .unwrap_or_else(|| item.media_path.with_extension("txt"));

        std::fs::write(&path, item.raw_tags.as_bytes()).map_err(|source| DatasetError::Io {
            path: path.clone(),
            source,
        })?;
        item.caption_path = Some(path.clone());
        item.modified = false;
        tracing::debug!(id, path = %path, "caption saved");
        Ok(path)
    }

    /// Save every modified item. Returns the number of captions written.
    ///
    /// # Errors
    ///
    /// Stops at the first write failure; earlier items stay saved.
    #[tracing::instrument(skip(self), fields(root = %self.root))]
    pub fn save_modified(&mut self) -> DatasetResult<usize> {
        let pending: Vec<String> = self
            .items
            .iter()
            .filter(|item| item.modified)
            .map(|item| item.id.clone())
            .collect();
        for id in &pending {
            self.save_item(id)?;
        }
        tracing::info!(saved = pending.len(), "captions saved");
        Ok(pending.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetItem, MediaKind};
    use std::fs;
    use tempfile::TempDir;

    fn dataset(captions: &[(&str, &str)]) -> Dataset {
        let items = captions
            .iter()
            .map(|(id, raw)| {
                DatasetItem::new(*id, format!("/data/{id}.png"), None, MediaKind::Image, *raw)
            })
            .collect();
        Dataset::from_items("/data", items)
    }

    #[test]
    fn add_tag_appends_and_prepends() {
        let mut ds = dataset(&[("a", "smile"), ("b", ""), ("c", "hat")]);
        assert_eq!(ds.add_tag(&["a", "b"], "solo", Position::Append).unwrap(), 2);
        ds.add_tag(&["c"], "solo", Position::Prepend).unwrap();

        assert_eq!(ds.item("a").unwrap().raw_tags, "smile, solo");
        assert_eq!(ds.item("b").unwrap().raw_tags, "solo");
        assert_eq!(ds.item("c").unwrap().raw_tags, "solo, hat");
        assert_eq!(ds.item("c").unwrap().tags, vec!["solo", "hat"]);
        assert!(ds.item("a").unwrap().modified);
    }

    #[test]
    fn unknown_id_aborts_before_editing() {
        let mut ds = dataset(&[("a", "smile")]);
        let err = ds.add_tag(&["a", "zzz"], "solo", Position::Append).unwrap_err();
        assert!(matches!(err, DatasetError::ItemNotFound(ref id) if id == "zzz"));
        assert_eq!(ds.item("a").unwrap().raw_tags, "smile");
    }

    #[test]
    fn remove_exact_tag() {
        let mut ds = dataset(&[("a", "smile, long hair, hat")]);
        let matcher = TagMatcher::new("long hair", false).unwrap();
        ds.remove_tag(&["a"], &matcher).unwrap();
        assert_eq!(ds.item("a").unwrap().raw_tags, "smile, hat");
    }

    #[test]
    fn remove_by_pattern() {
        let mut ds = dataset(&[("a", "long hair, short hair, smile")]);
        let matcher = TagMatcher::new("hair$", true).unwrap();
        ds.remove_tag(&["a"], &matcher).unwrap();
        assert_eq!(ds.item("a").unwrap().tags, vec!["smile"]);
    }

    #[test]
    fn replace_exact_only_touches_whole_tags() {
        let mut ds = dataset(&[("a", "hair, long hair")]);
        let matcher = TagMatcher::new("hair", false).unwrap();
        ds.replace_tag(&["a"], &matcher, "fur").unwrap();
        assert_eq!(ds.item("a").unwrap().raw_tags, "fur, long hair");
    }

    #[test]
    fn replace_by_pattern_with_groups() {
        let mut ds = dataset(&[("a", "long hair, short hair")]);
        let matcher = TagMatcher::new(r"(\w+) hair", true).unwrap();
        ds.replace_tag(&["a"], &matcher, "${1}_hair").unwrap();
        assert_eq!(ds.item("a").unwrap().raw_tags, "long_hair, short_hair");
    }

    #[test]
    fn unmatched_remove_and_replace_leave_items_alone() {
        let mut ds = dataset(&[("a", "cat\ndog"), ("b", "")]);
        let matcher = TagMatcher::new("zebra", false).unwrap();

        assert_eq!(ds.remove_tag(&["a", "b"], &matcher).unwrap(), 0);
        assert_eq!(ds.replace_tag(&["a", "b"], &matcher, "horse").unwrap(), 0);

        let a = ds.item("a").unwrap();
        assert_eq!(a.raw_tags, "cat\ndog");
        assert!(!a.modified);
        assert!(!ds.item("b").unwrap().modified);
    }

    #[test]
    fn unmatched_remove_writes_no_files() {
        let tmp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        fs::write(root.join("a.png"), b"").unwrap();
        fs::write(root.join("a.txt"), "cat\ndog").unwrap();
        fs::write(root.join("b.png"), b"").unwrap();

        let mut ds = Dataset::scan(&root, &crate::dataset::ScanOptions::default()).unwrap();
        let ids = ds.ids();
        let matcher = TagMatcher::new("zebra", false).unwrap();
        assert_eq!(ds.remove_tag(&ids, &matcher).unwrap(), 0);
        assert_eq!(ds.save_modified().unwrap(), 0);

        assert_eq!(fs::read_to_string(root.join("a.txt")).unwrap(), "cat\ndog");
        assert!(!root.join("b.txt").exists());
    }

    #[test]
    fn remove_counts_only_changed_items() {
        let mut ds = dataset(&[("a", "cat, dog"), ("b", "bird")]);
        let matcher = TagMatcher::new("cat", false).unwrap();
        assert_eq!(ds.remove_tag(&["a", "b"], &matcher).unwrap(), 1);
        assert!(ds.item("a").unwrap().modified);
        assert!(!ds.item("b").unwrap().modified);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = TagMatcher::new("(unclosed", true).unwrap_err();
        assert!(matches!(err, DatasetError::Pattern(_)));
    }

    #[test]
    fn set_caption_marks_modified() {
        let mut ds = dataset(&[("a", "x")]);
        ds.set_caption("a", "y, z").unwrap();
        let item = ds.item("a").unwrap();
        assert_eq!(item.tags, vec!["y", "z"]);
        assert!(item.modified);
        assert!(ds.set_caption("nope", "q").is_err());
    }

    #[test]
    fn save_creates_caption_next_to_media() {
        let tmp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let media = root.join("cat.png");
        fs::write(&media, b"").unwrap();

        let mut ds = Dataset::from_items(
            root.clone(),
            vec![DatasetItem::new("cat", media, None, MediaKind::Image, "")],
        );
        ds.add_tag(&["cat"], "whiskers", Position::Append).unwrap();
        assert_eq!(ds.save_modified().unwrap(), 1);

        let written = fs::read_to_string(root.join("cat.txt")).unwrap();
        assert_eq!(written, "whiskers");
        let item = ds.item("cat").unwrap();
        assert!(!item.modified);
        assert_eq!(item.caption_path.as_deref(), Some(root.join("cat.txt").as_path()));
        assert_eq!(ds.save_modified().unwrap(), 0);
    }
}
