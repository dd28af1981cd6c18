//! Directory scanning and media/caption pairing.

use std::collections::{BTreeMap, HashMap};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::{Dataset, DatasetItem, MediaKind};
use crate::config::DEFAULT_MAX_CAPTION_BYTES;
use crate::error::{DatasetError, DatasetResult};

/// Image extensions recognized by default (lowercase, no dot).
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// Video extensions recognized by default (lowercase, no dot).
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "flv"];

const CAPTION_EXTENSION: &str = "txt";

/// What a scan treats as media and how large a caption may be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Image extensions, matched case-insensitively.
    pub image_extensions: Vec<String>,
    /// Video extensions, matched case-insensitively.
    pub video_extensions: Vec<String>,
    /// Maximum caption size in bytes (default 1 MiB). `None` disables the check.
    pub max_caption_bytes: Option<u64>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            image_extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            video_extensions: DEFAULT_VIDEO_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            max_caption_bytes: Some(DEFAULT_MAX_CAPTION_BYTES),
        }
    }
}

impl ScanOptions {
    fn media_kind(&self, ext: &str) -> Option<MediaKind> {
        if self.image_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            Some(MediaKind::Image)
        } else if self.video_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

impl Dataset {
    /// Scan `root` recursively and pair media files with their captions.
    ///
    /// Media without a caption become items with empty text. Captions
    /// without media are ignored. When two media files share a basename
    /// (`cat.png` and `cat.jpg`), the first in file-name order wins.
    /// Unreadable directory entries are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Fails if `root` is not a directory, or a caption cannot be read or
    /// exceeds [`ScanOptions::max_caption_bytes`].
    #[tracing::instrument(skip(options), fields(root = %root))]
    pub fn scan(root: &Utf8Path, options: &ScanOptions) -> DatasetResult<Self> {
        if !root.is_dir() {
            return Err(DatasetError::NotADirectory(root.to_path_buf()));
        }

        let mut media: BTreeMap<String, (Utf8PathBuf, MediaKind)> = BTreeMap::new();
        let mut captions: HashMap<String, Utf8PathBuf> = HashMap::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = Utf8PathBuf::from_path_buf(entry.into_path())
                .map_err(DatasetError::NonUtf8Path)?;
            let Some(ext) = path.extension() else {
                continue;
            };
            let Some(key) = item_key(root, &path) else {
                continue;
            };

            if ext.eq_ignore_ascii_case(CAPTION_EXTENSION) {
                captions.insert(key, path);
            } else if let Some(kind) = options.media_kind(ext) {
                if let Some((existing, _)) = media.get(&key) {
                    tracing::warn!(kept = %existing, skipped = %path, "duplicate media basename");
                    continue;
                }
                media.insert(key, (path, kind));
            }
        }

        let mut items = Vec::with_capacity(media.len());
        for (id, (media_path, kind)) in media {
            let caption_path = captions.remove(&id);
            let raw_tags = match caption_path {
                Some(ref path) => read_caption(path, options.max_caption_bytes)?,
                None => String::new(),
            };
            items.push(DatasetItem::new(id, media_path, caption_path, kind, raw_tags));
        }

        let dataset = Self::from_items(root, items);
        let summary = dataset.summary();
        tracing::info!(
            items = summary.total_items,
            images = summary.total_images,
            videos = summary.total_videos,
            captioned = summary.captioned,
            "dataset scanned"
        );
        Ok(dataset)
    }
}

/// Root-relative path without extension, using `/` separators.
fn item_key(root: &Utf8Path, path: &Utf8Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let stem = rel.file_stem()?;
    let parent = rel.parent().map(Utf8Path::as_str).unwrap_or_default();
    let parent = parent.replace('\\', "/");
    if parent.is_empty() {
        Some(stem.to_string())
    } else {
        Some(format!("{parent}/{stem}"))
    }
}

fn read_caption(path: &Utf8Path, limit: Option<u64>) -> DatasetResult<String> {
    let io_err = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(limit) = limit {
        let size = std::fs::metadata(path).map_err(io_err)?.len();
        if size > limit {
            return Err(DatasetError::CaptionTooLarge {
                path: path.to_path_buf(),
                size,
                limit,
            });
        }
    }
    let bytes = std::fs::read(path).map_err(io_err)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap()
    }

    #[test]
    fn pairs_media_with_captions_by_basename() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        fs::write(root.join("cat.png"), b"").unwrap();
        fs::write(root.join("cat.txt"), "cat, whiskers").unwrap();
        fs::write(root.join("dog.jpg"), b"").unwrap();
        fs::write(root.join("orphan.txt"), "nothing").unwrap();

        let dataset = Dataset::scan(&root, &ScanOptions::default()).unwrap();
        assert_eq!(dataset.ids(), vec!["cat", "dog"]);

        let cat = dataset.item("cat").unwrap();
        assert_eq!(cat.tags, vec!["cat", "whiskers"]);
        assert_eq!(cat.caption_path.as_deref(), Some(root.join("cat.txt").as_path()));

        let dog = dataset.item("dog").unwrap();
        assert!(dog.caption_path.is_none());
        assert!(dog.raw_tags.is_empty());
    }

    #[test]
    fn walks_subdirectories_and_classifies_media() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        fs::create_dir_all(root.join("clips")).unwrap();
        fs::write(root.join("clips/run.MP4"), b"").unwrap();
        fs::write(root.join("clips/run.txt"), "running").unwrap();
        fs::write(root.join("still.WebP"), b"").unwrap();
        fs::write(root.join("notes.md"), "ignored").unwrap();

        let dataset = Dataset::scan(&root, &ScanOptions::default()).unwrap();
        let summary = dataset.summary();
        assert_eq!(summary.total_items, 2);
        assert_eq!(summary.total_videos, 1);
        assert_eq!(summary.total_images, 1);
        assert_eq!(summary.captioned, 1);

        let clip = dataset.item("clips/run").unwrap();
        assert!(clip.is_video());
        assert_eq!(clip.raw_tags, "running");
    }

    #[test]
    fn duplicate_basenames_keep_first() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        fs::write(root.join("cat.jpg"), b"").unwrap();
        fs::write(root.join("cat.png"), b"").unwrap();

        let dataset = Dataset::scan(&root, &ScanOptions::default()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.items()[0].media_path, root.join("cat.jpg"));
    }

    #[test]
    fn custom_extensions() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        fs::write(root.join("a.tiff"), b"").unwrap();
        fs::write(root.join("b.png"), b"").unwrap();

        let options = ScanOptions {
            image_extensions: vec!["tiff".to_string()],
            ..ScanOptions::default()
        };
        let dataset = Dataset::scan(&root, &options).unwrap();
        assert_eq!(dataset.ids(), vec!["a"]);
    }

    #[test]
    fn oversized_caption_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        fs::write(root.join("a.png"), b"").unwrap();
        fs::write(root.join("a.txt"), "0123456789").unwrap();

        let options = ScanOptions {
            max_caption_bytes: Some(4),
            ..ScanOptions::default()
        };
        let err = Dataset::scan(&root, &options).unwrap_err();
        assert!(matches!(err, DatasetError::CaptionTooLarge { size: 10, limit: 4, .. }));
    }

    #[test]
    fn default_options_cap_caption_size() {
        assert_eq!(
            ScanOptions::default().max_caption_bytes,
            Some(DEFAULT_MAX_CAPTION_BYTES)
        );
        assert_eq!(
            ScanOptions::default(),
            crate::Config::default().scan_options()
        );

        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        fs::write(root.join("a.png"), b"").unwrap();
        let oversized = vec![b'x'; usize::try_from(DEFAULT_MAX_CAPTION_BYTES).unwrap() + 1];
        fs::write(root.join("a.txt"), oversized).unwrap();

        let err = Dataset::scan(&root, &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetError::CaptionTooLarge { .. }));
    }

    #[test]
    fn invalid_utf8_caption_is_read_lossily() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        fs::write(root.join("a.png"), b"").unwrap();
        fs::write(root.join("a.txt"), b"ok, \xff\xfe").unwrap();

        let dataset = Dataset::scan(&root, &ScanOptions::default()).unwrap();
        assert!(dataset.item("a").unwrap().raw_tags.starts_with("ok, "));
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp).join("nope");
        let err = Dataset::scan(&root, &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetError::NotADirectory(_)));
    }

    #[test]
    fn scanned_dataset_feeds_phrase_extraction() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        for (name, caption) in [("a", "red hair, smile"), ("b", "red hair, frown")] {
            fs::write(root.join(format!("{name}.png")), b"").unwrap();
            fs::write(root.join(format!("{name}.txt")), caption).unwrap();
        }

        let dataset = Dataset::scan(&root, &ScanOptions::default()).unwrap();
        let phrases = dataset
            .common_phrases(&crate::phrases::PhraseOptions::default())
            .unwrap();
        let tags: Vec<&str> = phrases.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(tags, vec!["hair", "red"]);
    }
}
