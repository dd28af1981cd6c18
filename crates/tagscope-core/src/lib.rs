//! Core library for tagscope.
//!
//! Finds the phrases that recur across the captions of an image or video
//! dataset, and provides the dataset plumbing around it.
//!
//! # Modules
//!
//! - [`segment`] - Caption segmentation and substring enumeration
//! - [`phrases`] - Document-frequency counting, ranking, containment filtering
//! - [`dataset`] - Media/caption pairing, scanning, tag edits
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```
//! use tagscope_core::phrases::{PhraseOptions, TextDocument, extract_common_phrases};
//!
//! let captions = vec![
//!     TextDocument::new("a", "red hair, blue eyes"),
//!     TextDocument::new("b", "red hair, green eyes"),
//! ];
//! let phrases = extract_common_phrases(&captions, &PhraseOptions::default()).unwrap();
//! assert_eq!(phrases[0].text, "eyes");
//! assert_eq!(phrases[0].document_frequency, 2);
//! ```
#![deny(unsafe_code)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod phrases;
pub mod segment;

pub use config::{Config, ConfigLoader, ConfigSources, DEFAULT_MAX_CAPTION_BYTES, LogLevel};
pub use dataset::{Dataset, DatasetItem, MediaKind, ScanOptions};
pub use error::{
    AnalysisError, AnalysisResult, ConfigError, ConfigResult, DatasetError, DatasetResult,
};
pub use phrases::{Document, PhraseOptions, PhraseRecord, TextDocument, extract_common_phrases};
