//! Core data model for the conversion pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Target loudness filter applied when normalization is requested
pub const NORMALIZE_FILTER: &str = "loudnorm=I=-14:LRA=11:TP=-1.0";

/// Input extensions accepted into a selection
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "wav", "wave", "aif", "aiff", "flac", "mp3", "m4a", "aac", "ogg", "oga", "opus", "wma",
    "alac", "caf",
];

/// Whether a file extension is accepted as audio input
pub fn is_audio_extension(ext: &str) -> bool {
    let lower = ext.to_ascii_lowercase();
    AUDIO_EXTENSIONS.contains(&lower.as_str())
}

/// Where an input's content comes from
#[derive(Debug, Clone)]
pub enum FileSource {
    /// A persistent filesystem path the engine can read directly
    Path(PathBuf),
    /// An in-memory byte copy from an ephemeral source
    Bytes(Arc<[u8]>),
}

/// One user-selected input file
///
/// Identity is stable across re-selection so duplicates can be rejected:
/// path-derived for persistent sources, name+size+mtime for ephemeral byte
/// sources. Immutable after creation.
#[derive(Debug, Clone)]
pub struct FileItem {
    /// Stable identity within a selection
    pub id: String,
    /// Display name (file name, no directory)
    pub name: String,
    /// Content source
    pub source: FileSource,
}

impl FileItem {
    /// Create an item backed by a persistent filesystem path
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            id: format!("path:{}", path.to_string_lossy()),
            name,
            source: FileSource::Path(path),
        }
    }

    /// Create an item backed by an in-memory byte copy
    ///
    /// `modified_ms` is the source's modification time in milliseconds,
    /// used only to build a stable identity.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>, modified_ms: i64) -> Self {
        let name = name.into();
        Self {
            id: format!("mem:{}:{}:{}", name, bytes.len(), modified_ms),
            name,
            source: FileSource::Bytes(bytes.into()),
        }
    }

    /// Filesystem path, when this item has a persistent source
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Path(p) => Some(p),
            FileSource::Bytes(_) => None,
        }
    }

    /// In-memory bytes, when this item has an ephemeral source
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.source {
            FileSource::Path(_) => None,
            FileSource::Bytes(b) => Some(b),
        }
    }
}

/// The active selection list
///
/// Owns its items exclusively; duplicate identities are rejected at
/// insertion.
#[derive(Debug, Default)]
pub struct Selection {
    items: Vec<FileItem>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item, rejecting duplicates by identity
    ///
    /// Returns `false` when an item with the same identity is already
    /// selected.
    pub fn insert(&mut self, item: FileItem) -> bool {
        if self.items.iter().any(|existing| existing.id == item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Drop every selected item
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in selection order
    pub fn items(&self) -> &[FileItem] {
        &self.items
    }
}

/// Immutable per-batch conversion options
///
/// The target format is fixed (mono, 48 kHz, signed 16-bit PCM WAV); only
/// loudness normalization is user-selectable. Captured once when a batch
/// starts and invariant for its duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Target channel count
    pub channels: u32,
    /// Target sample rate in Hz
    pub sample_rate: u32,
    /// Target sample format (ffmpeg `-sample_fmt` name)
    pub sample_format: String,
    /// Apply the loudness normalization filter
    pub normalize: bool,
}

impl ConversionOptions {
    pub fn new(normalize: bool) -> Self {
        Self {
            channels: 1,
            sample_rate: 48_000,
            sample_format: "s16".to_string(),
            normalize,
        }
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self::new(false)
    }
}

/// User decision for one conflicting output name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictDecision {
    /// Overwrite the conflicting output for this item
    OverwriteCurrent,
    /// Overwrite this and every later conflict in the batch
    OverwriteAll,
    /// Keep the existing file; give this item a disambiguated name
    Skip,
    /// Abort the whole batch
    Cancel,
}

/// Accumulated outcome of one driver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Items successfully converted and placed, in order
    pub converted: usize,
}
