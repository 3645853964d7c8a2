//! Configuration for the filesystem-backed media index

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::models::MediaKind;

/// Default max depth for recursive traversal
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Cover-image file names probed for album art, in priority order
pub const ALBUM_ART_CANDIDATES: &[&str] = &["cover.jpg", "cover.png", "folder.jpg", "album.jpg"];

/// Configuration for [`crate::source::FsMediaIndex`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Root directories the index covers
    pub roots: Vec<PathBuf>,

    /// Audio file extensions (lowercase, no dot)
    pub audio_extensions: HashSet<String>,

    /// Video file extensions
    pub video_extensions: HashSet<String>,

    /// Image file extensions
    pub image_extensions: HashSet<String>,

    /// Directory names to skip entirely
    pub ignore_dirs: HashSet<String>,

    /// Whether to descend into subdirectories
    pub recursive: bool,

    /// Maximum traversal depth when recursive
    pub max_depth: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            audio_extensions: Self::default_audio_extensions(),
            video_extensions: Self::default_video_extensions(),
            image_extensions: Self::default_image_extensions(),
            ignore_dirs: Self::default_ignore_dirs(),
            recursive: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl IndexConfig {
    /// Create a config covering the given root directories
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            ..Default::default()
        }
    }

    /// Create a config builder
    pub fn builder() -> IndexConfigBuilder {
        IndexConfigBuilder::new()
    }

    /// Get the default audio extensions
    pub fn default_audio_extensions() -> HashSet<String> {
        ["mp3", "flac", "wav", "aac", "ogg", "wma", "m4a"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Get the default video extensions
    pub fn default_video_extensions() -> HashSet<String> {
        [
            "mp4", "mkv", "avi", "wmv", "flv", "mov", "webm", "m4v", "ts", "rmvb",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Get the default image extensions
    pub fn default_image_extensions() -> HashSet<String> {
        ["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "tif"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Get the default directories to skip
    pub fn default_ignore_dirs() -> HashSet<String> {
        [
            "$RECYCLE.BIN",
            "System Volume Information",
            ".Trash",
            ".Trash-1000",
            "@eaDir",
            ".git",
            "node_modules",
            ".cache",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Extension set for one media kind
    pub fn extensions_for(&self, kind: MediaKind) -> &HashSet<String> {
        match kind {
            MediaKind::Audio => &self.audio_extensions,
            MediaKind::Video => &self.video_extensions,
            MediaKind::Images => &self.image_extensions,
        }
    }

    /// Check whether an extension belongs to a media kind
    pub fn matches_kind(&self, ext: &str, kind: MediaKind) -> bool {
        self.extensions_for(kind).contains(&ext.to_lowercase())
    }

    /// Check whether a directory should be skipped
    pub fn should_ignore_dir(&self, name: &str) -> bool {
        // Hidden directories are always skipped
        if name.starts_with('.') {
            return true;
        }
        self.ignore_dirs.contains(name)
    }

    /// Depth limit handed to the directory walker
    pub fn effective_max_depth(&self) -> usize {
        if !self.recursive {
            1
        } else {
            self.max_depth
        }
    }
}

/// Builder for [`IndexConfig`]
#[derive(Debug, Default)]
pub struct IndexConfigBuilder {
    config: IndexConfig,
}

impl IndexConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: IndexConfig::default(),
        }
    }

    /// Set the root directories
    pub fn roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.config.roots = roots;
        self
    }

    /// Add a root directory
    pub fn add_root(mut self, root: PathBuf) -> Self {
        self.config.roots.push(root);
        self
    }

    /// Replace the audio extension set
    pub fn audio_extensions(mut self, extensions: HashSet<String>) -> Self {
        self.config.audio_extensions = extensions;
        self
    }

    /// Replace the video extension set
    pub fn video_extensions(mut self, extensions: HashSet<String>) -> Self {
        self.config.video_extensions = extensions;
        self
    }

    /// Replace the image extension set
    pub fn image_extensions(mut self, extensions: HashSet<String>) -> Self {
        self.config.image_extensions = extensions;
        self
    }

    /// Add a directory to skip
    pub fn add_ignore_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.ignore_dirs.insert(dir.into());
        self
    }

    /// Enable or disable recursion
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.config.recursive = enabled;
        self
    }

    /// Set the maximum traversal depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Build the config
    pub fn build(self) -> IndexConfig {
        self.config
    }
}
