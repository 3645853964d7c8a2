//! Core data models for the media inventory engine

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bucket name assigned when neither the source nor the path yields a folder
pub const UNKNOWN_BUCKET: &str = "Unknown";

/// Media category a scan pass targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Audio items (mp3, flac, wav, etc.)
    Audio,
    /// Video items (mp4, mkv, avi, etc.)
    Video,
    /// Image items (jpg, png, webp, etc.)
    Images,
}

impl MediaKind {
    /// All media kinds, one store each
    pub const ALL: [MediaKind; 3] = [MediaKind::Audio, MediaKind::Video, MediaKind::Images];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
            MediaKind::Images => "images",
        }
    }

    /// Whether records of this kind carry the audio/video attribute block
    pub fn has_av_attributes(&self) -> bool {
        matches!(self, MediaKind::Audio | MediaKind::Video)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "audio" => Ok(MediaKind::Audio),
            "video" => Ok(MediaKind::Video),
            "images" | "image" => Ok(MediaKind::Images),
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}

/// One discovered media item with its metadata
///
/// Common attributes are populated for every kind; the audio/video block
/// (`album` through `duration`) only for [`MediaKind::Audio`] and
/// [`MediaKind::Video`]. Absent source columns decode to zero-value
/// defaults, never to a failure.
///
/// `selected` is a transient consumer-side toggle and is excluded from
/// equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Source-assigned identifier
    pub id: String,
    /// Absolute storage path of the item
    pub uri: String,
    /// Display name
    pub name: String,
    /// MIME type
    pub mime: String,
    /// Size in bytes
    pub size: u64,
    /// Last-modified time, epoch millis
    pub date: i64,
    /// Owning folder identifier
    pub bucket_id: String,
    /// Owning folder name, never empty (see [`MediaRecord::resolve_bucket_name`])
    pub bucket_name: String,
    /// Album title (audio/video)
    pub album: String,
    /// Artist (audio/video)
    pub artist: String,
    /// Composer (audio/video)
    pub composer: String,
    /// Genre (audio/video)
    pub genre: String,
    /// Release year (audio/video)
    pub year: String,
    /// Frame resolution (audio/video)
    pub resolution: String,
    /// Duration in millis (audio/video)
    pub duration: u64,
    /// Album-art reference (audio only, resolved on demand)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub art: Option<String>,
    /// Transient UI selection toggle, not part of identity
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl MediaRecord {
    /// Ensure `bucket_name` is non-empty.
    ///
    /// A blank source bucket is replaced by the parent-folder name of
    /// `uri` when that folder exists, else by [`UNKNOWN_BUCKET`].
    pub fn resolve_bucket_name(&mut self) {
        if !self.bucket_name.trim().is_empty() {
            return;
        }
        self.bucket_name = derive_bucket_name(&self.uri);
    }
}

// `selected` is deliberately left out: two records describing the same
// source row compare equal regardless of consumer-side selection.
impl PartialEq for MediaRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.uri == other.uri
            && self.name == other.name
            && self.mime == other.mime
            && self.size == other.size
            && self.date == other.date
            && self.bucket_id == other.bucket_id
            && self.bucket_name == other.bucket_name
            && self.album == other.album
            && self.artist == other.artist
            && self.composer == other.composer
            && self.genre == other.genre
            && self.year == other.year
            && self.resolution == other.resolution
            && self.duration == other.duration
            && self.art == other.art
    }
}

impl Eq for MediaRecord {}

/// Derive a folder name from the parent directory of `uri`
///
/// Falls back to [`UNKNOWN_BUCKET`] when the path does not exist or has no
/// usable parent.
pub fn derive_bucket_name(uri: &str) -> String {
    let child = Path::new(uri);
    let parent = if child.exists() { child.parent() } else { None };
    parent
        .filter(|p| p.exists())
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .unwrap_or_else(|| UNKNOWN_BUCKET.to_string())
}
