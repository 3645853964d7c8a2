//! Media index abstraction and the filesystem-backed implementation
//!
//! [`MediaIndex`] is the seam to the device's categorized media index: a
//! capability handle with a synchronous permission predicate, an ordered
//! per-kind row query, and a secondary album lookup used only for album
//! art. [`FsMediaIndex`] implements it over plain directories.

use std::path::Path;
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

use crate::config::{IndexConfig, ALBUM_ART_CANDIDATES};
use crate::error::ScanError;
use crate::models::MediaKind;

/// One row of a media index query
///
/// Every column is optional: an absent column decodes to a zero-value
/// default in the pass rather than failing it.
#[derive(Debug, Clone, Default)]
pub struct SourceRow {
    /// Source-assigned identifier
    pub id: Option<String>,
    /// Absolute storage path
    pub path: Option<String>,
    /// Display name
    pub display_name: Option<String>,
    /// MIME type
    pub mime_type: Option<String>,
    /// Size in bytes
    pub size: Option<u64>,
    /// Last-modified time, epoch millis
    pub date_modified: Option<i64>,
    /// Owning folder identifier
    pub bucket_id: Option<String>,
    /// Owning folder display name
    pub bucket_name: Option<String>,
    /// Album title
    pub album: Option<String>,
    /// Artist
    pub artist: Option<String>,
    /// Composer
    pub composer: Option<String>,
    /// Genre
    pub genre: Option<String>,
    /// Release year
    pub year: Option<String>,
    /// Frame resolution
    pub resolution: Option<String>,
    /// Duration in millis
    pub duration: Option<u64>,
    /// Album identifier for the secondary art lookup
    pub album_id: Option<String>,
}

/// Capability handle over a categorized media index
pub trait MediaIndex: Send + Sync {
    /// Synchronous check: is read access currently granted?
    fn is_read_permitted(&self) -> bool;

    /// Ordered rows of one media category
    ///
    /// An empty or absent source yields an empty vector, not an error.
    fn query(&self, kind: MediaKind) -> Result<Vec<SourceRow>, ScanError>;

    /// Secondary single-row lookup by album identifier
    ///
    /// Used only for optional album-art resolution; an unresolvable id
    /// yields `None`.
    fn album_art(&self, album_id: &str) -> Option<String>;
}

/// Filesystem-backed media index
///
/// Classifies files under the configured roots by extension. Audio rows
/// use the containing directory as the album: its name becomes the album
/// title and its path the album id probed for a cover file.
#[derive(Debug, Clone)]
pub struct FsMediaIndex {
    config: IndexConfig,
}

impl FsMediaIndex {
    /// Create an index over the given configuration
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    fn row_for_file(&self, path: &Path, kind: MediaKind) -> SourceRow {
        let metadata = std::fs::metadata(path).ok();
        let parent = path.parent();

        let mut row = SourceRow {
            path: Some(path.to_string_lossy().to_string()),
            display_name: path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.to_string()),
            mime_type: path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| mime_for_extension(e, kind)),
            size: metadata.as_ref().map(|m| m.len()),
            date_modified: metadata.as_ref().and_then(|m| {
                m.modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_millis() as i64)
            }),
            bucket_id: parent.map(|p| p.to_string_lossy().to_string()),
            bucket_name: parent
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .map(|n| n.to_string()),
            ..Default::default()
        };

        if kind == MediaKind::Audio {
            // Folder-per-album convention: the directory stands in for the
            // album row of a device index.
            row.album = row.bucket_name.clone();
            row.album_id = row.bucket_id.clone();
        }

        row
    }
}

impl MediaIndex for FsMediaIndex {
    fn is_read_permitted(&self) -> bool {
        for root in &self.config.roots {
            match std::fs::read_dir(root) {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => return false,
                // A missing root is an absent source, not a denied one
                Err(_) => {}
            }
        }
        true
    }

    fn query(&self, kind: MediaKind) -> Result<Vec<SourceRow>, ScanError> {
        let mut rows = Vec::new();

        for root in &self.config.roots {
            if !root.exists() {
                log::warn!("index root does not exist, skipping: {}", root.display());
                continue;
            }

            let walker = WalkDir::new(root)
                .max_depth(self.config.effective_max_depth())
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| {
                    if !entry.file_type().is_dir() {
                        return true;
                    }
                    match entry.file_name().to_str() {
                        Some(name) => {
                            entry.depth() == 0 || !self.config.should_ignore_dir(name)
                        }
                        None => true,
                    }
                });

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        log::warn!("skipping unreadable entry: {e}");
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let extension = entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_lowercase())
                    .unwrap_or_default();
                if self.config.matches_kind(&extension, kind) {
                    rows.push(self.row_for_file(entry.path(), kind));
                }
            }
        }

        log::debug!("{kind} query returned {} rows", rows.len());
        Ok(rows)
    }

    fn album_art(&self, album_id: &str) -> Option<String> {
        let dir = Path::new(album_id);
        if !dir.is_dir() {
            return None;
        }
        for candidate in ALBUM_ART_CANDIDATES {
            let art = dir.join(candidate);
            if art.is_file() {
                return Some(art.to_string_lossy().to_string());
            }
        }
        None
    }
}

/// Best-effort MIME type from a file extension
fn mime_for_extension(ext: &str, kind: MediaKind) -> String {
    let ext = ext.to_lowercase();
    let subtype = match ext.as_str() {
        "mp3" => "mpeg",
        "m4a" | "m4v" => "mp4",
        "jpg" => "jpeg",
        "tif" => "tiff",
        other => other,
    };
    let prefix = match kind {
        MediaKind::Audio => "audio",
        MediaKind::Video => "video",
        MediaKind::Images => "image",
    };
    format!("{prefix}/{subtype}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn fixture() -> (tempfile::TempDir, FsMediaIndex) {
        let dir = tempfile::tempdir().unwrap();
        let music = dir.path().join("Music");
        let clips = dir.path().join("Clips");
        let hidden = dir.path().join(".thumbs");
        fs::create_dir_all(&music).unwrap();
        fs::create_dir_all(&clips).unwrap();
        fs::create_dir_all(&hidden).unwrap();

        fs::write(music.join("b.mp3"), b"x").unwrap();
        fs::write(music.join("a.mp3"), b"x").unwrap();
        fs::write(music.join("cover.jpg"), b"x").unwrap();
        fs::write(clips.join("clip.mp4"), b"x").unwrap();
        fs::write(hidden.join("c.mp3"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let index = FsMediaIndex::new(IndexConfig::new(vec![dir.path().to_path_buf()]));
        (dir, index)
    }

    #[test]
    fn test_query_classifies_by_extension() {
        let (_dir, index) = fixture();

        let audio = index.query(MediaKind::Audio).unwrap();
        let names: Vec<_> = audio
            .iter()
            .map(|r| r.display_name.clone().unwrap())
            .collect();
        // hidden directory is skipped, walk order is by file name
        assert_eq!(names, ["a.mp3", "b.mp3"]);

        let video = index.query(MediaKind::Video).unwrap();
        assert_eq!(video.len(), 1);
        assert_eq!(video[0].display_name.as_deref(), Some("clip.mp4"));

        let images = index.query(MediaKind::Images).unwrap();
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn test_rows_carry_bucket_and_album_columns() {
        let (_dir, index) = fixture();

        let audio = index.query(MediaKind::Audio).unwrap();
        let row = &audio[0];
        assert_eq!(row.bucket_name.as_deref(), Some("Music"));
        assert_eq!(row.album.as_deref(), Some("Music"));
        assert!(row.album_id.is_some());
        assert_eq!(row.mime_type.as_deref(), Some("audio/mpeg"));
        assert!(row.size.is_some());
        assert!(row.date_modified.is_some());
        // no stable source id on a plain filesystem
        assert!(row.id.is_none());
    }

    #[test]
    fn test_non_recursive_query_stays_in_root() {
        let (dir, _) = fixture();
        let config = IndexConfig::builder()
            .add_root(dir.path().to_path_buf())
            .recursive(false)
            .build();
        let index = FsMediaIndex::new(config);

        assert!(index.query(MediaKind::Audio).unwrap().is_empty());
    }

    #[test]
    fn test_missing_root_yields_no_rows() {
        let index = FsMediaIndex::new(IndexConfig::new(vec![PathBuf::from("/no/such/root")]));
        assert!(index.is_read_permitted());
        assert!(index.query(MediaKind::Audio).unwrap().is_empty());
    }

    #[test]
    fn test_album_art_probe() {
        let (dir, index) = fixture();

        let music = dir.path().join("Music").to_string_lossy().to_string();
        let art = index.album_art(&music).unwrap();
        assert!(art.ends_with("cover.jpg"));

        let clips = dir.path().join("Clips").to_string_lossy().to_string();
        assert!(index.album_art(&clips).is_none());
        assert!(index.album_art("/no/such/album").is_none());
    }

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension("mp3", MediaKind::Audio), "audio/mpeg");
        assert_eq!(mime_for_extension("JPG", MediaKind::Images), "image/jpeg");
        assert_eq!(mime_for_extension("mkv", MediaKind::Video), "video/mkv");
    }
}
