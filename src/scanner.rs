//! Scanner module - one full pass over a media source
//!
//! A pass walks the source rows in cursor order, decodes each row into a
//! [`MediaRecord`] with explicit zero-value defaults, inserts it into the
//! target store, and reports per-row progress. Cancellation is cooperative
//! and checked once per row boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::models::{MediaKind, MediaRecord};
use crate::progress::ScanObserver;
use crate::source::{MediaIndex, SourceRow};
use crate::store::CollectionStore;

/// Execute one pass over `rows`, populating `store`
///
/// Returns the number of rows processed, which is less than `rows.len()`
/// only when the cancellation flag was raised mid-pass. Rows already
/// stored are kept; there is no rollback.
pub fn run_pass(
    rows: &[SourceRow],
    kind: MediaKind,
    with_album_art: bool,
    index: &dyn MediaIndex,
    store: &Mutex<CollectionStore>,
    cancelled: &AtomicBool,
    observer: Option<&Arc<dyn ScanObserver>>,
) -> usize {
    let total = rows.len();
    let mut processed = 0;

    for (position, row) in rows.iter().enumerate() {
        if cancelled.load(Ordering::SeqCst) {
            log::info!("{kind} pass cancelled at row {position}");
            break;
        }

        if let Some(observer) = observer {
            observer.on_observing(position);
        }

        let mut record = build_record(row, kind);

        if kind == MediaKind::Audio && with_album_art {
            record.art = row
                .album_id
                .as_deref()
                .and_then(|album_id| index.album_art(album_id));
        }

        store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(record);
        processed += 1;

        if let Some(observer) = observer {
            let percent = (position * 100 / total) as u32;
            observer.on_progress(position, percent);
        }
    }

    log::debug!("{kind} pass processed {processed}/{total} rows");
    processed
}

/// Decode one source row into a record
///
/// Common attributes are always populated; the audio/video block only for
/// kinds that carry it. Absent columns become zero-value defaults and the
/// bucket name is derived when the source leaves it blank.
pub fn build_record(row: &SourceRow, kind: MediaKind) -> MediaRecord {
    let mut record = MediaRecord {
        id: row.id.clone().unwrap_or_default(),
        uri: row.path.clone().unwrap_or_default(),
        name: row.display_name.clone().unwrap_or_default(),
        mime: row.mime_type.clone().unwrap_or_default(),
        size: row.size.unwrap_or(0),
        date: row.date_modified.unwrap_or(0),
        bucket_id: row.bucket_id.clone().unwrap_or_default(),
        bucket_name: row.bucket_name.clone().unwrap_or_default(),
        ..Default::default()
    };

    if kind.has_av_attributes() {
        record.album = row.album.clone().unwrap_or_default();
        record.artist = row.artist.clone().unwrap_or_default();
        record.composer = row.composer.clone().unwrap_or_default();
        record.genre = row.genre.clone().unwrap_or_default();
        record.year = row.year.clone().unwrap_or_default();
        record.resolution = row.resolution.clone().unwrap_or_default();
        record.duration = row.duration.unwrap_or(0);
    }

    record.resolve_bucket_name();
    record
}
