//! Result stores for completed and in-flight scan passes
//!
//! One [`CollectionStore`] exists per media kind, all three owned by a
//! [`MediaLibrary`]. The library is an explicit session object: create it
//! once, hand clones to controllers and consumers, read it at any time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::{MediaKind, MediaRecord};

/// Result sets for one media kind
///
/// `items` keeps source cursor order; `by_folder` groups records by bucket
/// name with each bucket kept sorted by record name. Both are deduplicated
/// by value equality. `selected` is the consumer-chosen subset and is
/// emptied together with the rest at the start of every pass.
#[derive(Debug, Default)]
pub struct CollectionStore {
    items: Vec<MediaRecord>,
    selected: Vec<MediaRecord>,
    by_folder: HashMap<String, Vec<MediaRecord>>,
}

impl CollectionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty all three result sets
    pub fn clear(&mut self) {
        self.items.clear();
        self.selected.clear();
        self.by_folder.clear();
    }

    /// Insert one record into the flat list and its folder bucket
    ///
    /// The flat list skips records already present (value equality). The
    /// bucket insertion is skipped entirely for a blank bucket name;
    /// otherwise the bucket is deduplicated and re-sorted by name.
    pub fn insert(&mut self, record: MediaRecord) {
        self.insert_into_folder(&record);

        if !self.items.contains(&record) {
            self.items.push(record);
        }
    }

    fn insert_into_folder(&mut self, record: &MediaRecord) {
        let key = record.bucket_name.trim();
        if key.is_empty() {
            return;
        }

        let bucket = self.by_folder.entry(key.to_string()).or_default();
        if !bucket.contains(record) {
            bucket.push(record.clone());
            bucket.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    /// All records in source cursor order
    pub fn items(&self) -> &[MediaRecord] {
        &self.items
    }

    /// The consumer-selected subset
    pub fn selected(&self) -> &[MediaRecord] {
        &self.selected
    }

    /// Records of one folder bucket, sorted by name
    pub fn folder(&self, bucket: &str) -> Option<&[MediaRecord]> {
        self.by_folder.get(bucket).map(|v| v.as_slice())
    }

    /// Names of all non-empty folder buckets
    pub fn folder_names(&self) -> Vec<&str> {
        self.by_folder.keys().map(|k| k.as_str()).collect()
    }

    /// Number of records in the flat list
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the flat list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mark a record as selected, adding it to the selected subset
    ///
    /// No-op when the record is not in `items` or already selected.
    pub fn select(&mut self, record: &MediaRecord) {
        if !self.items.contains(record) || self.selected.contains(record) {
            return;
        }
        for item in &mut self.items {
            if item == record {
                item.selected = true;
            }
        }
        let mut chosen = record.clone();
        chosen.selected = true;
        self.selected.push(chosen);
    }

    /// Remove a record from the selected subset
    pub fn deselect(&mut self, record: &MediaRecord) {
        self.selected.retain(|r| r != record);
        for item in &mut self.items {
            if item == record {
                item.selected = false;
            }
        }
    }
}

/// Session-owned holder of the three per-kind stores
///
/// Clones share the same underlying stores. Passes for different kinds
/// touch disjoint stores and may run concurrently; within one kind the
/// controller serializes passes.
#[derive(Debug, Clone, Default)]
pub struct MediaLibrary {
    audio: Arc<Mutex<CollectionStore>>,
    video: Arc<Mutex<CollectionStore>>,
    images: Arc<Mutex<CollectionStore>>,
}

impl MediaLibrary {
    /// Create a library with three empty stores
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the store of one media kind
    pub fn store(&self, kind: MediaKind) -> Arc<Mutex<CollectionStore>> {
        match kind {
            MediaKind::Audio => Arc::clone(&self.audio),
            MediaKind::Video => Arc::clone(&self.video),
            MediaKind::Images => Arc::clone(&self.images),
        }
    }

    /// Run a closure against the locked store of one media kind
    pub fn with_store<R>(&self, kind: MediaKind, f: impl FnOnce(&mut CollectionStore) -> R) -> R {
        let store = self.store(kind);
        let mut guard = store.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    /// Snapshot of the flat list of one media kind
    pub fn items(&self, kind: MediaKind) -> Vec<MediaRecord> {
        self.with_store(kind, |store| store.items().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(name: &str, bucket: &str) -> MediaRecord {
        MediaRecord {
            uri: format!("/media/{bucket}/{name}"),
            name: name.to_string(),
            bucket_name: bucket.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_keeps_source_order() {
        let mut store = CollectionStore::new();
        store.insert(record("b.mp3", "Music"));
        store.insert(record("a.mp3", "Music"));
        store.insert(record("c.mp3", "Ringtones"));

        let names: Vec<_> = store.items().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["b.mp3", "a.mp3", "c.mp3"]);
    }

    #[test]
    fn test_folder_buckets_sorted_by_name() {
        let mut store = CollectionStore::new();
        store.insert(record("b.mp3", "Music"));
        store.insert(record("a.mp3", "Music"));
        store.insert(record("c.mp3", "Ringtones"));

        let music: Vec<_> = store
            .folder("Music")
            .unwrap()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(music, ["a.mp3", "b.mp3"]);

        let ringtones: Vec<_> = store
            .folder("Ringtones")
            .unwrap()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(ringtones, ["c.mp3"]);
    }

    #[test]
    fn test_duplicates_skipped_by_value() {
        let mut store = CollectionStore::new();
        store.insert(record("a.mp3", "Music"));
        store.insert(record("a.mp3", "Music"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.folder("Music").unwrap().len(), 1);
    }

    #[test]
    fn test_blank_bucket_skipped_from_folder_map() {
        let mut store = CollectionStore::new();
        let mut r = record("a.mp3", "");
        r.bucket_name = "  ".to_string();
        store.insert(r);

        assert_eq!(store.len(), 1);
        assert!(store.folder_names().is_empty());
    }

    #[test]
    fn test_folder_records_are_subset_of_items() {
        let mut store = CollectionStore::new();
        store.insert(record("b.mp3", "Music"));
        store.insert(record("a.mp3", "Music"));
        store.insert(record("c.mp3", ""));

        for bucket in store.folder_names() {
            for r in store.folder(bucket).unwrap() {
                assert!(store.items().contains(r));
            }
        }
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut store = CollectionStore::new();
        store.insert(record("a.mp3", "Music"));
        let item = store.items()[0].clone();
        store.select(&item);

        store.clear();
        assert!(store.is_empty());
        assert!(store.selected().is_empty());
        assert!(store.folder_names().is_empty());
    }

    #[test]
    fn test_select_and_deselect() {
        let mut store = CollectionStore::new();
        store.insert(record("a.mp3", "Music"));
        let item = record("a.mp3", "Music");

        store.select(&item);
        assert_eq!(store.selected().len(), 1);
        assert!(store.items()[0].selected);

        // selecting again is a no-op
        store.select(&item);
        assert_eq!(store.selected().len(), 1);

        store.deselect(&item);
        assert!(store.selected().is_empty());
        assert!(!store.items()[0].selected);
    }

    #[test]
    fn test_select_unknown_record_is_noop() {
        let mut store = CollectionStore::new();
        store.insert(record("a.mp3", "Music"));
        store.select(&record("z.mp3", "Music"));
        assert!(store.selected().is_empty());
    }

    #[test]
    fn test_library_stores_are_disjoint() {
        let library = MediaLibrary::new();
        library.with_store(MediaKind::Audio, |s| s.insert(record("a.mp3", "Music")));

        assert_eq!(library.items(MediaKind::Audio).len(), 1);
        assert!(library.items(MediaKind::Video).is_empty());
        assert!(library.items(MediaKind::Images).is_empty());

        // clones share the same stores
        let clone = library.clone();
        assert_eq!(clone.items(MediaKind::Audio).len(), 1);
    }

    proptest! {
        #[test]
        fn prop_buckets_stay_sorted_and_deduped(names in proptest::collection::vec("[a-z]{1,8}", 0..40)) {
            let mut store = CollectionStore::new();
            for name in &names {
                store.insert(record(name, "Bucket"));
            }

            if let Some(bucket) = store.folder("Bucket") {
                for pair in bucket.windows(2) {
                    prop_assert!(pair[0].name <= pair[1].name);
                    prop_assert!(pair[0] != pair[1]);
                }
                for r in bucket {
                    prop_assert!(store.items().contains(r));
                }
            }
        }
    }
}
