//! Device media inventory engine
//!
//! This library scans a categorized media index in the background,
//! classifies each row into a typed record, and aggregates records into
//! per-kind stores with deduplicated, name-sorted folder buckets, with
//! per-row progress and cooperative cancellation.

pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod progress;
pub mod scanner;
pub mod source;
pub mod store;

pub use config::{IndexConfig, IndexConfigBuilder};
pub use controller::{CompletionQueue, CompletionReceiver, ScanController, ScanState};
pub use error::{ScanError, ScanErrorKind};
pub use models::{MediaKind, MediaRecord};
pub use progress::{JsonProgressReporter, ScanObserver};
pub use source::{FsMediaIndex, MediaIndex, SourceRow};
pub use store::{CollectionStore, MediaLibrary};
