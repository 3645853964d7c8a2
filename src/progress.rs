//! Scan observation: the observer contract and a stderr JSON reporter
//!
//! [`ScanObserver`] is the advisory callback surface of a pass. Per-row
//! callbacks arrive on the worker thread; the single completion callback
//! is marshaled onto the caller's thread by the controller.

use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Observer of one scan pass
///
/// All callbacks are advisory: a pass with no observer attached still
/// populates the store, it simply emits nothing.
pub trait ScanObserver: Send + Sync {
    /// A row is about to be decoded (zero-based position, worker thread)
    fn on_observing(&self, position: usize);

    /// A row was stored (worker thread); `percent` is
    /// `floor(position * 100 / total)`
    fn on_progress(&self, position: usize, percent: u32);

    /// The pass finished, naturally or by cancellation; fires exactly
    /// once, on the caller's thread
    fn on_complete(&self);
}

/// Observing message sent before a row is decoded
#[derive(Debug, Clone, Serialize)]
pub struct ObservingMessage {
    /// Message type identifier ("o" for observing)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Zero-based row position
    pub pos: usize,
}

/// Progress message sent after a row is stored
#[derive(Debug, Clone, Serialize)]
pub struct ProgressMessage {
    /// Message type identifier ("p" for progress)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Zero-based row position
    pub pos: usize,
    /// Percentage of the pass completed
    pub pct: u32,
}

/// Done message sent when the pass completes
#[derive(Debug, Clone, Serialize)]
pub struct DoneMessage {
    /// Message type identifier ("done" for completion)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
}

/// Progress reporter writing JSON lines to stderr
///
/// Implements [`ScanObserver`] for CLI consumption. Message framing
/// (`_t` / `seq` / `ts`) lets a supervising process demultiplex the
/// stream.
pub struct JsonProgressReporter {
    /// Whether reporting is enabled
    enabled: bool,
    /// Sequence number for messages (atomic, callbacks cross threads)
    seq: AtomicU64,
    /// Start time of the reporter
    start_time: Instant,
}

impl JsonProgressReporter {
    /// Create a new reporter
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            seq: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Check if the reporter is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get the next sequence number (monotonically increasing)
    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Get the current timestamp in milliseconds since reporter creation
    fn current_timestamp(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Output a serializable message to stderr as JSON
    fn output_to_stderr<T: Serialize>(&self, msg: &T) {
        if let Ok(json) = serde_json::to_string(msg) {
            eprintln!("{json}");
            std::io::stderr().flush().ok();
        }
    }
}

impl ScanObserver for JsonProgressReporter {
    fn on_observing(&self, position: usize) {
        if !self.enabled {
            return;
        }
        let msg = ObservingMessage {
            msg_type: "o",
            seq: self.next_seq(),
            ts: self.current_timestamp(),
            pos: position,
        };
        self.output_to_stderr(&msg);
    }

    fn on_progress(&self, position: usize, percent: u32) {
        if !self.enabled {
            return;
        }
        let msg = ProgressMessage {
            msg_type: "p",
            seq: self.next_seq(),
            ts: self.current_timestamp(),
            pos: position,
            pct: percent,
        };
        self.output_to_stderr(&msg);
    }

    fn on_complete(&self) {
        if !self.enabled {
            return;
        }
        let msg = DoneMessage {
            msg_type: "done",
            seq: self.next_seq(),
            ts: self.current_timestamp(),
        };
        self.output_to_stderr(&msg);
    }
}
