//! Decoder for SSCM acoustic sensor capture files.
//!
//! This crate reads the proprietary `.sscm` binary container written by
//! cityai acoustic sensors and exposes its channels — loudness, sharpness,
//! sound source classification, battery voltage and a system event log — as
//! time-indexed records. A folder of files, possibly spanning multiple
//! sensors and overlapping capture windows, merges into one ordered dataset
//! per sensor.
//!
//! # Example
//!
//! ```no_run
//! use sscm_core::{read_sscm, read_sscm_folder};
//!
//! let record = read_sscm("capture.sscm", 2).unwrap();
//! println!("{}: {} loudness samples", record.sensor, record.loudness.len());
//!
//! let folder = read_sscm_folder("captures/", 2).unwrap();
//! for (sensor, dataset) in &folder.sensors {
//!     println!("{sensor}: merged {} files", dataset.file_count);
//! }
//! ```
//!
//! # Features
//!
//! - Bounds-checked decoding that fails closed on truncated or corrupt files
//! - Timestamp normalization to UTC with a caller-supplied hour offset
//! - Deterministic folder merge: lexicographic file order, stable
//!   timestamp sort, duplicate scalar samples collapsed
//! - Per-file failure reporting so one bad file never hides a folder
//! - CSV export per channel

pub mod cursor;
pub mod decoder;
pub mod merge;
pub mod output;
pub mod time;
pub mod types;

// Re-export commonly used items
pub use decoder::{read_sscm, DecodeError, SscmDecoder};
pub use merge::{read_sscm_folder, FileFailure, FolderDataset, MergedDataset};
pub use output::OutputError;
pub use types::{
    EventLogEntry, FileRecord, Header, LoudnessSample, SharpnessSample, SourceSample, SystemEvent,
    VoltageSample, NUM_SOURCE_CLASSES, SOURCE_LABELS,
};
