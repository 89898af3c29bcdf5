//! Folder-level merge of many SSCM files into per-sensor datasets.
//!
//! Files are processed in lexicographic filename order so the result is
//! independent of filesystem enumeration order. A file that fails to decode
//! is recorded against its name and skipped; the merge only fails outright
//! when no file decodes at all.

use crate::decoder::{DecodeError, SscmDecoder};
use crate::types::{
    EventLogEntry, FileRecord, LoudnessSample, SharpnessSample, SourceSample, VoltageSample,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A file that failed to decode during a folder merge.
#[derive(Debug)]
pub struct FileFailure {
    pub file: PathBuf,
    pub error: DecodeError,
}

/// All channels of one sensor, merged across every file it produced.
///
/// Scalar channels are sorted by timestamp with exact duplicates collapsed;
/// the event log is sorted but never deduplicated.
#[derive(Debug, Clone, Default)]
pub struct MergedDataset {
    /// Number of files that contributed to this dataset.
    pub file_count: usize,
    pub loudness: Vec<LoudnessSample>,
    pub sharpness: Vec<SharpnessSample>,
    pub source: Vec<SourceSample>,
    pub voltage: Vec<VoltageSample>,
    pub events: Vec<EventLogEntry>,
}

impl MergedDataset {
    fn append(&mut self, record: FileRecord) {
        self.file_count += 1;
        self.loudness.extend(record.loudness);
        self.sharpness.extend(record.sharpness);
        self.source.extend(record.source);
        self.voltage.extend(record.voltage);
        self.events.extend(record.events);
    }

    fn finalize(&mut self) {
        sort_and_dedup(&mut self.loudness);
        sort_and_dedup(&mut self.sharpness);
        sort_and_dedup(&mut self.source);
        sort_and_dedup(&mut self.voltage);
        // repeated events are meaningful, sort only
        sort_by_time(&mut self.events);
    }
}

/// Result of reading a folder of SSCM files.
#[derive(Debug, Default)]
pub struct FolderDataset {
    /// One merged dataset per distinct sensor identity, keyed by sensor name.
    pub sensors: BTreeMap<String, MergedDataset>,
    /// Files that failed to decode, in processing order.
    pub failures: Vec<FileFailure>,
}

trait Timestamped {
    fn time(&self) -> DateTime<Utc>;
}

macro_rules! impl_timestamped {
    ($($ty:ty),*) => {
        $(impl Timestamped for $ty {
            #[inline]
            fn time(&self) -> DateTime<Utc> {
                self.time
            }
        })*
    };
}

impl_timestamped!(
    LoudnessSample,
    SharpnessSample,
    SourceSample,
    VoltageSample,
    EventLogEntry
);

/// Stable sort by timestamp; ties keep file/insertion order.
fn sort_by_time<T: Timestamped>(samples: &mut [T]) {
    samples.sort_by_key(|s| s.time());
}

/// Stable sort by timestamp, then collapse adjacent exact-duplicate samples.
fn sort_and_dedup<T: Timestamped + PartialEq>(samples: &mut Vec<T>) {
    sort_by_time(samples);
    samples.dedup();
}

/// Lists `*.sscm` files in `folder`, sorted lexicographically by filename.
fn list_sscm_files(folder: &Path) -> Result<Vec<PathBuf>, DecodeError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        // extension match is case-sensitive, the device always writes .sscm
        let is_sscm = path.is_file() && path.extension().is_some_and(|ext| ext == "sscm");
        if is_sscm {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Reads every `.sscm` file in `folder` and merges them per sensor.
///
/// Per-file decode failures are collected in [`FolderDataset::failures`];
/// the call fails with [`DecodeError::NoValidFiles`] only when not a single
/// file decodes (including the empty-folder case).
pub fn read_sscm_folder<P: AsRef<Path>>(
    folder: P,
    add_tz_hours: i32,
) -> Result<FolderDataset, DecodeError> {
    let paths = list_sscm_files(folder.as_ref())?;
    let decoder = SscmDecoder::new(add_tz_hours);

    let mut result = FolderDataset::default();
    for path in paths {
        match decoder.decode_file(&path) {
            Ok(record) => {
                result
                    .sensors
                    .entry(record.sensor.clone())
                    .or_default()
                    .append(record);
            }
            Err(error) => {
                result.failures.push(FileFailure { file: path, error });
            }
        }
    }

    if result.sensors.is_empty() {
        return Err(DecodeError::NoValidFiles);
    }

    for dataset in result.sensors.values_mut() {
        dataset.finalize();
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::normalize_ms;
    use crate::types::SystemEvent;

    fn voltage(ms: i64, millivolts: u16) -> VoltageSample {
        VoltageSample {
            time: normalize_ms(ms, 0),
            millivolts,
        }
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        // two samples at the same instant with different values must keep
        // their insertion order
        let mut samples = vec![voltage(5_000, 3_700), voltage(1_000, 3_650), voltage(5_000, 3_600)];
        sort_by_time(&mut samples);
        assert_eq!(samples[0].millivolts, 3_650);
        assert_eq!(samples[1].millivolts, 3_700);
        assert_eq!(samples[2].millivolts, 3_600);
    }

    #[test]
    fn test_dedup_collapses_exact_pairs_only() {
        let mut samples = vec![
            voltage(1_000, 3_700),
            voltage(1_000, 3_700),
            voltage(1_000, 3_600),
        ];
        sort_and_dedup(&mut samples);
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_events_are_never_deduplicated() {
        let entry = EventLogEntry {
            time: normalize_ms(1_000, 0),
            event: SystemEvent::TimeFromNtp,
            value: 0.0,
        };
        let mut dataset = MergedDataset::default();
        dataset.events = vec![entry, entry];
        dataset.finalize();
        assert_eq!(dataset.events.len(), 2);
    }

    #[test]
    fn test_missing_folder_is_io_error() {
        let err = read_sscm_folder("/nonexistent/sscm-folder", 0).unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }
}
