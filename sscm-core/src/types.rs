//! Core types for decoded SSCM sensor data.
//!
//! One `.sscm` file carries five channels from a single acoustic sensor:
//! loudness, sharpness and battery voltage (continuous scalar series), sound
//! source classification (continuous vector series), and a discrete system
//! event log. All timestamps are normalized to UTC when a file is decoded.

use chrono::{DateTime, Utc};

/// Sound source classification labels, in on-disk probability order.
///
/// The file header declares how many classes the firmware writes; decoding
/// fails if that count disagrees with this label set.
pub const SOURCE_LABELS: [&str; 11] = [
    "vehicle", "honking", "aircraft", "siren", "human", "bark", "bird", "church", "music", "wind",
    "rain",
];

/// Number of sound source classification classes.
pub const NUM_SOURCE_CLASSES: usize = SOURCE_LABELS.len();

/// One loudness measurement.
///
/// The device records A-weighted decibels; the linear sound pressure level
/// `10^(dBA/10)` is derived at decode time so downstream averaging can be
/// done in the linear domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessSample {
    pub time: DateTime<Utc>,
    /// A-weighted sound level in dB.
    pub dba: f32,
    /// Linear SPL derived from `dba`.
    pub spl_a: f64,
}

impl LoudnessSample {
    pub fn new(time: DateTime<Utc>, dba: f32) -> Self {
        Self {
            time,
            dba,
            spl_a: 10f64.powf(f64::from(dba) / 10.0),
        }
    }
}

/// One psychoacoustic sharpness measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharpnessSample {
    pub time: DateTime<Utc>,
    pub sharpness: f32,
}

/// One battery/supply voltage reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoltageSample {
    pub time: DateTime<Utc>,
    pub millivolts: u16,
}

/// One sound source classification, a probability per class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceSample {
    pub time: DateTime<Utc>,
    /// Class probabilities in [`SOURCE_LABELS`] order.
    pub probabilities: [f32; NUM_SOURCE_CLASSES],
}

impl SourceSample {
    /// Index of the most probable class. Ties resolve to the first class
    /// in [`SOURCE_LABELS`] order.
    pub fn label_index(&self) -> usize {
        let mut best = 0;
        for (i, &p) in self.probabilities.iter().enumerate() {
            if p > self.probabilities[best] {
                best = i;
            }
        }
        best
    }

    /// Name of the most probable class.
    pub fn label(&self) -> &'static str {
        SOURCE_LABELS[self.label_index()]
    }
}

/// Discrete system events the firmware writes to the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEvent {
    /// Device clock was set from NTP.
    TimeFromNtp,
    /// Device clock was set from the onboard RTC.
    TimeFromRtc,
    /// Device entered sleep; the entry value is the sleep duration in seconds.
    EnterSleep,
    /// Nightly power-down; the entry value is the sampling rate at shutdown.
    NightlyPowerDown,
}

impl SystemEvent {
    /// Stable event name as used in exported tables.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TimeFromNtp => "TIME_FROM_NTP",
            Self::TimeFromRtc => "TIME_FROM_RTC",
            Self::EnterSleep => "ENTER_SLEEP",
            Self::NightlyPowerDown => "NIGHTLY_PD",
        }
    }
}

/// One entry in the system event log. Cadence is irregular; repeated
/// identical entries are meaningful and are never collapsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventLogEntry {
    pub time: DateTime<Utc>,
    pub event: SystemEvent,
    /// Event payload (seconds for `EnterSleep`, sampling rate for
    /// `NightlyPowerDown`, 0 otherwise).
    pub value: f64,
}

/// Parsed SSCM file header.
#[derive(Debug, Clone)]
pub struct Header {
    /// Two-character ASCII format version, e.g. `"01"`.
    pub format_version: String,
    /// When the firmware created the file.
    pub created: DateTime<Utc>,
    /// Name of the sensor that produced the file; the merge key across files.
    pub sensor_name: String,
    /// Number of source classification classes declared by the file.
    pub num_source_classes: u8,
}

/// Decoded content of one `.sscm` file. Immutable once produced.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Identity of the sensor that produced the file.
    pub sensor: String,
    pub loudness: Vec<LoudnessSample>,
    pub sharpness: Vec<SharpnessSample>,
    pub source: Vec<SourceSample>,
    pub voltage: Vec<VoltageSample>,
    pub events: Vec<EventLogEntry>,
}
