//! SSCM container and entry-stream decoder.
//!
//! An `.sscm` file is a fixed header followed by a stream of tagged entries.
//! Each entry is a one-byte type tag, a signed 64-bit millisecond timestamp
//! and a tag-specific payload, optionally preceded by a two-byte `FF FF`
//! sync marker. Decoding is a pure transform over a fully-read byte buffer;
//! no I/O happens after the initial file read.

use crate::cursor::Cursor;
use crate::time::normalize_ms;
use crate::types::{
    EventLogEntry, FileRecord, Header, LoudnessSample, SharpnessSample, SourceSample, SystemEvent,
    VoltageSample, NUM_SOURCE_CLASSES,
};
use byteorder::LittleEndian;
use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while decoding SSCM data.
///
/// All variants are structural and non-retryable; corruption is not
/// transient.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The buffer ended in the middle of a read.
    #[error("truncated data at offset {offset} ({needed} more bytes needed)")]
    TruncatedData { offset: usize, needed: usize },

    /// The magic bytes or format version did not match.
    #[error("unrecognized file format: {0}")]
    UnrecognizedFormat(String),

    /// An entry with an unknown or inconsistent type tag. Entry payloads are
    /// variable-length, so an unknown tag cannot be skipped over.
    #[error("corrupt entry with tag {tag} at offset {offset}")]
    CorruptEntry { tag: u8, offset: usize },

    /// A stream-level structural mismatch.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// The header carries no sensor name.
    #[error("file declares no sensor identity")]
    MissingIdentity,

    /// Every file in a folder failed to decode.
    #[error("no valid SSCM files found")]
    NoValidFiles,
}

/// Magic bytes at offset 0 of every SSCM file.
pub const MAGIC: &[u8; 20] = b"\x00\x00cityai_sc_sensor_v";

/// The only format version this decoder understands.
pub const SUPPORTED_VERSION: &str = "01";

/// Optional marker the firmware writes between entries.
const SYNC_MARKER: [u8; 2] = [0xFF, 0xFF];

/// Bytes of tag + timestamp that every entry starts with.
const ENTRY_PREFIX_LEN: usize = 9;

/// SSCM entry type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntryTag {
    /// Loudness measurement: f32 dBA + f32 reserved (0)
    Loudness = 0,
    /// Source classification: one f32 probability per class (1)
    Source = 1,
    /// Sharpness measurement: f32 (2)
    Sharpness = 2,
    /// Battery voltage: u16 millivolts (100)
    Voltage = 100,
    /// Clock synced from NTP, no payload (110)
    TimeFromNtp = 110,
    /// Clock synced from RTC, no payload (111)
    TimeFromRtc = 111,
    /// Sleep entered: u16 seconds (120)
    EnterSleep = 120,
    /// Nightly power-down: f32 sampling rate (121)
    NightlyPowerDown = 121,
}

impl EntryTag {
    /// Attempts to parse an entry tag. Unknown tags are fatal for the file
    /// since their payload length is unknowable.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Loudness),
            1 => Some(Self::Source),
            2 => Some(Self::Sharpness),
            100 => Some(Self::Voltage),
            110 => Some(Self::TimeFromNtp),
            111 => Some(Self::TimeFromRtc),
            120 => Some(Self::EnterSleep),
            121 => Some(Self::NightlyPowerDown),
            _ => None,
        }
    }
}

/// Parses and validates the SSCM file header.
pub fn decode_header(cursor: &mut Cursor) -> Result<Header, DecodeError> {
    let magic = cursor.read_bytes(MAGIC.len())?;
    if magic != MAGIC {
        return Err(DecodeError::UnrecognizedFormat(format!(
            "bad magic bytes {:02x?}",
            &magic[..magic.len().min(8)]
        )));
    }

    let version = cursor.read_bytes(2)?;
    if version != SUPPORTED_VERSION.as_bytes() {
        return Err(DecodeError::UnrecognizedFormat(format!(
            "unsupported SSCM format version {:?}",
            String::from_utf8_lossy(version)
        )));
    }
    let format_version = String::from_utf8_lossy(version).into_owned();

    let created_ts = cursor.read_u32::<LittleEndian>()?;
    let created = normalize_ms(i64::from(created_ts) * 1000, 0);

    let sensor_name = cursor.read_len_prefixed_str()?;
    if sensor_name.is_empty() {
        return Err(DecodeError::MissingIdentity);
    }

    let num_source_classes = cursor.read_u8()?;
    if usize::from(num_source_classes) != NUM_SOURCE_CLASSES {
        return Err(DecodeError::MalformedRecord(format!(
            "header declares {num_source_classes} source classes, expected {NUM_SOURCE_CLASSES}"
        )));
    }

    Ok(Header {
        format_version,
        created,
        sensor_name,
        num_source_classes,
    })
}

/// SSCM decoder.
///
/// Carries the timezone hour offset applied to every timestamp in every
/// channel of a decoded file.
#[derive(Debug, Clone, Copy, Default)]
pub struct SscmDecoder {
    add_tz_hours: i32,
}

impl SscmDecoder {
    /// Creates a decoder that shifts all timestamps by `add_tz_hours` hours.
    pub fn new(add_tz_hours: i32) -> Self {
        Self { add_tz_hours }
    }

    #[inline]
    fn normalize(&self, raw_ms: i64) -> DateTime<Utc> {
        normalize_ms(raw_ms, self.add_tz_hours)
    }

    /// Decodes a complete SSCM file from an in-memory buffer.
    pub fn decode_buffer(&self, buf: &[u8]) -> Result<FileRecord, DecodeError> {
        let mut cursor = Cursor::new(buf);
        let header = decode_header(&mut cursor)?;

        let mut loudness = Vec::new();
        let mut sharpness = Vec::new();
        let mut source = Vec::new();
        let mut voltage = Vec::new();
        let mut events = Vec::new();

        while cursor.remaining() > 0 {
            if cursor.peek(SYNC_MARKER.len()) == Some(SYNC_MARKER.as_slice()) {
                cursor.skip(SYNC_MARKER.len())?;
                if cursor.remaining() == 0 {
                    break;
                }
            }

            // Trailing zero bytes after the last complete entry are block
            // padding, not an entry.
            if is_zero_padding(cursor.rest()) {
                break;
            }

            let entry_offset = cursor.position();
            let tag = cursor.read_u8()?;
            let raw_ms = cursor.read_i64::<LittleEndian>()?;
            let time = self.normalize(raw_ms);

            match EntryTag::from_u8(tag) {
                Some(EntryTag::Loudness) => {
                    let dba = cursor.read_f32::<LittleEndian>()?;
                    // reserved field, always written as zero by the firmware
                    let _ = cursor.read_f32::<LittleEndian>()?;
                    loudness.push(LoudnessSample::new(time, dba));
                }

                Some(EntryTag::Source) => {
                    let mut probabilities = [0f32; NUM_SOURCE_CLASSES];
                    for p in &mut probabilities {
                        *p = cursor.read_f32::<LittleEndian>()?;
                    }
                    source.push(SourceSample {
                        time,
                        probabilities,
                    });
                }

                Some(EntryTag::Sharpness) => {
                    let value = cursor.read_f32::<LittleEndian>()?;
                    sharpness.push(SharpnessSample {
                        time,
                        sharpness: value,
                    });
                }

                Some(EntryTag::Voltage) => {
                    let millivolts = cursor.read_u16::<LittleEndian>()?;
                    voltage.push(VoltageSample { time, millivolts });
                }

                Some(EntryTag::TimeFromNtp) => {
                    events.push(EventLogEntry {
                        time,
                        event: SystemEvent::TimeFromNtp,
                        value: 0.0,
                    });
                }

                Some(EntryTag::TimeFromRtc) => {
                    events.push(EventLogEntry {
                        time,
                        event: SystemEvent::TimeFromRtc,
                        value: 0.0,
                    });
                }

                Some(EntryTag::EnterSleep) => {
                    let seconds = cursor.read_u16::<LittleEndian>()?;
                    events.push(EventLogEntry {
                        time,
                        event: SystemEvent::EnterSleep,
                        value: f64::from(seconds),
                    });
                }

                Some(EntryTag::NightlyPowerDown) => {
                    let sampling_rate = cursor.read_f32::<LittleEndian>()?;
                    events.push(EventLogEntry {
                        time,
                        event: SystemEvent::NightlyPowerDown,
                        value: f64::from(sampling_rate),
                    });
                }

                None => {
                    return Err(DecodeError::CorruptEntry {
                        tag,
                        offset: entry_offset,
                    });
                }
            }
        }

        Ok(FileRecord {
            sensor: header.sensor_name,
            loudness,
            sharpness,
            source,
            voltage,
            events,
        })
    }

    /// Reads and decodes an SSCM file from disk.
    ///
    /// The file is read fully before decoding begins.
    pub fn decode_file<P: AsRef<Path>>(&self, path: P) -> Result<FileRecord, DecodeError> {
        let buf = std::fs::read(path.as_ref())?;
        self.decode_buffer(&buf)
    }
}

/// True if the unread tail is nothing but zero bytes.
///
/// A real entry never starts with nine zero bytes followed by zeros to the
/// end of the file, so this is checked before each entry. The cheap prefix
/// probe keeps the common path from rescanning the tail.
#[inline]
fn is_zero_padding(rest: &[u8]) -> bool {
    let probe = rest.len().min(ENTRY_PREFIX_LEN);
    rest[..probe].iter().all(|&b| b == 0) && rest.iter().all(|&b| b == 0)
}

/// Reads one `.sscm` file.
///
/// Returns the decoded [`FileRecord`]: sensor identity plus the loudness,
/// sharpness, source, voltage and event-log channels, all timestamps
/// shifted by `add_tz_hours`.
pub fn read_sscm<P: AsRef<Path>>(path: P, add_tz_hours: i32) -> Result<FileRecord, DecodeError> {
    SscmDecoder::new(add_tz_hours).decode_file(path)
}
