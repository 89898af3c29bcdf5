//! CSV export for decoded SSCM channels.
//!
//! A thin adapter over the decoded records; timestamps are written as
//! RFC 3339 UTC strings. Nothing here feeds back into decoding.

use crate::types::{
    EventLogEntry, LoudnessSample, SharpnessSample, SourceSample, VoltageSample, SOURCE_LABELS,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing channel CSV files.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes loudness samples as `time,dba,spl_a`.
pub fn write_loudness<W: Write>(writer: W, samples: &[LoudnessSample]) -> Result<(), OutputError> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "time,dba,spl_a")?;
    for s in samples {
        writeln!(writer, "{},{},{}", s.time.to_rfc3339(), s.dba, s.spl_a)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes sharpness samples as `time,sharpness`.
pub fn write_sharpness<W: Write>(
    writer: W,
    samples: &[SharpnessSample],
) -> Result<(), OutputError> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "time,sharpness")?;
    for s in samples {
        writeln!(writer, "{},{}", s.time.to_rfc3339(), s.sharpness)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes source classifications as `time,<one column per class>,label`.
pub fn write_source<W: Write>(writer: W, samples: &[SourceSample]) -> Result<(), OutputError> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "time,{},label", SOURCE_LABELS.join(","))?;
    for s in samples {
        write!(writer, "{}", s.time.to_rfc3339())?;
        for p in s.probabilities {
            write!(writer, ",{p}")?;
        }
        writeln!(writer, ",{}", s.label())?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes voltage samples as `time,mV`.
pub fn write_voltage<W: Write>(writer: W, samples: &[VoltageSample]) -> Result<(), OutputError> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "time,mV")?;
    for s in samples {
        writeln!(writer, "{},{}", s.time.to_rfc3339(), s.millivolts)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes event log entries as `time,event,value`.
pub fn write_events<W: Write>(writer: W, entries: &[EventLogEntry]) -> Result<(), OutputError> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "time,event,value")?;
    for e in entries {
        writeln!(writer, "{},{},{}", e.time.to_rfc3339(), e.event.name(), e.value)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes loudness samples to a CSV file.
pub fn write_loudness_csv<P: AsRef<Path>>(
    path: P,
    samples: &[LoudnessSample],
) -> Result<(), OutputError> {
    write_loudness(File::create(path)?, samples)
}

/// Writes sharpness samples to a CSV file.
pub fn write_sharpness_csv<P: AsRef<Path>>(
    path: P,
    samples: &[SharpnessSample],
) -> Result<(), OutputError> {
    write_sharpness(File::create(path)?, samples)
}

/// Writes source classifications to a CSV file.
pub fn write_source_csv<P: AsRef<Path>>(
    path: P,
    samples: &[SourceSample],
) -> Result<(), OutputError> {
    write_source(File::create(path)?, samples)
}

/// Writes voltage samples to a CSV file.
pub fn write_voltage_csv<P: AsRef<Path>>(
    path: P,
    samples: &[VoltageSample],
) -> Result<(), OutputError> {
    write_voltage(File::create(path)?, samples)
}

/// Writes event log entries to a CSV file.
pub fn write_events_csv<P: AsRef<Path>>(
    path: P,
    entries: &[EventLogEntry],
) -> Result<(), OutputError> {
    write_events(File::create(path)?, entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::normalize_ms;
    use crate::types::{SystemEvent, NUM_SOURCE_CLASSES};

    #[test]
    fn test_loudness_csv() {
        let samples = [LoudnessSample::new(normalize_ms(0, 0), 30.0)];
        let mut out = Vec::new();
        write_loudness(&mut out, &samples).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("time,dba,spl_a\n"));
        assert!(text.contains("1970-01-01T00:00:00+00:00,30,1000"));
    }

    #[test]
    fn test_source_csv_has_label_column() {
        let mut probabilities = [0.0f32; NUM_SOURCE_CLASSES];
        probabilities[6] = 1.0; // bird
        let samples = [SourceSample {
            time: normalize_ms(0, 0),
            probabilities,
        }];
        let mut out = Vec::new();
        write_source(&mut out, &samples).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().next().unwrap().ends_with(",label"));
        assert!(text.lines().nth(1).unwrap().ends_with(",bird"));
    }

    #[test]
    fn test_events_csv() {
        let entries = [EventLogEntry {
            time: normalize_ms(1_000, 0),
            event: SystemEvent::EnterSleep,
            value: 30.0,
        }];
        let mut out = Vec::new();
        write_events(&mut out, &entries).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("ENTER_SLEEP,30"));
    }
}
