//! SSCM decoder CLI application.
//!
//! Decodes cityai acoustic sensor `.sscm` captures to per-channel CSV files.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use sscm_core::{output, read_sscm, read_sscm_folder};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// SSCM capture decoder for cityai acoustic sensors.
///
/// Decodes one .sscm file, or merges a whole folder of them per sensor, and
/// writes one CSV file per channel (loudness, sharpness, source, voltage,
/// events).
#[derive(Parser, Debug)]
#[command(name = "sscm")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input .sscm file or a folder of .sscm files
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory for the per-channel CSV files
    ///
    /// Files are named <sensor>_<channel>.csv; when a folder is merged, one
    /// set of files is written per distinct sensor.
    #[arg(value_name = "OUTDIR")]
    outdir: PathBuf,

    /// Hours to add to every timestamp (timezone adjustment)
    #[arg(short = 'z', long = "tz-hours", default_value_t = 0)]
    tz_hours: i32,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

struct Channels<'a> {
    loudness: &'a [sscm_core::LoudnessSample],
    sharpness: &'a [sscm_core::SharpnessSample],
    source: &'a [sscm_core::SourceSample],
    voltage: &'a [sscm_core::VoltageSample],
    events: &'a [sscm_core::EventLogEntry],
}

/// Makes a decoded sensor name safe to embed in an output filename.
///
/// Sensor names come from the file being decoded, so path separators must
/// not leak into the paths we write.
fn sanitize_sensor(sensor: &str) -> String {
    sensor.replace(['/', '\\'], "_")
}

fn write_channels(outdir: &Path, sensor: &str, channels: &Channels) -> Result<()> {
    let sensor = sanitize_sensor(sensor);
    let path = |channel: &str| outdir.join(format!("{sensor}_{channel}.csv"));

    output::write_loudness_csv(path("loudness"), channels.loudness)
        .with_context(|| format!("failed to write loudness CSV for {sensor}"))?;
    output::write_sharpness_csv(path("sharpness"), channels.sharpness)
        .with_context(|| format!("failed to write sharpness CSV for {sensor}"))?;
    output::write_source_csv(path("source"), channels.source)
        .with_context(|| format!("failed to write source CSV for {sensor}"))?;
    output::write_voltage_csv(path("voltage"), channels.voltage)
        .with_context(|| format!("failed to write voltage CSV for {sensor}"))?;
    output::write_events_csv(path("events"), channels.events)
        .with_context(|| format!("failed to write events CSV for {sensor}"))?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap(),
        );
        pb.set_message("Decoding...");
        pb
    };

    let start_time = Instant::now();

    std::fs::create_dir_all(&args.outdir)
        .with_context(|| format!("failed to create output directory {:?}", args.outdir))?;

    let mut sensors = 0usize;
    let mut failures = 0usize;
    let mut samples = 0usize;

    if args.input.is_dir() {
        progress.set_message(format!("Merging folder {:?}...", args.input));

        let folder = read_sscm_folder(&args.input, args.tz_hours)
            .with_context(|| format!("failed to read SSCM folder {:?}", args.input))?;

        for failure in &folder.failures {
            eprintln!("warning: {:?}: {}", failure.file, failure.error);
        }
        failures = folder.failures.len();

        for (sensor, dataset) in &folder.sensors {
            progress.set_message(format!("Writing CSV for sensor {sensor}..."));
            write_channels(
                &args.outdir,
                sensor,
                &Channels {
                    loudness: &dataset.loudness,
                    sharpness: &dataset.sharpness,
                    source: &dataset.source,
                    voltage: &dataset.voltage,
                    events: &dataset.events,
                },
            )?;
            sensors += 1;
            samples += dataset.loudness.len()
                + dataset.sharpness.len()
                + dataset.source.len()
                + dataset.voltage.len()
                + dataset.events.len();
        }
    } else {
        progress.set_message(format!(
            "Decoding {:?}...",
            args.input.file_name().unwrap_or_default()
        ));

        let record = read_sscm(&args.input, args.tz_hours)
            .with_context(|| format!("failed to decode SSCM file {:?}", args.input))?;

        write_channels(
            &args.outdir,
            &record.sensor,
            &Channels {
                loudness: &record.loudness,
                sharpness: &record.sharpness,
                source: &record.source,
                voltage: &record.voltage,
                events: &record.events,
            },
        )?;
        sensors = 1;
        samples = record.loudness.len()
            + record.sharpness.len()
            + record.source.len()
            + record.voltage.len()
            + record.events.len();
    }

    let duration = start_time.elapsed();
    progress.finish_with_message(format!(
        "Done! {sensors} sensor(s), {samples} samples in {:.2}s",
        duration.as_secs_f64()
    ));

    if !args.quiet {
        eprintln!();
        eprintln!("Summary:");
        eprintln!("  Input:     {:?}", args.input);
        eprintln!("  Output:    {:?}", args.outdir);
        eprintln!("  Sensors:   {sensors}");
        eprintln!("  Samples:   {samples}");
        eprintln!("  Failures:  {failures}");
        eprintln!("  Duration:  {:.3}s", duration.as_secs_f64());
    }

    Ok(())
}
