//! Benchmarks for the SSCM decoder.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sscm_core::{SscmDecoder, NUM_SOURCE_CLASSES};

const MAGIC: &[u8] = b"\x00\x00cityai_sc_sensor_v";

fn synthetic_file(entries: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(b"01");
    buf.extend_from_slice(&1_700_000_000u32.to_le_bytes());
    buf.push(6);
    buf.extend_from_slice(b"mic-01");
    buf.push(NUM_SOURCE_CLASSES as u8);

    // channel mix of a typical capture: mostly loudness, periodic source
    // classifications, occasional voltage readings
    for i in 0..entries as i64 {
        let ms = 1_700_000_000_000 + i * 125;
        match i % 10 {
            0 => {
                buf.push(1);
                buf.extend_from_slice(&ms.to_le_bytes());
                for c in 0..NUM_SOURCE_CLASSES {
                    buf.extend_from_slice(&(c as f32 / 11.0).to_le_bytes());
                }
            }
            9 => {
                buf.push(100);
                buf.extend_from_slice(&ms.to_le_bytes());
                buf.extend_from_slice(&3_700u16.to_le_bytes());
            }
            _ => {
                buf.push(0);
                buf.extend_from_slice(&ms.to_le_bytes());
                buf.extend_from_slice(&(45.0 + (i % 30) as f32).to_le_bytes());
                buf.extend_from_slice(&0f32.to_le_bytes());
            }
        }
    }
    buf
}

fn decode_buffer_benchmark(c: &mut Criterion) {
    let buf = synthetic_file(500_000);

    let mut group = c.benchmark_group("decode_buffer");
    group.throughput(Throughput::Bytes(buf.len() as u64));

    group.bench_function("synthetic_500k_entries", |b| {
        b.iter(|| {
            let decoder = SscmDecoder::new(0);
            let record = decoder.decode_buffer(black_box(&buf)).unwrap();
            black_box(record.loudness.len())
        })
    });

    group.finish();
}

criterion_group!(benches, decode_buffer_benchmark);
criterion_main!(benches);
