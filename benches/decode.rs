//! Benchmarks for sensor line decoding and color normalization
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use swatchbooth::sensor::{decode, normalize};

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    let cases = [
        ("plain", "128,64,255\r\n"),
        ("with_intensity", "1023,512,256;900\r\n"),
        ("flagged", "128,64,255;900@\r\n"),
        ("garbled", "12x,64,255\r\n"),
        ("truncated", "128,64\r\n"),
    ];

    for (name, line) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), line, |b, line| {
            b.iter(|| black_box(decode(black_box(line))));
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    group.throughput(Throughput::Elements(1));

    let plain = decode("200,100,50\n").unwrap();
    let rescaled = decode("1023,512,256;900\n").unwrap();

    group.bench_function("clamp_only", |b| {
        b.iter(|| black_box(normalize(black_box(plain))));
    });

    group.bench_function("intensity_rescale", |b| {
        b.iter(|| black_box(normalize(black_box(rescaled))));
    });

    group.finish();
}

fn bench_sample_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_pipeline");

    // A representative burst of sensor output, garble included
    let burst: Vec<String> = (0..1000)
        .map(|i| match i % 10 {
            9 => "garbage\r\n".to_string(),
            3 => format!("{},{},{};{}@\r\n", i % 256, (i * 7) % 256, (i * 13) % 256, 900),
            _ => format!("{},{},{};{}\r\n", i % 1024, (i * 7) % 1024, (i * 13) % 1024, 900),
        })
        .collect();

    group.throughput(Throughput::Elements(burst.len() as u64));
    group.bench_function("decode_and_normalize_burst", |b| {
        b.iter(|| {
            let mut decoded = 0u64;
            for line in &burst {
                if let Some(sample) = decode(line) {
                    black_box(normalize(sample));
                    decoded += 1;
                }
            }
            black_box(decoded)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_normalize, bench_sample_pipeline);
criterion_main!(benches);
