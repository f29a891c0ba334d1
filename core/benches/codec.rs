//! Encode/decode throughput of the LZW codec and the decompression filter.
//!
//! Run with: `cargo bench --bench codec`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use samplink_core::codec::{compress, decompress};
use samplink_core::constants::tags::{COMPRESS_START, COMPRESS_STOP};
use samplink_core::filters::{DecompressionFilter, FilterChain};

/// Captured-signal shape: long runs of a few channel states.
fn capture(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i / 97) % 5) as u8 * 0x11).collect()
}

fn noise(len: usize) -> Vec<u8> {
    let mut x = 0x9E37_79B9u32;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            x as u8
        })
        .collect()
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzw");
    for (name, data) in [("capture", capture(1 << 20)), ("noise", noise(1 << 18))] {
        let wire = compress(&data);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", name), &data, |b, d| {
            b.iter(|| compress(black_box(d)))
        });
        group.bench_with_input(BenchmarkId::new("decode", name), &wire, |b, w| {
            b.iter(|| decompress(black_box(w)))
        });
    }
    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let data = capture(1 << 20);
    let mut wire = COMPRESS_START.to_vec();
    wire.extend_from_slice(&compress(&data));
    wire.extend_from_slice(COMPRESS_STOP);

    let mut group = c.benchmark_group("filters");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("decompression_chain", |b| {
        b.iter(|| {
            let mut chain = FilterChain::new();
            chain.add_filter(DecompressionFilter::new());
            chain.write_all(black_box(&wire)).map(|_| chain.drain())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_codec, bench_filter);
criterion_main!(benches);
