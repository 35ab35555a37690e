//! Benchmarks for the tagpack encoder and decoder.

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tagpack::{Decoder, Encoder};

/// Packs a small mixed record: two integers, a string and a 128-element array.
fn pack_record(encoder: &mut Encoder, values: &[i32]) {
    encoder
        .write_i32(1)
        .write_i32(4)
        .write_str("test")
        .write_array(values);
}

fn bench_encode(c: &mut Criterion) {
    let values: Vec<i32> = (0..128).collect();
    c.bench_function("encode_record", |b| {
        b.iter(|| {
            let mut encoder = Encoder::new();
            pack_record(&mut encoder, black_box(&values));
            encoder.into_bytes()
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let values: Vec<i32> = (0..128).collect();
    let mut encoder = Encoder::new();
    pack_record(&mut encoder, &values);
    let bytes = bytes::Bytes::from(encoder.into_bytes());

    c.bench_function("decode_record", |b| {
        b.iter(|| {
            let mut decoder = Decoder::new(black_box(bytes.clone()));
            let x = decoder.read_i32().unwrap();
            let y = decoder.read_i32().unwrap();
            let s = decoder.read_str().unwrap();
            let v: Vec<i32> = decoder.read_array().unwrap();
            (x, y, s, v)
        })
    });

    c.bench_function("skip_record", |b| {
        b.iter(|| {
            let mut decoder = Decoder::new(black_box(bytes.clone()));
            while !decoder.is_empty() {
                decoder.skip().unwrap();
            }
        })
    });
}

fn bench_map(c: &mut Criterion) {
    let map: BTreeMap<String, u64> = (0..64u64).map(|i| (format!("key{i}"), i * 1000)).collect();
    let bytes = bytes::Bytes::from(tagpack::to_vec(&map));

    c.bench_function("decode_map", |b| {
        b.iter(|| {
            let mut decoder = Decoder::new(black_box(bytes.clone()));
            let decoded: BTreeMap<String, u64> = decoder.read_map().unwrap();
            decoded
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_map);
criterion_main!(benches);
