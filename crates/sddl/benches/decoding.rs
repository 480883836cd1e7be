use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hexlit::hex;
use sddl::prelude::*;

/// A representative category 048 record: DSI, time of day, target report
/// descriptor, measured position, mode 3/A and flight level.
const CAT048_RECORD: [u8; 15] = hex!("fc0102250fb8a04012b67210050140");

/// A category 001 block with two plots sharing a SAC/SIC.
const CAT001_BLOCK: [u8; 12] = hex!("a00102400080002040008000");

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    group.bench_function("cat048_record", |b| {
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut sink = VecSink::default();
        b.iter(|| {
            sink.reports.clear();
            decode_data_block(&mut ctx, 48, black_box(&CAT048_RECORD), &mut sink).unwrap();
        });
    });

    group.bench_function("cat001_block", |b| {
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut sink = VecSink::default();
        b.iter(|| {
            sink.reports.clear();
            decode_data_block(&mut ctx, 1, black_box(&CAT001_BLOCK), &mut sink).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
