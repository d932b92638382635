//! Receive-path benchmark: frame decode followed by payload parse.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loralink_frame::{decode_frame, encode_frame};
use loralink_telemetry::parse_telemetry;

const PAYLOAD: &str = r#"{"id":"tiny32-AB12CD","fw":"1.0","topic":"inverter",220.5,5.2,1150.0,49.9,0.0,0.0,0.0,0.0,0.0,0.0}"#;

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_telemetry", |b| {
        b.iter(|| parse_telemetry(black_box(PAYLOAD)))
    });
}

fn bench_decode_and_parse(c: &mut Criterion) {
    let wire = encode_frame(1, 2, 17, PAYLOAD.as_bytes()).expect("payload fits");

    c.bench_function("decode_frame_and_parse", |b| {
        b.iter(|| {
            let frame = decode_frame(black_box(&wire)).ok().flatten()?;
            parse_telemetry(&frame.payload_text()).ok()
        })
    });
}

criterion_group!(benches, bench_parse, bench_decode_and_parse);
criterion_main!(benches);
