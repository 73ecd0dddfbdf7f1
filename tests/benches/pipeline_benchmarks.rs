//! # Envelope Pipeline Benchmarks
//!
//! | Stage | Measured |
//! |-------|----------|
//! | Emitter | seal one version, full multi-version emit |
//! | Wire | envelope encode / decode |
//! | Subscriber | validate + decrypt + decode one envelope |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pipeline_core::{EncryptedEnvelope, EventKind, PipelineVersion};
use pipeline_tests::fixtures::{emitter, subscriber, RecordingPublisher, TestEmitter};

fn source(len: usize) -> TestEmitter {
    TestEmitter {
        foo: "x".repeat(len),
    }
}

// ============================================================================
// EMITTER
// ============================================================================

fn bench_create_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("emitter-create-envelope");
    group.measurement_time(Duration::from_secs(5));

    let emitter = emitter(Arc::new(RecordingPublisher::default()));
    for len in [16, 1024, 16 * 1024] {
        let source = source(len);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::new("seal_v2_0", len), &source, |b, s| {
            b.iter(|| {
                black_box(
                    emitter
                        .create_envelope(s, PipelineVersion::new(2, 0), Some(EventKind::Created))
                        .unwrap(),
                )
            })
        });
    }

    group.finish();
}

fn bench_emit(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let source = source(256);

    c.bench_function("emitter-emit-two-versions", |b| {
        b.iter(|| {
            // Fresh publisher so recorded calls do not grow without bound.
            let emitter = emitter(Arc::new(RecordingPublisher::default()));
            runtime.block_on(async { black_box(emitter.emit_created(&source).await.unwrap()) })
        })
    });
}

// ============================================================================
// WIRE FORMAT
// ============================================================================

fn bench_envelope_wire(c: &mut Criterion) {
    let emitter = emitter(Arc::new(RecordingPublisher::default()));
    let envelope = emitter
        .create_envelope(&source(1024), PipelineVersion::new(2, 0), None)
        .unwrap();
    let bytes = envelope.encode_to_vec();

    let mut group = c.benchmark_group("envelope-wire");
    group.bench_function("encode", |b| b.iter(|| black_box(envelope.encode_to_vec())));
    group.bench_function("decode", |b| {
        b.iter(|| black_box(EncryptedEnvelope::decode(&bytes).unwrap()))
    });
    group.finish();
}

// ============================================================================
// SUBSCRIBER
// ============================================================================

fn bench_decode_payload(c: &mut Criterion) {
    let mut group = c.benchmark_group("subscriber-decode-payload");

    let emitter = emitter(Arc::new(RecordingPublisher::default()));
    let subscriber = subscriber();
    for len in [16, 1024, 16 * 1024] {
        let envelope = emitter
            .create_envelope(&source(len), PipelineVersion::new(2, 0), None)
            .unwrap();
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::new("v2_0", len), &envelope, |b, e| {
            b.iter(|| black_box(subscriber.decode_payload(e).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_create_envelope,
    bench_emit,
    bench_envelope_wire,
    bench_decode_payload
);
criterion_main!(benches);
