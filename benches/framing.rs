use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mill_reactor::net::tcp::framing::extract_frame;

const REQUEST: &[u8] =
    b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nUser-Agent: bench\r\nAccept: */*\r\n\r\n";

fn bench_pipelined(c: &mut Criterion) {
    let mut group = c.benchmark_group("framing_pipelined");

    for depth in [1usize, 16, 256] {
        let stream = REQUEST.repeat(depth);
        group.throughput(Throughput::Bytes(stream.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &stream, |b, stream| {
            b.iter(|| {
                let mut buf = BytesMut::from(&stream[..]);
                let mut frames = 0;
                while let Some(frame) = extract_frame(&mut buf) {
                    black_box(frame);
                    frames += 1;
                }
                assert_eq!(frames, depth);
            });
        });
    }
    group.finish();
}

fn bench_incomplete(c: &mut Criterion) {
    // Worst case: a large header block still waiting for its blank line.
    let mut pending = Vec::new();
    while pending.len() < 64 * 1024 {
        pending.extend_from_slice(b"X-Filler: abcdefghijklmnopqrstuvwxyz\r\n");
    }

    c.bench_function("framing_incomplete_64k", |b| {
        b.iter(|| {
            let mut buf = BytesMut::from(&pending[..]);
            assert!(extract_frame(black_box(&mut buf)).is_none());
        });
    });
}

criterion_group!(benches, bench_pipelined, bench_incomplete);
criterion_main!(benches);
