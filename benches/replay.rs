use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use mesisim::config::CacheConfig;
use mesisim::simulator::{Mode, Simulator};

const RECORDS: usize = 200_000;

/// Builds a deterministic synthetic trace: mostly reads and writes with a sprinkling of snoops,
/// over a tag space small enough to produce a realistic hit rate
fn synthetic_trace(records: usize) -> String {
    let mut out = String::with_capacity(records * 14);
    let mut x: u32 = 0x9e37_79b9;
    for _ in 0..records {
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        let code = match x % 10 {
            0..=5 => 0,
            6 | 7 => 1,
            8 => 3,
            _ => 4,
        };
        let address = (x >> 4) & 0x00ff_ffff;
        out.push_str(&format!("{code} 0x{address:x}\n"));
    }
    out
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let trace = synthetic_trace(RECORDS);
    let mut group = c.benchmark_group("replay");
    group.throughput(Throughput::Elements(RECORDS as u64));
    group.bench_function("synthetic", |bench| {
        bench.iter(|| {
            let mut simulator = Simulator::new(&CacheConfig::default(), Mode::Silent);
            simulator.replay(Cursor::new(trace.as_bytes())).unwrap();
        });
    });
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = criterion_benchmark
);
criterion_main!(benches);
