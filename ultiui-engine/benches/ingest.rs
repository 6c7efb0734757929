use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::thread;
use std::time::Duration;
use ultiui_engine::{signature, LogIngestor, Timestamp};

const LINES: [&str; 4] = [
    "PrintCore 1 extruded 12.5 mm in 3.25 s, remaining length = 4000 mm",
    "job 1b4e28ba-2fa1-11d2-883f-0016d3cca427 from 192.168.6.218 at 10:22:01",
    "PrinterService[1234]:WAR - Hotend 0 not detected",
    "Nozzle temp 215C",
];

/// Benchmark signature extraction on typical printer lines
fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    for (i, line) in LINES.iter().enumerate() {
        group.bench_with_input(BenchmarkId::from_parameter(i), line, |b, line| {
            b.iter(|| signature::extract(black_box(line)));
        });
    }
    group.finish();
}

/// Benchmark ingest of a line that always merges (hot path)
fn bench_ingest_duplicate(c: &mut Criterion) {
    let ingestor = LogIngestor::default();
    c.bench_function("ingest_duplicate", |b| {
        b.iter(|| ingestor.ingest(black_box("Nozzle temp 215C"), black_box(Timestamp::EPOCH)));
    });
}

/// Benchmark ingest of distinct signatures into a full buffer (evicts every call)
fn bench_ingest_with_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_with_eviction");

    for capacity in [100usize, 1000, 10_000].iter() {
        let ingestor = LogIngestor::new(*capacity, Duration::from_secs(60)).unwrap();
        let lines: Vec<String> = (0..capacity * 2).map(|i| format!("sensor-{} offline", letters(i))).collect();
        let mut n = 0i64;

        group.bench_with_input(BenchmarkId::from_parameter(capacity), capacity, |b, _| {
            b.iter(|| {
                n += 1;
                let line = &lines[n as usize % lines.len()];
                ingestor.ingest(black_box(line), Timestamp::from_secs(n * 120));
            });
        });
    }
    group.finish();
}

/// Benchmark concurrent ingest with varying thread counts
fn bench_concurrent_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_ingest");

    for thread_count in [1, 2, 4, 8].iter() {
        group.throughput(Throughput::Elements(*thread_count as u64 * 1000));
        group.bench_with_input(
            BenchmarkId::new("threads", thread_count),
            thread_count,
            |b, &thread_count| {
                b.iter(|| {
                    let ingestor = LogIngestor::default();
                    let workers: Vec<_> = (0..thread_count)
                        .map(|t| {
                            let ingestor = ingestor.clone();
                            thread::spawn(move || {
                                for i in 0..1000 {
                                    let line = LINES[(t + i) % LINES.len()];
                                    ingestor.ingest(black_box(line), Timestamp::from_millis(i as i64));
                                }
                            })
                        })
                        .collect();
                    for worker in workers {
                        worker.join().unwrap();
                    }
                });
            },
        );
    }
    group.finish();
}

/// Digit-free label so every line gets its own signature.
fn letters(mut i: usize) -> String {
    let mut out = String::new();
    loop {
        out.push((b'a' + (i % 26) as u8) as char);
        i /= 26;
        if i == 0 {
            return out;
        }
    }
}

criterion_group!(
    benches,
    bench_extract,
    bench_ingest_duplicate,
    bench_ingest_with_eviction,
    bench_concurrent_ingest
);
criterion_main!(benches);
