//! Performance benchmarks for telegram encoding.
//!
//! These benchmarks measure payload packing and the cost of walking a full
//! telegram through a recording sink, so regressions in the per-symbol loop
//! show up without real delays.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench telegram_bench
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use kaku_core::CommandWord;
use kaku_hardware::mock::RecordingSink;
use kaku_protocol::{PackedSymbols, Telegram, Transmitter};
use std::hint::black_box;

/// Benchmark packing a payload into base-4 slots.
fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack");
    group.throughput(Throughput::Elements(1));

    group.bench_function("pack_payload", |b| {
        b.iter(|| PackedSymbols::pack(black_box(0xABCDE)));
    });

    group.finish();
}

/// Benchmark transmitting into a recording sink for several repeat counts.
fn bench_transmit(c: &mut Criterion) {
    let mut group = c.benchmark_group("transmit");
    let transmitter = Transmitter::default();

    for exponent in [0u32, 3, 7] {
        let command = CommandWord::new((350 << 23) | (exponent << 20) | 0x12345);
        let transitions = Telegram::new(command).transition_count();
        group.throughput(Throughput::Elements(transitions as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(1u32 << exponent),
            &command,
            |b, command| {
                b.iter(|| {
                    let mut sink = RecordingSink::new();
                    transmitter.transmit(black_box(*command), &mut sink);
                    black_box(sink);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_pack, bench_transmit);
criterion_main!(benches);
