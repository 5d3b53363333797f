// Allow our dollar.cents digit grouping convention (e.g., 100_00 = $100.00)
#![allow(clippy::inconsistent_digit_grouping)]

//! Stop order benchmarks: triggers and cascades.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tradesim::session::matching::SecurityEngine;
use tradesim::{Price, SessionId, Side, Symbol, TimeInForce, UserId};

const TRADER: UserId = UserId(1);

fn new_engine() -> SecurityEngine {
    let mut engine = SecurityEngine::new(Symbol::new("AOE"), SessionId::new());
    engine.open_market();
    engine
}

fn bench_stop_trigger(c: &mut Criterion) {
    let mut group = c.benchmark_group("stop_trigger");

    for cascade_depth in [1, 10, 50] {
        group.throughput(Throughput::Elements(cascade_depth as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(cascade_depth),
            &cascade_depth,
            |b, &depth| {
                b.iter_batched(
                    || {
                        let mut engine = new_engine();
                        // Build book levels for the triggered stops to execute against
                        for i in 0..depth {
                            let _ = engine.submit_limit(
                                TRADER,
                                Side::Sell,
                                Price(100_00 + (i as i64 + 1) * 10),
                                100,
                                TimeInForce::GTC,
                            );
                        }
                        // Add cascading stop orders
                        for i in 0..depth {
                            let trigger_price = Price(100_00 + (i as i64) * 10);
                            let _ = engine.submit_stop(
                                Side::Buy,
                                trigger_price,
                                None,
                                100,
                                TimeInForce::GTC,
                                TRADER,
                            );
                        }
                        // A resting ask at 100.00 to trigger the first stop
                        let _ = engine.submit_limit(TRADER, Side::Sell, Price(100_00), 100, TimeInForce::GTC);
                        engine
                    },
                    |mut engine| {
                        // This buy order produces a trade at 100.00, triggering the first stop,
                        // which trades at 100.10, triggering the second stop, and so on.
                        black_box(engine.submit_limit(TRADER, Side::Buy, Price(100_00), 100, TimeInForce::GTC))
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

fn bench_pending_stop_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("pending_stop_count");

    for num_stops in [10, 100, 1000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_stops),
            &num_stops,
            |b, &num_stops| {
                let mut engine = new_engine();
                for i in 0..num_stops {
                    let trigger_price = Price(90_00 - (i as i64) * 10);
                    let _ = engine.submit_stop(Side::Sell, trigger_price, None, 100, TimeInForce::GTC, TRADER);
                }

                b.iter(|| black_box(engine.pending_stop_count()));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_stop_trigger, bench_pending_stop_count);
criterion_main!(benches);
