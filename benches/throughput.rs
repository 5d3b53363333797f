// Allow our dollar.cents digit grouping convention (e.g., 100_00 = $100.00)
#![allow(clippy::inconsistent_digit_grouping)]

//! Throughput benchmarks for the per-security matching engine.
//!
//! Measures performance of core operations:
//! - Order submission (with and without matching)
//! - Order cancellation
//! - Market order execution
//! - Book queries (BBO, depth)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tradesim::session::matching::SecurityEngine;
use tradesim::{OrderId, Price, SessionId, Side, Symbol, TimeInForce, UserId};

const TRADER: UserId = UserId(1);

fn new_engine() -> SecurityEngine {
    let mut engine = SecurityEngine::new(Symbol::new("AOE"), SessionId::new());
    engine.open_market();
    engine
}

/// Build an engine with N price levels on each side.
fn build_book(levels: usize, orders_per_level: usize) -> SecurityEngine {
    let mut engine = new_engine();

    // Add bid levels: 99.00, 98.00, 97.00, ...
    for i in 0..levels {
        let price = Price(99_00 - (i as i64) * 100);
        for _ in 0..orders_per_level {
            let _ = engine.submit_limit(TRADER, Side::Buy, price, 100, TimeInForce::GTC);
        }
    }

    // Add ask levels: 101.00, 102.00, 103.00, ...
    for i in 0..levels {
        let price = Price(101_00 + (i as i64) * 100);
        for _ in 0..orders_per_level {
            let _ = engine.submit_limit(TRADER, Side::Sell, price, 100, TimeInForce::GTC);
        }
    }

    engine
}

/// Benchmark: Submit limit order (no match, rests on book)
fn bench_submit_no_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_no_match");

    for levels in [10, 100, 1000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(levels),
            &levels,
            |b, &levels| {
                let mut engine = build_book(levels, 1);
                let mut price_offset = 0i64;

                b.iter(|| {
                    let price = Price(50_00 - price_offset);
                    price_offset = (price_offset + 1) % 1000;
                    black_box(engine.submit_limit(TRADER, Side::Buy, price, 100, TimeInForce::GTC))
                });
            },
        );
    }

    group.finish();
}

/// Benchmark: Submit limit order that fully matches
fn bench_submit_with_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_with_match");
    group.throughput(Throughput::Elements(1));

    group.bench_function("single_fill", |b| {
        b.iter_batched(
            || {
                let mut engine = new_engine();
                let _ = engine.submit_limit(TRADER, Side::Sell, Price(100_00), 100, TimeInForce::GTC);
                engine
            },
            |mut engine| {
                black_box(engine.submit_limit(TRADER, Side::Buy, Price(100_00), 100, TimeInForce::GTC))
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Benchmark: Cancel order
fn bench_cancel(c: &mut Criterion) {
    let mut group = c.benchmark_group("cancel");

    for num_orders in [100, 1000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("deep", num_orders),
            &num_orders,
            |b, &num_orders| {
                b.iter_batched(
                    || {
                        let mut engine = new_engine();
                        let price = Price(100_00);
                        for _ in 0..num_orders {
                            let _ = engine.submit_limit(TRADER, Side::Buy, price, 100, TimeInForce::GTC);
                        }
                        let order_id = OrderId(num_orders as u64 / 2);
                        (engine, order_id)
                    },
                    |(mut engine, order_id): (SecurityEngine, OrderId)| black_box(engine.cancel(order_id)),
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark: Market order sweeping multiple levels
fn bench_market_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("market_sweep");

    for levels_to_sweep in [1, 5, 10] {
        group.throughput(Throughput::Elements(levels_to_sweep as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(levels_to_sweep),
            &levels_to_sweep,
            |b, &levels| {
                b.iter_batched(
                    || build_book(20, 1),
                    |mut engine| {
                        let qty = levels as u64 * 100;
                        black_box(engine.submit_market(TRADER, Side::Buy, qty))
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark: Best bid/ask query (O(1) operation)
fn bench_bbo_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("bbo_query");

    for levels in [10, 100, 1000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(levels),
            &levels,
            |b, &levels| {
                let engine = build_book(levels, 10);

                b.iter(|| black_box(engine.best_bid_ask()));
            },
        );
    }

    group.finish();
}

/// Benchmark: Depth snapshot generation
fn bench_depth_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("depth_snapshot");

    let engine = build_book(100, 10);

    for depth in [5, 10, 20] {
        group.throughput(Throughput::Elements(depth as u64 * 2)); // Both sides
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| black_box(engine.depth(depth)));
        });
    }

    group.finish();
}

/// Benchmark: Modify order (cancel-replace)
fn bench_modify(c: &mut Criterion) {
    let mut group = c.benchmark_group("modify");
    group.throughput(Throughput::Elements(1));

    for levels in [10, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(levels),
            &levels,
            |b, &levels| {
                b.iter_batched(
                    || {
                        let mut engine = build_book(levels, 1);
                        let order_id = engine
                            .submit_limit(TRADER, Side::Buy, Price(99_00), 100, TimeInForce::GTC)
                            .unwrap()
                            .order_id;
                        (engine, order_id)
                    },
                    |(mut engine, order_id)| {
                        black_box(engine.modify(TRADER, order_id, Price(98_50), 150))
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

/// Benchmark: multiple securities, one engine each, round-robin submission
fn bench_multi_symbol(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_symbol");

    for num_symbols in [10, 100, 1000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_symbols),
            &num_symbols,
            |b, &num_symbols| {
                let session_id = SessionId::new();
                let mut engines: Vec<SecurityEngine> = (0..num_symbols)
                    .map(|i| {
                        let mut e = SecurityEngine::new(Symbol::new(&format!("S{:05}", i)), session_id);
                        e.open_market();
                        e
                    })
                    .collect();

                let mut i = 0;
                b.iter(|| {
                    let engine = &mut engines[i % num_symbols];
                    i += 1;
                    black_box(engine.submit_limit(TRADER, Side::Buy, Price(100_00), 100, TimeInForce::GTC))
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_submit_no_match,
    bench_submit_with_match,
    bench_cancel,
    bench_modify,
    bench_market_sweep,
    bench_bbo_query,
    bench_depth_snapshot,
    bench_multi_symbol,
);

criterion_main!(benches);
