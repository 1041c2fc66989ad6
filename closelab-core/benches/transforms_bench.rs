//! Criterion benchmarks for the four transforms.
//!
//! Benchmarks:
//! 1. Change calculator over a multi-symbol daily series
//! 2. Ranking sort of the extended records
//! 3. Per-symbol risk statistics
//! 4. Bounded top-K selection at several ceilings

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use closelab_core::changes::compute_changes;
use closelab_core::domain::{ExtendedRecord, Record};
use closelab_core::ranking::sort_by_date_and_change;
use closelab_core::stats::compute_symbol_statistics;
use closelab_core::topk::{select_top_k, MemoryBudget};

// ── Helpers ──────────────────────────────────────────────────────────

const SYMBOLS: [&str; 8] = ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF", "GGG", "HHH"];

fn make_records(days: usize) -> Vec<Record> {
    let mut out = Vec::with_capacity(days * SYMBOLS.len());
    for day in 0..days {
        let date = format!("2020-{:02}-{:02}", day / 28 % 12 + 1, day % 28 + 1);
        for (i, sym) in SYMBOLS.iter().enumerate() {
            let close = 100.0 + ((day + i * 7) as f64 * 0.1).sin() * 10.0;
            out.push(Record::new(date.clone(), *sym, close));
        }
    }
    out
}

fn make_extended(days: usize) -> Vec<ExtendedRecord> {
    compute_changes(make_records(days))
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_changes(c: &mut Criterion) {
    let mut group = c.benchmark_group("changes");
    for days in [250, 2500] {
        let records = make_records(days);
        group.bench_with_input(BenchmarkId::from_parameter(days), &records, |b, records| {
            b.iter(|| compute_changes(black_box(records.clone())))
        });
    }
    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let records = make_extended(2500);
    c.bench_function("ranking_sort_20k", |b| {
        b.iter(|| {
            let mut sorted = records.clone();
            sort_by_date_and_change(black_box(&mut sorted));
            sorted
        })
    });
}

fn bench_stats(c: &mut Criterion) {
    let records = make_extended(2500);
    c.bench_function("symbol_stats_20k", |b| {
        b.iter(|| compute_symbol_statistics(black_box(&records)))
    });
}

fn bench_top_k(c: &mut Criterion) {
    let records = make_extended(2500);
    let mut group = c.benchmark_group("top_k");
    for ceiling_kib in [64usize, 1024, 10 * 1024] {
        let budget = MemoryBudget::new(ceiling_kib * 1024);
        group.bench_with_input(
            BenchmarkId::from_parameter(ceiling_kib),
            &budget,
            |b, &budget| b.iter(|| select_top_k(black_box(records.clone()), 10, budget)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_changes, bench_ranking, bench_stats, bench_top_k);
criterion_main!(benches);
