//! Criterion benchmarks for the portfolio allocator.
//!
//! Run with: `cargo bench -p swinglab-runner`
//!
//! Measures cohort grouping, causal scoring and greedy admission over
//! synthetic candidate sets of increasing size.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use swinglab_core::domain::{ExitReason, Outcome, SimulatedTrade};
use swinglab_runner::{
    Allocator, Candidate, PortfolioConfig, RankBy, RankingConfig, TradeStats,
};

const SYMBOLS: [&str; 8] = ["SPY", "QQQ", "IWM", "DIA", "XLF", "XLE", "XLK", "TLT"];
const SETUPS: [&str; 3] = ["PrevDayBreakout_D1", "TwoDayBreakout_D1", "MeanReversion_D1"];

/// Deterministic candidate set spread over trading days.
fn generate_candidates(count: usize) -> Vec<Candidate> {
    let origin = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..count)
        .map(|i| {
            let entry = origin + Duration::days((i / 6) as i64);
            let r = ((i * 37) % 31) as f64 / 10.0 - 1.0;
            let entry_price = 50.0 + (i % 150) as f64;
            let stop_price = entry_price * 0.97;
            let risk = entry_price - stop_price;
            let trade = SimulatedTrade {
                symbol: SYMBOLS[i % SYMBOLS.len()].to_string(),
                setup_name: SETUPS[(i / SYMBOLS.len()) % SETUPS.len()].to_string(),
                signal_ts: entry - Duration::days(1),
                entry_ts: entry,
                entry_price,
                stop_price,
                target_price: entry_price + 2.0 * risk,
                exit_ts: entry + Duration::days(1 + (i % 5) as i64),
                exit_price: entry_price + r * risk,
                exit_reason: ExitReason::time_stop(r),
                r_multiple: r,
                outcome: Outcome::from_r(r),
            };
            Candidate::new(trade, 10.0)
        })
        .collect()
}

fn allocator(rank_by: RankBy) -> Allocator {
    let portfolio = PortfolioConfig {
        max_open_positions: 5,
        max_capital_usd: 10_000.0,
        max_total_open_risk_usd: 400.0,
    };
    let ranking = RankingConfig {
        rank_by,
        ..RankingConfig::default()
    };
    Allocator::new(portfolio, ranking).unwrap()
}

/// Benchmark full allocation per ranking mode
fn bench_allocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate");

    for rank_by in [RankBy::Unranked, RankBy::TrailingAvgR, RankBy::TrailingBlendedAvgR] {
        let allocator = allocator(rank_by);
        for size in [100, 1_000, 10_000].iter() {
            let candidates = generate_candidates(*size);
            group.bench_with_input(
                BenchmarkId::new(rank_by.to_string(), size),
                size,
                |b, _| {
                    b.iter(|| {
                        let _ = allocator.allocate(black_box(candidates.clone()));
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark summary statistics over candidate trades
fn bench_trade_stats(c: &mut Criterion) {
    let candidates = generate_candidates(10_000);
    c.bench_function("trade_stats_10k", |b| {
        b.iter(|| TradeStats::compute_iter(black_box(candidates.iter().map(|c| &c.trade))));
    });
}

criterion_group!(benches, bench_allocate, bench_trade_stats);
criterion_main!(benches);
