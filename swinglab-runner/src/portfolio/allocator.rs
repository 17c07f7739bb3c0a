//! Greedy constrained allocator.
//!
//! Candidates are grouped into cohorts by entry date and processed in date
//! order. Within a cohort, candidates are ranked by causal trailing score and
//! admitted one at a time while the open-slot, capital and risk caps allow.
//! Admissions update the open book immediately, so later candidates in the
//! same cohort see the reduced availability. Processing order is part of the
//! result: the same input always yields the same decisions.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::candidate::{ActivePosition, BookSnapshot, Candidate, ExecutedTrade, SkipReason, SkipRecord};
use super::scoring::TrailingScorer;
use crate::config::{ConfigError, PortfolioConfig, RankingConfig};
use crate::metrics::TradeStats;

/// Result of one allocation pass.
#[derive(Debug, Clone, Default)]
pub struct Allocation {
    pub executed: Vec<ExecutedTrade>,
    pub skipped: Vec<SkipRecord>,
    pub summary: AllocationSummary,
}

/// Constrained (executed) versus unconstrained (every candidate) performance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub total_candidates: usize,
    pub executed_count: usize,
    pub skipped_count: usize,
    pub cohort_count: usize,
    pub fill_rate: f64,
    pub skip_reasons: BTreeMap<String, usize>,
    pub constrained: TradeStats,
    pub unconstrained: TradeStats,
}

/// Running open book: positions plus their summed footprint.
#[derive(Debug, Default)]
struct Book {
    positions: Vec<ActivePosition>,
    exposure_usd: f64,
    risk_usd: f64,
}

impl Book {
    /// Drop positions whose exit date is on or before `as_of`.
    fn prune(&mut self, as_of: chrono::NaiveDate) {
        self.positions.retain(|p| p.exit_ts > as_of);
        self.exposure_usd = self.positions.iter().map(|p| p.entry_notional_usd).sum();
        self.risk_usd = self.positions.iter().map(|p| p.risk_to_stop_usd).sum();
    }

    fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            open_slots: self.positions.len(),
            open_exposure_usd: self.exposure_usd,
            open_risk_usd: self.risk_usd,
        }
    }

    fn admit(&mut self, candidate: &Candidate) {
        self.positions.push(ActivePosition::from(candidate));
        self.exposure_usd += candidate.entry_notional_usd;
        self.risk_usd += candidate.risk_to_stop_usd;
    }
}

#[derive(Debug, Clone)]
pub struct Allocator {
    portfolio: PortfolioConfig,
    ranking: RankingConfig,
}

impl Allocator {
    pub fn new(portfolio: PortfolioConfig, ranking: RankingConfig) -> Result<Self, ConfigError> {
        ranking.validate()?;
        Ok(Self { portfolio, ranking })
    }

    pub fn portfolio(&self) -> &PortfolioConfig {
        &self.portfolio
    }

    pub fn ranking(&self) -> &RankingConfig {
        &self.ranking
    }

    /// Allocate over `candidates`. Scoring history is the full candidate set,
    /// filtered per candidate to trades that exited before its entry.
    pub fn allocate(&self, candidates: Vec<Candidate>) -> Allocation {
        let scorer = TrailingScorer::new(candidates.iter().map(|c| &c.trade), &self.ranking);
        let unconstrained = TradeStats::compute_iter(candidates.iter().map(|c| &c.trade));
        let total_candidates = candidates.len();

        let mut cohorts: BTreeMap<chrono::NaiveDate, Vec<Candidate>> = BTreeMap::new();
        for candidate in candidates {
            cohorts.entry(candidate.entry_ts()).or_default().push(candidate);
        }
        let cohort_count = cohorts.len();

        let mut book = Book::default();
        let mut executed = Vec::new();
        let mut skipped = Vec::new();

        for (entry_ts, cohort) in cohorts {
            book.prune(entry_ts);

            let mut ranked: Vec<(f64, Candidate)> =
                cohort.into_iter().map(|c| (scorer.score(&c), c)).collect();
            ranked.sort_by(|a, b| cohort_order(a, b));

            let (before_exec, before_skip) = (executed.len(), skipped.len());
            for (score, candidate) in ranked {
                match self.check(&book, score, &candidate) {
                    Some(skip_reason) => skipped.push(SkipRecord {
                        candidate,
                        score,
                        skip_reason,
                        snapshot: book.snapshot(),
                    }),
                    None => {
                        book.admit(&candidate);
                        executed.push(ExecutedTrade { candidate, score });
                    }
                }
            }

            log::debug!(
                "cohort {entry_ts}: admitted {} skipped {} open={} exposure={:.2} risk={:.2}",
                executed.len() - before_exec,
                skipped.len() - before_skip,
                book.positions.len(),
                book.exposure_usd,
                book.risk_usd,
            );
        }

        let mut skip_reasons = BTreeMap::new();
        for s in &skipped {
            *skip_reasons.entry(s.skip_reason.to_string()).or_insert(0) += 1;
        }
        let constrained = TradeStats::compute_iter(executed.iter().map(|e| &e.candidate.trade));
        let summary = AllocationSummary {
            total_candidates,
            executed_count: executed.len(),
            skipped_count: skipped.len(),
            cohort_count,
            fill_rate: if total_candidates == 0 {
                0.0
            } else {
                executed.len() as f64 / total_candidates as f64
            },
            skip_reasons,
            constrained,
            unconstrained,
        };

        Allocation {
            executed,
            skipped,
            summary,
        }
    }

    /// First failing constraint, in fixed order: rank floor, slot, capital, risk.
    fn check(&self, book: &Book, score: f64, candidate: &Candidate) -> Option<SkipReason> {
        let p = &self.portfolio;
        let floor = self.ranking.min_rank_score;
        let slot_cap = p.slot_cap();
        if slot_cap.is_some() && floor > 0.0 && score < floor {
            return Some(SkipReason::BelowMinRankScore);
        }
        if slot_cap.is_some_and(|cap| book.positions.len() >= cap) {
            return Some(SkipReason::NoSlot);
        }
        if p.max_capital_usd > 0.0
            && book.exposure_usd + candidate.entry_notional_usd > p.max_capital_usd
        {
            return Some(SkipReason::CapitalCap);
        }
        if p.max_total_open_risk_usd > 0.0
            && book.risk_usd + candidate.risk_to_stop_usd > p.max_total_open_risk_usd
        {
            return Some(SkipReason::RiskCap);
        }
        None
    }
}

/// Score descending, then symbol, setup name and signal ID ascending.
fn cohort_order(a: &(f64, Candidate), b: &(f64, Candidate)) -> Ordering {
    b.0.total_cmp(&a.0)
        .then_with(|| a.1.trade.symbol.cmp(&b.1.trade.symbol))
        .then_with(|| a.1.trade.setup_name.cmp(&b.1.trade.setup_name))
        .then_with(|| a.1.signal_id.cmp(&b.1.signal_id))
}
