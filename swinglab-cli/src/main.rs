//! swinglab CLI: backtests, portfolio allocation and the hot-only gate.
//!
//! Commands:
//! - `backtest`: one symbol/setup over a date range, trades to CSV
//! - `summary`: yearly/monthly rollup of a trades CSV
//! - `batch`: symbols × setups × recent-day windows
//! - `portfolio`: candidates across symbols × setups, allocated under caps
//! - `assess`: hot-only assessment for one pair, state file + markdown report
//! - `gate`: entry-gate check for one pair
//!
//! Bars come from a CSV directory by default, or `--synthetic` / `--alpaca`.

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use swinglab_core::data::{
    AlpacaBarSource, AlpacaCredentials, BarSource, CsvBarSource, SyntheticBarSource,
};
use swinglab_core::domain::{Signal, SimulatedTrade};
use swinglab_core::SetupRegistry;
use swinglab_runner::reporting::{
    backtest_summary, batch_summary, portfolio_summary, rollup_summary, write_manifest,
    AssessmentReportGenerator, PortfolioManifest,
};
use swinglab_runner::{
    evaluate_entry_gate, run_assessment, run_backtest, run_batch, run_portfolio, BacktestRequest,
    CsvRowStore, EngineConfig, EntryGateOutcome, ExecutedRow, HotOnlyState, HotOnlyTable,
    JournalRow, RowStore, SkipRow, TradeRollup, TradeStats,
};

#[derive(Parser)]
#[command(
    name = "swinglab",
    about = "swinglab: daily swing-setup backtests, portfolio allocation, hot-only gate"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Engine config TOML. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of `<SYMBOL>.csv` bar files.
    #[arg(long, global = true, default_value = "data/bars")]
    data_dir: PathBuf,

    /// Use seeded synthetic bars instead of CSV files.
    #[arg(long, global = true, default_value_t = false)]
    synthetic: bool,

    /// Seed for --synthetic.
    #[arg(long, global = true, default_value_t = 42)]
    seed: u64,

    /// Fetch bars from Alpaca (APCA_API_KEY_ID / APCA_API_SECRET_KEY).
    #[arg(long, global = true, default_value_t = false)]
    alpaca: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest one symbol and setup over a date range.
    Backtest {
        #[arg(long)]
        symbol: String,

        #[arg(long, default_value = "PrevDayBreakout_D1")]
        setup: String,

        /// Start date (YYYY-MM-DD). Defaults to two years before --end.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Keep only the last N trading days.
        #[arg(long)]
        recent_days: Option<usize>,

        /// Trades CSV output.
        #[arg(long, default_value = "results/trades.csv")]
        out: PathBuf,
    },
    /// Yearly and monthly rollup of a trades CSV.
    Summary {
        /// Trades CSV written by `backtest`.
        trades: PathBuf,
    },
    /// Backtest symbols × setups × windows.
    Batch {
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        symbols: Vec<String>,

        /// Setup names. Defaults to the configured setups.
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        setups: Vec<String>,

        /// Recent-day windows.
        #[arg(long, num_args = 1.., value_delimiter = ',', default_values_t = [30, 90, 180])]
        windows: Vec<usize>,

        #[arg(long)]
        end: Option<String>,
    },
    /// Allocate candidates across symbols × configured setups.
    Portfolio {
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        symbols: Vec<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        /// Directory for executed.csv, skipped.csv, signals.csv and manifest.json.
        #[arg(long, default_value = "results/portfolio")]
        out_dir: PathBuf,
    },
    /// Hot-only assessment for one symbol and setup.
    Assess {
        #[arg(long)]
        symbol: String,

        #[arg(long, default_value = "PrevDayBreakout_D1")]
        setup: String,

        #[arg(long)]
        end: Option<String>,

        /// Realized trade journal CSV.
        #[arg(long, default_value = "data/trade_journal.csv")]
        journal: PathBuf,

        /// Markdown report output.
        #[arg(long, default_value = "results/hot_only_report.md")]
        report: PathBuf,
    },
    /// Entry-gate check for one symbol and setup.
    Gate {
        #[arg(long)]
        symbol: String,

        #[arg(long, default_value = "PrevDayBreakout_D1")]
        setup: String,

        #[arg(long)]
        end: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = load_config(cli.global.config.as_deref())?;
    let source = bar_source(&cli.global)?;
    let registry = SetupRegistry::with_defaults();
    log::debug!("bar source: {}", source.name());

    match cli.command {
        Commands::Backtest {
            symbol,
            setup,
            start,
            end,
            recent_days,
            out,
        } => run_backtest_cmd(
            source.as_ref(),
            &config,
            &registry,
            &symbol,
            &setup,
            start,
            end,
            recent_days,
            &out,
        ),
        Commands::Summary { trades } => run_summary_cmd(&trades),
        Commands::Batch {
            symbols,
            setups,
            windows,
            end,
        } => {
            let setups = if setups.is_empty() {
                config.simulation.setups.clone()
            } else {
                setups
            };
            let end = parse_date_or_today(end.as_deref())?;
            let results = run_batch(
                source.as_ref(),
                &symbols,
                &setups,
                &windows,
                end,
                &config,
                &registry,
            )?;
            print!("{}", batch_summary(&results));
            Ok(())
        }
        Commands::Portfolio {
            symbols,
            start,
            end,
            out_dir,
        } => run_portfolio_cmd(source.as_ref(), &config, &registry, &symbols, start, end, &out_dir),
        Commands::Assess {
            symbol,
            setup,
            end,
            journal,
            report,
        } => run_assess_cmd(
            source.as_ref(),
            &config,
            &registry,
            &symbol,
            &setup,
            end,
            &journal,
            &report,
        ),
        Commands::Gate { symbol, setup, end } => {
            let end = parse_date_or_today(end.as_deref())?;
            let (outcome, result) =
                evaluate_entry_gate(source.as_ref(), &symbol, &setup, end, &config, &registry)?;
            if let Some(result) = &result {
                print!("{}", backtest_summary(result));
            }
            println!("entry gate: {}", gate_verdict(outcome)?);
            Ok(())
        }
    }
}

// ─── Setup ───────────────────────────────────────────────────────────

/// Label for an allowed entry; a blocked one is an error.
fn gate_verdict(outcome: EntryGateOutcome) -> Result<&'static str> {
    match outcome {
        EntryGateOutcome::Disabled => Ok("disabled"),
        EntryGateOutcome::Passed => Ok("passed"),
        EntryGateOutcome::Failed(reason) => bail!("entry gate blocked: {reason}"),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn bar_source(global: &GlobalArgs) -> Result<Box<dyn BarSource>> {
    if global.alpaca && global.synthetic {
        bail!("--alpaca and --synthetic are mutually exclusive");
    }
    if global.alpaca {
        let key_id = std::env::var("APCA_API_KEY_ID").context("APCA_API_KEY_ID is not set")?;
        let secret_key =
            std::env::var("APCA_API_SECRET_KEY").context("APCA_API_SECRET_KEY is not set")?;
        let source = AlpacaBarSource::new(AlpacaCredentials { key_id, secret_key })?;
        return Ok(Box::new(source));
    }
    if global.synthetic {
        return Ok(Box::new(SyntheticBarSource::new(global.seed)));
    }
    Ok(Box::new(CsvBarSource::new(&global.data_dir)))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn parse_date_or_today(s: Option<&str>) -> Result<NaiveDate> {
    match s {
        Some(s) => parse_date(s),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn date_range(start: Option<String>, end: Option<String>) -> Result<(NaiveDate, NaiveDate)> {
    let end = parse_date_or_today(end.as_deref())?;
    let start = match start.as_deref() {
        Some(s) => parse_date(s)?,
        None => end - chrono::Duration::days(365 * 2),
    };
    if start > end {
        bail!("start {start} is after end {end}");
    }
    Ok((start, end))
}

// ─── Commands ────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn run_backtest_cmd(
    source: &dyn BarSource,
    config: &EngineConfig,
    registry: &SetupRegistry,
    symbol: &str,
    setup: &str,
    start: Option<String>,
    end: Option<String>,
    recent_days: Option<usize>,
    out: &Path,
) -> Result<()> {
    let (start, end) = date_range(start, end)?;
    let mut request = BacktestRequest::new(symbol, setup, start, end);
    request.recent_days = recent_days;
    let result = run_backtest(source, &request, config, registry)?;

    print!("{}", backtest_summary(&result));
    let mut store: CsvRowStore<SimulatedTrade> = CsvRowStore::new(out);
    store.replace_all(&result.trades)?;
    println!("Trades saved to: {}", out.display());
    Ok(())
}

fn run_summary_cmd(trades_path: &Path) -> Result<()> {
    if !trades_path.exists() {
        bail!("trades file not found: {}", trades_path.display());
    }
    let store: CsvRowStore<SimulatedTrade> = CsvRowStore::new(trades_path);
    let trades = store.load_all()?;
    let stats = TradeStats::compute(&trades);
    let rollup = TradeRollup::compute(&trades);
    print!("{}", rollup_summary(&stats, &rollup));
    Ok(())
}

fn run_portfolio_cmd(
    source: &dyn BarSource,
    config: &EngineConfig,
    registry: &SetupRegistry,
    symbols: &[String],
    start: Option<String>,
    end: Option<String>,
    out_dir: &Path,
) -> Result<()> {
    let (start, end) = date_range(start, end)?;
    let run = run_portfolio(source, symbols, start, end, config, registry)?;
    print!("{}", portfolio_summary(&run));

    let executed: Vec<ExecutedRow> = run.allocation.executed.iter().map(ExecutedRow::from).collect();
    let skipped: Vec<SkipRow> = run.allocation.skipped.iter().map(SkipRow::from).collect();
    CsvRowStore::<ExecutedRow>::new(out_dir.join("executed.csv")).replace_all(&executed)?;
    CsvRowStore::<SkipRow>::new(out_dir.join("skipped.csv")).replace_all(&skipped)?;
    CsvRowStore::<Signal>::new(out_dir.join("signals.csv")).replace_all(&run.signals)?;
    let manifest = PortfolioManifest::new(&run, symbols, start, end, config, Utc::now());
    write_manifest(&out_dir.join("manifest.json"), &manifest)?;
    println!("Portfolio records saved to: {}", out_dir.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_assess_cmd(
    source: &dyn BarSource,
    config: &EngineConfig,
    registry: &SetupRegistry,
    symbol: &str,
    setup: &str,
    end: Option<String>,
    journal_path: &Path,
    report_path: &Path,
) -> Result<()> {
    let end = parse_date_or_today(end.as_deref())?;
    let journal = CsvRowStore::<JournalRow>::new(journal_path).load_all()?;
    if journal.is_empty() {
        log::warn!("journal {} is empty or missing", journal_path.display());
    }

    let state_path = config.hot_only.state_path.clone();
    let mut state_store: CsvRowStore<HotOnlyState> = CsvRowStore::new(&state_path);
    let mut table = HotOnlyTable::load(&state_store)?;
    let run = run_assessment(
        source,
        symbol,
        setup,
        end,
        config,
        registry,
        &journal,
        &mut table,
        Utc::now(),
    )?;
    table.save(&mut state_store)?;

    let report = AssessmentReportGenerator.generate(&run, &config.hot_only, &state_path);
    if let Some(dir) = report_path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
    }
    std::fs::write(report_path, &report)
        .with_context(|| format!("writing {}", report_path.display()))?;

    print!("{report}");
    println!("Report saved to: {}", report_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_gate_is_an_error() {
        assert_eq!(gate_verdict(EntryGateOutcome::Passed).unwrap(), "passed");
        assert_eq!(gate_verdict(EntryGateOutcome::Disabled).unwrap(), "disabled");
        let err = gate_verdict(EntryGateOutcome::Failed("trades 3 < 15".into())).unwrap_err();
        assert_eq!(err.to_string(), "entry gate blocked: trades 3 < 15");
    }
}
