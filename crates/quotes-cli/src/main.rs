//! `quotes` command-line front end.
//!
//! Commands:
//! - `fetch` - fetch a time series (through the cache) and print a summary
//! - `cache stats` - report entry counts and size
//! - `cache purge` - remove expired entries, or all of them with `--all`

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use quotes::{Dataset, Interval, OutputSize, QuoteCache, QuotesConfig, TimeSeriesFunction};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_LEVEL: &str = "info";
const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Parser)]
#[command(name = "quotes", version, about = "Cached Alpha Vantage stock time series")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch a time series and print a summary.
    Fetch {
        /// Ticker symbol (e.g. AAPL).
        symbol: String,

        /// Time series function: daily, daily-adjusted, weekly, weekly-adjusted,
        /// monthly, monthly-adjusted or intraday.
        #[arg(long, default_value = "daily")]
        function: TimeSeriesFunction,

        /// Bar size for intraday: 1min, 5min, 15min, 30min or 60min.
        #[arg(long)]
        interval: Option<Interval>,

        /// compact (latest 100 points) or full.
        #[arg(long, default_value = "full")]
        output_size: OutputSize,

        /// Keep rows on or after this date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Keep rows on or before this date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Bypass the cache entirely.
        #[arg(long, default_value_t = false)]
        no_cache: bool,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Subcommand)]
enum CacheAction {
    /// Report entry counts, size and location.
    Stats,
    /// Remove expired entries.
    Purge {
        /// Remove every entry, fresh or not.
        #[arg(long, default_value_t = false)]
        all: bool,
    },
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging(DEFAULT_LOG_LEVEL);
    let cli = Cli::parse();
    let config = QuotesConfig::from_env().context("invalid configuration")?;

    match cli.command {
        Commands::Fetch {
            symbol,
            function,
            interval,
            output_size,
            start,
            end,
            no_cache,
        } => {
            let client = config.with_cache_enabled(!no_cache).build_client()?;
            let data = client
                .fetch(&symbol, function, interval, output_size)
                .await
                .with_context(|| format!("failed to fetch {function} for {symbol}"))?;
            info!(rows = data.height(), "Fetched {symbol}");
            let data = apply_range(data, start, end)?;
            print_summary(&symbol, function, &data);
        }
        Commands::Cache { action } => {
            let cache = config.build_cache();
            match action {
                CacheAction::Stats => {
                    let stats = cache.stats().await;
                    if let Some(location) = &stats.location {
                        println!("Location: {}", location.display());
                    }
                    println!(
                        "Entries:  {} ({} valid, {} expired)",
                        stats.total, stats.valid, stats.expired
                    );
                    println!("Size:     {:.2} MB", stats.total_size_mb());
                }
                CacheAction::Purge { all } => {
                    let removed = if all {
                        cache.purge_all().await
                    } else {
                        cache.purge_expired().await
                    };
                    info!(removed, all, "Purged cache");
                    println!("Removed {removed} cache entries");
                }
            }
        }
    }

    Ok(())
}

/// Filters to the requested dates. A missing bound defaults to the data's own
/// first or last day, clamped so it never crosses the bound that was given.
fn apply_range(
    data: Dataset,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Dataset> {
    let Some((first, last)) = data.time_range() else {
        return Ok(data);
    };
    let (start, end) = match (start, end) {
        (None, None) => return Ok(data),
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => (start, last.date().max(start)),
        (None, Some(end)) => (first.date().min(end), end),
    };
    Ok(data.filter_range(start, end)?)
}

fn print_summary(symbol: &str, function: TimeSeriesFunction, data: &Dataset) {
    println!("{} {}", symbol.trim().to_uppercase(), function.short_name());
    match data.time_range() {
        Some((first, last)) => println!("Rows:    {} ({first} to {last})", data.height()),
        None => println!("Rows:    0"),
    }
    println!("Columns: {}", data.column_names().join(", "));
    if !data.is_empty() {
        println!("{}", data.frame().tail(Some(PREVIEW_ROWS)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample() -> Dataset {
        let index = [2, 3, 4]
            .into_iter()
            .map(|d| date(d).and_hms_opt(0, 0, 0).unwrap())
            .collect();
        Dataset::new(
            index,
            vec![("Close".to_string(), vec![Some(1.0), Some(2.0), Some(3.0)])],
        )
        .unwrap()
    }

    #[test]
    fn test_no_bounds_keeps_everything() {
        assert_eq!(apply_range(sample(), None, None).unwrap().height(), 3);
    }

    #[test]
    fn test_single_bound_within_data() {
        assert_eq!(apply_range(sample(), Some(date(3)), None).unwrap().height(), 2);
        assert_eq!(apply_range(sample(), None, Some(date(3))).unwrap().height(), 2);
    }

    #[test]
    fn test_start_after_data_is_empty() {
        let filtered = apply_range(sample(), Some(date(20)), None).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_end_before_data_is_empty() {
        let filtered = apply_range(sample(), None, Some(date(1))).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_inverted_explicit_bounds_are_rejected() {
        assert!(apply_range(sample(), Some(date(4)), Some(date(2))).is_err());
    }
}
