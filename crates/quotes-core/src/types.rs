//! Request types for time series queries.
//!
//! This module defines the parts of a query and the key built from them:
//!
//! - [`Symbol`] - Normalized ticker
//! - [`TimeSeriesFunction`] - Which upstream time series to request
//! - [`Interval`] - Bar size for intraday requests
//! - [`OutputSize`] - How much history to request
//! - [`RequestKey`] - The full query, and the cache key derived from it

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{QuoteError, Result};

/// A trading symbol/ticker.
///
/// Symbols are trimmed and uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, trimming and converting to uppercase.
    #[must_use]
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if nothing was left after trimming.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Characters allowed in a symbol; keeps cache keys usable as file names.
const fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')
}

/// Upstream time series function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeSeriesFunction {
    /// Daily bars.
    Daily,
    /// Daily bars with split/dividend adjustments.
    DailyAdjusted,
    /// Weekly bars (last trading day of each week).
    Weekly,
    /// Weekly bars with split/dividend adjustments.
    WeeklyAdjusted,
    /// Monthly bars (last trading day of each month).
    Monthly,
    /// Monthly bars with split/dividend adjustments.
    MonthlyAdjusted,
    /// Intraday bars; requires an [`Interval`].
    Intraday,
}

impl TimeSeriesFunction {
    /// Every function, in menu order.
    pub const ALL: [Self; 7] = [
        Self::Daily,
        Self::DailyAdjusted,
        Self::Weekly,
        Self::WeeklyAdjusted,
        Self::Monthly,
        Self::MonthlyAdjusted,
        Self::Intraday,
    ];

    /// Returns the upstream API name (e.g. `TIME_SERIES_DAILY`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "TIME_SERIES_DAILY",
            Self::DailyAdjusted => "TIME_SERIES_DAILY_ADJUSTED",
            Self::Weekly => "TIME_SERIES_WEEKLY",
            Self::WeeklyAdjusted => "TIME_SERIES_WEEKLY_ADJUSTED",
            Self::Monthly => "TIME_SERIES_MONTHLY",
            Self::MonthlyAdjusted => "TIME_SERIES_MONTHLY_ADJUSTED",
            Self::Intraday => "TIME_SERIES_INTRADAY",
        }
    }

    /// Returns the short, command-line friendly name (e.g. `daily-adjusted`).
    #[must_use]
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::DailyAdjusted => "daily-adjusted",
            Self::Weekly => "weekly",
            Self::WeeklyAdjusted => "weekly-adjusted",
            Self::Monthly => "monthly",
            Self::MonthlyAdjusted => "monthly-adjusted",
            Self::Intraday => "intraday",
        }
    }

    /// Returns true if requests for this function must carry an [`Interval`].
    #[must_use]
    pub const fn requires_interval(&self) -> bool {
        matches!(self, Self::Intraday)
    }
}

impl fmt::Display for TimeSeriesFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeSeriesFunction {
    type Err = QuoteError;

    /// Accepts either the API name or the short name, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| {
                f.as_str().eq_ignore_ascii_case(wanted)
                    || f.short_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| QuoteError::Configuration(format!("Unknown time series function: {s}")))
    }
}

/// Bar size for intraday requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// One-minute bars.
    #[serde(rename = "1min")]
    OneMinute,
    /// Five-minute bars.
    #[serde(rename = "5min")]
    FiveMinutes,
    /// Fifteen-minute bars.
    #[serde(rename = "15min")]
    FifteenMinutes,
    /// Thirty-minute bars.
    #[serde(rename = "30min")]
    ThirtyMinutes,
    /// Hourly bars.
    #[serde(rename = "60min")]
    SixtyMinutes,
}

impl Interval {
    /// Every interval, shortest first.
    pub const ALL: [Self; 5] = [
        Self::OneMinute,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::SixtyMinutes,
    ];

    /// Returns the upstream API name (e.g. `5min`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1min",
            Self::FiveMinutes => "5min",
            Self::FifteenMinutes => "15min",
            Self::ThirtyMinutes => "30min",
            Self::SixtyMinutes => "60min",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| QuoteError::Configuration(format!("Unknown interval: {s}")))
    }
}

/// How much history the upstream should return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    /// The latest 100 data points.
    Compact,
    /// The full available history.
    #[default]
    Full,
}

impl OutputSize {
    /// Returns the upstream API name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputSize {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "full" => Ok(Self::Full),
            _ => Err(QuoteError::Configuration(format!("Unknown output size: {s}"))),
        }
    }
}

/// A validated time series query.
///
/// An interval is present exactly when the function is
/// [`TimeSeriesFunction::Intraday`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    symbol: Symbol,
    function: TimeSeriesFunction,
    interval: Option<Interval>,
    output_size: OutputSize,
}

impl RequestKey {
    /// Creates a request key, enforcing the symbol and interval rules.
    ///
    /// # Errors
    /// Returns [`QuoteError::Configuration`] if the symbol is blank or holds
    /// characters other than ASCII letters, digits and `.-^=`, if an
    /// intraday request has no interval, or if a non-intraday request has one.
    pub fn new(
        symbol: impl Into<Symbol>,
        function: TimeSeriesFunction,
        interval: Option<Interval>,
        output_size: OutputSize,
    ) -> Result<Self> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(QuoteError::Configuration("Symbol must not be empty".to_string()));
        }
        if let Some(c) = symbol.as_str().chars().find(|c| !is_symbol_char(*c)) {
            return Err(QuoteError::Configuration(format!(
                "Symbol {symbol} contains invalid character {c:?}"
            )));
        }
        match (function.requires_interval(), interval) {
            (true, None) => {
                return Err(QuoteError::Configuration(format!(
                    "Interval required for {function}"
                )));
            }
            (false, Some(interval)) => {
                return Err(QuoteError::Configuration(format!(
                    "Interval {interval} is only valid for {}",
                    TimeSeriesFunction::Intraday
                )));
            }
            _ => {}
        }
        Ok(Self {
            symbol,
            function,
            interval,
            output_size,
        })
    }

    /// Returns the normalized symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Returns the time series function.
    #[must_use]
    pub const fn function(&self) -> TimeSeriesFunction {
        self.function
    }

    /// Returns the intraday interval, if any.
    #[must_use]
    pub const fn interval(&self) -> Option<Interval> {
        self.interval
    }

    /// Returns the requested output size.
    #[must_use]
    pub const fn output_size(&self) -> OutputSize {
        self.output_size
    }

    /// Returns the cache key for this request.
    ///
    /// `SYMBOL_FUNCTION_INTERVAL_OUTPUTSIZE` when an interval is present,
    /// `SYMBOL_FUNCTION_OUTPUTSIZE` otherwise.
    #[must_use]
    pub fn cache_key(&self) -> String {
        match self.interval {
            Some(interval) => format!(
                "{}_{}_{}_{}",
                self.symbol, self.function, interval, self.output_size
            ),
            None => format!("{}_{}_{}", self.symbol, self.function, self.output_size),
        }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_normalization() {
        assert_eq!(Symbol::new("  aapl ").as_str(), "AAPL");
        assert!(Symbol::new("   ").is_empty());
    }

    #[test]
    fn test_cache_key_format() {
        let daily = RequestKey::new("AAPL", TimeSeriesFunction::Daily, None, OutputSize::Full)
            .unwrap();
        assert_eq!(daily.cache_key(), "AAPL_TIME_SERIES_DAILY_full");

        let intraday = RequestKey::new(
            "MSFT",
            TimeSeriesFunction::Intraday,
            Some(Interval::FiveMinutes),
            OutputSize::Full,
        )
        .unwrap();
        assert_eq!(intraday.cache_key(), "MSFT_TIME_SERIES_INTRADAY_5min_full");
    }

    #[test]
    fn test_cache_keys_are_distinct_and_stable() {
        let daily = RequestKey::new("aapl", TimeSeriesFunction::Daily, None, OutputSize::Full)
            .unwrap();
        let intraday = RequestKey::new(
            "AAPL",
            TimeSeriesFunction::Intraday,
            Some(Interval::FiveMinutes),
            OutputSize::Full,
        )
        .unwrap();
        let again = RequestKey::new(" AAPL", TimeSeriesFunction::Daily, None, OutputSize::Full)
            .unwrap();

        assert_ne!(daily.cache_key(), intraday.cache_key());
        assert_eq!(daily.cache_key(), again.cache_key());
        assert_eq!(daily, again);
    }

    #[test]
    fn test_compact_and_full_do_not_collide() {
        let compact =
            RequestKey::new("IBM", TimeSeriesFunction::Weekly, None, OutputSize::Compact).unwrap();
        let full = RequestKey::new("IBM", TimeSeriesFunction::Weekly, None, OutputSize::Full)
            .unwrap();
        assert_ne!(compact.cache_key(), full.cache_key());
    }

    #[test]
    fn test_interval_rules() {
        let missing = RequestKey::new("AAPL", TimeSeriesFunction::Intraday, None, OutputSize::Full);
        assert!(matches!(missing, Err(QuoteError::Configuration(_))));

        let unexpected = RequestKey::new(
            "AAPL",
            TimeSeriesFunction::Daily,
            Some(Interval::OneMinute),
            OutputSize::Full,
        );
        assert!(matches!(unexpected, Err(QuoteError::Configuration(_))));

        let blank = RequestKey::new(" ", TimeSeriesFunction::Daily, None, OutputSize::Full);
        assert!(matches!(blank, Err(QuoteError::Configuration(_))));

        let path = RequestKey::new("../X", TimeSeriesFunction::Daily, None, OutputSize::Full);
        assert!(matches!(path, Err(QuoteError::Configuration(_))));

        let share_class =
            RequestKey::new("brk.b", TimeSeriesFunction::Daily, None, OutputSize::Full).unwrap();
        assert_eq!(share_class.cache_key(), "BRK.B_TIME_SERIES_DAILY_full");
    }

    #[test]
    fn test_function_parsing() {
        assert_eq!(
            "TIME_SERIES_WEEKLY_ADJUSTED".parse::<TimeSeriesFunction>().unwrap(),
            TimeSeriesFunction::WeeklyAdjusted
        );
        assert_eq!(
            "monthly".parse::<TimeSeriesFunction>().unwrap(),
            TimeSeriesFunction::Monthly
        );
        assert!("hourly".parse::<TimeSeriesFunction>().is_err());
    }

    #[test]
    fn test_interval_and_output_size_parsing() {
        assert_eq!("15min".parse::<Interval>().unwrap(), Interval::FifteenMinutes);
        assert!("2min".parse::<Interval>().is_err());
        assert_eq!("COMPACT".parse::<OutputSize>().unwrap(), OutputSize::Compact);
        assert_eq!(OutputSize::default(), OutputSize::Full);
    }
}
