//! Upstream payload classification and parsing.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use quotes_core::{Dataset, QuoteError, Result, TimeSeriesFunction};
use serde_json::{Map, Value};
use std::collections::HashMap;

const ERROR_MESSAGE_FIELD: &str = "Error Message";
const NOTE_FIELD: &str = "Note";
const INFORMATION_FIELD: &str = "Information";
const INTRADAY_SERIES_PREFIX: &str = "Time Series";

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a raw response body for `function` into a [`Dataset`].
///
/// # Errors
/// - [`QuoteError::MalformedResponse`] if the body is not a JSON object or has
///   no usable series.
/// - [`QuoteError::InvalidSymbol`] or [`QuoteError::RateLimited`] if the
///   upstream reported an error in place of data.
pub fn parse_response(body: &str, function: TimeSeriesFunction) -> Result<Dataset> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| QuoteError::MalformedResponse(format!("Response is not JSON: {e}")))?;
    let Value::Object(payload) = value else {
        return Err(QuoteError::MalformedResponse(
            "Response is not a JSON object".to_string(),
        ));
    };

    classify(&payload)?;
    let series = locate_series(&payload, function)?;
    to_dataset(series)
}

/// Maps upstream error fields to errors, in precedence order.
///
/// # Errors
/// Returns the error the payload reports, if any.
pub fn classify(payload: &Map<String, Value>) -> Result<()> {
    if let Some(message) = payload.get(ERROR_MESSAGE_FIELD) {
        return Err(QuoteError::InvalidSymbol(text(message)));
    }
    if payload.contains_key(NOTE_FIELD) {
        return Err(QuoteError::RateLimited(
            "API rate limit reached (25 requests per day). Try again tomorrow or use cached data."
                .to_string(),
        ));
    }
    if let Some(info) = payload.get(INFORMATION_FIELD) {
        let info = text(info);
        if info.to_lowercase().contains("rate limit") {
            return Err(QuoteError::RateLimited(format!(
                "API rate limit reached. Details: {info}"
            )));
        }
    }
    Ok(())
}

/// Returns the label under which `function` publishes its series.
///
/// Intraday labels embed the interval and are discovered at parse time, so
/// this returns `None` for [`TimeSeriesFunction::Intraday`].
#[must_use]
pub const fn series_label(function: TimeSeriesFunction) -> Option<&'static str> {
    match function {
        TimeSeriesFunction::Daily | TimeSeriesFunction::DailyAdjusted => {
            Some("Time Series (Daily)")
        }
        TimeSeriesFunction::Weekly => Some("Weekly Time Series"),
        TimeSeriesFunction::WeeklyAdjusted => Some("Weekly Adjusted Time Series"),
        TimeSeriesFunction::Monthly => Some("Monthly Time Series"),
        TimeSeriesFunction::MonthlyAdjusted => Some("Monthly Adjusted Time Series"),
        TimeSeriesFunction::Intraday => None,
    }
}

fn locate_series(
    payload: &Map<String, Value>,
    function: TimeSeriesFunction,
) -> Result<&Map<String, Value>> {
    let label = match series_label(function) {
        Some(label) => Some(label),
        None => payload
            .keys()
            .map(String::as_str)
            .find(|key| key.starts_with(INTRADAY_SERIES_PREFIX)),
    };
    let Some(label) = label else {
        return Err(QuoteError::MalformedResponse(format!(
            "Unexpected API response format: no series for {function}"
        )));
    };

    match payload.get(label) {
        Some(Value::Object(series)) if !series.is_empty() => Ok(series),
        Some(Value::Object(_)) => Err(QuoteError::MalformedResponse(
            "No time series data in API response".to_string(),
        )),
        Some(_) => Err(QuoteError::MalformedResponse(format!(
            "Series {label} is not an object"
        ))),
        None => Err(QuoteError::MalformedResponse(format!(
            "Unexpected API response format. Expected key: {label}"
        ))),
    }
}

fn to_dataset(series: &Map<String, Value>) -> Result<Dataset> {
    let mut names: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut index = Vec::with_capacity(series.len());
    let mut rows = Vec::with_capacity(series.len());

    for (stamp, row) in series {
        index.push(parse_timestamp(stamp)?);
        let Value::Object(fields) = row else {
            return Err(QuoteError::MalformedResponse(format!(
                "Row {stamp} is not an object"
            )));
        };

        let mut cells = Vec::with_capacity(fields.len());
        for (field, raw) in fields {
            let name = column_name(field);
            let pos = *positions.entry(name.clone()).or_insert_with(|| {
                names.push(name);
                names.len() - 1
            });
            cells.push((pos, coerce(raw)));
        }
        rows.push(cells);
    }

    let mut columns: Vec<Vec<Option<f64>>> = vec![vec![None; index.len()]; names.len()];
    for (row, cells) in rows.into_iter().enumerate() {
        for (pos, value) in cells {
            columns[pos][row] = value;
        }
    }

    Dataset::new(index, names.into_iter().zip(columns).collect())
}

/// Normalizes an upstream field name: `"5. adjusted close"` becomes
/// `"Adjusted close"`. Names without an ordinal prefix are kept as-is.
#[must_use]
pub fn column_name(field: &str) -> String {
    match field.split(". ").nth(1) {
        Some(bare) => capitalize(bare),
        None => field.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Converts a JSON cell to a float; anything non-numeric, and NaN, is `None`.
#[must_use]
pub fn coerce(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    value.filter(|v| !v.is_nan())
}

/// Parses `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.
///
/// # Errors
/// Returns [`QuoteError::MalformedResponse`] for any other format.
pub fn parse_timestamp(stamp: &str) -> Result<NaiveDateTime> {
    let stamp = stamp.trim();
    NaiveDateTime::parse_from_str(stamp, DATETIME_FORMAT)
        .or_else(|_| {
            NaiveDate::parse_from_str(stamp, DATE_FORMAT).map(|d| d.and_time(NaiveTime::MIN))
        })
        .map_err(|_| QuoteError::MalformedResponse(format!("Invalid timestamp: {stamp}")))
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY_SAMPLE: &str = r#"{
        "Meta Data": {
            "1. Information": "Daily Prices (open, high, low, close) and Volumes",
            "2. Symbol": "IBM"
        },
        "Time Series (Daily)": {
            "2024-01-03": {"1. open": "10.5", "2. high": "11.0", "3. low": "10.0",
                           "4. close": "10.8", "5. volume": "2000"},
            "2024-01-02": {"1. open": "10.0", "2. high": "10.6", "3. low": "9.9",
                           "4. close": "10.5", "5. volume": "1000"}
        }
    }"#;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_daily_sample() {
        let data = parse_response(DAILY_SAMPLE, TimeSeriesFunction::Daily).unwrap();

        assert_eq!(data.height(), 2);
        assert_eq!(data.timestamps(), vec![ymd(2024, 1, 2), ymd(2024, 1, 3)]);
        assert_eq!(
            data.column_names(),
            vec!["Open", "High", "Low", "Close", "Volume"]
        );
        assert_eq!(data.values("Close").unwrap(), vec![Some(10.5), Some(10.8)]);
        assert_eq!(
            data.values("Volume").unwrap(),
            vec![Some(1000.0), Some(2000.0)]
        );
    }

    #[test]
    fn test_non_numeric_values_become_null() {
        let body = r#"{"Time Series (Daily)": {
            "2024-01-02": {"1. open": "abc", "4. close": "NaN", "5. volume": "7"},
            "2024-01-03": {"1. open": "10.5", "4. close": "11", "5. volume": "-"}
        }}"#;
        let data = parse_response(body, TimeSeriesFunction::Daily).unwrap();
        assert_eq!(data.height(), 2);
        assert_eq!(data.values("Open").unwrap(), vec![None, Some(10.5)]);
        assert_eq!(data.values("Close").unwrap(), vec![None, Some(11.0)]);
        assert_eq!(data.values("Volume").unwrap(), vec![Some(7.0), None]);
    }

    #[test]
    fn test_missing_fields_are_null() {
        let body = r#"{"Time Series (Daily)": {
            "2024-01-02": {"1. open": "1"},
            "2024-01-03": {"1. open": "2", "7. dividend amount": "0.5"}
        }}"#;
        let data = parse_response(body, TimeSeriesFunction::DailyAdjusted).unwrap();
        assert_eq!(data.column_names(), vec!["Open", "Dividend amount"]);
        assert_eq!(data.values("Dividend amount").unwrap(), vec![None, Some(0.5)]);
    }

    #[test]
    fn test_intraday_series_discovery() {
        let body = r#"{
            "Meta Data": {"4. Interval": "5min"},
            "Time Series (5min)": {
                "2024-01-02 09:35:00": {"1. open": "2", "4. close": "2.5"},
                "2024-01-02 09:30:00": {"1. open": "1", "4. close": "1.5"}
            }
        }"#;
        let data = parse_response(body, TimeSeriesFunction::Intraday).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(data.timestamps()[0], start);
        assert_eq!(data.values("Close").unwrap(), vec![Some(1.5), Some(2.5)]);
    }

    #[test]
    fn test_classification_precedence() {
        let body =
            r#"{"Error Message": "Invalid API call.", "Note": "Hi", "Information": "rate limit"}"#;
        let err = parse_response(body, TimeSeriesFunction::Daily).unwrap_err();
        assert_eq!(err, QuoteError::InvalidSymbol("Invalid API call.".to_string()));

        let body = r#"{"Note": "Thank you for using Alpha Vantage!", "Information": "x"}"#;
        let err = parse_response(body, TimeSeriesFunction::Daily).unwrap_err();
        assert!(err.is_rate_limited());

        let body = r#"{"Information": "Our standard API RATE LIMIT is 25 requests per day."}"#;
        let err = parse_response(body, TimeSeriesFunction::Daily).unwrap_err();
        assert!(matches!(err, QuoteError::RateLimited(ref msg) if msg.contains("RATE LIMIT")));
    }

    #[test]
    fn test_unrelated_information_is_not_rate_limit() {
        let body = r#"{"Information": "This is a premium endpoint."}"#;
        let err = parse_response(body, TimeSeriesFunction::Daily).unwrap_err();
        assert!(matches!(err, QuoteError::MalformedResponse(_)));
    }

    #[test]
    fn test_malformed_payloads() {
        let cases = [
            "<html>busy</html>",
            "[1, 2]",
            r#"{"Meta Data": {}}"#,
            r#"{"Time Series (Daily)": {}}"#,
            r#"{"Time Series (Daily)": "nope"}"#,
            r#"{"Time Series (Daily)": {"not-a-date": {"1. open": "1"}}}"#,
            r#"{"Time Series (Daily)": {"2024-01-02": "1"}}"#,
        ];
        for body in cases {
            let err = parse_response(body, TimeSeriesFunction::Daily).unwrap_err();
            assert!(
                matches!(err, QuoteError::MalformedResponse(_)),
                "{body}: {err:?}"
            );
        }
    }

    #[test]
    fn test_weekly_label_is_exact() {
        let body = r#"{"Weekly Adjusted Time Series": {"2024-01-05": {"1. open": "1"}}}"#;
        assert!(parse_response(body, TimeSeriesFunction::Weekly).is_err());
        assert!(parse_response(body, TimeSeriesFunction::WeeklyAdjusted).is_ok());
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name("1. open"), "Open");
        assert_eq!(column_name("5. adjusted close"), "Adjusted close");
        assert_eq!(column_name("8. split coefficient"), "Split coefficient");
        assert_eq!(column_name("volume"), "volume");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("2024-03-01").unwrap(), ymd(2024, 3, 1));
        assert!(parse_timestamp("2024-03-01 16:00:00").is_ok());
        assert!(parse_timestamp("03/01/2024").is_err());
    }
}
