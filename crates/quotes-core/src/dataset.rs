//! Time-indexed datasets.
//!
//! A [`Dataset`] is a polars [`DataFrame`] with a `Date` index column
//! (millisecond datetimes, ascending) followed by `Float64` value columns such
//! as `Open`, `High`, `Low`, `Close` and `Volume`. Missing values are nulls.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use polars::prelude::*;

use crate::error::{QuoteError, Result};

/// Name of the index column.
pub const INDEX_COLUMN: &str = "Date";

const INDEX_DTYPE: DataType = DataType::Datetime(TimeUnit::Milliseconds, None);

/// An ordered, typed time series.
#[derive(Clone, Debug)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    /// Builds a dataset from an index and named value columns.
    ///
    /// Rows are stably sorted by timestamp, so rows sharing a timestamp keep
    /// their input order.
    ///
    /// # Errors
    /// Returns [`QuoteError::MalformedResponse`] if a column length differs from
    /// the index length or two columns share a name.
    pub fn new(
        index: Vec<NaiveDateTime>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self> {
        let mut order: Vec<usize> = (0..index.len()).collect();
        order.sort_by_key(|&i| index[i]);

        let millis: Vec<i64> = order
            .iter()
            .map(|&i| index[i].and_utc().timestamp_millis())
            .collect();
        let date_col = Column::new(INDEX_COLUMN.into(), millis)
            .cast(&INDEX_DTYPE)
            .map_err(|e| QuoteError::MalformedResponse(e.to_string()))?;

        let mut frame_columns = Vec::with_capacity(columns.len() + 1);
        frame_columns.push(date_col);
        for (name, values) in columns {
            if values.len() != index.len() {
                return Err(QuoteError::MalformedResponse(format!(
                    "Column {name} has {} values for {} timestamps",
                    values.len(),
                    index.len()
                )));
            }
            let sorted: Vec<Option<f64>> = order.iter().map(|&i| values[i]).collect();
            frame_columns.push(Column::new(name.as_str().into(), sorted));
        }

        let frame = DataFrame::new(frame_columns)
            .map_err(|e| QuoteError::MalformedResponse(e.to_string()))?;
        Ok(Self { frame })
    }

    /// Wraps an existing frame after checking the dataset invariants.
    ///
    /// # Errors
    /// Returns [`QuoteError::MalformedResponse`] if the `Date` column is missing,
    /// not a datetime, contains nulls or is out of order, or if any other
    /// column is not `Float64`.
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        let index = frame
            .column(INDEX_COLUMN)
            .map_err(|e| QuoteError::MalformedResponse(e.to_string()))?;
        if !matches!(index.dtype(), DataType::Datetime(_, _)) {
            return Err(QuoteError::MalformedResponse(format!(
                "{INDEX_COLUMN} column has type {}",
                index.dtype()
            )));
        }
        if index.null_count() > 0 {
            return Err(QuoteError::MalformedResponse(format!(
                "{INDEX_COLUMN} column contains nulls"
            )));
        }
        if let Some(column) = frame
            .get_columns()
            .iter()
            .find(|c| c.name().as_str() != INDEX_COLUMN && c.dtype() != &DataType::Float64)
        {
            return Err(QuoteError::MalformedResponse(format!(
                "Column {} has type {}",
                column.name(),
                column.dtype()
            )));
        }

        let dataset = Self { frame };
        let timestamps = dataset.timestamps();
        if timestamps.len() != dataset.height() {
            return Err(QuoteError::MalformedResponse(format!(
                "{INDEX_COLUMN} column holds out-of-range timestamps"
            )));
        }
        if timestamps.windows(2).any(|w| w[0] > w[1]) {
            return Err(QuoteError::MalformedResponse(format!(
                "{INDEX_COLUMN} column is not sorted"
            )));
        }
        Ok(dataset)
    }

    /// Returns the underlying frame.
    #[must_use]
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Consumes the dataset and returns the underlying frame.
    #[must_use]
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Returns the value column names, excluding the index.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(PlSmallStr::as_str)
            .filter(|name| *name != INDEX_COLUMN)
            .collect()
    }

    /// Returns the values of a column, with `None` for missing values.
    #[must_use]
    pub fn values(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let column = self.frame.column(name).ok()?;
        let values = column.f64().ok()?;
        Some(values.into_iter().collect())
    }

    /// Returns the index timestamps in row order.
    #[must_use]
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        let Ok(index) = self.frame.column(INDEX_COLUMN) else {
            return Vec::new();
        };
        let Ok(millis) = index
            .cast(&INDEX_DTYPE)
            .and_then(|c| c.cast(&DataType::Int64))
        else {
            return Vec::new();
        };
        let Ok(millis) = millis.i64() else {
            return Vec::new();
        };
        millis
            .into_iter()
            .flatten()
            .filter_map(DateTime::from_timestamp_millis)
            .map(|dt| dt.naive_utc())
            .collect()
    }

    /// Returns the first and last timestamps.
    #[must_use]
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let timestamps = self.timestamps();
        Some((*timestamps.first()?, *timestamps.last()?))
    }

    /// Returns the rows whose timestamp falls on or between `start` and `end`.
    ///
    /// Both bounds are whole days: every bar stamped on `end` is kept.
    ///
    /// # Errors
    /// Returns [`QuoteError::Configuration`] if `end` is before `start`.
    pub fn filter_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(QuoteError::Configuration(format!(
                "End date {end} is before start date {start}"
            )));
        }
        let lower = start.and_time(chrono::NaiveTime::MIN);
        let upper = end.and_time(chrono::NaiveTime::MIN) + TimeDelta::days(1);

        let flags: Vec<bool> = self
            .timestamps()
            .iter()
            .map(|t| *t >= lower && *t < upper)
            .collect();
        let mask = BooleanChunked::from_slice("mask".into(), &flags);
        let frame = self
            .frame
            .filter(&mask)
            .map_err(|e| QuoteError::MalformedResponse(e.to_string()))?;
        Ok(Self { frame })
    }
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.frame.get_column_names() == other.frame.get_column_names()
            && self.frame.equals_missing(&other.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sample() -> Dataset {
        Dataset::new(
            vec![day(2024, 1, 3), day(2024, 1, 2), day(2024, 1, 4)],
            vec![
                ("Open".to_string(), vec![Some(100.0), Some(98.0), None]),
                ("Close".to_string(), vec![Some(103.0), Some(100.0), Some(104.5)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rows_sorted_by_timestamp() {
        let ds = sample();
        assert_eq!(
            ds.timestamps(),
            vec![day(2024, 1, 2), day(2024, 1, 3), day(2024, 1, 4)]
        );
        assert_eq!(ds.values("Open").unwrap(), vec![Some(98.0), Some(100.0), None]);
        assert_eq!(ds.column_names(), vec!["Open", "Close"]);
    }

    #[test]
    fn test_duplicate_timestamps_keep_input_order() {
        let ds = Dataset::new(
            vec![day(2024, 1, 3), day(2024, 1, 2), day(2024, 1, 2)],
            vec![("Close".to_string(), vec![Some(3.0), Some(1.0), Some(2.0)])],
        )
        .unwrap();
        assert_eq!(ds.values("Close").unwrap(), vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = Dataset::new(
            vec![day(2024, 1, 2)],
            vec![("Close".to_string(), vec![Some(1.0), Some(2.0)])],
        );
        assert!(matches!(result, Err(QuoteError::MalformedResponse(_))));
    }

    #[test]
    fn test_from_frame_round_trip() {
        let ds = sample();
        let rebuilt = Dataset::from_frame(ds.frame().clone()).unwrap();
        assert_eq!(ds, rebuilt);
    }

    #[test]
    fn test_from_frame_rejects_non_float_columns() {
        let frame = DataFrame::new(vec![
            Column::new(INDEX_COLUMN.into(), vec![0i64])
                .cast(&INDEX_DTYPE)
                .unwrap(),
            Column::new("Open".into(), vec!["100.0"]),
        ])
        .unwrap();
        assert!(Dataset::from_frame(frame).is_err());
    }

    #[test]
    fn test_equality_tracks_missing_positions() {
        let a = sample();
        let b = Dataset::new(
            vec![day(2024, 1, 3), day(2024, 1, 2), day(2024, 1, 4)],
            vec![
                ("Open".to_string(), vec![Some(100.0), Some(98.0), Some(0.0)]),
                ("Close".to_string(), vec![Some(103.0), Some(100.0), Some(104.5)]),
            ],
        )
        .unwrap();
        assert_ne!(a, b);
        assert_eq!(a, sample());
    }

    #[test]
    fn test_filter_range_is_inclusive() {
        let ds = sample();
        let start = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let filtered = ds.filter_range(start, end).unwrap();
        assert_eq!(filtered.height(), 2);
        assert_eq!(filtered.time_range(), Some((day(2024, 1, 3), day(2024, 1, 4))));
    }

    #[test]
    fn test_filter_range_keeps_intraday_bars_on_end_day() {
        let late = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(15, 55, 0)
            .unwrap();
        let ds = Dataset::new(vec![late], vec![("Close".to_string(), vec![Some(1.0)])]).unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(ds.filter_range(d, d).unwrap().height(), 1);
    }

    #[test]
    fn test_filter_range_rejects_inverted_bounds() {
        let ds = sample();
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            ds.filter_range(start, end),
            Err(QuoteError::Configuration(_))
        ));
    }
}
