use chrono::{Datelike, Days, NaiveDate};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

// ============================================================================
// Historical input
// ============================================================================

/// One daily AQI observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub aqi: f64,
}

impl HistoricalPoint {
    pub fn new(date: NaiveDate, aqi: f64) -> Self {
        Self { date, aqi }
    }
}

/// Check that observations are usable as a daily series: every AQI finite
/// and non-negative, dates strictly increasing.
pub fn validate_chronology(points: &[HistoricalPoint]) -> Result<(), ValidationError> {
    if let Some((index, point)) = points
        .iter()
        .enumerate()
        .find(|(_, p)| !p.aqi.is_finite() || p.aqi < 0.0)
    {
        let mut err = ValidationError::new("invalid_aqi");
        err.message = Some(Cow::from(format!(
            "aqi at index {index} ({}) must be a finite, non-negative number",
            point.aqi
        )));
        err.add_param(Cow::from("index"), &index);
        return Err(err);
    }

    if let Some((index, (prev, cur))) = points
        .iter()
        .tuple_windows()
        .enumerate()
        .find(|(_, (prev, cur))| cur.date <= prev.date)
    {
        let mut err = ValidationError::new("non_increasing_dates");
        err.message = Some(Cow::from(format!(
            "date {} at index {} does not follow {}",
            cur.date,
            index + 1,
            prev.date
        )));
        err.add_param(Cow::from("index"), &(index + 1));
        return Err(err);
    }

    Ok(())
}

// ============================================================================
// Validated series
// ============================================================================

/// A non-empty, strictly date-ordered AQI series.
///
/// Models only ever see this type, so they can rely on `len() >= 1` and on
/// the values being finite.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(points: &[HistoricalPoint]) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if points.is_empty() {
            let mut err = ValidationError::new("length");
            err.message = Some(Cow::from("series must contain at least one observation"));
            errors.add("series", err);
            return Err(errors);
        }
        if let Err(err) = validate_chronology(points) {
            errors.add("series", err);
            return Err(errors);
        }

        Ok(Self {
            dates: points.iter().map(|p| p.date).collect(),
            values: points.iter().map(|p| p.aqi).collect(),
        })
    }

    /// Consecutive daily series starting at `start`
    pub fn daily(start: NaiveDate, values: &[f64]) -> Result<Self, ValidationErrors> {
        let points: Vec<HistoricalPoint> = values
            .iter()
            .enumerate()
            .filter_map(|(i, &aqi)| {
                start
                    .checked_add_days(Days::new(i as u64))
                    .map(|date| HistoricalPoint::new(date, aqi))
            })
            .collect();
        Self::new(&points)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn last_value(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// The first `len` observations. `len` is clamped to `1..=self.len()`.
    pub fn head(&self, len: usize) -> Self {
        let len = len.clamp(1, self.len());
        Self {
            dates: self.dates[..len].to_vec(),
            values: self.values[..len].to_vec(),
        }
    }

    /// Date `steps` days after the last observation
    pub fn date_after_end(&self, steps: u64) -> Option<NaiveDate> {
        self.last_date().checked_add_days(Days::new(steps))
    }

    /// Day of week (0 = Monday) for each observation
    pub fn weekdays(&self) -> impl Iterator<Item = usize> + '_ {
        self.dates
            .iter()
            .map(|d| d.weekday().num_days_from_monday() as usize)
    }

    pub fn points(&self) -> impl Iterator<Item = HistoricalPoint> + '_ {
        self.dates
            .iter()
            .zip(self.values.iter())
            .map(|(&date, &aqi)| HistoricalPoint { date, aqi })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_series_is_contiguous() {
        let series = TimeSeries::daily(date(2024, 2, 27), &[10.0, 20.0, 30.0, 40.0]).unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.last_date(), date(2024, 3, 1)); // leap year
        assert_eq!(series.last_value(), 40.0);
        assert_eq!(series.date_after_end(1), Some(date(2024, 3, 2)));
    }

    #[test]
    fn test_empty_series_rejected() {
        let err = TimeSeries::new(&[]).unwrap_err();
        assert!(err.field_errors().contains_key("series"));
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let points = [
            HistoricalPoint::new(date(2024, 1, 1), 10.0),
            HistoricalPoint::new(date(2024, 1, 2), 11.0),
            HistoricalPoint::new(date(2024, 1, 2), 12.0),
        ];
        let err = validate_chronology(&points).unwrap_err();
        assert_eq!(err.code, "non_increasing_dates");
        assert!(err.message.unwrap().contains("index 2"));
    }

    #[test]
    fn test_decreasing_dates_rejected() {
        let points = [
            HistoricalPoint::new(date(2024, 1, 5), 10.0),
            HistoricalPoint::new(date(2024, 1, 4), 11.0),
        ];
        assert!(TimeSeries::new(&points).is_err());
    }

    #[test]
    fn test_gaps_are_allowed() {
        let points = [
            HistoricalPoint::new(date(2024, 1, 1), 10.0),
            HistoricalPoint::new(date(2024, 1, 9), 11.0),
        ];
        assert!(TimeSeries::new(&points).is_ok());
    }

    #[test]
    fn test_negative_and_nan_aqi_rejected() {
        let negative = [HistoricalPoint::new(date(2024, 1, 1), -1.0)];
        assert_eq!(validate_chronology(&negative).unwrap_err().code, "invalid_aqi");

        let nan = [HistoricalPoint::new(date(2024, 1, 1), f64::NAN)];
        assert!(TimeSeries::new(&nan).is_err());
    }

    #[test]
    fn test_head_and_weekdays() {
        // 2024-01-01 is a Monday
        let series = TimeSeries::daily(date(2024, 1, 1), &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let head = series.head(2);
        assert_eq!(head.values(), &[1.0, 2.0]);
        assert_eq!(series.head(0).len(), 1);
        assert_eq!(series.weekdays().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }
}
