//! Series preparation: raw rows to a sorted, cleaned, derived-column series.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::domain::error::RowError;
use crate::domain::indicator::daily_return::calculate_daily_return;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::stddev::calculate_sample_stddev;
use crate::domain::ohlcv::{Bar, RawRow};

/// Trailing window used for the moving average and volatility columns.
pub const ROLLING_WINDOW: usize = 5;

/// A bar with its derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBar {
    pub bar: Bar,
    pub daily_return: f64,
    pub moving_average_5: Option<f64>,
    pub volatility_5: Option<f64>,
}

/// Cleaned bars in ascending date order. Equal dates keep their input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedSeries {
    bars: Vec<PreparedBar>,
}

impl PreparedSeries {
    pub fn bars(&self) -> &[PreparedBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn min_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.bar.date)
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.bar.date)
    }

    pub fn last(&self) -> Option<&PreparedBar> {
        self.bars.last()
    }

    /// (day_offset, close) pairs relative to the series minimum date.
    pub fn offsets_and_closes(&self) -> Vec<(f64, f64)> {
        let Some(origin) = self.min_date() else {
            return Vec::new();
        };
        self.bars
            .iter()
            .map(|b| (b.bar.day_offset(origin) as f64, b.bar.close))
            .collect()
    }
}

/// Outcome of a preparation pass: the series plus the rows that were dropped.
#[derive(Debug, Clone, Default)]
pub struct Preparation {
    pub series: PreparedSeries,
    pub dropped: Vec<RowError>,
}

/// Parse, sort, clean, and derive. Never fails: bad rows are dropped.
pub fn prepare(rows: &[RawRow]) -> Preparation {
    let mut dropped = Vec::new();

    let mut dated: Vec<(NaiveDate, usize, &RawRow)> = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        match parse_date(&row.date) {
            Some(date) => dated.push((date, i, row)),
            None => dropped.push(RowError::Date {
                row: i,
                value: row.date.clone(),
            }),
        }
    }

    // stable, so duplicate dates keep insertion order
    dated.sort_by_key(|(date, _, _)| *date);

    let mut bars = Vec::with_capacity(dated.len());
    for (date, index, row) in dated {
        let Some(close) = parse_number(&row.close) else {
            dropped.push(RowError::Close {
                row: index,
                value: row.close.clone(),
            });
            continue;
        };
        bars.push(Bar {
            date,
            open: parse_number(&row.open),
            high: parse_number(&row.high),
            low: parse_number(&row.low),
            close,
            volume: parse_number(&row.volume),
        });
    }

    for err in &dropped {
        debug!(%err, "dropping row");
    }

    let series = derive(bars);
    if series.is_empty() {
        warn!(rows = rows.len(), "no bars survived preparation");
    } else {
        info!(
            rows = rows.len(),
            kept = series.len(),
            dropped = dropped.len(),
            "data loaded and cleaned"
        );
    }

    Preparation { series, dropped }
}

/// Attach derived columns to bars that are already sorted and cleaned.
pub fn derive(bars: Vec<Bar>) -> PreparedSeries {
    let returns = calculate_daily_return(&bars);
    let sma = calculate_sma(&bars, ROLLING_WINDOW);
    let stddev = calculate_sample_stddev(&bars, ROLLING_WINDOW);
    for indicator in [&sma, &stddev] {
        match indicator.first_valid() {
            Some(i) => debug!(
                indicator = %indicator.indicator_type,
                first_window = %indicator.values[i].date,
                "backfilling warmup"
            ),
            None => debug!(
                indicator = %indicator.indicator_type,
                bars = bars.len(),
                "no full window"
            ),
        }
    }
    let moving_average = sma.backfilled();
    let volatility = stddev.backfilled();

    let bars = bars
        .into_iter()
        .zip(returns.values)
        .zip(moving_average.into_iter().zip(volatility))
        .map(|((bar, ret), (ma, vol))| PreparedBar {
            bar,
            daily_return: ret.value,
            moving_average_5: ma,
            volatility_5: vol,
        })
        .collect();

    PreparedSeries { bars }
}

/// `YYYY-MM-DD`, optionally with a trailing time part; the time is discarded.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

/// A finite decimal number, or `None` for anything else (empty, text, NaN, inf).
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(date: &str, close: &str) -> RawRow {
        RawRow::new(date, "1.0", "2.0", "0.5", close, "100")
    }

    fn rows_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<RawRow> {
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let date = start + chrono::Duration::days(i as i64);
                row(&date.format("%Y-%m-%d").to_string(), &c.to_string())
            })
            .collect()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn sorts_ascending_by_date() {
        let rows = vec![
            row("2024-01-03", "3"),
            row("2024-01-01", "1"),
            row("2024-01-02", "2"),
        ];
        let prep = prepare(&rows);
        let dates: Vec<_> = prep.series.bars().iter().map(|b| b.bar.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
    }

    #[test]
    fn duplicate_dates_are_kept_in_insertion_order() {
        let rows = vec![
            row("2024-01-02", "20"),
            row("2024-01-01", "10"),
            row("2024-01-02", "21"),
        ];
        let prep = prepare(&rows);
        let closes: Vec<_> = prep.series.bars().iter().map(|b| b.bar.close).collect();
        assert_eq!(closes, vec![10.0, 20.0, 21.0]);
    }

    #[test]
    fn drops_unparseable_dates() {
        let rows = vec![row("yesterday", "5"), row("2024-01-01", "1")];
        let prep = prepare(&rows);
        assert_eq!(prep.series.len(), 1);
        assert_eq!(
            prep.dropped,
            vec![RowError::Date {
                row: 0,
                value: "yesterday".into()
            }]
        );
    }

    #[test]
    fn drops_rows_without_numeric_close() {
        let rows = vec![
            row("2024-01-01", "1"),
            row("2024-01-02", "n/a"),
            row("2024-01-03", ""),
            row("2024-01-04", "NaN"),
            row("2024-01-05", "4"),
        ];
        let prep = prepare(&rows);
        let closes: Vec<_> = prep.series.bars().iter().map(|b| b.bar.close).collect();
        assert_eq!(closes, vec![1.0, 4.0]);
        assert_eq!(prep.dropped.len(), 3);
        assert!(matches!(prep.dropped[0], RowError::Close { row: 1, .. }));
    }

    #[test]
    fn other_unparseable_cells_become_missing() {
        let rows = vec![RawRow::new("2024-01-01", "x", "", " 2.5 ", "10", "lots")];
        let prep = prepare(&rows);
        let bar = &prep.series.bars()[0].bar;
        assert_eq!(bar.open, None);
        assert_eq!(bar.high, None);
        assert_eq!(bar.low, Some(2.5));
        assert_eq!(bar.close, 10.0);
        assert_eq!(bar.volume, None);
    }

    #[test]
    fn daily_return_uses_surviving_neighbours() {
        let rows = vec![
            row("2024-01-01", "100"),
            row("2024-01-02", "bad"),
            row("2024-01-03", "110"),
        ];
        let prep = prepare(&rows);
        let bars = prep.series.bars();
        assert_eq!(bars[0].daily_return, 0.0);
        assert_relative_eq!(bars[1].daily_return, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn rolling_columns_backfill_leading_bars() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let prep = prepare(&rows_from_closes(d(2024, 1, 1), &closes));
        let bars = prep.series.bars();

        for b in &bars[..5] {
            assert_eq!(b.moving_average_5, bars[4].moving_average_5);
            assert_eq!(b.volatility_5, bars[4].volatility_5);
        }
        assert_relative_eq!(bars[4].moving_average_5.unwrap(), 3.0);
        assert_relative_eq!(bars[6].moving_average_5.unwrap(), 5.0);
        assert_relative_eq!(bars[4].volatility_5.unwrap(), 2.5_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn short_series_has_no_rolling_values() {
        let prep = prepare(&rows_from_closes(d(2024, 1, 1), &[1.0, 2.0, 3.0]));
        assert!(
            prep.series
                .bars()
                .iter()
                .all(|b| b.moving_average_5.is_none() && b.volatility_5.is_none())
        );
    }

    #[test]
    fn empty_input_gives_empty_series() {
        let prep = prepare(&[]);
        assert!(prep.series.is_empty());
        assert_eq!(prep.series.min_date(), None);
        assert!(prep.series.offsets_and_closes().is_empty());
    }

    #[test]
    fn offsets_follow_calendar_days() {
        let rows = vec![
            row("2024-01-05", "3"),
            row("2024-01-01", "1"),
            row("2024-01-08", "4"),
        ];
        let prep = prepare(&rows);
        let offsets: Vec<_> = prep
            .series
            .offsets_and_closes()
            .into_iter()
            .map(|(x, _)| x)
            .collect();
        assert_eq!(offsets, vec![0.0, 4.0, 7.0]);
    }

    #[test]
    fn parse_date_accepts_time_suffixes() {
        assert_eq!(parse_date("2024-01-10"), Some(d(2024, 1, 10)));
        assert_eq!(parse_date(" 2024-01-10 "), Some(d(2024, 1, 10)));
        assert_eq!(parse_date("2024-01-10 16:00:00"), Some(d(2024, 1, 10)));
        assert_eq!(parse_date("2024-01-10T16:00:00"), Some(d(2024, 1, 10)));
        assert_eq!(parse_date("2024-01-10T16:00:00Z"), Some(d(2024, 1, 10)));
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn parse_number_rejects_non_finite() {
        assert_eq!(parse_number("12.5"), Some(12.5));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1,000"), None);
    }

    mod laws {
        use super::*;
        use proptest::prelude::*;

        fn arb_rows() -> impl Strategy<Value = Vec<RawRow>> {
            prop::collection::vec(
                (0i64..60, prop_oneof![
                    (1.0f64..500.0).prop_map(|c| c.to_string()),
                    Just("bad".to_string()),
                ]),
                0..40,
            )
            .prop_map(|cells| {
                cells
                    .into_iter()
                    .map(|(offset, close)| {
                        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                            + chrono::Duration::days(offset);
                        row(&date.format("%Y-%m-%d").to_string(), &close)
                    })
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn prepared_dates_are_non_decreasing(rows in arb_rows()) {
                let prep = prepare(&rows);
                let bars = prep.series.bars();
                for pair in bars.windows(2) {
                    prop_assert!(pair[0].bar.date <= pair[1].bar.date);
                }
            }

            #[test]
            fn unparseable_close_never_survives(rows in arb_rows()) {
                let prep = prepare(&rows);
                let expected = rows.iter().filter(|r| r.close != "bad").count();
                prop_assert_eq!(prep.series.len(), expected);
            }

            #[test]
            fn leading_window_equals_first_full_window(rows in arb_rows()) {
                let prep = prepare(&rows);
                let bars = prep.series.bars();
                if bars.len() >= ROLLING_WINDOW {
                    let anchor = &bars[ROLLING_WINDOW - 1];
                    for b in &bars[..ROLLING_WINDOW - 1] {
                        prop_assert_eq!(b.moving_average_5, anchor.moving_average_5);
                        prop_assert_eq!(b.volatility_5, anchor.volatility_5);
                    }
                }
            }
        }
    }
}
