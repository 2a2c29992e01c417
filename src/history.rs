use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};

use crate::models::OrderLine;

/// Offset used to find "the same period last year". A fixed 365-day
/// subtraction, not a calendar anniversary: the window drifts one day across
/// leap years, which is kept intact for parity with historical reports.
pub const SEASONAL_OFFSET_DAYS: i64 = 365;

/// Symmetric radius of the seasonal match window, in days.
pub const DEFAULT_WINDOW_RADIUS_DAYS: i64 = 3;

/// Read-only per-SKU index over an order-history snapshot.
///
/// Rows are partitioned by SKU and date-sorted once at build time; window and
/// trailing sums are then answered with binary search over prefix sums
/// instead of rescanning the snapshot per lookup.
#[derive(Debug, Default)]
pub struct HistoryIndex {
    series: BTreeMap<String, SkuSeries>,
    names: HashMap<String, String>,
    max_date: Option<NaiveDate>,
}

#[derive(Debug, Default)]
struct SkuSeries {
    dates: Vec<NaiveDate>,
    // prefix[i] = sum of quantities before dates[i]; one extra slot at the end.
    prefix: Vec<i64>,
}

impl SkuSeries {
    fn build(mut points: Vec<(NaiveDate, i64)>) -> Self {
        points.sort_by_key(|(date, _)| *date);
        let mut dates = Vec::with_capacity(points.len());
        let mut prefix = Vec::with_capacity(points.len() + 1);
        prefix.push(0);
        for (date, qty) in points {
            dates.push(date);
            let last = *prefix.last().unwrap_or(&0);
            prefix.push(last + qty);
        }
        Self { dates, prefix }
    }

    /// Inclusive date-range quantity sum.
    fn range_sum(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        if start > end {
            return 0;
        }
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end);
        self.prefix[hi] - self.prefix[lo]
    }
}

impl HistoryIndex {
    pub fn build(lines: &[OrderLine]) -> Self {
        let mut points: HashMap<&str, Vec<(NaiveDate, i64)>> = HashMap::new();
        let mut names: HashMap<String, String> = HashMap::new();
        let mut max_date = None;

        for line in lines {
            points
                .entry(line.sku.as_str())
                .or_default()
                .push((line.order_date, line.quantity));
            if !line.product_name.is_empty() {
                names
                    .entry(line.sku.clone())
                    .or_insert_with(|| line.product_name.clone());
            }
            max_date = max_date.max(Some(line.order_date));
        }

        let series = points
            .into_iter()
            .map(|(sku, points)| (sku.to_string(), SkuSeries::build(points)))
            .collect();

        Self {
            series,
            names,
            max_date,
        }
    }

    /// SKUs present in the snapshot, in deterministic (lexical) order.
    pub fn skus(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.series.contains_key(sku)
    }

    pub fn product_name(&self, sku: &str) -> &str {
        self.names.get(sku).map(String::as_str).unwrap_or("")
    }

    /// Latest order date in the snapshot; the dashboard's notion of "today".
    pub fn max_order_date(&self) -> Option<NaiveDate> {
        self.max_date
    }

    /// Quantity sold in the ±`window_days` window around the same period
    /// last year (`target_date` minus [`SEASONAL_OFFSET_DAYS`]). Returns 0
    /// when the SKU or the window has no rows; never fails.
    pub fn window_sum(&self, sku: &str, target_date: NaiveDate, window_days: i64) -> i64 {
        let Some(series) = self.series.get(sku) else {
            return 0;
        };
        let past = target_date - Duration::days(SEASONAL_OFFSET_DAYS);
        series.range_sum(
            past - Duration::days(window_days),
            past + Duration::days(window_days),
        )
    }

    /// Quantity sold in the trailing window of `days` days ending at `end`,
    /// inclusive on both sides (a 7-day window covers `end - 6 ..= end`).
    pub fn trailing_sum(&self, sku: &str, end: NaiveDate, days: i64) -> i64 {
        let Some(series) = self.series.get(sku) else {
            return 0;
        };
        series.range_sum(end - Duration::days(days - 1), end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn line(sku: &str, date: (i32, u32, u32), qty: i64) -> OrderLine {
        OrderLine {
            order_id: String::new(),
            sku: sku.to_string(),
            product_name: format!("{sku} name"),
            category: None,
            channel: "Webstore".to_string(),
            order_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            quantity: qty,
            unit_price: Decimal::ZERO,
            cost_price: Decimal::ZERO,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_sum_matches_hand_computed_scenario() {
        // 2025-01-10 minus 365 days crosses the 2024 leap day and lands on
        // 2024-01-11; the ±3d window [2024-01-08 .. 2024-01-14] catches both
        // rows.
        let index = HistoryIndex::build(&[
            line("A1", (2024, 1, 10), 5),
            line("A1", (2024, 1, 12), 3),
        ]);
        assert_eq!(index.window_sum("A1", date(2025, 1, 10), 3), 8);
    }

    #[test]
    fn window_edges_are_inclusive() {
        // target 2025-01-09 -> past 2024-01-10, window [2024-01-07 .. 2024-01-13].
        let index = HistoryIndex::build(&[
            line("A1", (2024, 1, 7), 2),
            line("A1", (2024, 1, 13), 4),
            line("A1", (2024, 1, 14), 100),
        ]);
        assert_eq!(index.window_sum("A1", date(2025, 1, 9), 3), 6);
    }

    #[test]
    fn unknown_sku_sums_to_zero() {
        let index = HistoryIndex::build(&[line("A1", (2024, 1, 10), 5)]);
        assert_eq!(index.window_sum("nope", date(2025, 1, 10), 3), 0);
        assert_eq!(index.trailing_sum("nope", date(2025, 1, 10), 7), 0);
    }

    #[test]
    fn offset_is_a_fixed_365_days_across_leap_years() {
        // 2025-02-27 minus 365 days spans 2024-02-29 and lands on
        // 2024-02-28, one day past the calendar anniversary. A zero-radius
        // window makes the drift visible.
        let index = HistoryIndex::build(&[line("A1", (2024, 2, 27), 9)]);
        assert_eq!(index.window_sum("A1", date(2025, 2, 27), 0), 0);
        let index = HistoryIndex::build(&[line("A1", (2024, 2, 28), 9)]);
        assert_eq!(index.window_sum("A1", date(2025, 2, 27), 0), 9);
    }

    #[test]
    fn trailing_sum_is_inclusive_of_both_ends() {
        let index = HistoryIndex::build(&[
            line("A1", (2025, 1, 1), 1),
            line("A1", (2025, 1, 4), 2),
            line("A1", (2025, 1, 7), 4),
        ]);
        // 7-day window ending 2025-01-07 covers 2025-01-01 ..= 2025-01-07.
        assert_eq!(index.trailing_sum("A1", date(2025, 1, 7), 7), 7);
        assert_eq!(index.trailing_sum("A1", date(2025, 1, 7), 3), 4);
    }

    #[test]
    fn max_order_date_tracks_snapshot() {
        let index = HistoryIndex::build(&[
            line("A1", (2024, 5, 1), 1),
            line("B2", (2024, 8, 9), 1),
        ]);
        assert_eq!(index.max_order_date(), Some(date(2024, 8, 9)));
        assert_eq!(HistoryIndex::build(&[]).max_order_date(), None);
    }

    #[test]
    fn skus_iterate_in_lexical_order() {
        let index = HistoryIndex::build(&[
            line("B2", (2024, 1, 1), 1),
            line("A1", (2024, 1, 1), 1),
        ]);
        let skus: Vec<_> = index.skus().collect();
        assert_eq!(skus, vec!["A1", "B2"]);
    }
}
