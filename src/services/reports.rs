use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{info, instrument};

use crate::{errors::ServiceError, models::OrderLine};

const DAYS_PER_MONTH: i64 = 30;

/// Headline figures for a date-filtered slice of order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesKpis {
    pub total_qty: i64,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    /// Inclusive day span of the reporting window.
    pub days: i64,
    /// Averages use 30-day months over the window span.
    pub avg_qty_per_month: Decimal,
    pub avg_revenue_per_month: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummaryRow {
    pub channel: String,
    /// Distinct order count within the channel.
    pub total_orders: i64,
    pub total_qty: i64,
    pub total_revenue: Decimal,
}

pub const GRAND_TOTAL_LABEL: &str = "Grand Total";

/// How long a SKU has gone unsold. SKUs sold within the last 7 days fall
/// outside every bucket and are omitted from the dead-stock report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum AgeBucket {
    #[strum(serialize = "7 days to 1 month")]
    #[serde(rename = "7 days to 1 month")]
    SevenDaysToOneMonth,
    #[strum(serialize = "1 to 3 months")]
    #[serde(rename = "1 to 3 months")]
    OneToThreeMonths,
    #[strum(serialize = "3 to 6 months")]
    #[serde(rename = "3 to 6 months")]
    ThreeToSixMonths,
    #[strum(serialize = "6 months to 1 year")]
    #[serde(rename = "6 months to 1 year")]
    SixMonthsToOneYear,
    #[strum(serialize = "more than 1 year")]
    #[serde(rename = "more than 1 year")]
    MoreThanOneYear,
}

impl AgeBucket {
    pub fn from_days(days: i64) -> Option<Self> {
        match days {
            7..=30 => Some(Self::SevenDaysToOneMonth),
            31..=90 => Some(Self::OneToThreeMonths),
            91..=180 => Some(Self::ThreeToSixMonths),
            181..=365 => Some(Self::SixMonthsToOneYear),
            d if d >= 366 => Some(Self::MoreThanOneYear),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadStockRow {
    pub sku: String,
    pub product_name: String,
    pub last_sold: NaiveDate,
    pub days_since_last_sale: i64,
    /// Calendar-aware elapsed label, e.g. `1 yr 2 mo 5 d`.
    pub time_since_last_sale: String,
    pub bucket: AgeBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadStockReport {
    /// Bucketed SKUs, ordered by bucket then SKU.
    pub rows: Vec<DeadStockRow>,
    /// SKU counts per bucket, every bucket present (possibly zero).
    pub bucket_counts: BTreeMap<AgeBucket, usize>,
    /// Unsold SKU counts per category, descending, categorized SKUs only.
    pub category_counts: Vec<(String, usize)>,
}

/// One month of a SKU's weekly sales matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthWeeks {
    /// `%b-%y` month label, e.g. `Jan-25`.
    pub label: String,
    /// (ISO week number, quantity) pairs, week ascending.
    pub weeks: Vec<(u32, i64)>,
    pub total: i64,
}

/// Trailing-365-day month × ISO-week quantity breakdown for one SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesMatrix {
    pub sku: String,
    pub product_name: String,
    /// Months in chronological order.
    pub months: Vec<MonthWeeks>,
}

/// Aggregations behind the dashboard's overview widgets: KPI strip, channel
/// summary, dead-stock analysis, and the per-SKU weekly sales matrices.
#[derive(Clone, Default)]
pub struct DashboardReportService;

impl DashboardReportService {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub fn sales_kpis(
        &self,
        lines: &[OrderLine],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SalesKpis, ServiceError> {
        if start > end {
            return Err(ServiceError::ValidationError(format!(
                "reporting window starts after it ends ({start} > {end})"
            )));
        }
        let days = (end - start).num_days() + 1;
        let mut total_qty = 0i64;
        let mut total_revenue = Decimal::ZERO;
        let mut total_cost = Decimal::ZERO;
        for line in lines.iter().filter(|l| within(l, start, end)) {
            total_qty += line.quantity;
            total_revenue += line.sale_amount();
            total_cost += line.cost_amount();
        }
        let months = Decimal::from(days) / Decimal::from(DAYS_PER_MONTH);
        Ok(SalesKpis {
            total_qty,
            total_revenue,
            total_cost,
            days,
            avg_qty_per_month: (Decimal::from(total_qty) / months).round_dp(1),
            avg_revenue_per_month: (total_revenue / months).round_dp(1),
        })
    }

    /// Per-channel order/quantity/revenue totals plus a `Grand Total` row.
    /// The grand total sums the per-channel distinct order counts, so an
    /// order split across channels counts once per channel it appears in.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub fn channel_summary(&self, lines: &[OrderLine]) -> Vec<ChannelSummaryRow> {
        let mut orders: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
        let mut qty: HashMap<&str, i64> = HashMap::new();
        let mut revenue: HashMap<&str, Decimal> = HashMap::new();
        for line in lines {
            orders
                .entry(line.channel.as_str())
                .or_default()
                .insert(line.order_id.as_str());
            *qty.entry(line.channel.as_str()).or_default() += line.quantity;
            *revenue.entry(line.channel.as_str()).or_default() += line.sale_amount();
        }
        if orders.is_empty() {
            return Vec::new();
        }

        let mut rows: Vec<ChannelSummaryRow> = orders
            .iter()
            .map(|(channel, ids)| ChannelSummaryRow {
                channel: channel.to_string(),
                total_orders: ids.len() as i64,
                total_qty: qty[channel],
                total_revenue: revenue[channel],
            })
            .collect();
        rows.push(ChannelSummaryRow {
            channel: GRAND_TOTAL_LABEL.to_string(),
            total_orders: rows.iter().map(|r| r.total_orders).sum(),
            total_qty: rows.iter().map(|r| r.total_qty).sum(),
            total_revenue: rows.iter().map(|r| r.total_revenue).sum(),
        });
        rows
    }

    #[instrument(skip(self, lines), fields(lines = lines.len(), %as_of))]
    pub fn dead_stock(&self, lines: &[OrderLine], as_of: NaiveDate) -> DeadStockReport {
        let mut last_sold: BTreeMap<&str, NaiveDate> = BTreeMap::new();
        let mut names: HashMap<&str, &str> = HashMap::new();
        let mut categories: HashMap<&str, &str> = HashMap::new();
        for line in lines {
            let entry = last_sold.entry(line.sku.as_str()).or_insert(line.order_date);
            *entry = (*entry).max(line.order_date);
            if !line.product_name.is_empty() {
                names.entry(line.sku.as_str()).or_insert(&line.product_name);
            }
            if let Some(category) = &line.category {
                categories.entry(line.sku.as_str()).or_insert(category);
            }
        }

        let mut rows = Vec::new();
        for (sku, sold) in &last_sold {
            let days = (as_of - *sold).num_days();
            let Some(bucket) = AgeBucket::from_days(days) else {
                continue;
            };
            rows.push(DeadStockRow {
                sku: sku.to_string(),
                product_name: names.get(sku).copied().unwrap_or_default().to_string(),
                last_sold: *sold,
                days_since_last_sale: days,
                time_since_last_sale: elapsed_label(*sold, as_of),
                bucket,
            });
        }
        rows.sort_by(|a, b| a.bucket.cmp(&b.bucket).then(a.sku.cmp(&b.sku)));

        let mut bucket_counts: BTreeMap<AgeBucket, usize> =
            AgeBucket::iter().map(|b| (b, 0)).collect();
        for row in &rows {
            *bucket_counts.entry(row.bucket).or_default() += 1;
        }

        let mut by_category: HashMap<&str, usize> = HashMap::new();
        for row in &rows {
            if let Some(category) = categories.get(row.sku.as_str()) {
                *by_category.entry(category).or_default() += 1;
            }
        }
        let mut category_counts: Vec<(String, usize)> = by_category
            .into_iter()
            .map(|(category, count)| (category.to_string(), count))
            .collect();
        category_counts.sort_by(|(ca, na), (cb, nb)| nb.cmp(na).then(ca.cmp(cb)));

        info!(dead_skus = rows.len(), "dead stock computed");
        DeadStockReport {
            rows,
            bucket_counts,
            category_counts,
        }
    }

    /// Weekly sales matrix for one SKU over the trailing 365 days. `None`
    /// when the SKU has no sales in that window.
    pub fn sales_matrix(
        &self,
        lines: &[OrderLine],
        sku: &str,
        as_of: NaiveDate,
    ) -> Option<SalesMatrix> {
        let cutoff = as_of - Duration::days(365);
        let mut months: BTreeMap<(i32, u32), BTreeMap<u32, i64>> = BTreeMap::new();
        let mut product_name = String::new();
        for line in lines
            .iter()
            .filter(|l| l.sku == sku && l.order_date >= cutoff)
        {
            if product_name.is_empty() && !line.product_name.is_empty() {
                product_name = line.product_name.clone();
            }
            *months
                .entry((line.order_date.year(), line.order_date.month()))
                .or_default()
                .entry(line.order_date.iso_week().week())
                .or_default() += line.quantity;
        }
        if months.is_empty() {
            return None;
        }

        let months = months
            .into_iter()
            .map(|((year, month), weeks)| {
                let label = NaiveDate::from_ymd_opt(year, month, 1)
                    .map(|d| d.format("%b-%y").to_string())
                    .unwrap_or_default();
                let total = weeks.values().sum();
                MonthWeeks {
                    label,
                    weeks: weeks.into_iter().collect(),
                    total,
                }
            })
            .collect();
        Some(SalesMatrix {
            sku: sku.to_string(),
            product_name,
            months,
        })
    }

    /// Matrices for every SKU with sales in the trailing year, SKU ascending.
    #[instrument(skip(self, lines), fields(lines = lines.len(), %as_of))]
    pub fn sales_matrices(&self, lines: &[OrderLine], as_of: NaiveDate) -> Vec<SalesMatrix> {
        let skus: std::collections::BTreeSet<&str> =
            lines.iter().map(|l| l.sku.as_str()).collect();
        skus.into_iter()
            .filter_map(|sku| self.sales_matrix(lines, sku, as_of))
            .collect()
    }
}

fn within(line: &OrderLine, start: NaiveDate, end: NaiveDate) -> bool {
    line.order_date >= start && line.order_date <= end
}

fn days_in_month(year: i32, month: u32) -> i64 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days(),
        _ => 30,
    }
}

/// Calendar-aware elapsed time between two dates, e.g. `1 yr 2 mo 5 d`;
/// `Today` when the dates coincide.
fn elapsed_label(from: NaiveDate, to: NaiveDate) -> String {
    let mut years = to.year() - from.year();
    let mut months = to.month() as i32 - from.month() as i32;
    let mut days = to.day() as i64 - from.day() as i64;
    if days < 0 {
        months -= 1;
        let (year, month) = if to.month() == 1 {
            (to.year() - 1, 12)
        } else {
            (to.year(), to.month() - 1)
        };
        days += days_in_month(year, month);
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }

    let mut parts = Vec::new();
    if years > 0 {
        parts.push(format!("{years} yr{}", if years > 1 { "s" } else { "" }));
    }
    if months > 0 {
        parts.push(format!("{months} mo"));
    }
    if days > 0 {
        parts.push(format!("{days} d"));
    }
    if parts.is_empty() {
        "Today".to_string()
    } else {
        parts.join(" ")
    }
}
