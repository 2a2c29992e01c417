use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Loosely typed row from an uploaded supplier sales sheet. Header
/// normalization (trim, lowercase, spaces to underscores) happens at parse
/// time; this type carries the already-mapped cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSupplierRow {
    pub product_code: Option<String>,
    pub description: Option<String>,
    pub units_sold: Option<String>,
    pub net_sales: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierSalesRow {
    pub product_code: String,
    pub description: String,
    /// Negative for returns.
    pub units_sold: i64,
    pub net_sales: Decimal,
}

/// Cleaned rows plus the count of rows dropped for having no product code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierCleanReport {
    pub rows: Vec<SupplierSalesRow>,
    pub excluded: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierInsights {
    pub total_unique_products: usize,
    pub total_units_sold: i64,
    pub total_net_sales: Decimal,
    /// Net sales over units sold, 2 decimals; zero when no units moved.
    pub avg_price_per_unit: Decimal,
    /// Top 10 by units sold.
    pub top_sellers: Vec<SupplierSalesRow>,
    /// Bottom 10 among positive sellers.
    pub slow_sellers: Vec<SupplierSalesRow>,
    /// Top 10 by net sales.
    pub top_value_products: Vec<SupplierSalesRow>,
    /// Products with negative units (returns outweighing sales).
    pub returns: Vec<SupplierSalesRow>,
    /// Products that sold exactly one unit.
    pub one_time_sellers: Vec<SupplierSalesRow>,
}

const TOP_N: usize = 10;

/// Cleans uploaded supplier sales rows and derives the weekly insight pack.
#[derive(Clone, Default)]
pub struct SupplierInsightsService;

impl SupplierInsightsService {
    pub fn new() -> Self {
        Self
    }

    /// Drops rows without a product code (counted, never fatal) and coerces
    /// blank or unparseable numerics to zero.
    #[instrument(skip(self, raw), fields(rows = raw.len()))]
    pub fn clean(&self, raw: Vec<RawSupplierRow>) -> SupplierCleanReport {
        let mut rows = Vec::with_capacity(raw.len());
        let mut excluded = 0usize;
        for (position, row) in raw.into_iter().enumerate() {
            let code = row
                .product_code
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty());
            let Some(code) = code else {
                warn!(position, "supplier row without product code dropped");
                excluded += 1;
                continue;
            };
            rows.push(SupplierSalesRow {
                product_code: code.to_string(),
                description: row.description.unwrap_or_default().trim().to_string(),
                units_sold: coerce_int(row.units_sold.as_deref()),
                net_sales: coerce_decimal(row.net_sales.as_deref()),
            });
        }
        info!(accepted = rows.len(), excluded, "supplier sheet cleaned");
        SupplierCleanReport { rows, excluded }
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn insights(&self, rows: &[SupplierSalesRow]) -> SupplierInsights {
        // Aggregate per product code in case the sheet repeats codes.
        let mut by_code: HashMap<&str, SupplierSalesRow> = HashMap::new();
        for row in rows {
            by_code
                .entry(row.product_code.as_str())
                .and_modify(|agg| {
                    agg.units_sold += row.units_sold;
                    agg.net_sales += row.net_sales;
                })
                .or_insert_with(|| row.clone());
        }
        let mut products: Vec<SupplierSalesRow> = by_code.into_values().collect();
        products.sort_by(|a, b| a.product_code.cmp(&b.product_code));

        let total_units_sold: i64 = products.iter().map(|p| p.units_sold).sum();
        let total_net_sales: Decimal = products.iter().map(|p| p.net_sales).sum();
        let avg_price_per_unit = if total_units_sold > 0 {
            (total_net_sales / Decimal::from(total_units_sold)).round_dp(2)
        } else {
            Decimal::ZERO
        };

        let mut by_units = products.clone();
        by_units.sort_by(|a, b| {
            b.units_sold
                .cmp(&a.units_sold)
                .then(a.product_code.cmp(&b.product_code))
        });
        let top_sellers = by_units.iter().take(TOP_N).cloned().collect();

        let mut positive: Vec<SupplierSalesRow> = products
            .iter()
            .filter(|p| p.units_sold > 0)
            .cloned()
            .collect();
        positive.sort_by(|a, b| {
            a.units_sold
                .cmp(&b.units_sold)
                .then(a.product_code.cmp(&b.product_code))
        });
        let slow_sellers = positive.iter().take(TOP_N).cloned().collect();

        let mut by_value = products.clone();
        by_value.sort_by(|a, b| {
            b.net_sales
                .cmp(&a.net_sales)
                .then(a.product_code.cmp(&b.product_code))
        });
        let top_value_products = by_value.iter().take(TOP_N).cloned().collect();

        let returns = products
            .iter()
            .filter(|p| p.units_sold < 0)
            .cloned()
            .collect();
        let one_time_sellers = products
            .iter()
            .filter(|p| p.units_sold == 1)
            .cloned()
            .collect();

        SupplierInsights {
            total_unique_products: products.len(),
            total_units_sold,
            total_net_sales,
            avg_price_per_unit,
            top_sellers,
            slow_sellers,
            top_value_products,
            returns,
            one_time_sellers,
        }
    }
}

fn coerce_int(value: Option<&str>) -> i64 {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn coerce_decimal(value: Option<&str>) -> Decimal {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| Decimal::from_str(v).ok())
        .unwrap_or(Decimal::ZERO)
}
