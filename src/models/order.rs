use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// One despatched order line from the history feed. Immutable once ingested;
/// the analytics only ever derive aggregates from these rows.
///
/// The forecasting math needs `sku`, `order_date` and `quantity`; the
/// remaining fields enrich downstream reports and default to empty values
/// when the feed omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub order_id: String,
    pub sku: String,
    pub product_name: String,
    pub category: Option<String>,
    pub channel: String,
    pub order_date: NaiveDate,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub cost_price: Decimal,
}

impl OrderLine {
    pub fn sale_amount(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }

    pub fn cost_amount(&self) -> Decimal {
        Decimal::from(self.quantity) * self.cost_price
    }
}

/// Loosely-typed ingress row as it arrives from a feed or upload, before
/// field-level validation. Everything is optional text; `try_into_line`
/// decides what is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOrderLine {
    pub order_id: Option<String>,
    pub sku: Option<String>,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub channel: Option<String>,
    pub order_date: Option<String>,
    pub quantity: Option<String>,
    pub unit_price: Option<String>,
    pub cost_price: Option<String>,
}

/// Why a single row was excluded from ingestion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("unparseable date `{0}`")]
    InvalidDate(String),
    #[error("invalid value `{value}` for field `{field}`")]
    InvalidNumber { field: &'static str, value: String },
}

impl RawOrderLine {
    /// Validates the row into an [`OrderLine`]. Required fields are `sku`,
    /// `order_date` and a non-negative `quantity`; optional enrichers fall
    /// back to empty defaults rather than rejecting the row.
    pub fn try_into_line(self) -> Result<OrderLine, RowError> {
        let sku = self
            .sku
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(RowError::MissingField("sku"))?
            .to_string();

        let date_text = self
            .order_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(RowError::MissingField("order_date"))?;
        let order_date = parse_order_date(date_text)
            .ok_or_else(|| RowError::InvalidDate(date_text.to_string()))?;

        let qty_text = self
            .quantity
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(RowError::MissingField("quantity"))?;
        let quantity: i64 = qty_text.parse().map_err(|_| RowError::InvalidNumber {
            field: "quantity",
            value: qty_text.to_string(),
        })?;
        if quantity < 0 {
            return Err(RowError::InvalidNumber {
                field: "quantity",
                value: qty_text.to_string(),
            });
        }

        let unit_price = parse_optional_decimal(self.unit_price.as_deref(), "unit_price")?;
        let cost_price = parse_optional_decimal(self.cost_price.as_deref(), "cost_price")?;

        Ok(OrderLine {
            order_id: self.order_id.unwrap_or_default().trim().to_string(),
            sku,
            product_name: self.product_name.unwrap_or_default().trim().to_string(),
            category: self
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            channel: self.channel.unwrap_or_default().trim().to_string(),
            order_date,
            quantity,
            unit_price,
            cost_price,
        })
    }
}

fn parse_order_date(text: &str) -> Option<NaiveDate> {
    // Date-only first; feeds that carry a timestamp get the time-of-day
    // normalized away.
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_optional_decimal(
    text: Option<&str>,
    field: &'static str,
) -> Result<Decimal, RowError> {
    match text.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Decimal::ZERO),
        Some(value) => value.parse().map_err(|_| RowError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}

/// Outcome of a batch ingestion: the usable rows plus a quarantine count.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub lines: Vec<OrderLine>,
    pub excluded: usize,
}

/// Validates a batch of raw rows. Malformed rows are excluded and counted,
/// never allowed to abort the batch; each exclusion is logged with its
/// position and reason.
pub fn ingest_rows(raw: Vec<RawOrderLine>) -> IngestReport {
    let total = raw.len();
    let mut report = IngestReport::default();
    for (position, row) in raw.into_iter().enumerate() {
        match row.try_into_line() {
            Ok(line) => report.lines.push(line),
            Err(reason) => {
                warn!(position, %reason, "excluding malformed order row");
                report.excluded += 1;
            }
        }
    }
    debug_assert_eq!(report.lines.len() + report.excluded, total);
    report
}
