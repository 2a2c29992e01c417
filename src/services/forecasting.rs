use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    config::ForecastDefaults,
    errors::ServiceError,
    history::{HistoryIndex, SEASONAL_OFFSET_DAYS},
    models::Horizon,
    store::OrderHistoryStore,
};

/// Parameters for one forecast run. Unset fields fall back to the service's
/// configured defaults; `today` defaults to the latest order date in the
/// snapshot, which is how the dashboard anchors its reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// SKUs to project; `None` means every SKU in the snapshot. Requested
    /// SKUs without history still produce a row of zeros.
    pub skus: Option<Vec<String>>,
    pub horizons: Vec<Horizon>,
    pub today: Option<NaiveDate>,
    pub growth_factor: Option<Decimal>,
}

/// Per-SKU forecast figures across the requested horizons, with trailing
/// historical sums for context. Quantities are reported to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub sku: String,
    pub product_name: String,
    pub base_qty: BTreeMap<Horizon, Decimal>,
    pub forecast_qty: BTreeMap<Horizon, Decimal>,
    pub qty_last_7d: i64,
    pub qty_last_1mo: i64,
    pub qty_last_3mo: i64,
}

/// Projects per-SKU demand from a seasonal same-period-last-year window.
///
/// For every future day in a horizon, the quantity sold in a ±3-day window
/// around the same date last year (fixed 365-day offset) is accumulated into
/// the horizon's base quantity; the growth factor then scales the base into
/// the forecast figure.
#[derive(Clone)]
pub struct ForecastService {
    store: Arc<dyn OrderHistoryStore>,
    defaults: ForecastDefaults,
}

impl ForecastService {
    pub fn new(store: Arc<dyn OrderHistoryStore>, defaults: ForecastDefaults) -> Self {
        Self { store, defaults }
    }

    #[instrument(skip(self, request), fields(horizons = request.horizons.len()))]
    pub async fn forecast(
        &self,
        request: &ForecastRequest,
    ) -> Result<Vec<ForecastRow>, ServiceError> {
        if request.horizons.is_empty() {
            return Err(ServiceError::InvalidConfiguration(
                "at least one forecast horizon must be selected".to_string(),
            ));
        }
        let growth_factor = request.growth_factor.unwrap_or(self.defaults.growth_factor);
        if growth_factor.is_sign_negative() || growth_factor.is_zero() {
            return Err(ServiceError::InvalidConfiguration(format!(
                "growth factor must be positive, got {growth_factor}"
            )));
        }
        if let Some(skus) = &request.skus {
            if skus.is_empty() {
                return Ok(Vec::new());
            }
        }

        // The seasonal window never looks back further than the offset plus
        // the window radius, so the snapshot cutoff can be tight when the
        // caller anchors the run explicitly.
        let since = match request.today {
            Some(today) => {
                today - Duration::days(SEASONAL_OFFSET_DAYS + self.defaults.window_radius_days)
            }
            None => NaiveDate::MIN,
        };

        let lines = self.store.load_order_lines(since).await?;
        if lines.is_empty() {
            info!("empty order history snapshot, nothing to forecast");
            return Ok(Vec::new());
        }
        let index = HistoryIndex::build(&lines);

        let Some(today) = request.today.or_else(|| index.max_order_date()) else {
            return Ok(Vec::new());
        };

        let rows = project(
            &index,
            request.skus.as_deref(),
            &request.horizons,
            today,
            growth_factor,
            self.defaults.window_radius_days,
        );
        info!(rows = rows.len(), %today, "forecast computed");
        Ok(rows)
    }
}

/// Pure projection over a prebuilt index. Row order is deterministic (SKU
/// ascending) but carries no meaning beyond grouping-key uniqueness.
pub fn project(
    index: &HistoryIndex,
    skus: Option<&[String]>,
    horizons: &[Horizon],
    today: NaiveDate,
    growth_factor: Decimal,
    window_radius_days: i64,
) -> Vec<ForecastRow> {
    let scope: BTreeSet<&str> = match skus {
        Some(requested) => requested.iter().map(String::as_str).collect(),
        None => index.skus().collect(),
    };

    scope
        .into_iter()
        .map(|sku| {
            let mut base_qty = BTreeMap::new();
            let mut forecast_qty = BTreeMap::new();
            for &horizon in horizons {
                let mut base_total: i64 = 0;
                for offset in 1..=horizon.days() {
                    let target = today + Duration::days(offset);
                    base_total += index.window_sum(sku, target, window_radius_days);
                }
                let base = Decimal::from(base_total);
                base_qty.insert(horizon, base.round_dp(1));
                forecast_qty.insert(horizon, (base * growth_factor).round_dp(1));
            }
            ForecastRow {
                sku: sku.to_string(),
                product_name: index.product_name(sku).to_string(),
                base_qty,
                forecast_qty,
                qty_last_7d: index.trailing_sum(sku, today, 7),
                qty_last_1mo: index.trailing_sum(sku, today, 30),
                qty_last_3mo: index.trailing_sum(sku, today, 90),
            }
        })
        .collect()
}
