use std::collections::{BTreeMap, HashMap};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    config::ForecastDefaults,
    errors::ServiceError,
    models::Horizon,
    services::forecasting::ForecastRow,
};

/// Stock on hand injected into the planning run. Absent SKUs in a per-SKU
/// feed count as zero on hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CurrentInventory {
    Flat(i64),
    PerSku(HashMap<String, i64>),
}

impl CurrentInventory {
    pub fn for_sku(&self, sku: &str) -> i64 {
        match self {
            Self::Flat(level) => *level,
            Self::PerSku(levels) => levels.get(sku).copied().unwrap_or(0),
        }
    }
}

/// Per-SKU inventory plan derived from a forecast row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRow {
    pub sku: String,
    pub product_name: String,
    pub forecast_qty: BTreeMap<Horizon, Decimal>,
    pub safety_stock: BTreeMap<Horizon, Decimal>,
    pub recommended_inventory: BTreeMap<Horizon, Decimal>,
    pub current_inventory: i64,
    /// Units to order against the largest selected horizon, clamped at zero.
    pub po_quantity: i64,
}

/// Turns forecast rows into safety stock, recommended inventory, and a
/// purchase-order quantity per SKU.
#[derive(Clone)]
pub struct InventoryPlanningService {
    defaults: ForecastDefaults,
}

impl InventoryPlanningService {
    pub fn new(defaults: ForecastDefaults) -> Self {
        Self { defaults }
    }

    /// `safety_stock_h = forecast_qty_h × safety_pct/100`,
    /// `recommended_inventory_h = forecast_qty_h + safety_stock_h`, and the
    /// PO quantity is `recommended` for the largest horizon minus stock on
    /// hand, rounded and clamped at zero.
    #[instrument(skip(self, forecast_rows, current_inventory), fields(rows = forecast_rows.len()))]
    pub fn recommend(
        &self,
        forecast_rows: &[ForecastRow],
        horizons: &[Horizon],
        safety_pct: Option<Decimal>,
        current_inventory: &CurrentInventory,
    ) -> Result<Vec<RecommendationRow>, ServiceError> {
        let Some(&main_horizon) = horizons.iter().max() else {
            return Err(ServiceError::InvalidConfiguration(
                "at least one planning horizon must be selected".to_string(),
            ));
        };
        let safety_pct = safety_pct.unwrap_or_else(|| Decimal::from(self.defaults.safety_pct));
        if safety_pct < Decimal::ZERO || safety_pct > Decimal::from(100) {
            return Err(ServiceError::InvalidConfiguration(format!(
                "safety percentage must be within 0..=100, got {safety_pct}"
            )));
        }
        let safety_ratio = safety_pct / Decimal::from(100);

        let rows = forecast_rows
            .iter()
            .map(|row| {
                let mut forecast_qty = BTreeMap::new();
                let mut safety_stock = BTreeMap::new();
                let mut recommended_inventory = BTreeMap::new();
                for &horizon in horizons {
                    let forecast = row
                        .forecast_qty
                        .get(&horizon)
                        .copied()
                        .unwrap_or(Decimal::ZERO);
                    let safety = forecast * safety_ratio;
                    forecast_qty.insert(horizon, forecast);
                    safety_stock.insert(horizon, safety);
                    recommended_inventory.insert(horizon, forecast + safety);
                }

                let on_hand = current_inventory.for_sku(&row.sku);
                let shortfall = recommended_inventory[&main_horizon] - Decimal::from(on_hand);
                let po_quantity = shortfall
                    .round()
                    .max(Decimal::ZERO)
                    .to_i64()
                    .unwrap_or(i64::MAX);

                RecommendationRow {
                    sku: row.sku.clone(),
                    product_name: row.product_name.clone(),
                    forecast_qty,
                    safety_stock,
                    recommended_inventory,
                    current_inventory: on_hand,
                    po_quantity,
                }
            })
            .collect::<Vec<_>>();

        info!(rows = rows.len(), %main_horizon, "inventory plan computed");
        Ok(rows)
    }
}
