use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::ReconciliationConfig;

pub const COMMENT_ADDED: &str = "Quantity added to inventory";
pub const COMMENT_REMOVED: &str = "Quantity removed from inventory";

/// One SKU's free stock according to the accounting ledger. Negative free
/// stock is clamped to zero at intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub sku: String,
    pub free_stock: i64,
}

/// One location's held quantity according to the warehouse system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseRow {
    pub sku: String,
    pub location: String,
    pub quantity: i64,
}

/// Adjustment line in the warehouse system's import format. The best-before,
/// batch, and serial columns are part of the template and always empty here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub client: String,
    pub sku: String,
    pub warehouse: String,
    pub location: String,
    pub best_before: String,
    pub batch_no: String,
    pub serial_no: String,
    pub quantity: i64,
    pub comment: String,
}

/// Produces the ledger-vs-warehouse delta report: location-level adjustment
/// lines that bring warehouse stock in line with the ledger.
#[derive(Clone)]
pub struct StockReconciliationService {
    config: ReconciliationConfig,
}

impl StockReconciliationService {
    pub fn new(config: ReconciliationConfig) -> Self {
        Self { config }
    }

    /// Per SKU present in both feeds: `delta = ledger − Σ warehouse`.
    /// A surplus books one addition at the SKU's first warehouse location; a
    /// deficit drains locations ordered by (quantity, location) until
    /// covered. Zero deltas produce no line.
    #[instrument(
        skip(self, ledger, warehouse),
        fields(ledger_rows = ledger.len(), warehouse_rows = warehouse.len())
    )]
    pub fn reconcile(
        &self,
        ledger: &[LedgerRow],
        warehouse: &[WarehouseRow],
    ) -> Vec<StockAdjustment> {
        let mut totals: HashMap<&str, i64> = HashMap::new();
        let mut locations: HashMap<&str, Vec<&WarehouseRow>> = HashMap::new();
        for row in warehouse {
            *totals.entry(row.sku.as_str()).or_default() += row.quantity;
            locations.entry(row.sku.as_str()).or_default().push(row);
        }

        let mut adjustments = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for row in ledger {
            if !seen.insert(row.sku.as_str()) {
                continue;
            }
            let Some(&held) = totals.get(row.sku.as_str()) else {
                continue;
            };
            let delta = row.free_stock.max(0) - held;
            if delta > 0 {
                if let Some(first) = locations[row.sku.as_str()].first() {
                    adjustments.push(self.adjustment(&row.sku, &first.location, delta));
                }
            } else if delta < 0 {
                let mut remaining = -delta;
                let mut ordered = locations[row.sku.as_str()].clone();
                ordered.sort_by(|a, b| {
                    a.quantity
                        .cmp(&b.quantity)
                        .then(a.location.cmp(&b.location))
                });
                for loc in ordered {
                    if remaining <= 0 {
                        break;
                    }
                    let reduce = loc.quantity.min(remaining);
                    remaining -= reduce;
                    if reduce != 0 {
                        adjustments.push(self.adjustment(&row.sku, &loc.location, -reduce));
                    }
                }
            }
        }

        info!(lines = adjustments.len(), "delta report computed");
        adjustments
    }

    fn adjustment(&self, sku: &str, location: &str, quantity: i64) -> StockAdjustment {
        StockAdjustment {
            client: self.config.client.clone(),
            sku: sku.to_string(),
            warehouse: self.config.warehouse.clone(),
            location: location.to_string(),
            best_before: String::new(),
            batch_no: String::new(),
            serial_no: String::new(),
            quantity,
            comment: if quantity > 0 { COMMENT_ADDED } else { COMMENT_REMOVED }.to_string(),
        }
    }
}
