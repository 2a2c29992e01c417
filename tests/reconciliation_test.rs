use despatch_analytics::{
    config::ReconciliationConfig,
    services::{
        LedgerRow, RawSupplierRow, StockReconciliationService, SupplierInsightsService,
        WarehouseRow,
    },
};

fn ledger(sku: &str, free: i64) -> LedgerRow {
    LedgerRow {
        sku: sku.to_string(),
        free_stock: free,
    }
}

fn held(sku: &str, location: &str, qty: i64) -> WarehouseRow {
    WarehouseRow {
        sku: sku.to_string(),
        location: location.to_string(),
        quantity: qty,
    }
}

#[test]
fn delta_report_covers_surplus_deficit_and_balance() {
    let service = StockReconciliationService::new(ReconciliationConfig {
        client: "MPTC".to_string(),
        warehouse: "Main".to_string(),
    });
    let ledger_rows = [ledger("UP", 20), ledger("DOWN", 1), ledger("EVEN", 8)];
    let warehouse_rows = [
        held("UP", "A1", 4),
        held("UP", "B2", 6),
        held("DOWN", "C3", 5),
        held("DOWN", "D4", 2),
        held("EVEN", "E5", 8),
    ];
    let lines = service.reconcile(&ledger_rows, &warehouse_rows);

    // UP: surplus of 10 booked once at its first location.
    let up: Vec<_> = lines.iter().filter(|l| l.sku == "UP").collect();
    assert_eq!(up.len(), 1);
    assert_eq!(up[0].location, "A1");
    assert_eq!(up[0].quantity, 10);
    assert_eq!(up[0].client, "MPTC");

    // DOWN: deficit of 6 drains D4 (2) then C3 (4).
    let down: Vec<_> = lines.iter().filter(|l| l.sku == "DOWN").collect();
    assert_eq!(down.len(), 2);
    assert_eq!((down[0].location.as_str(), down[0].quantity), ("D4", -2));
    assert_eq!((down[1].location.as_str(), down[1].quantity), ("C3", -4));

    assert!(lines.iter().all(|l| l.sku != "EVEN"));
}

#[test]
fn removal_lines_never_exceed_location_holdings() {
    let service = StockReconciliationService::new(ReconciliationConfig::default());
    let lines = service.reconcile(
        &[ledger("A", 0)],
        &[held("A", "L1", 3), held("A", "L2", 5)],
    );
    for line in &lines {
        let held_at = if line.location == "L1" { 3 } else { 5 };
        assert!(-line.quantity <= held_at);
    }
    let total: i64 = lines.iter().map(|l| l.quantity).sum();
    assert_eq!(total, -8);
}

#[test]
fn supplier_pipeline_cleans_then_summarizes() {
    let service = SupplierInsightsService::new();
    let report = service.clean(vec![
        RawSupplierRow {
            product_code: Some("P1".to_string()),
            description: Some("Widget".to_string()),
            units_sold: Some("10".to_string()),
            net_sales: Some("120.50".to_string()),
        },
        RawSupplierRow {
            product_code: None,
            description: Some("headerless".to_string()),
            units_sold: Some("99".to_string()),
            net_sales: Some("999".to_string()),
        },
        RawSupplierRow {
            product_code: Some("P2".to_string()),
            description: None,
            units_sold: Some("-1".to_string()),
            net_sales: Some("-12".to_string()),
        },
    ]);
    assert_eq!(report.excluded, 1);

    let insights = service.insights(&report.rows);
    assert_eq!(insights.total_unique_products, 2);
    assert_eq!(insights.total_units_sold, 9);
    assert_eq!(insights.returns.len(), 1);
    assert_eq!(insights.returns[0].product_code, "P2");
    assert_eq!(insights.top_sellers[0].product_code, "P1");
}
