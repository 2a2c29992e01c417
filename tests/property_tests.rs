use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use despatch_analytics::{
    config::ForecastDefaults,
    history::HistoryIndex,
    models::{Horizon, OrderLine},
    services::{
        forecasting, AbcAnalysisService, AbcGroupBy, AbcMetric, CurrentInventory,
        InventoryPlanningService, LedgerRow, StockReconciliationService, WarehouseRow,
    },
};

use despatch_analytics::config::ReconciliationConfig;

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2023i32..=2025, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("valid date"))
}

fn arb_line() -> impl Strategy<Value = OrderLine> {
    (
        "[A-Z][0-9]{2}",
        arb_date(),
        0i64..500,
        0u32..10_000,
        "ord-[0-9]{3}",
        prop_oneof![Just("Webstore"), Just("Amazon"), Just("Ebay")],
    )
        .prop_map(|(sku, order_date, quantity, pence, order_id, channel)| OrderLine {
            order_id,
            product_name: format!("{sku} product"),
            category: None,
            channel: channel.to_string(),
            order_date,
            quantity,
            unit_price: Decimal::new(pence as i64, 2),
            cost_price: Decimal::ZERO,
            sku,
        })
}

proptest! {
    #[test]
    fn forecast_is_base_times_growth_rounded(lines in prop::collection::vec(arb_line(), 0..60)) {
        let index = HistoryIndex::build(&lines);
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
        let growth = Decimal::new(105, 2);
        let rows = forecasting::project(&index, None, &Horizon::all(), today, growth, 3);
        for row in &rows {
            for &h in &Horizon::all() {
                let base = row.base_qty[&h];
                prop_assert!(base >= Decimal::ZERO);
                prop_assert_eq!(row.forecast_qty[&h], (base * growth).round_dp(1));
            }
        }
    }

    #[test]
    fn recommended_inventory_dominates_forecast_and_po_is_non_negative(
        lines in prop::collection::vec(arb_line(), 0..40),
        safety_pct in 0u32..=100,
        on_hand in -50i64..500,
    ) {
        let index = HistoryIndex::build(&lines);
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
        let horizons = Horizon::all();
        let forecast = forecasting::project(&index, None, &horizons, today, Decimal::new(105, 2), 3);

        let planner = InventoryPlanningService::new(ForecastDefaults::default());
        let plan = planner
            .recommend(
                &forecast,
                &horizons,
                Some(Decimal::from(safety_pct)),
                &CurrentInventory::Flat(on_hand),
            )
            .expect("valid planning inputs");
        for row in &plan {
            prop_assert!(row.po_quantity >= 0);
            for &h in &horizons {
                prop_assert!(row.recommended_inventory[&h] >= row.forecast_qty[&h]);
                prop_assert!(row.safety_stock[&h] >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn abc_classes_are_a_contiguous_prefix(lines in prop::collection::vec(arb_line(), 0..60)) {
        let rows = AbcAnalysisService::new().classify(&lines, AbcGroupBy::Sku, AbcMetric::Quantity);
        let mut past_a = false;
        let mut past_b = false;
        let mut previous = Decimal::ZERO;
        for row in &rows {
            prop_assert!(row.cumulative_pct >= previous);
            previous = row.cumulative_pct;
            match row.class {
                despatch_analytics::services::AbcClass::A => prop_assert!(!past_a && !past_b),
                despatch_analytics::services::AbcClass::B => {
                    past_a = true;
                    prop_assert!(!past_b);
                }
                despatch_analytics::services::AbcClass::C => {
                    past_a = true;
                    past_b = true;
                }
            }
        }
        if let Some(last) = rows.last() {
            prop_assert_eq!(last.cumulative_pct, Decimal::ONE);
        }
    }

    #[test]
    fn reconciliation_adjustments_sum_to_the_delta(
        free_stock in -20i64..200,
        quantities in prop::collection::vec(0i64..50, 1..6),
    ) {
        let ledger = [LedgerRow { sku: "S".to_string(), free_stock }];
        let warehouse: Vec<WarehouseRow> = quantities
            .iter()
            .enumerate()
            .map(|(i, &quantity)| WarehouseRow {
                sku: "S".to_string(),
                location: format!("L{i}"),
                quantity,
            })
            .collect();
        let held: i64 = quantities.iter().sum();

        let service = StockReconciliationService::new(ReconciliationConfig::default());
        let lines = service.reconcile(&ledger, &warehouse);

        let booked: i64 = lines.iter().map(|l| l.quantity).sum();
        let delta = free_stock.max(0) - held;
        if delta >= 0 {
            prop_assert_eq!(booked, delta);
            if delta == 0 {
                prop_assert!(lines.is_empty());
            }
        } else {
            // Removals cover the deficit up to what locations actually hold.
            prop_assert_eq!(booked, delta.max(-held));
            for line in &lines {
                prop_assert!(line.quantity < 0);
            }
        }
    }

    #[test]
    fn window_sum_equals_brute_force(
        lines in prop::collection::vec(arb_line(), 0..40),
        radius in 0i64..5,
    ) {
        let index = HistoryIndex::build(&lines);
        let target = NaiveDate::from_ymd_opt(2025, 3, 15).expect("valid date");
        let past = target - chrono::Duration::days(365);
        for sku in lines.iter().map(|l| l.sku.as_str()).collect::<std::collections::BTreeSet<_>>() {
            let expected: i64 = lines
                .iter()
                .filter(|l| l.sku == sku)
                .filter(|l| {
                    l.order_date >= past - chrono::Duration::days(radius)
                        && l.order_date <= past + chrono::Duration::days(radius)
                })
                .map(|l| l.quantity)
                .sum();
            prop_assert_eq!(index.window_sum(sku, target, radius), expected);
        }
    }
}
