#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;

use despatch_analytics::models::OrderLine;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn order_line(
    order_id: &str,
    sku: &str,
    channel: &str,
    order_date: NaiveDate,
    quantity: i64,
    unit_price: Decimal,
) -> OrderLine {
    OrderLine {
        order_id: order_id.to_string(),
        sku: sku.to_string(),
        product_name: format!("{sku} product"),
        category: Some("General".to_string()),
        channel: channel.to_string(),
        order_date,
        quantity,
        unit_price,
        cost_price: Decimal::ONE,
    }
}

/// The hand-computed seasonal scenario used across the forecasting suites:
/// two rows of SKU `A1` in January 2024, anchored at 2025-01-05.
pub fn seasonal_fixture() -> Vec<OrderLine> {
    vec![
        order_line("ord-1", "A1", "Webstore", date(2024, 1, 10), 5, Decimal::TEN),
        order_line("ord-2", "A1", "Webstore", date(2024, 1, 12), 3, Decimal::TEN),
    ]
}
