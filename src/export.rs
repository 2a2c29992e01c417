//! Delimited exports for the report tables. Quantities follow the
//! `base_qty_<label>` / `forecast_qty_<label>` / `safety_stock_<label>` /
//! `recommended_inventory_<label>` column convention with labels
//! `7d` / `1mo` / `3mo`.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::str::FromStr;

use csv::Writer;
use rust_decimal::Decimal;

use crate::{
    errors::ServiceError,
    models::Horizon,
    services::{AbcRow, ForecastRow, RecommendationRow, StockAdjustment},
};

pub fn write_forecast_csv<W: Write>(
    writer: W,
    rows: &[ForecastRow],
    horizons: &[Horizon],
) -> Result<(), ServiceError> {
    let mut out = Writer::from_writer(writer);

    let mut header = vec!["sku".to_string(), "product_name".to_string()];
    for horizon in horizons {
        header.push(format!("base_qty_{}", horizon.label()));
        header.push(format!("forecast_qty_{}", horizon.label()));
    }
    header.extend(
        ["qty_last_7d", "qty_last_1mo", "qty_last_3mo"]
            .iter()
            .map(|s| s.to_string()),
    );
    out.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.sku.clone(), row.product_name.clone()];
        for horizon in horizons {
            record.push(decimal_cell(row.base_qty.get(horizon)));
            record.push(decimal_cell(row.forecast_qty.get(horizon)));
        }
        record.push(row.qty_last_7d.to_string());
        record.push(row.qty_last_1mo.to_string());
        record.push(row.qty_last_3mo.to_string());
        out.write_record(&record)?;
    }
    flush(out)
}

pub fn forecast_csv_string(
    rows: &[ForecastRow],
    horizons: &[Horizon],
) -> Result<String, ServiceError> {
    let mut buffer = Vec::new();
    write_forecast_csv(&mut buffer, rows, horizons)?;
    String::from_utf8(buffer).map_err(|e| ServiceError::ExportError(e.to_string()))
}

/// Reads a forecast CSV back into rows. Reproduces `sku` and every numeric
/// column exactly at the exported 1-decimal precision.
pub fn parse_forecast_csv<R: Read>(reader: R) -> Result<Vec<ForecastRow>, ServiceError> {
    let mut input = csv::Reader::from_reader(reader);
    let headers = input.headers()?.clone();

    enum Column {
        Sku,
        ProductName,
        Base(Horizon),
        Forecast(Horizon),
        Last7d,
        Last1mo,
        Last3mo,
    }
    let mut columns = Vec::with_capacity(headers.len());
    for header in headers.iter() {
        let column = if header == "sku" {
            Column::Sku
        } else if header == "product_name" {
            Column::ProductName
        } else if header == "qty_last_7d" {
            Column::Last7d
        } else if header == "qty_last_1mo" {
            Column::Last1mo
        } else if header == "qty_last_3mo" {
            Column::Last3mo
        } else if let Some(label) = header.strip_prefix("base_qty_") {
            Column::Base(parse_horizon(label)?)
        } else if let Some(label) = header.strip_prefix("forecast_qty_") {
            Column::Forecast(parse_horizon(label)?)
        } else {
            return Err(ServiceError::ExportError(format!(
                "unrecognized forecast column: {header}"
            )));
        };
        columns.push(column);
    }

    let mut rows = Vec::new();
    for record in input.records() {
        let record = record?;
        let mut row = ForecastRow {
            sku: String::new(),
            product_name: String::new(),
            base_qty: BTreeMap::new(),
            forecast_qty: BTreeMap::new(),
            qty_last_7d: 0,
            qty_last_1mo: 0,
            qty_last_3mo: 0,
        };
        for (column, cell) in columns.iter().zip(record.iter()) {
            match column {
                Column::Sku => row.sku = cell.to_string(),
                Column::ProductName => row.product_name = cell.to_string(),
                Column::Base(h) => {
                    row.base_qty.insert(*h, parse_decimal(cell)?);
                }
                Column::Forecast(h) => {
                    row.forecast_qty.insert(*h, parse_decimal(cell)?);
                }
                Column::Last7d => row.qty_last_7d = parse_int(cell)?,
                Column::Last1mo => row.qty_last_1mo = parse_int(cell)?,
                Column::Last3mo => row.qty_last_3mo = parse_int(cell)?,
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

pub fn write_recommendation_csv<W: Write>(
    writer: W,
    rows: &[RecommendationRow],
    horizons: &[Horizon],
) -> Result<(), ServiceError> {
    let mut out = Writer::from_writer(writer);

    let mut header = vec!["sku".to_string(), "product_name".to_string()];
    for horizon in horizons {
        header.push(format!("forecast_qty_{}", horizon.label()));
        header.push(format!("safety_stock_{}", horizon.label()));
        header.push(format!("recommended_inventory_{}", horizon.label()));
    }
    header.push("current_inventory".to_string());
    header.push("po_quantity".to_string());
    out.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.sku.clone(), row.product_name.clone()];
        // Planning figures keep their full precision; only the forecast
        // table is normalized to 1 decimal.
        for horizon in horizons {
            record.push(plain_cell(row.forecast_qty.get(horizon)));
            record.push(plain_cell(row.safety_stock.get(horizon)));
            record.push(plain_cell(row.recommended_inventory.get(horizon)));
        }
        record.push(row.current_inventory.to_string());
        record.push(row.po_quantity.to_string());
        out.write_record(&record)?;
    }
    flush(out)
}

/// `key_header` names the grouping column, e.g. `sku` or `channel`.
pub fn write_abc_csv<W: Write>(
    writer: W,
    rows: &[AbcRow],
    key_header: &str,
) -> Result<(), ServiceError> {
    let mut out = Writer::from_writer(writer);
    out.write_record([
        key_header,
        "product_name",
        "metric_value",
        "cumulative_value",
        "cumulative_pct",
        "abc_class",
    ])?;
    for row in rows {
        out.write_record([
            row.key.clone(),
            row.product_name.clone(),
            row.metric_value.to_string(),
            row.cumulative_value.to_string(),
            row.cumulative_pct.to_string(),
            row.class.to_string(),
        ])?;
    }
    flush(out)
}

/// Delta-report lines in the warehouse import template's column order.
pub fn write_adjustments_csv<W: Write>(
    writer: W,
    rows: &[StockAdjustment],
) -> Result<(), ServiceError> {
    let mut out = Writer::from_writer(writer);
    out.write_record([
        "Client",
        "SKU",
        "Warehouse",
        "Location",
        "BestBefore",
        "BatchNo",
        "SerialNo",
        "Quantity",
        "Comment",
    ])?;
    for row in rows {
        out.write_record([
            row.client.clone(),
            row.sku.clone(),
            row.warehouse.clone(),
            row.location.clone(),
            row.best_before.clone(),
            row.batch_no.clone(),
            row.serial_no.clone(),
            row.quantity.to_string(),
            row.comment.clone(),
        ])?;
    }
    flush(out)
}

fn decimal_cell(value: Option<&Decimal>) -> String {
    let value = value.copied().unwrap_or(Decimal::ZERO);
    format!("{value:.1}")
}

fn plain_cell(value: Option<&Decimal>) -> String {
    value.copied().unwrap_or(Decimal::ZERO).to_string()
}

fn parse_horizon(label: &str) -> Result<Horizon, ServiceError> {
    Horizon::from_str(label)
        .map_err(|_| ServiceError::ExportError(format!("unknown horizon label: {label}")))
}

fn parse_decimal(cell: &str) -> Result<Decimal, ServiceError> {
    Decimal::from_str(cell.trim())
        .map_err(|e| ServiceError::ExportError(format!("bad decimal cell {cell:?}: {e}")))
}

fn parse_int(cell: &str) -> Result<i64, ServiceError> {
    cell.trim()
        .parse()
        .map_err(|e| ServiceError::ExportError(format!("bad integer cell {cell:?}: {e}")))
}

fn flush<W: Write>(mut out: Writer<W>) -> Result<(), ServiceError> {
    out.flush()
        .map_err(|e| ServiceError::ExportError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn forecast_row(sku: &str) -> ForecastRow {
        ForecastRow {
            sku: sku.to_string(),
            product_name: format!("{sku} name"),
            base_qty: BTreeMap::from([(Horizon::SevenDays, dec!(50.0))]),
            forecast_qty: BTreeMap::from([(Horizon::SevenDays, dec!(52.5))]),
            qty_last_7d: 4,
            qty_last_1mo: 10,
            qty_last_3mo: 20,
        }
    }

    #[test]
    fn forecast_header_follows_the_column_convention() {
        let csv = forecast_csv_string(&[forecast_row("A1")], &[Horizon::SevenDays]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "sku,product_name,base_qty_7d,forecast_qty_7d,qty_last_7d,qty_last_1mo,qty_last_3mo"
        );
        assert_eq!(lines.next().unwrap(), "A1,A1 name,50.0,52.5,4,10,20");
    }

    #[test]
    fn forecast_round_trips_through_csv() {
        let rows = vec![forecast_row("A1"), forecast_row("B2")];
        let csv = forecast_csv_string(&rows, &[Horizon::SevenDays]).unwrap();
        let parsed = parse_forecast_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let err = parse_forecast_csv("sku,mystery\nA1,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ServiceError::ExportError(_)));
        let err = parse_forecast_csv("sku,base_qty_5d\nA1,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ServiceError::ExportError(_)));
    }

    #[test]
    fn adjustments_use_the_import_template_columns() {
        let row = StockAdjustment {
            client: "Default".into(),
            sku: "A1".into(),
            warehouse: "Main".into(),
            location: "L1".into(),
            best_before: String::new(),
            batch_no: String::new(),
            serial_no: String::new(),
            quantity: -3,
            comment: crate::services::stock_reconciliation::COMMENT_REMOVED.into(),
        };
        let mut buffer = Vec::new();
        write_adjustments_csv(&mut buffer, &[row]).unwrap();
        let csv = String::from_utf8(buffer).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Client,SKU,Warehouse,Location,BestBefore,BatchNo,SerialNo,Quantity,Comment"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Default,A1,Main,L1,,,,-3,Quantity removed from inventory"
        );
    }
}
