use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{info, instrument};

use crate::models::OrderLine;

const CLASS_A_THRESHOLD: Decimal = Decimal::from_parts(70, 0, 0, false, 2); // 0.70
const CLASS_B_THRESHOLD: Decimal = Decimal::from_parts(90, 0, 0, false, 2); // 0.90

/// Pareto class assigned from the cumulative share of the ranked metric.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl AbcClass {
    fn from_cumulative_pct(pct: Decimal) -> Self {
        if pct <= CLASS_A_THRESHOLD {
            Self::A
        } else if pct <= CLASS_B_THRESHOLD {
            Self::B
        } else {
            Self::C
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AbcGroupBy {
    Sku,
    Channel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AbcMetric {
    Quantity,
    Revenue,
}

/// One ranked grouping key with its cumulative position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbcRow {
    /// SKU or channel, depending on the grouping.
    pub key: String,
    /// Product name for SKU groupings, empty for channels.
    pub product_name: String,
    pub metric_value: Decimal,
    pub cumulative_value: Decimal,
    pub cumulative_pct: Decimal,
    pub class: AbcClass,
}

/// SKU ranking inside a single channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSkuAbcRow {
    pub channel: String,
    pub sku: String,
    pub product_name: String,
    pub quantity: i64,
    pub class: AbcClass,
}

/// ABC (Pareto) classifier over order lines: group, rank by metric
/// descending, classify by cumulative share against the 0.70/0.90
/// thresholds. Ties rank by key ascending.
#[derive(Clone, Default)]
pub struct AbcAnalysisService;

impl AbcAnalysisService {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, lines), fields(lines = lines.len(), %group_by, %metric))]
    pub fn classify(
        &self,
        lines: &[OrderLine],
        group_by: AbcGroupBy,
        metric: AbcMetric,
    ) -> Vec<AbcRow> {
        let mut totals: HashMap<String, Decimal> = HashMap::new();
        let mut names: HashMap<String, String> = HashMap::new();

        match (group_by, metric) {
            (AbcGroupBy::Sku, AbcMetric::Quantity) => {
                for line in lines {
                    *totals.entry(line.sku.clone()).or_default() += Decimal::from(line.quantity);
                    remember_name(&mut names, line);
                }
            }
            (AbcGroupBy::Sku, AbcMetric::Revenue) => {
                for line in lines {
                    *totals.entry(line.sku.clone()).or_default() += line.sale_amount();
                    remember_name(&mut names, line);
                }
            }
            (AbcGroupBy::Channel, AbcMetric::Quantity) => {
                for line in lines {
                    *totals.entry(line.channel.clone()).or_default() +=
                        Decimal::from(line.quantity);
                }
            }
            (AbcGroupBy::Channel, AbcMetric::Revenue) => {
                // Revenue is order-level here: one entry per order_id, channel
                // taken from the order's first line, amounts summed across
                // its lines, so multi-line orders are not double counted.
                let mut order_channel: HashMap<&str, &str> = HashMap::new();
                let mut order_revenue: HashMap<&str, Decimal> = HashMap::new();
                for line in lines {
                    order_channel
                        .entry(line.order_id.as_str())
                        .or_insert(line.channel.as_str());
                    *order_revenue.entry(line.order_id.as_str()).or_default() +=
                        line.sale_amount();
                }
                for (order_id, revenue) in order_revenue {
                    let channel = order_channel.get(order_id).copied().unwrap_or_default();
                    *totals.entry(channel.to_string()).or_default() += revenue;
                }
            }
        }

        let rows = rank(totals, &names);
        info!(rows = rows.len(), "abc classification computed");
        rows
    }

    /// SKU-level ABC within each channel: the cumulative share resets per
    /// channel, so every channel gets its own A/B/C segmentation.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub fn classify_per_channel(&self, lines: &[OrderLine]) -> Vec<ChannelSkuAbcRow> {
        let mut totals: HashMap<(String, String), i64> = HashMap::new();
        let mut names: HashMap<String, String> = HashMap::new();
        for line in lines {
            *totals
                .entry((line.channel.clone(), line.sku.clone()))
                .or_default() += line.quantity;
            remember_name(&mut names, line);
        }

        let mut grouped: Vec<((String, String), i64)> = totals.into_iter().collect();
        // Channel ascending, quantity descending, SKU ascending.
        grouped.sort_by(|((ca, sa), qa), ((cb, sb), qb)| {
            ca.cmp(cb).then(qb.cmp(qa)).then(sa.cmp(sb))
        });

        let mut channel_totals: HashMap<&str, i64> = HashMap::new();
        for ((channel, _), qty) in &grouped {
            *channel_totals.entry(channel.as_str()).or_default() += qty;
        }

        let mut rows = Vec::with_capacity(grouped.len());
        let mut current_channel: Option<&str> = None;
        let mut cumulative = 0i64;
        for ((channel, sku), qty) in &grouped {
            if current_channel != Some(channel.as_str()) {
                current_channel = Some(channel.as_str());
                cumulative = 0;
            }
            let total = channel_totals[channel.as_str()];
            if total == 0 {
                continue;
            }
            cumulative += qty;
            let pct = Decimal::from(cumulative) / Decimal::from(total);
            rows.push(ChannelSkuAbcRow {
                channel: channel.clone(),
                sku: sku.clone(),
                product_name: names.get(sku).cloned().unwrap_or_default(),
                quantity: *qty,
                class: AbcClass::from_cumulative_pct(pct),
            });
        }
        rows
    }
}

fn remember_name(names: &mut HashMap<String, String>, line: &OrderLine) {
    if !line.product_name.is_empty() {
        names
            .entry(line.sku.clone())
            .or_insert_with(|| line.product_name.clone());
    }
}

fn rank(totals: HashMap<String, Decimal>, names: &HashMap<String, String>) -> Vec<AbcRow> {
    let grand_total: Decimal = totals.values().copied().sum();
    if grand_total.is_zero() {
        // No rank order is meaningful over a zero total.
        return Vec::new();
    }

    let mut ranked: Vec<(String, Decimal)> = totals.into_iter().collect();
    ranked.sort_by(|(ka, va), (kb, vb)| vb.cmp(va).then(ka.cmp(kb)));

    let mut cumulative = Decimal::ZERO;
    ranked
        .into_iter()
        .map(|(key, value)| {
            cumulative += value;
            let pct = cumulative / grand_total;
            AbcRow {
                product_name: names.get(&key).cloned().unwrap_or_default(),
                key,
                metric_value: value,
                cumulative_value: cumulative,
                cumulative_pct: pct,
                class: AbcClass::from_cumulative_pct(pct),
            }
        })
        .collect()
}
