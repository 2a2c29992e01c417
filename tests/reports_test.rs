mod common;

use rust_decimal_macros::dec;

use despatch_analytics::services::{AgeBucket, DashboardReportService};

use common::{date, order_line};

#[test]
fn kpis_channel_summary_and_dead_stock_agree_on_one_dataset() {
    let service = DashboardReportService::new();
    let lines = vec![
        order_line("ord-1", "LIVE", "Webstore", date(2025, 5, 29), 2, dec!(10)),
        order_line("ord-2", "LIVE", "Amazon", date(2025, 5, 1), 1, dec!(10)),
        order_line("ord-3", "STALE", "Webstore", date(2025, 3, 1), 3, dec!(20)),
        order_line("ord-4", "DEAD", "Webstore", date(2024, 1, 1), 1, dec!(5)),
    ];

    let kpis = service
        .sales_kpis(&lines, date(2025, 5, 1), date(2025, 5, 30))
        .unwrap();
    assert_eq!(kpis.total_qty, 3);
    assert_eq!(kpis.total_revenue, dec!(30));
    assert_eq!(kpis.days, 30);

    let summary = service.channel_summary(&lines);
    assert_eq!(summary.len(), 3);
    assert_eq!(summary[0].channel, "Amazon");
    assert_eq!(summary[1].channel, "Webstore");
    assert_eq!(summary[1].total_orders, 3);
    assert_eq!(summary[2].channel, "Grand Total");
    assert_eq!(summary[2].total_qty, 7);

    let dead = service.dead_stock(&lines, date(2025, 6, 1));
    let skus: Vec<&str> = dead.rows.iter().map(|r| r.sku.as_str()).collect();
    // LIVE sold 3 days before as_of and stays out of every bucket.
    assert_eq!(skus, vec!["STALE", "DEAD"]);
    assert_eq!(dead.rows[0].bucket, AgeBucket::OneToThreeMonths);
    assert_eq!(dead.rows[1].bucket, AgeBucket::MoreThanOneYear);
    assert_eq!(dead.bucket_counts[&AgeBucket::OneToThreeMonths], 1);
    assert_eq!(dead.bucket_counts[&AgeBucket::SixMonthsToOneYear], 0);
}

#[test]
fn dead_stock_buckets_are_disjoint() {
    let service = DashboardReportService::new();
    let as_of = date(2025, 6, 1);
    let lines: Vec<_> = [10i64, 45, 120, 250, 400]
        .iter()
        .enumerate()
        .map(|(i, &age)| {
            order_line(
                &format!("ord-{i}"),
                &format!("SKU-{i}"),
                "Webstore",
                as_of - chrono::Duration::days(age),
                1,
                dec!(1),
            )
        })
        .collect();
    let report = service.dead_stock(&lines, as_of);
    assert_eq!(report.rows.len(), 5);
    let total: usize = report.bucket_counts.values().sum();
    assert_eq!(total, 5);
    // One SKU per bucket, each bucket hit exactly once.
    assert!(report.bucket_counts.values().all(|&count| count == 1));
}

#[test]
fn sales_matrices_cover_every_recently_sold_sku() {
    let service = DashboardReportService::new();
    let as_of = date(2025, 2, 1);
    let lines = vec![
        order_line("1", "A", "Webstore", date(2025, 1, 6), 3, dec!(1)),
        order_line("2", "B", "Webstore", date(2025, 1, 20), 2, dec!(1)),
        order_line("3", "OLD", "Webstore", date(2022, 1, 1), 9, dec!(1)),
    ];
    let matrices = service.sales_matrices(&lines, as_of);
    let skus: Vec<&str> = matrices.iter().map(|m| m.sku.as_str()).collect();
    assert_eq!(skus, vec!["A", "B"]);
    assert_eq!(matrices[0].months[0].label, "Jan-25");
    assert_eq!(matrices[0].months[0].total, 3);
}
