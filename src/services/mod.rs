// Analytics and reporting
pub mod abc_analysis;
pub mod forecasting;
pub mod inventory_planning;
pub mod reports;
pub mod supplier_insights;

// Stock operations
pub mod stock_reconciliation;

// Service factory for dependency injection
pub mod factory;

pub use abc_analysis::{AbcAnalysisService, AbcClass, AbcGroupBy, AbcMetric, AbcRow, ChannelSkuAbcRow};
pub use factory::AnalyticsServices;
pub use forecasting::{ForecastRequest, ForecastRow, ForecastService};
pub use inventory_planning::{CurrentInventory, InventoryPlanningService, RecommendationRow};
pub use reports::{
    AgeBucket, ChannelSummaryRow, DashboardReportService, DeadStockReport, DeadStockRow,
    SalesKpis, SalesMatrix,
};
pub use stock_reconciliation::{
    LedgerRow, StockAdjustment, StockReconciliationService, WarehouseRow,
};
pub use supplier_insights::{
    RawSupplierRow, SupplierCleanReport, SupplierInsights, SupplierInsightsService,
    SupplierSalesRow,
};
