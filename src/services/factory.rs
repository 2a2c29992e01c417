use std::sync::Arc;

use tracing::info;

use crate::{
    cache::{CachedOrderStore, InMemoryCache},
    config::AppConfig,
    services::{
        abc_analysis::AbcAnalysisService, forecasting::ForecastService,
        inventory_planning::InventoryPlanningService, reports::DashboardReportService,
        stock_reconciliation::StockReconciliationService,
        supplier_insights::SupplierInsightsService,
    },
    store::OrderHistoryStore,
};

/// The wired service set. Built once from a store and configuration, then
/// cloned freely; every service is cheap to clone.
#[derive(Clone)]
pub struct AnalyticsServices {
    pub store: Arc<dyn OrderHistoryStore>,
    pub forecasting: ForecastService,
    pub planning: InventoryPlanningService,
    pub abc: AbcAnalysisService,
    pub reports: DashboardReportService,
    pub suppliers: SupplierInsightsService,
    pub reconciliation: StockReconciliationService,
}

impl AnalyticsServices {
    /// Wires the services against `store`, wrapping it in the snapshot cache
    /// when caching is enabled.
    pub fn new(store: Arc<dyn OrderHistoryStore>, config: &AppConfig) -> Self {
        let store: Arc<dyn OrderHistoryStore> = if config.cache.enabled {
            info!(
                max_entries = config.cache.max_entries,
                ttl_secs = config.cache.default_ttl_secs,
                "snapshot cache enabled"
            );
            Arc::new(CachedOrderStore::new(
                store,
                Arc::new(InMemoryCache::new(config.cache.max_entries)),
                config.cache.ttl(),
            ))
        } else {
            store
        };

        Self {
            forecasting: ForecastService::new(store.clone(), config.forecast.clone()),
            planning: InventoryPlanningService::new(config.forecast.clone()),
            abc: AbcAnalysisService::new(),
            reports: DashboardReportService::new(),
            suppliers: SupplierInsightsService::new(),
            reconciliation: StockReconciliationService::new(config.reconciliation.clone()),
            store,
        }
    }
}
