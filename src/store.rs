use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;

use crate::{errors::ServiceError, models::OrderLine};

/// Boundary to the order-history data source. The engine never talks to a
/// database itself; callers put whatever feed they have behind this trait and
/// the services treat each returned snapshot as read-only.
#[async_trait]
pub trait OrderHistoryStore: Send + Sync {
    /// Loads every order line despatched on or after `since`.
    async fn load_order_lines(&self, since: NaiveDate) -> Result<Vec<OrderLine>, ServiceError>;
}

/// Store over a preloaded row set; used by tests and by embedders that fetch
/// rows themselves.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    lines: Vec<OrderLine>,
}

impl InMemoryOrderStore {
    pub fn new(lines: Vec<OrderLine>) -> Self {
        Self { lines }
    }
}

#[async_trait]
impl OrderHistoryStore for InMemoryOrderStore {
    async fn load_order_lines(&self, since: NaiveDate) -> Result<Vec<OrderLine>, ServiceError> {
        let lines: Vec<OrderLine> = self
            .lines
            .iter()
            .filter(|line| line.order_date >= since)
            .cloned()
            .collect();
        info!(since = %since, rows = lines.len(), "loaded order history snapshot");
        Ok(lines)
    }
}
