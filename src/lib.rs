//! Despatch Analytics Library
//!
//! Retail operations analytics over order/despatch history: seasonal demand
//! forecasting, inventory planning, ABC classification, dashboard reporting,
//! supplier sales insights, and stock reconciliation.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod cache;
pub mod config;
pub mod errors;
pub mod export;
pub mod history;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use errors::ServiceError;
pub use services::AnalyticsServices;

/// Convenience re-exports for embedding callers.
pub mod prelude {
    pub use crate::cache::{CacheBackend, CachedOrderStore, InMemoryCache};
    pub use crate::config::AppConfig;
    pub use crate::errors::ServiceError;
    pub use crate::history::HistoryIndex;
    pub use crate::models::{Horizon, OrderLine, RawOrderLine};
    pub use crate::services::*;
    pub use crate::store::{InMemoryOrderStore, OrderHistoryStore};
}
