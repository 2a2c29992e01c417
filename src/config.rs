use config::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use validator::{Validate, ValidationError};

use crate::{cache::CacheConfig, errors::ServiceError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_SAFETY_PCT: u32 = 10;
const DEFAULT_CURRENT_INVENTORY: i64 = 100;
const DEFAULT_WINDOW_RADIUS_DAYS: i64 = 3;
const DEFAULT_CLIENT_LABEL: &str = "Default";
const DEFAULT_WAREHOUSE_LABEL: &str = "Main";
const CONFIG_DIR: &str = "config";
const ENV_PREFIX: &str = "ANALYTICS";

fn default_growth_factor() -> Decimal {
    Decimal::new(105, 2) // 1.05
}

fn default_safety_pct() -> u32 {
    DEFAULT_SAFETY_PCT
}

fn default_current_inventory() -> i64 {
    DEFAULT_CURRENT_INVENTORY
}

fn default_window_radius_days() -> i64 {
    DEFAULT_WINDOW_RADIUS_DAYS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_client_label() -> String {
    DEFAULT_CLIENT_LABEL.to_string()
}

fn default_warehouse_label() -> String {
    DEFAULT_WAREHOUSE_LABEL.to_string()
}

/// Forecast defaults applied when a request leaves them unspecified.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ForecastDefaults {
    /// Multiplier applied to the seasonal base quantity.
    #[serde(default = "default_growth_factor")]
    #[validate(custom = "validate_growth_factor")]
    pub growth_factor: Decimal,

    /// Safety stock percentage (0-100).
    #[serde(default = "default_safety_pct")]
    #[validate(range(max = 100))]
    pub safety_pct: u32,

    /// Flat stock-on-hand assumed when no inventory feed is injected.
    #[serde(default = "default_current_inventory")]
    #[validate(range(min = 0))]
    pub current_inventory: i64,

    /// Symmetric radius of the seasonal match window, in days.
    #[serde(default = "default_window_radius_days")]
    #[validate(range(min = 1, max = 30))]
    pub window_radius_days: i64,
}

impl Default for ForecastDefaults {
    fn default() -> Self {
        Self {
            growth_factor: default_growth_factor(),
            safety_pct: DEFAULT_SAFETY_PCT,
            current_inventory: DEFAULT_CURRENT_INVENTORY,
            window_radius_days: DEFAULT_WINDOW_RADIUS_DAYS,
        }
    }
}

fn validate_growth_factor(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || value.is_zero() {
        return Err(ValidationError::new("growth_factor_not_positive"));
    }
    Ok(())
}

/// Labels stamped onto stock-reconciliation adjustment lines.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ReconciliationConfig {
    #[serde(default = "default_client_label")]
    #[validate(length(min = 1))]
    pub client: String,

    #[serde(default = "default_warehouse_label")]
    #[validate(length(min = 1))]
    pub warehouse: String,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            client: default_client_label(),
            warehouse: default_warehouse_label(),
        }
    }
}

/// Application configuration: defaults, then an optional
/// `config/{environment}.toml`, then `ANALYTICS_*` environment variables
/// (nested fields separated by `__`, e.g. `ANALYTICS_FORECAST__SAFETY_PCT`).
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    #[validate]
    pub forecast: ForecastDefaults,

    #[serde(default)]
    #[validate]
    pub reconciliation: ReconciliationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            cache: CacheConfig::default(),
            forecast: ForecastDefaults::default(),
            reconciliation: ReconciliationConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ServiceError> {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

        let config = Config::builder()
            .add_source(File::with_name(&format!("{CONFIG_DIR}/{environment}")).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;
        if app_config.environment != environment {
            app_config.environment = environment;
        }
        app_config.validate()?;

        info!(
            environment = %app_config.environment,
            cache_enabled = app_config.cache.enabled,
            "configuration loaded"
        );
        Ok(app_config)
    }
}
