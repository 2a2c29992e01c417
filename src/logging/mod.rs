use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;

/// Initializes the tracing subscriber for the process. `RUST_LOG` wins over
/// the configured level; repeated calls are ignored so embedding tests can
/// call this freely.
pub fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let result = if config.log_json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };

    if result.is_ok() {
        info!(
            environment = %config.environment,
            level = %config.log_level,
            json = config.log_json,
            "tracing initialized"
        );
    }
}
