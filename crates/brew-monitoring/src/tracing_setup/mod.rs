//! Process-wide tracing subscriber plus the structured monitoring log events.

pub mod events;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use brew_core::config::ObservabilityConfig;

/// Filter variable consulted before the configured level.
pub const LOG_ENV_VAR: &str = "BREW_LOG";

static INIT: Once = Once::new();

/// Install the fmt subscriber. `BREW_LOG` wins over `config.log_level`.
///
/// Safe to call more than once; only the first call installs anything, and an
/// already-installed global subscriber (e.g. from a test harness) is left alone.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true);
        let installed = if config.json_logs {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        if installed.is_err() {
            tracing::debug!(event = "tracing_already_initialized");
        }
    });
}
