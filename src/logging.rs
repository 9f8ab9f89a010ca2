//! Tracing setup shared by every command.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::level_filter;

/// Filter used when `RUST_LOG` is not set.
pub fn default_directive(log_level: &str) -> String {
    let level = level_filter(log_level).unwrap_or("info");
    format!("agent_starter={level},tower_http={level}")
}

/// Install the global subscriber. `RUST_LOG` wins over `LOG_LEVEL`.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(log_level))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
