use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::presentation::config::{Environment, LoggingSettings};

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(settings: &LoggingSettings, environment: Environment) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},accounting_agent={level},tower_http=info,sqlx=warn",
            level = settings.level
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if settings.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {}", e);
        return;
    }

    tracing::info!(
        environment = %environment,
        level = %settings.level,
        json_format = settings.json,
        "Logging initialized"
    );
}
