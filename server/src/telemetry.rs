use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::config::{Config, LogFormat, LoggingConfig};

/// Build the level filter: `RUST_LOG` wins over the configured level
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Invalid log level configuration")
}

/// Initialize the tracing subscriber for logging and telemetry
pub fn init_telemetry(config: &LoggingConfig) -> Result<()> {
    let registry = Registry::default().with(build_env_filter(config)?);

    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);

            registry
                .with(fmt_layer)
                .try_init()
                .context("Failed to install tracing subscriber")?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_span_list(true)
                .flatten_event(true);

            registry
                .with(fmt_layer)
                .try_init()
                .context("Failed to install tracing subscriber")?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            registry
                .with(fmt_layer)
                .try_init()
                .context("Failed to install tracing subscriber")?;
        }
    }

    tracing::info!(
        log_level = %config.level,
        log_format = ?config.format,
        "Telemetry initialized"
    );

    Ok(())
}

/// Log server startup information; credentials are never included
pub fn log_startup_info(config: &Config) {
    tracing::info!(
        server_address = %config.server_address(),
        environment = %config.server.environment,
        db_host = %config.database.host,
        db_port = config.database.port,
        db_name = %config.database.name,
        max_connections = config.database.max_connections,
        rate_limit_enabled = config.rate_limit.enabled,
        "Task API server starting up"
    );
}

pub fn log_shutdown_info() {
    tracing::info!("Task API server shutting down gracefully");
}

/// Log configuration validation
pub fn log_config_validation(config: &Config) {
    match config.validate() {
        Ok(()) => {
            tracing::info!("Configuration validation passed");
        }
        Err(e) => {
            tracing::error!(error = %e, "Configuration validation failed");
        }
    }
}

/// Log an error together with its cause chain
pub fn report_error(error: &anyhow::Error, context: &str) {
    tracing::error!(
        error = %error,
        context = context,
        "Operation failed"
    );

    for (depth, cause) in error.chain().skip(1).enumerate() {
        tracing::error!(
            error = %cause,
            depth = depth + 1,
            "Error cause"
        );
    }
}
