use anyhow::{Context, Result};
use clap::Parser;
use task_server::config::Config;
use task_server::setup::initialize_app;
use task_server::telemetry::{
    init_telemetry, log_config_validation, log_shutdown_info, log_startup_info, report_error,
};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "task-api-server")]
#[command(about = "Task tracking REST API backed by PostgreSQL")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CONFIG_FILE")]
    config: Option<String>,

    /// Listen port override
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Database host override
    #[arg(long, env = "DB_HOST")]
    db_host: Option<String>,

    /// Log level override
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(config_file) => Config::from_file(config_file)
            .with_context(|| format!("Failed to load configuration file {config_file}"))?,
        None => Config::from_env()?,
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if let Some(ref db_host) = cli.db_host {
        config.database.host = db_host.clone();
    }

    if let Some(ref log_level) = cli.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

/// Resolves on SIGTERM or SIGINT
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
                    _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Failed to register signal handlers, falling back to Ctrl+C");
            }
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, initiating graceful shutdown");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config = load_config(&cli).context("Failed to load configuration")?;

    init_telemetry(&config.logging).context("Failed to initialize telemetry")?;

    log_config_validation(&config);
    if config.validate().is_err() {
        std::process::exit(1);
    }

    log_startup_info(&config);

    let (repository, server) = match initialize_app(&config).await {
        Ok(parts) => parts,
        Err(e) => {
            report_error(&e, "startup");
            std::process::exit(2);
        }
    };

    let addr = config.server_address();
    let result = server.serve(&addr, shutdown_signal()).await;

    log_shutdown_info();
    repository.shutdown().await;

    match result {
        Ok(()) => {
            info!("Task API server shut down cleanly");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Task API server error");
            std::process::exit(3);
        }
    }
}
