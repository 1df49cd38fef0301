use anyhow::{Context, Result};
use database::PostgresTaskRepository;
use std::sync::Arc;
use task_api::{TaskApiServer, TaskHandler};
use task_core::TaskRepository;
use tracing::info;

use crate::config::Config;

/// Create the PostgreSQL repository and run the startup initializer.
///
/// Retries connectivity according to the configured attempt budget and
/// applies the schema; an error here is fatal for the process.
pub async fn create_repository(config: &Config) -> Result<Arc<PostgresTaskRepository>> {
    info!(
        host = %config.database.host,
        port = config.database.port,
        database = %config.database.name,
        "Creating task repository"
    );

    let repo = PostgresTaskRepository::connect(&config.database_settings());

    repo.initialize(&config.retry_policy())
        .await
        .context("Failed to initialize database")?;

    info!("Task repository created successfully");
    Ok(Arc::new(repo))
}

/// Create and configure the HTTP server over any repository
pub fn create_server<R: TaskRepository + 'static>(
    repository: Arc<R>,
    config: &Config,
) -> Result<TaskApiServer<R>> {
    info!("Creating HTTP server");

    let handler = TaskHandler::new(repository)
        .with_environment(config.server.environment.clone())
        .with_version(env!("CARGO_PKG_VERSION"));

    let options = config
        .server_options()
        .context("Invalid server options")?;

    Ok(TaskApiServer::new(handler, options))
}

/// Initialize the complete application.
///
/// The repository is returned alongside the server so the caller can close
/// the pool after the server stops.
pub async fn initialize_app(
    config: &Config,
) -> Result<(Arc<PostgresTaskRepository>, TaskApiServer<PostgresTaskRepository>)> {
    info!("Initializing application");

    let repository = create_repository(config)
        .await
        .context("Failed to create repository")?;

    let server = create_server(Arc::clone(&repository), config)
        .context("Failed to create server")?;

    info!("Application initialized successfully");
    Ok((repository, server))
}
