use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use database::{DatabaseSettings, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;
use task_api::{CorsPolicy, RateLimitSettings, ServerOptions};

/// Prefix for structured overrides, e.g. `TASKS__DATABASE__MAX_CONNECTIONS`
const ENV_PREFIX: &str = "TASKS";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// Maximum number of database connections in the pool
    pub max_connections: u32,
    /// Idle connections are closed after this many seconds
    pub idle_timeout_secs: u64,
    /// How long a request waits for a pooled connection
    pub acquire_timeout_secs: u64,
    /// Startup attempts before giving up on the database
    pub connect_attempts: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("connect_attempts", &self.connect_attempts)
            .finish()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Listen address for the HTTP server
    pub listen_addr: String,
    /// Port number to listen on
    pub port: u16,
    /// Deployment environment reported by the health check
    pub environment: String,
    pub body_limit_bytes: usize,
    /// Allowed CORS origin, `*` for any
    pub cors_origin: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub window_secs: u64,
    pub max_requests: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, json, compact)
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(anyhow::anyhow!(
                "Invalid log format: {other}. Must be one of: pretty, json, compact"
            )),
        }
    }
}

impl Config {
    /// Load configuration from the embedded defaults, `CONFIG_FILE` and the environment
    pub fn from_env() -> Result<Self> {
        let config_file = env::var("CONFIG_FILE").ok();
        Self::load(config_file.as_deref(), false)
    }

    /// Load configuration with `path` layered over the embedded defaults.
    ///
    /// Unlike [`Config::from_env`], the file must exist.
    pub fn from_file(path: &str) -> Result<Self> {
        Self::load(Some(path), true)
    }

    fn load(config_file: Option<&str>, required: bool) -> Result<Self> {
        let mut builder = ConfigBuilder::builder().add_source(File::from_str(
            include_str!("../config/default.toml"),
            FileFormat::Toml,
        ));

        if let Some(path) = config_file {
            builder = builder.add_source(
                File::with_name(path)
                    .required(required)
                    .format(FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let mut result: Config = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        result.apply_standard_env_vars()?;
        Ok(result)
    }

    /// Apply the conventional container variables (`DB_HOST`, `PORT`, `LOG_LEVEL`, ...)
    pub fn apply_standard_env_vars(&mut self) -> Result<()> {
        if let Ok(host) = env::var("DB_HOST") {
            self.database.host = host;
        }
        if let Ok(port) = env::var("DB_PORT") {
            self.database.port = port
                .parse()
                .with_context(|| format!("Invalid DB_PORT value: {port}"))?;
        }
        if let Ok(name) = env::var("DB_NAME") {
            self.database.name = name;
        }
        if let Ok(user) = env::var("DB_USER") {
            self.database.user = user;
        }
        if let Ok(password) = env::var("DB_PASSWORD") {
            self.database.password = password;
        }
        if let Ok(port) = env::var("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid PORT value: {port}"))?;
        }
        if let Ok(environment) = env::var("APP_ENV") {
            self.server.environment = environment;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }
        Ok(())
    }

    /// Get the server socket address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.listen_addr, self.server.port)
    }

    /// Pool settings for the database crate
    pub fn database_settings(&self) -> DatabaseSettings {
        DatabaseSettings {
            host: self.database.host.clone(),
            port: self.database.port,
            name: self.database.name.clone(),
            user: self.database.user.clone(),
            password: self.database.password.clone(),
            max_connections: self.database.max_connections,
            idle_timeout: Duration::from_secs(self.database.idle_timeout_secs),
            acquire_timeout: Duration::from_secs(self.database.acquire_timeout_secs),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.database.connect_attempts,
            ..RetryPolicy::default()
        }
    }

    /// Transport options for the HTTP server
    pub fn server_options(&self) -> Result<ServerOptions> {
        let cors = CorsPolicy::new(&self.server.cors_origin).map_err(|e| anyhow::anyhow!(e))?;

        let rate_limit = self.rate_limit.enabled.then(|| RateLimitSettings {
            window: Duration::from_secs(self.rate_limit.window_secs),
            max_requests: self.rate_limit.max_requests,
        });

        Ok(ServerOptions {
            body_limit_bytes: self.server.body_limit_bytes,
            cors,
            rate_limit,
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                ));
            }
        }

        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.server.body_limit_bytes == 0 {
            return Err(anyhow::anyhow!("Server body_limit_bytes must be greater than 0"));
        }

        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!(
                "Database max_connections must be greater than 0"
            ));
        }

        if self.database.connect_attempts == 0 {
            return Err(anyhow::anyhow!(
                "Database connect_attempts must be greater than 0"
            ));
        }

        if self.rate_limit.enabled
            && (self.rate_limit.window_secs == 0 || self.rate_limit.max_requests == 0)
        {
            return Err(anyhow::anyhow!(
                "Rate limit window_secs and max_requests must be greater than 0"
            ));
        }

        CorsPolicy::new(&self.server.cors_origin).map_err(|e| anyhow::anyhow!(e))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
                name: "taskdb".to_string(),
                user: "postgres".to_string(),
                password: "postgres".to_string(),
                max_connections: 20,
                idle_timeout_secs: 30,
                acquire_timeout_secs: 2,
                connect_attempts: 10,
            },
            server: ServerConfig {
                listen_addr: "0.0.0.0".to_string(),
                port: 3000,
                environment: "development".to_string(),
                body_limit_bytes: task_api::DEFAULT_BODY_LIMIT,
                cors_origin: "*".to_string(),
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                window_secs: 900,
                max_requests: 100,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }
}
