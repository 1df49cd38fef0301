use std::env;
use task_server::config::{Config, LogFormat};

#[test]
fn test_environment_overrides() {
    // Kept in its own test binary; it mutates the process environment
    env::set_var("TASKS__DATABASE__MAX_CONNECTIONS", "7");
    env::set_var("TASKS__RATE_LIMIT__MAX_REQUESTS", "250");
    env::set_var("DB_HOST", "postgres.svc");
    env::set_var("DB_PORT", "6543");
    env::set_var("DB_PASSWORD", "s3cret");
    env::set_var("APP_ENV", "production");
    env::set_var("LOG_FORMAT", "compact");

    let config = Config::from_env();

    env::set_var("DB_PORT", "not-a-port");
    let bad_port = Config::from_env();

    for var in [
        "TASKS__DATABASE__MAX_CONNECTIONS",
        "TASKS__RATE_LIMIT__MAX_REQUESTS",
        "DB_HOST",
        "DB_PORT",
        "DB_PASSWORD",
        "APP_ENV",
        "LOG_FORMAT",
    ] {
        env::remove_var(var);
    }

    let config = config.unwrap();
    assert_eq!(config.database.max_connections, 7);
    assert_eq!(config.rate_limit.max_requests, 250);
    assert_eq!(config.database.host, "postgres.svc");
    assert_eq!(config.database.port, 6543);
    assert_eq!(config.database.password, "s3cret");
    assert_eq!(config.server.environment, "production");
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert!(!format!("{config:?}").contains("s3cret"));

    assert!(bad_port.is_err());
}
