//! Task Server Library
//!
//! Configuration loading, telemetry and application wiring for the task API
//! binary. Exposed as a library so the pieces can be tested without a process.

pub mod config;
pub mod setup;
pub mod telemetry;

pub use config::Config;
pub use setup::{create_repository, create_server, initialize_app};
pub use telemetry::init_telemetry;
