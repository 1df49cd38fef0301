//! Health report types and the process memory probe

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sysinfo::System;
use task_core::TaskError;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Body of `GET /api/health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `healthy` or `unhealthy`
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since the server started
    pub uptime: f64,
    pub environment: String,
    pub version: String,
    /// `connected` or `disconnected`
    pub database: &'static str,
    pub memory: MemoryUsage,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Process memory in megabytes.
///
/// A native process has no managed heap, so these are whole-process
/// figures rather than heap statistics: `used` is the resident set size and
/// `total` the virtual memory size. Virtual size is always at least the
/// resident size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryUsage {
    /// Resident set size
    pub used: u64,
    /// Virtual memory size
    pub total: u64,
}

/// Body of `GET /api/health/live`
#[derive(Debug, Clone, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub uptime: f64,
}

/// Read resident and virtual memory for the current process
pub fn process_memory() -> Result<MemoryUsage, TaskError> {
    let pid = sysinfo::get_current_pid()
        .map_err(|e| TaskError::Internal(format!("Cannot determine process id: {e}")))?;

    let mut system = System::new();
    system.refresh_process(pid);

    let process = system
        .process(pid)
        .ok_or_else(|| TaskError::Internal("Process information unavailable".to_string()))?;

    Ok(MemoryUsage {
        used: process.memory() / BYTES_PER_MB,
        total: process.virtual_memory() / BYTES_PER_MB,
    })
}

/// Current time as an ISO-8601 string with millisecond precision
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
