//! Configuration loading for the import service
//!
//! An explicit configuration struct passed at startup replaces process-wide
//! state: schedule, environment gating, worker-pool sizes and retry budgets
//! all live here. Resolution order is TOML file, then environment variable
//! overrides.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Top-level import service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Whether the scheduled import is active in this environment.
    /// Manual triggers work regardless.
    pub import_enabled: bool,

    /// Daily trigger time (UTC)
    pub schedule: ScheduleConfig,

    /// Per-stage worker pool sizes
    pub workers: WorkerConfig,

    /// Retry policy for transient failures
    pub retry: RetryConfig,

    /// Bounded job queue capacity (submission backpressure)
    pub queue_capacity: usize,

    /// HTTP bind address for the admin surface
    pub bind_address: String,

    /// SQLite database path (staging + target schema)
    pub database_path: String,
}

/// Daily trigger time
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub hour: u32,
    pub minute: u32,
}

/// Per-stage worker pool sizes and max in-flight counts
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Concurrent company leaf units
    pub companies: usize,
    /// Concurrent licence leaf units
    pub licences: usize,
    /// Concurrent bill-run region units
    pub bill_runs: usize,
}

/// Retry policy for transient failures
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts before a unit becomes terminal-failed
    pub max_attempts: u32,
    /// Base backoff between attempts; multiplied by the attempt number
    pub backoff_ms: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            import_enabled: true,
            schedule: ScheduleConfig::default(),
            workers: WorkerConfig::default(),
            retry: RetryConfig::default(),
            queue_capacity: 1000,
            bind_address: "127.0.0.1:8007".to_string(),
            database_path: "nald-import.db".to_string(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        // Companies import kicks off daily at 04:00
        Self { hour: 4, minute: 0 }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            companies: 5,
            licences: 5,
            bill_runs: 2,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 500,
        }
    }
}

impl ImportConfig {
    /// Load configuration from an optional TOML file, then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("invalid config file {}: {e}", path.display())))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variable overrides for deployment targets that cannot
    /// ship a config file
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("NALD_IMPORT_ENABLED") {
            self.import_enabled = matches!(value.as_str(), "1" | "true" | "yes");
        }
        if let Ok(value) = std::env::var("NALD_IMPORT_DATABASE") {
            self.database_path = value;
        }
        if let Ok(value) = std::env::var("NALD_IMPORT_BIND") {
            self.bind_address = value;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.schedule.hour > 23 || self.schedule.minute > 59 {
            return Err(Error::Config(format!(
                "invalid schedule time {:02}:{:02}",
                self.schedule.hour, self.schedule.minute
            )));
        }
        if self.workers.companies == 0 || self.workers.licences == 0 || self.workers.bill_runs == 0 {
            return Err(Error::Config("worker pool sizes must be non-zero".to_string()));
        }
        if self.queue_capacity == 0 {
            return Err(Error::Config("queue_capacity must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ImportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.schedule.hour, 4);
        assert_eq!(config.workers.licences, 5);
    }

    #[test]
    fn loads_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "import_enabled = false\n[workers]\nlicences = 10\n[schedule]\nhour = 2"
        )
        .unwrap();

        let config = ImportConfig::load(Some(file.path())).unwrap();
        assert!(!config.import_enabled);
        assert_eq!(config.workers.licences, 10);
        // Unspecified fields keep their defaults
        assert_eq!(config.workers.companies, 5);
        assert_eq!(config.schedule.hour, 2);
        assert_eq!(config.schedule.minute, 0);
    }

    #[test]
    fn rejects_invalid_schedule() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[schedule]\nhour = 25").unwrap();
        assert!(ImportConfig::load(Some(file.path())).is_err());
    }
}
