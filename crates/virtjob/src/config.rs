use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use virtjob_core::{Error, Result};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Settings for [`JobMonitor`](crate::JobMonitor).
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use virtjob::MonitorConfig;
///
/// let config = MonitorConfig::default()
///     .poll_interval(Duration::from_millis(250))
///     .timeout(Duration::from_secs(600));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Delay between two status queries.
    pub poll_interval: Duration,
    /// Minimum delay between two progress log lines.
    pub progress_log_interval: Duration,
    /// Give up after this long. None waits for the job indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            progress_log_interval: DEFAULT_PROGRESS_LOG_INTERVAL,
            timeout: None,
        }
    }
}

/// On-disk form of [`MonitorConfig`], with durations in milliseconds.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MonitorConfigFile {
    poll_interval_ms: Option<u64>,
    progress_log_interval_ms: Option<u64>,
    timeout_ms: Option<u64>,
}

impl From<MonitorConfigFile> for MonitorConfig {
    fn from(file: MonitorConfigFile) -> Self {
        let defaults = MonitorConfig::default();
        Self {
            poll_interval: file
                .poll_interval_ms
                .map_or(defaults.poll_interval, Duration::from_millis),
            progress_log_interval: file
                .progress_log_interval_ms
                .map_or(defaults.progress_log_interval, Duration::from_millis),
            timeout: file.timeout_ms.map(Duration::from_millis),
        }
    }
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn progress_log_interval(mut self, interval: Duration) -> Self {
        self.progress_log_interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Parses a TOML config. Missing keys keep their defaults.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: MonitorConfigFile =
            toml::from_str(contents).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        let config = Self::from(file);
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "poll interval must be greater than zero".into(),
            ));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::InvalidConfig("timeout must be greater than zero".into()));
        }
        Ok(())
    }
}
