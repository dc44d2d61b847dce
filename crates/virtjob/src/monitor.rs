//! Polling a domain's background job until it ends.
//!
//! [`JobMonitor`] is what a migration or snapshot driver uses to wait for the
//! hypervisor job it started. It samples the job through a shared
//! [`HostJobStatusResolver`], logs progress periodically, and returns the
//! final record.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use virtjob::{DomainTrace, HostJobStatusResolver, JobMonitor, MonitorConfig, TraceDomain};
//!
//! # async fn example() -> virtjob::Result<()> {
//! let domain = TraceDomain::new(DomainTrace::load("migration.toml")?);
//! let monitor = JobMonitor::new(
//!     Arc::new(HostJobStatusResolver::new()),
//!     MonitorConfig::default(),
//! )?;
//!
//! let record = monitor.watch(&domain).await?;
//! println!("job ended: {:?}", record.kind);
//! # Ok(())
//! # }
//! ```

use crate::config::MonitorConfig;
use crate::resolver::HostJobStatusResolver;
use std::sync::Arc;
use tokio::time::{Instant, MissedTickBehavior};
use virtjob_core::{DomainJobSource, Error, JobKind, JobStatusRecord, Result};

/// Waits for background jobs to finish.
pub struct JobMonitor {
    resolver: Arc<HostJobStatusResolver>,
    config: MonitorConfig,
}

impl JobMonitor {
    pub fn new(resolver: Arc<HostJobStatusResolver>, config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { resolver, config })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Polls the domain until its job ends and returns the last record.
    ///
    /// A job has ended when the record is terminal, or when no job is
    /// reported after an active one was seen. No job before that point means
    /// the job has not started yet, so polling continues.
    pub async fn watch(&self, domain: &dyn DomainJobSource) -> Result<JobStatusRecord> {
        self.watch_with(domain, |_| {}).await
    }

    /// Like [`watch`](Self::watch), handing every sampled record to
    /// `on_sample`.
    pub async fn watch_with<F>(
        &self,
        domain: &dyn DomainJobSource,
        mut on_sample: F,
    ) -> Result<JobStatusRecord>
    where
        F: FnMut(&JobStatusRecord) + Send,
    {
        let poll = self.poll_until_done(domain, &mut on_sample);

        match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, poll).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        "Gave up waiting for job on domain {} after {:?}",
                        domain.name(),
                        limit
                    );
                    Err(Error::Timeout)
                }
            },
            None => poll.await,
        }
    }

    async fn poll_until_done(
        &self,
        domain: &dyn DomainJobSource,
        on_sample: &mut (dyn FnMut(&JobStatusRecord) + Send),
    ) -> Result<JobStatusRecord> {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut seen_active = false;
        let mut last_progress_log: Option<Instant> = None;

        loop {
            interval.tick().await;

            let record = self.resolver.get_status(domain).await?;
            on_sample(&record);

            if record.is_terminal() || (seen_active && record.kind == JobKind::None) {
                tracing::debug!("Job on domain {} ended: {:?}", domain.name(), record.kind);
                return Ok(record);
            }

            if record.is_active() {
                seen_active = true;
                let due = last_progress_log
                    .is_none_or(|at| at.elapsed() >= self.config.progress_log_interval);
                if due {
                    log_progress(domain, &record);
                    last_progress_log = Some(Instant::now());
                }
            }
        }
    }
}

fn log_progress(domain: &dyn DomainJobSource, record: &JobStatusRecord) {
    match record.progress_percent() {
        Some(percent) => tracing::info!(
            "Job on domain {}: {}% done, elapsed {} ms, {} of {} bytes remaining",
            domain.name(),
            percent,
            record.time_elapsed,
            record.data_remaining,
            record.data_total
        ),
        None => tracing::info!(
            "Job on domain {}: elapsed {} ms",
            domain.name(),
            record.time_elapsed
        ),
    }
}
