//! Normalized job status for a domain.
//!
//! Two library calls report the same information: the keyed statistics call
//! returns an open-ended map of counters, while the older positional call
//! returns twelve values in a fixed order. [`HostJobStatusResolver`] prefers
//! the keyed call and falls back to the positional one for good once the
//! client binding or the remote daemon turns out not to support it.
//!
//! A domain that has just finished migrating either disappears (transient
//! domains) or shuts off (persistent domains). Both cases surface as library
//! errors, and both are reported as a completed job rather than a failure.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use virtjob_core::{DomainJobSource, Error, ErrorClass, JobStatusRecord, QueryError, Result};

/// Resolves the background job status of domains on one host.
///
/// The resolver remembers whether the keyed statistics call is available.
/// That knowledge only ever goes from "available" to "unavailable": library
/// and daemon versions do not change under a running process.
///
/// # Thread Safety
///
/// `HostJobStatusResolver` is `Send + Sync` and can be shared across tasks
/// polling different domains. Concurrent downgrades of the capability flag
/// all write the same value.
#[derive(Debug)]
pub struct HostJobStatusResolver {
    job_stats_available: AtomicBool,
}

impl Default for HostJobStatusResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl HostJobStatusResolver {
    pub fn new() -> Self {
        Self {
            job_stats_available: AtomicBool::new(true),
        }
    }

    /// Process-wide resolver for callers that manage a single host.
    pub fn shared() -> &'static HostJobStatusResolver {
        static SHARED: OnceLock<HostJobStatusResolver> = OnceLock::new();
        SHARED.get_or_init(HostJobStatusResolver::new)
    }

    /// Whether the keyed statistics call is still assumed to be available.
    pub fn job_stats_available(&self) -> bool {
        self.job_stats_available.load(Ordering::Acquire)
    }

    /// Returns the status of the domain's current or last background job.
    ///
    /// Only errors that cannot be classified as "unsupported" or "domain
    /// gone" are returned; everything else resolves to a record.
    pub async fn get_status(&self, domain: &dyn DomainJobSource) -> Result<JobStatusRecord> {
        if !self.job_stats_available() {
            return job_status_from_info(domain).await;
        }

        match job_status_from_stats(domain).await {
            Ok(record) => Ok(record),
            Err(StatsFailure::Unsupported(err)) => {
                tracing::debug!(
                    "Missing job stats for domain {}: {}; using job info",
                    domain.name(),
                    err
                );
                self.disable_job_stats();
                job_status_from_info(domain).await
            }
            Err(StatsFailure::Fatal(err)) => Err(err),
        }
    }

    fn disable_job_stats(&self) {
        if self.job_stats_available.swap(false, Ordering::AcqRel) {
            tracing::info!("Keyed job statistics unavailable, falling back to positional job info");
        }
    }
}

enum StatsFailure {
    Unsupported(QueryError),
    Fatal(Error),
}

/// Queries the keyed statistics call.
async fn job_status_from_stats(
    domain: &dyn DomainJobSource,
) -> std::result::Result<JobStatusRecord, StatsFailure> {
    let stats = match domain.job_stats().await {
        Ok(stats) => stats,
        Err(err) => {
            return match err.class() {
                ErrorClass::Unsupported => Err(StatsFailure::Unsupported(err)),
                ErrorClass::DomainGone => Ok(domain_gone(domain, &err)),
                ErrorClass::Unexpected => {
                    tracing::debug!(
                        "Failed to get job stats for domain {}: {}",
                        domain.name(),
                        err
                    );
                    Err(StatsFailure::Fatal(err.into()))
                }
            };
        }
    };

    Ok(JobStatusRecord::from_job_stats(&stats))
}

/// Queries the positional job info call.
async fn job_status_from_info(domain: &dyn DomainJobSource) -> Result<JobStatusRecord> {
    match domain.job_info().await {
        Ok(info) => JobStatusRecord::from_job_info(&info),
        Err(err) if err.class() == ErrorClass::DomainGone => Ok(domain_gone(domain, &err)),
        Err(err) => {
            tracing::debug!("Failed to get job info for domain {}: {}", domain.name(), err);
            Err(err.into())
        }
    }
}

fn domain_gone(domain: &dyn DomainJobSource, err: &QueryError) -> JobStatusRecord {
    tracing::debug!("Domain {} has shut down or gone away: {}", domain.name(), err);
    JobStatusRecord::completed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{DomainTrace, TraceDomain, TraceReply};
    use virtjob_core::{ErrorCode, HypervisorError, JobKind, JobStats};

    fn error<T>(code: ErrorCode) -> TraceReply<T> {
        TraceReply::Error {
            code,
            message: "boom".into(),
        }
    }

    fn domain(
        job_stats: Vec<TraceReply<JobStats>>,
        job_info: Vec<TraceReply<Vec<u64>>>,
    ) -> TraceDomain {
        TraceDomain::new(DomainTrace {
            name: "instance-00000001".into(),
            job_stats,
            job_info,
        })
    }

    #[test]
    fn starts_with_job_stats_available() {
        assert!(HostJobStatusResolver::new().job_stats_available());
    }

    #[test]
    fn shared_is_a_single_instance() {
        assert!(std::ptr::eq(
            HostJobStatusResolver::shared(),
            HostJobStatusResolver::shared()
        ));
    }

    #[tokio::test]
    async fn unexpected_stats_error_keeps_capability() {
        let resolver = HostJobStatusResolver::new();
        let dom = domain(vec![error(ErrorCode::Other(1))], vec![]);

        let err = resolver.get_status(&dom).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Hypervisor(HypervisorError {
                code: ErrorCode::Other(1),
                ..
            })
        ));
        assert!(resolver.job_stats_available());
        assert_eq!(dom.job_info_calls(), 0);
    }

    #[tokio::test]
    async fn unsupported_legacy_call_is_unexpected() {
        let resolver = HostJobStatusResolver::new();
        let dom = domain(
            vec![error(ErrorCode::NoSupport)],
            vec![error(ErrorCode::NoSupport)],
        );

        let err = resolver.get_status(&dom).await.unwrap_err();

        assert!(matches!(err, Error::Hypervisor(_)));
        assert!(!resolver.job_stats_available());
    }

    #[tokio::test]
    async fn unknown_job_type_is_carried_through() {
        let resolver = HostJobStatusResolver::new();
        let stats: JobStats = [("type".to_string(), 6), ("data_total".to_string(), 9)]
            .into_iter()
            .collect();
        let dom = domain(vec![TraceReply::Ok(stats)], vec![]);

        let record = resolver.get_status(&dom).await.unwrap();

        assert_eq!(record.kind, JobKind::Other(6));
        assert_eq!(record.data_total, 9);
        assert!(resolver.job_stats_available());
        assert_eq!(dom.job_info_calls(), 0);
    }

    #[tokio::test]
    async fn short_job_info_propagates() {
        let resolver = HostJobStatusResolver::new();
        let dom = domain(
            vec![TraceReply::MissingBinding],
            vec![TraceReply::Ok(vec![2, 100])],
        );

        let err = resolver.get_status(&dom).await.unwrap_err();

        assert!(matches!(err, Error::InvalidJobInfo(_)));
    }

    #[tokio::test]
    async fn downgrade_is_permanent() {
        let resolver = HostJobStatusResolver::new();
        let dom = domain(
            vec![TraceReply::MissingBinding],
            vec![TraceReply::Ok(vec![JobKind::Bounded.as_raw(), 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0])],
        );

        for _ in 0..3 {
            let record = resolver.get_status(&dom).await.unwrap();
            assert_eq!(record.kind, JobKind::Bounded);
        }

        assert!(!resolver.job_stats_available());
        assert_eq!(dom.job_stats_calls(), 1);
        assert_eq!(dom.job_info_calls(), 3);
    }
}
