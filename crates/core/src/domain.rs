use crate::error::{QueryError, QueryResult};
use crate::types::JobStats;
use async_trait::async_trait;

/// Name of the keyed statistics call in the control library.
pub const JOB_STATS_METHOD: &str = "virDomainGetJobStats";

/// Name of the positional job info call in the control library.
pub const JOB_INFO_METHOD: &str = "virDomainGetJobInfo";

/// A managed domain whose background job can be queried.
///
/// Implemented on top of whatever virtualization control binding the host
/// uses. Both calls are bounded round trips to the hypervisor and have no
/// effect on the domain.
#[async_trait]
pub trait DomainJobSource: Send + Sync {
    fn name(&self) -> &str;

    /// Keyed job statistics.
    ///
    /// Bindings built against a library that predates the call keep the
    /// default implementation, which reports the method as missing.
    async fn job_stats(&self) -> QueryResult<JobStats> {
        Err(QueryError::MissingBinding {
            method: JOB_STATS_METHOD,
        })
    }

    /// Positional job info, available on every library version.
    async fn job_info(&self) -> QueryResult<Vec<u64>>;
}
