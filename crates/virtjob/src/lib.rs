//! Version-independent status of hypervisor background jobs.
//!
//! Live migrations and snapshots run as background jobs inside the
//! hypervisor. Depending on the installed client library and the remote
//! daemon, their progress is available through a modern keyed statistics
//! call, an older positional call, or both. This crate hides that difference
//! behind one record type.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use virtjob::{DomainJobSource, HostJobStatusResolver, JobKind};
//!
//! # async fn example(domain: &dyn DomainJobSource) -> virtjob::Result<()> {
//! let resolver = HostJobStatusResolver::new();
//! let status = resolver.get_status(domain).await?;
//!
//! if status.kind == JobKind::Completed {
//!     println!("migration finished");
//! } else {
//!     println!("{} of {} bytes left", status.data_remaining, status.data_total);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! To wait for a job to end, see [`JobMonitor`]. To replay recorded query
//! replies without a hypervisor, see [`TraceDomain`].

mod config;
mod monitor;
mod resolver;
mod trace;

pub use config::MonitorConfig;
pub use monitor::JobMonitor;
pub use resolver::HostJobStatusResolver;
pub use trace::{DomainTrace, TraceDomain, TraceReply};

pub use virtjob_core::{
    DomainJobSource, Error, ErrorClass, ErrorCode, HypervisorError, JOB_INFO_LEN, JOB_INFO_METHOD,
    JOB_STATS_METHOD, JobKind, JobStats, JobStatusRecord, QueryError, QueryResult, Result,
};
