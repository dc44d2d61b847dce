pub mod domain;
pub mod error;
pub mod types;

pub use domain::{DomainJobSource, JOB_INFO_METHOD, JOB_STATS_METHOD};
pub use error::{Error, ErrorClass, ErrorCode, HypervisorError, QueryError, QueryResult, Result};
pub use types::{JOB_INFO_LEN, JobKind, JobStats, JobStatusRecord};
