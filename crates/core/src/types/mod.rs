mod job;

pub use job::{JOB_INFO_LEN, JobKind, JobStats, JobStatusRecord};
