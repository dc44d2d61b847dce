//! Replay of recorded job query replies.
//!
//! A trace captures what a domain answered to each job query, in order. It is
//! useful to reproduce a migration seen on a real host without a hypervisor
//! connection, and it is what the `virtjob` CLI operates on.
//!
//! # Format
//!
//! Traces are TOML, or JSON when the file name ends in `.json`:
//!
//! ```toml
//! name = "instance-00000001"
//! job_stats = [
//!     { error = { code = "no_support", message = "virDomainGetJobStats not implemented" } },
//! ]
//! job_info = [
//!     { ok = [2, 100, 99, 10, 11, 12, 75, 50, 33, 1, 2, 3] },
//!     { error = { code = "no_domain", message = "Domain not found" } },
//! ]
//! ```
//!
//! Each query consumes the next reply in its list and keeps repeating the
//! last one once the list runs out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use virtjob_core::{
    DomainJobSource, Error, ErrorCode, HypervisorError, JOB_INFO_METHOD, JOB_STATS_METHOD, JobStats,
    QueryError, QueryResult, Result,
};

/// One recorded reply to a job query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceReply<T> {
    Ok(T),
    Error {
        code: ErrorCode,
        #[serde(default)]
        message: String,
    },
    /// The binding that recorded the trace did not expose the call.
    MissingBinding,
}

impl<T: Clone> TraceReply<T> {
    fn to_result(&self, method: &'static str) -> QueryResult<T> {
        match self {
            TraceReply::Ok(value) => Ok(value.clone()),
            TraceReply::Error { code, message } => {
                Err(HypervisorError::new(*code, message.clone()).into())
            }
            TraceReply::MissingBinding => Err(QueryError::MissingBinding { method }),
        }
    }
}

/// Recorded replies of one domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainTrace {
    pub name: String,
    /// Replies to the keyed statistics call. Empty means the binding
    /// lacks the call.
    #[serde(default)]
    pub job_stats: Vec<TraceReply<JobStats>>,
    /// Replies to the positional call. Empty means the domain is gone.
    #[serde(default)]
    pub job_info: Vec<TraceReply<Vec<u64>>>,
}

impl DomainTrace {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_toml(&contents)
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Trace(e.to_string()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| Error::Trace(e.to_string()))
    }
}

/// A [`DomainJobSource`] that replays a [`DomainTrace`].
#[derive(Debug)]
pub struct TraceDomain {
    trace: DomainTrace,
    job_stats_calls: AtomicUsize,
    job_info_calls: AtomicUsize,
}

impl TraceDomain {
    pub fn new(trace: DomainTrace) -> Self {
        Self {
            trace,
            job_stats_calls: AtomicUsize::new(0),
            job_info_calls: AtomicUsize::new(0),
        }
    }

    pub fn job_stats_calls(&self) -> usize {
        self.job_stats_calls.load(Ordering::SeqCst)
    }

    pub fn job_info_calls(&self) -> usize {
        self.job_info_calls.load(Ordering::SeqCst)
    }
}

fn next_reply<'a, T>(
    replies: &'a [TraceReply<T>],
    calls: &AtomicUsize,
) -> Option<&'a TraceReply<T>> {
    let index = calls.fetch_add(1, Ordering::SeqCst);
    replies.get(index).or_else(|| replies.last())
}

#[async_trait]
impl DomainJobSource for TraceDomain {
    fn name(&self) -> &str {
        &self.trace.name
    }

    async fn job_stats(&self) -> QueryResult<JobStats> {
        match next_reply(&self.trace.job_stats, &self.job_stats_calls) {
            Some(reply) => reply.to_result(JOB_STATS_METHOD),
            None => Err(QueryError::MissingBinding {
                method: JOB_STATS_METHOD,
            }),
        }
    }

    async fn job_info(&self) -> QueryResult<Vec<u64>> {
        match next_reply(&self.trace.job_info, &self.job_info_calls) {
            Some(reply) => reply.to_result(JOB_INFO_METHOD),
            None => Err(HypervisorError::new(
                ErrorCode::NoDomain,
                format!("Domain not found: no domain with matching name '{}'", self.trace.name),
            )
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TOML_TRACE: &str = r#"
name = "instance-00000001"
job_stats = [
    { ok = { type = 2, memory_total = 75 } },
    { error = { code = "operation_invalid", message = "Domain is not running" } },
]
job_info = [
    { error = { code = { other = 1 } } },
    "missing_binding",
]
"#;

    #[test]
    fn parses_toml() {
        let trace = DomainTrace::from_toml(TOML_TRACE).unwrap();

        assert_eq!(trace.name, "instance-00000001");
        assert_eq!(trace.job_stats.len(), 2);
        let TraceReply::Ok(stats) = &trace.job_stats[0] else {
            panic!("expected stats reply");
        };
        assert_eq!(stats.get("memory_total"), Some(&75));
        assert_eq!(
            trace.job_stats[1],
            TraceReply::Error {
                code: ErrorCode::OperationInvalid,
                message: "Domain is not running".into(),
            }
        );
        assert_eq!(
            trace.job_info[0],
            TraceReply::Error {
                code: ErrorCode::Other(1),
                message: String::new(),
            }
        );
        assert_eq!(trace.job_info[1], TraceReply::MissingBinding);
    }

    #[test]
    fn parses_json() {
        let trace = DomainTrace::from_json(
            r#"{"name": "vm", "job_info": [{"ok": [0,0,0,0,0,0,0,0,0,0,0,0]}]}"#,
        )
        .unwrap();

        assert_eq!(trace.name, "vm");
        assert!(trace.job_stats.is_empty());
        assert_eq!(trace.job_info, vec![TraceReply::Ok(vec![0; 12])]);
    }

    #[test]
    fn rejects_malformed_trace() {
        let err = DomainTrace::from_toml("name = 3").unwrap_err();
        assert!(matches!(err, Error::Trace(_)));
    }

    #[test]
    fn load_picks_format_from_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"name": "from-json"}}"#).unwrap();

        let trace = DomainTrace::load(file.path()).unwrap();
        assert_eq!(trace.name, "from-json");

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "name = \"from-toml\"").unwrap();

        let trace = DomainTrace::load(file.path()).unwrap();
        assert_eq!(trace.name, "from-toml");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = DomainTrace::load("/nonexistent/trace.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn replays_in_order_and_repeats_last() {
        let domain = TraceDomain::new(DomainTrace::from_toml(TOML_TRACE).unwrap());

        assert!(domain.job_stats().await.is_ok());
        for _ in 0..2 {
            let err = domain.job_stats().await.unwrap_err();
            assert_eq!(
                err,
                QueryError::Hypervisor(HypervisorError::new(
                    ErrorCode::OperationInvalid,
                    "Domain is not running"
                ))
            );
        }
        assert_eq!(domain.job_stats_calls(), 3);
    }

    #[tokio::test]
    async fn empty_lists_mean_missing_call_and_gone_domain() {
        let domain = TraceDomain::new(DomainTrace {
            name: "vm".into(),
            ..DomainTrace::default()
        });

        let err = domain.job_stats().await.unwrap_err();
        assert!(matches!(err, QueryError::MissingBinding { .. }));

        let err = domain.job_info().await.unwrap_err();
        assert_eq!(err.class(), virtjob_core::ErrorClass::DomainGone);
    }
}
