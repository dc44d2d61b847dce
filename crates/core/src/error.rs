use serde::{Deserialize, Serialize};

/// Error codes reported by the virtualization control library.
///
/// Only the codes that change how a job query is handled get their own
/// variant; everything else is carried through as [`ErrorCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The remote end does not implement the requested call.
    NoSupport,
    /// The domain no longer exists.
    NoDomain,
    /// The call is not valid for the domain's current state.
    OperationInvalid,
    Other(i32),
}

impl ErrorCode {
    const RAW_NO_SUPPORT: i32 = 3;
    const RAW_NO_DOMAIN: i32 = 42;
    const RAW_OPERATION_INVALID: i32 = 55;

    /// Maps a raw libvirt `virErrorNumber`.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            Self::RAW_NO_SUPPORT => Self::NoSupport,
            Self::RAW_NO_DOMAIN => Self::NoDomain,
            Self::RAW_OPERATION_INVALID => Self::OperationInvalid,
            other => Self::Other(other),
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Self::NoSupport => Self::RAW_NO_SUPPORT,
            Self::NoDomain => Self::RAW_NO_DOMAIN,
            Self::OperationInvalid => Self::RAW_OPERATION_INVALID,
            Self::Other(raw) => raw,
        }
    }
}

/// A typed error raised by the virtualization control library.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (code {})", .code.as_raw())]
pub struct HypervisorError {
    pub code: ErrorCode,
    pub message: String,
}

impl HypervisorError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Failure of a single job query against a domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("hypervisor error: {0}")]
    Hypervisor(#[from] HypervisorError),

    /// The local client binding does not expose the call at all.
    #[error("local binding does not provide {method}")]
    MissingBinding { method: &'static str },
}

/// How a [`QueryError`] affects the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The call is not available on this client or daemon.
    Unsupported,
    /// The domain went away or powered off, which ends any job on it.
    DomainGone,
    /// Anything else.
    Unexpected,
}

impl QueryError {
    pub fn class(&self) -> ErrorClass {
        match self {
            QueryError::MissingBinding { .. } => ErrorClass::Unsupported,
            QueryError::Hypervisor(err) => match err.code {
                ErrorCode::NoSupport => ErrorClass::Unsupported,
                ErrorCode::NoDomain | ErrorCode::OperationInvalid => ErrorClass::DomainGone,
                ErrorCode::Other(_) => ErrorClass::Unexpected,
            },
        }
    }
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("hypervisor error: {0}")]
    Hypervisor(#[from] HypervisorError),

    #[error("local binding does not provide {0}")]
    MissingBinding(&'static str),

    #[error("invalid job info: {0}")]
    InvalidJobInfo(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("operation timed out")]
    Timeout,

    #[error("invalid trace: {0}")]
    Trace(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Hypervisor(err) => Error::Hypervisor(err),
            QueryError::MissingBinding { method } => Error::MissingBinding(method),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
