//! Failure classification shared by the whole CLI.
//!
//! Every failure that needs uniform handling (exit-code mapping, retry
//! eligibility, message tone) is wrapped with exactly one [`FaultKind`].
//! Callers branch on the kind, never on message text.

use std::fmt;

use thiserror::Error;
use tracing::Level;

use crate::exitcode;

/// Closed set of failure categories. Never extended ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Filesystem anomalies, hosed state files, subsystems behaving outside
    /// their documented contract.
    System,

    /// Caller-supplied value is syntactically invalid, or its value prevents
    /// the requested operation from succeeding.
    InvalidArgument,

    /// Remote endpoint returned an application-level error (e.g. a 50x).
    /// Transport failures (DNS, TCP, TLS) are NOT this kind; classify them
    /// at the call site, typically as `System`.
    ServerMisbehaving,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::System => write!(f, "system error"),
            FaultKind::InvalidArgument => write!(f, "invalid argument"),
            FaultKind::ServerMisbehaving => write!(f, "server error"),
        }
    }
}

/// A classified failure: one category, a user-facing message, and the
/// original cause (when wrapping) preserved for inspection via `source()`.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Fault {
    kind: FaultKind,
    message: String,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Result type for classified operations.
pub type FaultResult<T> = Result<T, Fault>;

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Wrap an underlying error, keeping it as the inspectable cause.
    pub fn wrap(
        kind: FaultKind,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let cause = cause.into();
        Self {
            kind,
            message: cause.to_string(),
            cause: Some(cause),
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::new(FaultKind::System, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(FaultKind::InvalidArgument, message)
    }

    pub fn server_misbehaving(message: impl Into<String>) -> Self {
        Self::new(FaultKind::ServerMisbehaving, message)
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    /// Category membership test: exactly one kind matches per fault.
    pub fn is(&self, kind: FaultKind) -> bool {
        self.kind == kind
    }

    /// Get the appropriate exit code for this fault (sysexits.h compatible).
    pub fn exit_code(&self) -> i32 {
        match self.kind {
            FaultKind::InvalidArgument => exitcode::USAGE,
            FaultKind::System => exitcode::SOFTWARE,
            FaultKind::ServerMisbehaving => exitcode::UNAVAILABLE,
        }
    }

    /// Suggested log level when reporting this fault.
    pub fn log_level(&self) -> Level {
        match self.kind {
            FaultKind::InvalidArgument => Level::WARN,
            FaultKind::System | FaultKind::ServerMisbehaving => Level::ERROR,
        }
    }
}

/// Extension trait for classifying plain errors with context.
pub trait ClassifyExt<T> {
    /// Classify as [`FaultKind::System`] with a context message.
    fn or_system(self, context: &str) -> FaultResult<T>;

    /// Classify as [`FaultKind::InvalidArgument`] with a context message.
    fn or_invalid_argument(self, context: &str) -> FaultResult<T>;

    /// Classify as [`FaultKind::ServerMisbehaving`] with a context message.
    fn or_server_misbehaving(self, context: &str) -> FaultResult<T>;
}

impl<T, E> ClassifyExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn or_system(self, context: &str) -> FaultResult<T> {
        self.map_err(|e| classify(FaultKind::System, context, e))
    }

    fn or_invalid_argument(self, context: &str) -> FaultResult<T> {
        self.map_err(|e| classify(FaultKind::InvalidArgument, context, e))
    }

    fn or_server_misbehaving(self, context: &str) -> FaultResult<T> {
        self.map_err(|e| classify(FaultKind::ServerMisbehaving, context, e))
    }
}

fn classify<E>(kind: FaultKind, context: &str, cause: E) -> Fault
where
    E: std::error::Error + Send + Sync + 'static,
{
    Fault {
        kind,
        message: format!("{}: {}", context, cause),
        cause: Some(Box::new(cause)),
    }
}
