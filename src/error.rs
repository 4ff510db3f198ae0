use thiserror::Error;

use crate::backend::Readiness;

/// Convenience result type for record parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Convenience result type for backend invocations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Error returned when CSV text cannot be tokenized into header-keyed rows.
///
/// Row-level problems (a missing or non-numeric `age`) are never reported here; they are encoded
/// in the output as null fields.
#[derive(Debug, Error)]
pub enum ParseError {
    /// No line with any non-blank field was found, so there is nothing to key rows by.
    #[error("missing header: input has no non-empty line")]
    MissingHeader,

    /// The underlying CSV tokenizer failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Error returned by a backend's `parse` call.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The native backend was invoked before its loader reported [`Readiness::Ready`].
    #[error("native backend is not ready (state: {state})")]
    NotReady { state: Readiness },

    /// The input could not be tokenized.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Any other backend-reported failure. The message is surfaced verbatim.
    #[error("{0}")]
    Execution(String),
}

/// Error returned by the native backend's load step.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The readiness state machine only allows `Uninitialized -> Loading -> Ready | Failed`.
    #[error("invalid readiness transition from {from} to {to}")]
    InvalidTransition { from: Readiness, to: Readiness },

    /// The loader was configured with options it cannot honor.
    #[error("invalid native backend options: {message}")]
    InvalidOptions { message: String },

    /// The worker pool backing the native engine could not be built.
    #[error("failed to build native worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Severity classification used for harness observer callbacks and alert thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunSeverity {
    /// A precondition was not met; nothing ran.
    Warning,
    /// The input was structurally unusable.
    Error,
    /// The backend itself failed.
    Critical,
}

impl RunSeverity {
    /// Lowercase label used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            RunSeverity::Warning => "warning",
            RunSeverity::Error => "error",
            RunSeverity::Critical => "critical",
        }
    }
}

/// Failure recorded in a [`crate::execution::RunStatus::Failure`].
///
/// Unlike the lower-level errors this type owns only strings, so results can be cloned and compared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// No input text was supplied.
    #[error("no input text supplied")]
    InputMissing,

    /// The native backend was invoked before it was ready.
    #[error("native backend is not ready (state: {state})")]
    BackendNotReady { state: Readiness },

    /// The input has no header or could not be tokenized.
    #[error("parse error: {0}")]
    Parse(String),

    /// Backend-reported failure, message preserved verbatim.
    #[error("{0}")]
    BackendExecution(String),
}

impl RunError {
    /// Severity used for observer callbacks.
    pub fn severity(&self) -> RunSeverity {
        match self {
            RunError::InputMissing | RunError::BackendNotReady { .. } => RunSeverity::Warning,
            RunError::Parse(_) => RunSeverity::Error,
            RunError::BackendExecution(_) => RunSeverity::Critical,
        }
    }
}

impl From<BackendError> for RunError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotReady { state } => RunError::BackendNotReady { state },
            BackendError::Parse(e) => RunError::Parse(e.to_string()),
            BackendError::Execution(msg) => RunError::BackendExecution(msg),
        }
    }
}
