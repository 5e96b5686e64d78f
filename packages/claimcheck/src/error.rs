//! Typed errors for the claimcheck library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell a
//! transport failure from a schema violation from a search outage.

use std::path::PathBuf;

use thiserror::Error;

use crate::traits::generator::AgentRole;

/// A single failed text-generation attempt. Every variant is retryable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// Connection refused, timeout, TLS failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx answer from the endpoint
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// 2xx answer that could not be read as a completion
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Returned once a retried operation has used up its attempts.
///
/// `last` is the failure of the final attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("gave up after {attempts} attempt(s): {last}")]
pub struct CallError<E> {
    pub attempts: u32,
    pub last: E,
}

/// A successful call whose payload does not match the expected shape.
#[derive(Debug, Error)]
pub enum StructuredOutputError {
    /// Not JSON, wrong field types, or a required field missing
    #[error("{role} returned an invalid payload: {source}")]
    InvalidPayload {
        role: AgentRole,
        #[source]
        source: serde_json::Error,
    },

    /// A triple without exactly three non-empty elements
    #[error("claim #{index} is malformed: {reason}")]
    InvalidClaim { index: usize, reason: ClaimError },
}

/// Why a candidate triple was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClaimError {
    #[error("expected 3 elements, got {0}")]
    WrongArity(usize),

    #[error("element {0} is empty")]
    EmptyElement(usize),
}

/// Anything an agent can fail with before degrading.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Call(#[from] CallError<GenerationError>),

    #[error(transparent)]
    StructuredOutput(#[from] StructuredOutputError),
}

/// Search provider failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("search transport error: {0}")]
    Transport(String),

    #[error("search API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed search response: {0}")]
    Malformed(String),
}

/// Failure to load an evaluation suite.
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("cannot read test suite {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line} of {path} is not a valid test case: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that stop a harness run before it starts.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Suite(#[from] SuiteError),

    #[error("evaluation log error: {0}")]
    Log(#[from] std::io::Error),

    #[error("test suite is empty")]
    EmptySuite,
}

/// Result type alias for agent operations.
pub type AgentResult<T> = std::result::Result<T, AgentError>;
