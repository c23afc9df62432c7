//! Client error taxonomy
//!
//! Every failure crossing the core's public API is a `ClientError`.
//! Remote failures are passed through as `RequestFailed` with the operation
//! that issued them; interpretation (e.g. treating 401 as an expired session)
//! is left to the caller.

use std::fmt;

use thiserror::Error;

use crate::storage::StorageError;

/// Remote operations issued by the clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    CurrentUser,
    ListTasks,
    GetTask,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

impl Operation {
    /// Short verb phrase used in user-facing messages
    pub fn describe(&self) -> &'static str {
        match self {
            Operation::Register => "register",
            Operation::Login => "log in",
            Operation::CurrentUser => "fetch current user",
            Operation::ListTasks => "load tasks",
            Operation::GetTask => "fetch task",
            Operation::CreateTask => "create task",
            Operation::UpdateTask => "update task",
            Operation::DeleteTask => "delete task",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Why a remote request failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestCause {
    /// Connection, DNS, TLS or other transport failure
    Network(String),
    /// Server answered with a non-2xx status
    Status { status: u16, body: String },
    /// Response body could not be decoded
    Decode(String),
}

impl RequestCause {
    /// HTTP status, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestCause::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for RequestCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestCause::Network(msg) => write!(f, "network error: {}", msg),
            RequestCause::Status { status, body } if body.is_empty() => {
                write!(f, "server returned HTTP {}", status)
            }
            RequestCause::Status { status, body } => {
                write!(f, "server returned HTTP {}: {}", status, body)
            }
            RequestCause::Decode(msg) => write!(f, "malformed response: {}", msg),
        }
    }
}

/// Errors produced by the core
#[derive(Error, Debug)]
pub enum ClientError {
    /// Bad credentials or expired session
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Network, server or parse failure
    #[error("Failed to {operation}: {cause}")]
    RequestFailed {
        operation: Operation,
        cause: RequestCause,
    },

    /// Rejected locally before sending
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Client-local persistence failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Client could not be constructed
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub(crate) fn request(operation: Operation, cause: RequestCause) -> Self {
        ClientError::RequestFailed { operation, cause }
    }

    /// HTTP status of a failed request, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RequestFailed { cause, .. } => cause.status(),
            _ => None,
        }
    }

    /// True when the server rejected the bearer token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Auth(_)) || self.status() == Some(401)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
