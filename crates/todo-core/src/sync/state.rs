//! Observable synchronizer state

use std::fmt;

use crate::error::{ClientError, Operation};
use crate::models::{Task, TaskId};

/// Class of the most recent failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or rejected credentials (HTTP 401)
    Auth,
    /// Network, server or parse failure
    RequestFailed,
    /// Rejected locally before sending
    Validation,
}

/// Human-readable failure kept for the view layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncError {
    pub kind: ErrorKind,
    pub operation: Operation,
    pub message: String,
}

impl SyncError {
    /// Classify a client error raised while performing `operation`
    pub fn from_client(operation: Operation, error: &ClientError) -> Self {
        let kind = match error {
            ClientError::Validation { .. } => ErrorKind::Validation,
            e if e.is_unauthorized() => ErrorKind::Auth,
            _ => ErrorKind::RequestFailed,
        };

        let message = match error {
            // Already phrased as "Failed to <operation>: ..."
            ClientError::RequestFailed { .. } => error.to_string(),
            _ => format!("Failed to {}: {}", operation, error),
        };

        Self {
            kind,
            operation,
            message,
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Point-in-time copy of the synchronizer state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskListSnapshot {
    /// Tasks in display order
    pub tasks: Vec<Task>,
    /// Most recent failure, cleared by the next success
    pub last_error: Option<SyncError>,
    /// A request is outstanding
    pub pending: bool,
}

impl TaskListSnapshot {
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Number of completed tasks
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestCause;

    #[test]
    fn test_classification() {
        let not_found = ClientError::RequestFailed {
            operation: Operation::UpdateTask,
            cause: RequestCause::Status {
                status: 404,
                body: String::new(),
            },
        };
        let err = SyncError::from_client(Operation::UpdateTask, &not_found);
        assert_eq!(err.kind, ErrorKind::RequestFailed);
        assert_eq!(err.message, "Failed to update task: server returned HTTP 404");

        let unauthorized = ClientError::RequestFailed {
            operation: Operation::ListTasks,
            cause: RequestCause::Status {
                status: 401,
                body: String::new(),
            },
        };
        assert_eq!(
            SyncError::from_client(Operation::ListTasks, &unauthorized).kind,
            ErrorKind::Auth
        );

        let invalid = ClientError::Validation {
            field: "title",
            reason: "must not be empty".to_string(),
        };
        let err = SyncError::from_client(Operation::CreateTask, &invalid);
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.to_string(), "Failed to create task: Invalid title: must not be empty");
    }
}
