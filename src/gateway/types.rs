//! Core types for the assistant gateway.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque handle to a conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque handle to a run of an assistant over a thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Pre-provisioned assistant the runs are started against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssistantId(pub String);

impl AssistantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AssistantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// RUN STATE
// =============================================================================

/// Remote state of a run, as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
}

impl From<&str> for RunState {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "queued" => RunState::Queued,
            "in_progress" => RunState::InProgress,
            "requires_action" => RunState::RequiresAction,
            "cancelling" => RunState::Cancelling,
            "cancelled" => RunState::Cancelled,
            "failed" => RunState::Failed,
            "completed" => RunState::Completed,
            "incomplete" => RunState::Incomplete,
            "expired" => RunState::Expired,
            _ => RunState::InProgress, // Unknown states keep the poll going until the cap
        }
    }
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Queued => "queued",
            RunState::InProgress => "in_progress",
            RunState::RequiresAction => "requires_action",
            RunState::Cancelling => "cancelling",
            RunState::Cancelled => "cancelled",
            RunState::Failed => "failed",
            RunState::Completed => "completed",
            RunState::Incomplete => "incomplete",
            RunState::Expired => "expired",
        }
    }

    /// Whether polling can stop. `RequiresAction` counts as terminal: no tools
    /// are registered, so nothing would ever resolve it.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            RunState::Queued | RunState::InProgress | RunState::Cancelling
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunState::Completed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStatus {
    pub id: RunId,
    pub state: RunState,
    /// Service-provided reason, when the run did not complete.
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_states() {
        assert_eq!(RunState::from("queued"), RunState::Queued);
        assert_eq!(RunState::from("IN_PROGRESS"), RunState::InProgress);
        assert_eq!(RunState::from("completed"), RunState::Completed);
        assert_eq!(RunState::from("failed"), RunState::Failed);
        assert_eq!(RunState::from("something_new"), RunState::InProgress);
    }

    #[test]
    fn terminal_states() {
        let pending = [RunState::Queued, RunState::InProgress, RunState::Cancelling];
        for s in pending {
            assert!(!s.is_terminal(), "{s}");
        }
        let terminal = [
            RunState::RequiresAction,
            RunState::Cancelled,
            RunState::Failed,
            RunState::Completed,
            RunState::Incomplete,
            RunState::Expired,
        ];
        for s in terminal {
            assert!(s.is_terminal(), "{s}");
        }
        assert!(RunState::Completed.is_success());
        assert!(!RunState::Failed.is_success());
    }
}
