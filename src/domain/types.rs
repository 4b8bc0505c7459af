// ==========================================
// Exam Timetabling Engine - Domain Types
// ==========================================
// Status vocabularies shared by the engine, the repositories and the
// service facade. Serialized in lowercase, matching the database TEXT
// columns.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Exam Status
// ==========================================
// An exam is "active" (it occupies its room and professor) unless it is
// a draft or has been cancelled. The engine only ever writes `scheduled`;
// the remaining values are written by downstream administrative flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamStatus {
    Draft,
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
}

impl ExamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamStatus::Draft => "draft",
            ExamStatus::Scheduled => "scheduled",
            ExamStatus::Confirmed => "confirmed",
            ExamStatus::Completed => "completed",
            ExamStatus::Cancelled => "cancelled",
        }
    }

    /// Active exams block their room and professor.
    pub fn is_active(&self) -> bool {
        !matches!(self, ExamStatus::Draft | ExamStatus::Cancelled)
    }
}

impl fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExamStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(ExamStatus::Draft),
            "scheduled" => Ok(ExamStatus::Scheduled),
            "confirmed" => Ok(ExamStatus::Confirmed),
            "completed" => Ok(ExamStatus::Completed),
            "cancelled" => Ok(ExamStatus::Cancelled),
            other => Err(format!("unknown exam status: {}", other)),
        }
    }
}

// ==========================================
// Session Status
// ==========================================
// Lifecycle of a generation run. A session is opened `in_progress` and
// must reach exactly one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(SessionStatus::Pending),
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            "failed" => Ok(SessionStatus::Failed),
            other => Err(format!("unknown session status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_exam_status_roundtrip() {
        for status in [
            ExamStatus::Draft,
            ExamStatus::Scheduled,
            ExamStatus::Confirmed,
            ExamStatus::Completed,
            ExamStatus::Cancelled,
        ] {
            assert_eq!(ExamStatus::from_str(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn test_exam_status_active() {
        assert!(ExamStatus::Scheduled.is_active());
        assert!(ExamStatus::Confirmed.is_active());
        assert!(ExamStatus::Completed.is_active());
        assert!(!ExamStatus::Draft.is_active());
        assert!(!ExamStatus::Cancelled.is_active());
    }

    #[test]
    fn test_session_status_terminal() {
        assert!(!SessionStatus::Pending.is_terminal());
        assert!(!SessionStatus::InProgress.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
    }

    #[test]
    fn test_session_status_unknown() {
        assert!(SessionStatus::from_str("running").is_err());
    }
}
