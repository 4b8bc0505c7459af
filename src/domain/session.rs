// ==========================================
// Exam Timetabling Engine - Generation Session
// ==========================================
// One row per generation run, opened before any placement and finalized
// exactly once with a terminal status. The row is the audit trail of the
// run: who asked, for which window, with which parameters, and how it
// ended.
// ==========================================

use crate::domain::types::SessionStatus;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSession {
    /// Session id (UUID, generated when the run is opened)
    pub session_id: String,
    /// Requesting user label
    pub requested_by: String,
    /// First day of the scheduling window (inclusive)
    pub window_start: NaiveDate,
    /// Last day of the scheduling window (inclusive)
    pub window_end: NaiveDate,
    /// JSON snapshot of the request parameters (filters, strategy, caps)
    pub filters_json: Option<String>,
    /// Lifecycle status
    pub status: SessionStatus,
    /// Exams actually committed by this run
    pub placed_count: i64,
    /// Candidate events examined by this run
    pub resolved_count: i64,
    /// Wall-clock duration of the run in milliseconds
    pub elapsed_ms: i64,
    /// Human-readable outcome or failure text
    pub log: Option<String>,
    /// Row creation timestamp
    pub created_at: NaiveDateTime,
    /// Set when the session reaches a terminal status
    pub finished_at: Option<NaiveDateTime>,
}

impl GenerationSession {
    /// Open a new `in_progress` session for a run.
    pub fn open(
        requested_by: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
        filters_json: Option<String>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            requested_by: requested_by.to_string(),
            window_start,
            window_end,
            filters_json,
            status: SessionStatus::InProgress,
            placed_count: 0,
            resolved_count: 0,
            elapsed_ms: 0,
            log: None,
            created_at: chrono::Utc::now().naive_utc(),
            finished_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
