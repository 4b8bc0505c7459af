// ==========================================
// Exam Timetabling Engine - Exam Entities
// ==========================================
// ExamEvent: a module/course that needs one exam in the window.
// ScheduledExam: a committed placement (event at a slot, in a room,
// supervised by a professor).
// ==========================================

use crate::domain::types::ExamStatus;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// ExamEvent - exam demand
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamEvent {
    /// Event id (catalog key, assigned upstream)
    pub id: i64,
    /// Module code (e.g. "INF301")
    pub code: String,
    /// Module display name
    pub name: String,
    /// Owning formation (curriculum)
    pub formation_id: i64,
    /// Owning department (denormalized from the formation for filtering)
    pub dept_id: i64,
    /// Exam duration in minutes
    pub duration_min: i64,
    /// Enrolled student count, derived upstream from active registrations
    pub enrollment: i64,
}

// ==========================================
// ScheduledExam - committed placement
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledExam {
    /// Row id (0 until persisted)
    pub id: i64,
    /// The exam event this placement realizes
    pub exam_event_id: i64,
    /// Assigned room (may be unassigned for drafts)
    pub room_id: Option<i64>,
    /// Supervising professor (may be unassigned for drafts)
    pub professor_id: Option<i64>,
    /// Start of the exam
    pub start_at: NaiveDateTime,
    /// Duration in minutes
    pub duration_min: i64,
    /// Lifecycle status
    pub status: ExamStatus,
    /// Generation session that produced this row (None for manual entries)
    pub session_id: Option<String>,
    /// Enrollment snapshot at placement time
    pub enrollment: i64,
    /// Row creation timestamp
    pub created_at: NaiveDateTime,
}

impl ScheduledExam {
    /// Build a fresh `scheduled` placement for an event, ready for the
    /// checked insert. The id is filled in by the repository.
    pub fn new_placement(
        event: &ExamEvent,
        room_id: i64,
        professor_id: i64,
        start_at: NaiveDateTime,
        duration_min: i64,
        session_id: &str,
    ) -> Self {
        Self {
            id: 0,
            exam_event_id: event.id,
            room_id: Some(room_id),
            professor_id: Some(professor_id),
            start_at,
            duration_min,
            status: ExamStatus::Scheduled,
            session_id: Some(session_id.to_string()),
            enrollment: event.enrollment,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Exclusive end of the exam interval.
    pub fn end_at(&self) -> NaiveDateTime {
        self.start_at + Duration::minutes(self.duration_min)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Half-open interval overlap against `[other_start, other_end)`.
    pub fn overlaps(&self, other_start: NaiveDateTime, other_end: NaiveDateTime) -> bool {
        self.start_at < other_end && other_start < self.end_at()
    }
}
