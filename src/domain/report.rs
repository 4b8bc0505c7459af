// ==========================================
// Exam Timetabling Engine - Reporting Read Models
// ==========================================
// Shapes returned by the conflict detector and the occupancy reporter.
// Read-only: these are built from analytical queries, never written back.
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Conflict findings
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Two active exams overlap in the same room
    RoomOverlap,
    /// A professor supervises more exams in one day than the threshold
    ProfessorOverload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictFinding {
    pub kind: ConflictKind,
    /// Human-readable description of the finding
    pub description: String,
    /// Involved exam row ids (empty for overload findings)
    pub exam_ids: Vec<i64>,
    /// Calendar day the finding refers to
    pub day: NaiveDate,
}

// ==========================================
// Room occupancy
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomOccupancy {
    pub room_id: i64,
    pub code: String,
    pub name: String,
    pub building: Option<String>,
    /// Derived exam-time capacity (half the nominal seat count)
    pub exam_capacity: i64,
    /// Active exams assigned to the room
    pub exam_count: i64,
    /// Sum of enrollment over those exams
    pub total_enrolled: i64,
}
