// ==========================================
// Exam Timetabling Engine - Domain Layer
// ==========================================
// Entities, status vocabularies and reporting read models.
// No data access, no engine logic.
// ==========================================

pub mod exam;
pub mod report;
pub mod resources;
pub mod session;
pub mod types;

// Re-export the core types
pub use exam::{ExamEvent, ScheduledExam};
pub use report::{ConflictFinding, ConflictKind, RoomOccupancy};
pub use resources::{Professor, Room};
pub use session::GenerationSession;
pub use types::{ExamStatus, SessionStatus};
