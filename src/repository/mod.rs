// ==========================================
// Exam Timetabling Engine - Repository Layer
// ==========================================
// Data access only: parameterized SQL, row mapping, error mapping.
// Scheduling rules live in the engine; the only rules enforced here are
// the ones the storage itself carries (guard triggers, status guard on
// session finalize).
// ==========================================

pub mod catalog_repo;
pub mod error;
pub mod exam_repo;
pub mod report_repo;
pub mod session_repo;

// Re-export the repositories
pub use catalog_repo::CatalogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use exam_repo::ScheduledExamRepository;
pub use report_repo::ReportRepository;
pub use session_repo::GenerationSessionRepository;
