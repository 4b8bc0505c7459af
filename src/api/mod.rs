// ==========================================
// Exam Timetabling Engine - API Layer
// ==========================================
// Thin caller-facing layer: input validation, error translation and
// delegation to the engine and repositories.
// ==========================================

pub mod error;
pub mod report_api;
pub mod schedule_api;

pub use error::{ApiError, ApiResult};
pub use report_api::ReportApi;
pub use schedule_api::ScheduleApi;
