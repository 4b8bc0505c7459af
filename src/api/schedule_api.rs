// ==========================================
// Exam Timetabling Engine - Schedule API
// ==========================================
// Caller-facing surface for generation runs: validates the request,
// delegates to the generation engine and exposes session lookups.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::exam::ScheduledExam;
use crate::domain::session::GenerationSession;
use crate::engine::orchestrator::{GenerationEngine, GenerationOutcome, GenerationRequest};
use crate::repository::exam_repo::ScheduledExamRepository;
use crate::repository::session_repo::GenerationSessionRepository;
use std::sync::Arc;

// ==========================================
// ScheduleApi
// ==========================================

pub struct ScheduleApi {
    engine: Arc<GenerationEngine>,
    session_repo: Arc<GenerationSessionRepository>,
    exam_repo: Arc<ScheduledExamRepository>,
}

impl ScheduleApi {
    pub fn new(
        engine: Arc<GenerationEngine>,
        session_repo: Arc<GenerationSessionRepository>,
        exam_repo: Arc<ScheduledExamRepository>,
    ) -> Self {
        Self {
            engine,
            session_repo,
            exam_repo,
        }
    }

    /// Run one generation for the requested window.
    ///
    /// Resource shortfalls and infeasible solves come back as a
    /// `failed` outcome, not an error; only validation problems and
    /// storage failures raise.
    pub fn generate(&self, request: GenerationRequest) -> ApiResult<GenerationOutcome> {
        if request.requested_by.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "requested_by must not be empty".to_string(),
            ));
        }
        if request.window_start > request.window_end {
            return Err(ApiError::InvalidInput(format!(
                "window_start {} is after window_end {}",
                request.window_start, request.window_end
            )));
        }
        Ok(self.engine.generate(&request)?)
    }

    /// Look up a session by id.
    pub fn get_session(&self, session_id: &str) -> ApiResult<GenerationSession> {
        if session_id.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "session_id must not be empty".to_string(),
            ));
        }
        self.session_repo
            .find_by_id(session_id)?
            .ok_or_else(|| ApiError::NotFound(format!("session {} does not exist", session_id)))
    }

    /// Exams committed by one session, in placement order.
    pub fn list_session_exams(&self, session_id: &str) -> ApiResult<Vec<ScheduledExam>> {
        if session_id.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "session_id must not be empty".to_string(),
            ));
        }
        Ok(self.exam_repo.find_by_session(session_id)?)
    }
}
