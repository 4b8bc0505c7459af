// ==========================================
// Exam Timetabling Engine - Report API
// ==========================================
// Read-only reporting over committed exams: conflict detection and
// room occupancy. Works straight from the database, no engine state.
// ==========================================

use crate::api::error::ApiResult;
use crate::config::DEFAULT_PROFESSOR_DAILY_CAP;
use crate::domain::report::{ConflictFinding, RoomOccupancy};
use crate::repository::report_repo::ReportRepository;
use std::sync::Arc;
use tracing::info;

// ==========================================
// ReportApi
// ==========================================

pub struct ReportApi {
    report_repo: Arc<ReportRepository>,
}

impl ReportApi {
    pub fn new(report_repo: Arc<ReportRepository>) -> Self {
        Self { report_repo }
    }

    /// Scan committed exams for room overlaps and professor overloads.
    ///
    /// The storage guards make overlaps impossible through the normal
    /// insert path, so findings here point at rows that were edited
    /// directly or imported from elsewhere.
    pub fn detect_conflicts(&self) -> ApiResult<Vec<ConflictFinding>> {
        let mut findings = self.report_repo.find_room_overlaps()?;
        findings.extend(
            self.report_repo
                .find_professor_overloads(DEFAULT_PROFESSOR_DAILY_CAP)?,
        );
        info!(findings = findings.len(), "conflict detection finished");
        Ok(findings)
    }

    /// Exam count and total enrollment per room, busiest first.
    pub fn room_occupancy(&self) -> ApiResult<Vec<RoomOccupancy>> {
        Ok(self.report_repo.room_occupancy()?)
    }
}
