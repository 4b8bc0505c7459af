// ==========================================
// Exam Timetabling Engine - Generation Orchestrator
// ==========================================
// Drives one generation run end to end: opens the session row, builds
// the slot grid and resource pools, seeds the conflict index from
// committed exams, dispatches to the configured assigner and finalizes
// the session exactly once, on every path.
// ==========================================

use crate::config::SchedulerConfig;
use crate::domain::session::GenerationSession;
use crate::domain::types::SessionStatus;
use crate::engine::catalog::ResourceCatalog;
use crate::engine::conflict_index::ConflictIndex;
use crate::engine::greedy::{AssignmentReport, GreedyAssigner};
use crate::engine::model::{ModelAssigner, ModelSolveOutcome};
use crate::engine::slots::SlotGenerator;
use crate::engine::strategy::AssignmentStrategy;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::RepositoryResult;
use crate::repository::exam_repo::ScheduledExamRepository;
use crate::repository::session_repo::GenerationSessionRepository;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

// ==========================================
// GenerationRequest - run parameters
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// First day of the scheduling window (inclusive)
    pub window_start: NaiveDate,
    /// Last day of the scheduling window (inclusive)
    pub window_end: NaiveDate,
    /// Restrict the event pool to these departments
    pub dept_ids: Option<Vec<i64>>,
    /// Restrict the event pool to these formations
    pub formation_ids: Option<Vec<i64>>,
    /// Requesting user label, recorded on the session
    pub requested_by: String,
}

// ==========================================
// GenerationOutcome - run result
// ==========================================

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    /// Session id of the finalized run
    pub session_id: String,
    /// Terminal status the session reached
    pub status: SessionStatus,
    /// Exams committed by this run
    pub placed_count: i64,
    /// Candidate events examined by this run
    pub resolved_count: i64,
    /// Wall-clock duration in milliseconds
    pub elapsed_ms: i64,
    /// Outcome or failure text, as recorded on the session
    pub message: String,
}

/// What a run decided before finalization.
struct RunSummary {
    status: SessionStatus,
    placed: i64,
    resolved: i64,
    message: String,
}

// ==========================================
// GenerationEngine - orchestrator
// ==========================================

pub struct GenerationEngine {
    catalog: ResourceCatalog,
    greedy: GreedyAssigner,
    model: ModelAssigner,
    sessions: Arc<GenerationSessionRepository>,
    exams: Arc<ScheduledExamRepository>,
    slots: SlotGenerator,
    config: SchedulerConfig,
}

impl GenerationEngine {
    pub fn new(
        catalog_repo: Arc<CatalogRepository>,
        exam_repo: Arc<ScheduledExamRepository>,
        session_repo: Arc<GenerationSessionRepository>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            catalog: ResourceCatalog::new(catalog_repo),
            greedy: GreedyAssigner::new(exam_repo.clone()),
            model: ModelAssigner::new(exam_repo.clone()),
            sessions: session_repo,
            exams: exam_repo,
            slots: SlotGenerator::new(&config.slot_start_hours),
            config,
        }
    }

    /// Execute one generation run.
    ///
    /// The session row is created before any scheduling work and
    /// finalized exactly once: `completed` when an assigner ran to the
    /// end (even with zero placements), `failed` when resources were
    /// insufficient or the constraint solve gave up, and `failed` with
    /// the error text when the run aborted. Abort errors are re-raised
    /// after finalization.
    #[instrument(skip(self, request), fields(
        requested_by = %request.requested_by,
        window_start = %request.window_start,
        window_end = %request.window_end,
        strategy = %self.config.strategy,
    ))]
    pub fn generate(&self, request: &GenerationRequest) -> RepositoryResult<GenerationOutcome> {
        let started = Instant::now();

        // ==========================================
        // Step 1: open the session
        // ==========================================
        let filters_json = serde_json::json!({
            "window_start": request.window_start,
            "window_end": request.window_end,
            "dept_ids": request.dept_ids,
            "formation_ids": request.formation_ids,
            "strategy": self.config.strategy,
            "pool_cap": self.config.pool_cap,
        })
        .to_string();

        let session = GenerationSession::open(
            &request.requested_by,
            request.window_start,
            request.window_end,
            Some(filters_json),
        );
        let session_id = self.sessions.create(&session)?;
        info!(session_id = %session_id, "generation session opened");

        // ==========================================
        // Step 2: run the assignment, finalize on every path
        // ==========================================
        match self.run_assignment(request, &session_id) {
            Ok(summary) => {
                let elapsed_ms = started.elapsed().as_millis() as i64;
                self.sessions.finalize(
                    &session_id,
                    summary.status,
                    summary.placed,
                    summary.resolved,
                    elapsed_ms,
                    &summary.message,
                )?;
                info!(
                    session_id = %session_id,
                    status = %summary.status,
                    placed = summary.placed,
                    resolved = summary.resolved,
                    elapsed_ms,
                    "generation session finalized"
                );
                Ok(GenerationOutcome {
                    session_id,
                    status: summary.status,
                    placed_count: summary.placed,
                    resolved_count: summary.resolved,
                    elapsed_ms,
                    message: summary.message,
                })
            }
            Err(e) => {
                let elapsed_ms = started.elapsed().as_millis() as i64;
                let message = format!("generation aborted: {}", e);
                if let Err(finalize_err) = self.sessions.finalize(
                    &session_id,
                    SessionStatus::Failed,
                    0,
                    0,
                    elapsed_ms,
                    &message,
                ) {
                    error!(
                        session_id = %session_id,
                        error = %finalize_err,
                        "could not finalize session after abort"
                    );
                }
                Err(e)
            }
        }
    }

    /// The scheduling work proper. Storage errors bubble up; resource
    /// and solver shortfalls come back as a failed summary.
    fn run_assignment(
        &self,
        request: &GenerationRequest,
        session_id: &str,
    ) -> RepositoryResult<RunSummary> {
        // ==========================================
        // Step 2a: slot grid and resource pools
        // ==========================================
        let slots = self.slots.generate(request.window_start, request.window_end);
        let pools = self.catalog.assemble(
            request.dept_ids.as_deref(),
            request.formation_ids.as_deref(),
            self.config.pool_cap,
        )?;

        if slots.is_empty() || pools.is_deficient() {
            let message = format!(
                "insufficient resources: {} exam events, {} rooms, {} professors, {} time slots",
                pools.events.len(),
                pools.rooms.len(),
                pools.professors.len(),
                slots.len(),
            );
            warn!(session_id = %session_id, "{}", message);
            return Ok(RunSummary {
                status: SessionStatus::Failed,
                placed: 0,
                resolved: 0,
                message,
            });
        }

        info!(
            session_id = %session_id,
            slots = slots.len(),
            events = pools.events.len(),
            rooms = pools.rooms.len(),
            professors = pools.professors.len(),
            "resource pools assembled"
        );

        // ==========================================
        // Step 2b: seed the conflict index from committed exams
        // ==========================================
        let committed = match slots.first().zip(slots.last()) {
            Some((first, last)) => self.exams.find_overlapping_window(
                *first,
                *last + Duration::minutes(self.config.nominal_slot_min),
            )?,
            None => Vec::new(),
        };
        let mut index = ConflictIndex::new();
        index.seed(&committed, &slots, self.config.nominal_slot_min);
        info!(
            session_id = %session_id,
            committed = committed.len(),
            "conflict index seeded"
        );

        // ==========================================
        // Step 2c: dispatch to the configured assigner
        // ==========================================
        let summary = match self.config.strategy {
            AssignmentStrategy::Greedy => {
                let report =
                    self.greedy
                        .assign(&pools, &slots, &mut index, session_id, &self.config)?;
                Self::completed_summary(&report)
            }
            AssignmentStrategy::ConstraintModel => {
                match self
                    .model
                    .assign(&pools, &slots, &index, session_id, &self.config)?
                {
                    ModelSolveOutcome::Solved(report) => Self::completed_summary(&report),
                    ModelSolveOutcome::Infeasible => RunSummary {
                        status: SessionStatus::Failed,
                        placed: 0,
                        resolved: pools.events.len() as i64,
                        message: "constraint model infeasible: no conflict-free assignment \
                                  exists for the requested window"
                            .to_string(),
                    },
                    ModelSolveOutcome::TimedOut => RunSummary {
                        status: SessionStatus::Failed,
                        placed: 0,
                        resolved: pools.events.len() as i64,
                        message: format!(
                            "constraint solve exceeded the {}s budget",
                            self.config.solver_budget_secs
                        ),
                    },
                }
            }
        };

        Ok(summary)
    }

    fn completed_summary(report: &AssignmentReport) -> RunSummary {
        let mut message = format!(
            "placed {} of {} exam events",
            report.placed.len(),
            report.considered
        );
        if report.already_scheduled > 0 {
            message.push_str(&format!(" ({} already scheduled)", report.already_scheduled));
        }
        RunSummary {
            status: SessionStatus::Completed,
            placed: report.placed_count(),
            resolved: report.considered as i64,
            message,
        }
    }
}
