// ==========================================
// Exam Timetabling Engine - Greedy Assigner
// ==========================================
// First-feasible placement: events in pool order, slots chronologically,
// rooms largest-first, professors in pool order. Each placement is
// persisted through the checked insert before the next event is
// considered, so a crash mid-run loses nothing and a re-run skips what
// is already committed. No backtracking.
// ==========================================

use crate::config::SchedulerConfig;
use crate::domain::exam::{ExamEvent, ScheduledExam};
use crate::engine::catalog::ResourcePools;
use crate::engine::conflict_index::ConflictIndex;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::exam_repo::ScheduledExamRepository;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Outcome of one assigner pass. Produced by both the greedy and the
/// constraint-model assigner.
#[derive(Debug, Clone)]
pub struct AssignmentReport {
    /// Rows committed by this pass, with their generated ids
    pub placed: Vec<ScheduledExam>,
    /// Candidate events examined
    pub considered: usize,
    /// Events skipped because they already had an active exam
    pub already_scheduled: usize,
}

impl AssignmentReport {
    pub fn placed_count(&self) -> i64 {
        self.placed.len() as i64
    }
}

// ==========================================
// GreedyAssigner
// ==========================================
pub struct GreedyAssigner {
    exam_repo: Arc<ScheduledExamRepository>,
}

impl GreedyAssigner {
    pub fn new(exam_repo: Arc<ScheduledExamRepository>) -> Self {
        Self { exam_repo }
    }

    /// Place every event on the first feasible (slot, room, professor)
    /// triple.
    ///
    /// Feasibility is answered by the seeded conflict index alone; the
    /// storage guards are the backstop. When a guard rejects an insert
    /// the index believed free, the candidate is logged and skipped, the
    /// run continues. Any other storage error aborts the run.
    ///
    /// Events with no feasible triple stay unplaced; that is reported
    /// through the counts, not as an error.
    #[instrument(skip(self, pools, slots, index, config), fields(
        session_id = %session_id,
        events = pools.events.len(),
        rooms = pools.rooms.len(),
        professors = pools.professors.len(),
        slots = slots.len(),
    ))]
    pub fn assign(
        &self,
        pools: &ResourcePools,
        slots: &[NaiveDateTime],
        index: &mut ConflictIndex,
        session_id: &str,
        config: &SchedulerConfig,
    ) -> RepositoryResult<AssignmentReport> {
        let mut report = AssignmentReport {
            placed: Vec::new(),
            considered: pools.events.len(),
            already_scheduled: 0,
        };

        for event in &pools.events {
            if self.exam_repo.has_active_for_event(event.id)? {
                report.already_scheduled += 1;
                debug!(
                    event_id = event.id,
                    code = %event.code,
                    "event already has an active exam, skipping"
                );
                continue;
            }

            match self.place_event(event, pools, slots, index, session_id, config)? {
                Some(exam) => {
                    debug!(
                        event_id = event.id,
                        code = %event.code,
                        exam_id = exam.id,
                        start_at = %exam.start_at,
                        "event placed"
                    );
                    report.placed.push(exam);
                }
                None => {
                    debug!(
                        event_id = event.id,
                        code = %event.code,
                        "no feasible slot/room/professor, leaving unplaced"
                    );
                }
            }
        }

        Ok(report)
    }

    /// Walk the candidate space for one event and commit the first
    /// feasible triple. Returns None when the event cannot be placed.
    fn place_event(
        &self,
        event: &ExamEvent,
        pools: &ResourcePools,
        slots: &[NaiveDateTime],
        index: &mut ConflictIndex,
        session_id: &str,
        config: &SchedulerConfig,
    ) -> RepositoryResult<Option<ScheduledExam>> {
        let duration_min = if event.duration_min > 0 {
            event.duration_min
        } else {
            config.default_exam_duration_min
        };

        for (slot_idx, slot) in slots.iter().enumerate() {
            let day = slot.date();
            if index.formation_day_count(event.formation_id, day) >= config.formation_daily_cap {
                continue;
            }

            for room in &pools.rooms {
                if room.exam_capacity() < event.enrollment {
                    continue;
                }
                if !index.is_room_free(room.id, slot_idx) {
                    continue;
                }

                for professor in &pools.professors {
                    if !index.is_professor_free(professor.id, slot_idx) {
                        continue;
                    }
                    if i64::from(index.professor_day_count(professor.id, day))
                        >= professor.daily_cap
                    {
                        continue;
                    }

                    let exam = ScheduledExam::new_placement(
                        event,
                        room.id,
                        professor.id,
                        *slot,
                        duration_min,
                        session_id,
                    );
                    match self.exam_repo.insert_checked(&exam) {
                        Ok(id) => {
                            index.record_placement(
                                room.id,
                                professor.id,
                                slot_idx,
                                day,
                                event.formation_id,
                            );
                            let mut committed = exam;
                            committed.id = id;
                            return Ok(Some(committed));
                        }
                        Err(RepositoryError::ScheduleConflict(msg)) => {
                            // Index and storage disagree; the row was not
                            // committed, keep searching.
                            warn!(
                                event_id = event.id,
                                room_id = room.id,
                                professor_id = professor.id,
                                slot = %slot,
                                conflict = %msg,
                                "storage rejected a placement the index considered free"
                            );
                            continue;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        Ok(None)
    }
}
