// ==========================================
// Exam Timetabling Engine - Constraint-Model Assigner
// ==========================================
// Exact alternative to the greedy pass: one binary variable per feasible
// (event, slot, room, professor) combination, pure feasibility solve
// (zero objective), then one materialization pass through the checked
// insert. The solve runs on a worker thread so the run can enforce a
// wall-clock budget; on timeout the thread is detached (the solver has
// no cancellation hook) and the run reports failure.
// ==========================================

use crate::config::SchedulerConfig;
use crate::engine::catalog::ResourcePools;
use crate::engine::conflict_index::ConflictIndex;
use crate::engine::greedy::AssignmentReport;
use crate::domain::exam::ScheduledExam;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::exam_repo::ScheduledExamRepository;
use chrono::{NaiveDate, NaiveDateTime};
use good_lp::{default_solver, variable, Expression, ProblemVariables, Solution, SolverModel, Variable};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// How a constraint solve ended.
#[derive(Debug)]
pub enum ModelSolveOutcome {
    /// Feasible assignment found and materialized
    Solved(AssignmentReport),
    /// No conflict-free assignment exists for the model
    Infeasible,
    /// The solve did not finish within the budget
    TimedOut,
}

/// One feasible (event, slot, room, professor) combination, by pool and
/// slot indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    event_idx: usize,
    slot_idx: usize,
    room_idx: usize,
    professor_idx: usize,
}

/// Everything the solve needs, owned, so it can move to the worker
/// thread.
struct SolveInput {
    candidates: Vec<Candidate>,
    slot_days: Vec<NaiveDate>,
    professor_caps: Vec<i64>,
    /// Committed exams per (professor index, day), from the seeded index
    committed_professor_days: HashMap<(usize, NaiveDate), i64>,
    /// Formation of each event, by event index
    event_formations: Vec<i64>,
    formation_daily_cap: i64,
}

// ==========================================
// ModelAssigner
// ==========================================
pub struct ModelAssigner {
    exam_repo: Arc<ScheduledExamRepository>,
}

impl ModelAssigner {
    pub fn new(exam_repo: Arc<ScheduledExamRepository>) -> Self {
        Self { exam_repo }
    }

    /// Build, solve and materialize the assignment model.
    ///
    /// Combinations ruled out up front (room too small, or the seeded
    /// index marks the room/professor occupied at the slot) never become
    /// variables. Events whose combinations are all ruled out are
    /// excluded from the exactly-one constraint and reported unplaced
    /// rather than poisoning the whole model.
    #[instrument(skip(self, pools, slots, index, config), fields(
        session_id = %session_id,
        events = pools.events.len(),
        slots = slots.len(),
        budget_secs = config.solver_budget_secs,
    ))]
    pub fn assign(
        &self,
        pools: &ResourcePools,
        slots: &[NaiveDateTime],
        index: &ConflictIndex,
        session_id: &str,
        config: &SchedulerConfig,
    ) -> RepositoryResult<ModelSolveOutcome> {
        // Idempotent re-run safety, same as the greedy pass
        let mut schedulable: Vec<usize> = Vec::new();
        let mut already_scheduled = 0usize;
        for (event_idx, event) in pools.events.iter().enumerate() {
            if self.exam_repo.has_active_for_event(event.id)? {
                already_scheduled += 1;
                debug!(event_id = event.id, code = %event.code, "event already has an active exam, skipping");
            } else {
                schedulable.push(event_idx);
            }
        }

        let mut candidates = Vec::new();
        for &event_idx in &schedulable {
            let event = &pools.events[event_idx];
            for (slot_idx, _slot) in slots.iter().enumerate() {
                for (room_idx, room) in pools.rooms.iter().enumerate() {
                    if room.exam_capacity() < event.enrollment {
                        continue;
                    }
                    if !index.is_room_free(room.id, slot_idx) {
                        continue;
                    }
                    for (professor_idx, professor) in pools.professors.iter().enumerate() {
                        if !index.is_professor_free(professor.id, slot_idx) {
                            continue;
                        }
                        candidates.push(Candidate {
                            event_idx,
                            slot_idx,
                            room_idx,
                            professor_idx,
                        });
                    }
                }
            }
        }

        if candidates.is_empty() {
            info!("no candidate variables, nothing to solve");
            return Ok(ModelSolveOutcome::Solved(AssignmentReport {
                placed: Vec::new(),
                considered: pools.events.len(),
                already_scheduled,
            }));
        }

        let days: BTreeSet<NaiveDate> = slots.iter().map(|s| s.date()).collect();
        let mut committed_professor_days = HashMap::new();
        for (professor_idx, professor) in pools.professors.iter().enumerate() {
            for day in &days {
                let n = index.professor_day_count(professor.id, *day);
                if n > 0 {
                    committed_professor_days.insert((professor_idx, *day), i64::from(n));
                }
            }
        }

        let input = SolveInput {
            candidates: candidates.clone(),
            slot_days: slots.iter().map(|s| s.date()).collect(),
            professor_caps: pools.professors.iter().map(|p| p.daily_cap).collect(),
            committed_professor_days,
            event_formations: pools.events.iter().map(|e| e.formation_id).collect(),
            formation_daily_cap: i64::from(config.formation_daily_cap),
        };

        info!(variables = candidates.len(), "starting constraint solve");
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(solve_assignment(&input));
        });

        let chosen = match rx.recv_timeout(Duration::from_secs(config.solver_budget_secs)) {
            Ok(Some(chosen)) => chosen,
            Ok(None) => return Ok(ModelSolveOutcome::Infeasible),
            Err(mpsc::RecvTimeoutError::Timeout) => return Ok(ModelSolveOutcome::TimedOut),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(RepositoryError::InternalError(
                    "constraint solver thread terminated unexpectedly".to_string(),
                ))
            }
        };

        self.materialize(&candidates, chosen, pools, slots, session_id, config, already_scheduled)
    }

    /// Persist the chosen combinations in one pass.
    fn materialize(
        &self,
        candidates: &[Candidate],
        mut chosen: Vec<usize>,
        pools: &ResourcePools,
        slots: &[NaiveDateTime],
        session_id: &str,
        config: &SchedulerConfig,
        already_scheduled: usize,
    ) -> RepositoryResult<ModelSolveOutcome> {
        // Build order is (event, slot, room, professor) ascending, so
        // sorted indices give a deterministic insert order.
        chosen.sort_unstable();

        let mut report = AssignmentReport {
            placed: Vec::new(),
            considered: pools.events.len(),
            already_scheduled,
        };

        for i in chosen {
            let c = candidates[i];
            let event = &pools.events[c.event_idx];
            let room = &pools.rooms[c.room_idx];
            let professor = &pools.professors[c.professor_idx];
            let duration_min = if event.duration_min > 0 {
                event.duration_min
            } else {
                config.default_exam_duration_min
            };

            let exam = ScheduledExam::new_placement(
                event,
                room.id,
                professor.id,
                slots[c.slot_idx],
                duration_min,
                session_id,
            );
            match self.exam_repo.insert_checked(&exam) {
                Ok(id) => {
                    let mut committed = exam;
                    committed.id = id;
                    report.placed.push(committed);
                }
                Err(RepositoryError::ScheduleConflict(msg)) => {
                    warn!(
                        event_id = event.id,
                        room_id = room.id,
                        professor_id = professor.id,
                        slot = %slots[c.slot_idx],
                        conflict = %msg,
                        "storage rejected a model placement"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(ModelSolveOutcome::Solved(report))
    }
}

/// Pure feasibility solve. Returns the chosen candidate indices, or
/// None when the model is infeasible.
fn solve_assignment(input: &SolveInput) -> Option<Vec<usize>> {
    let mut pvars = ProblemVariables::new();
    let xs: Vec<Variable> = input
        .candidates
        .iter()
        .map(|_| pvars.add(variable().binary()))
        .collect();

    let mut by_event: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut by_slot_room: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
    let mut by_slot_professor: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
    let mut by_professor_day: BTreeMap<(usize, NaiveDate), Vec<usize>> = BTreeMap::new();
    let mut by_formation_day: BTreeMap<(i64, NaiveDate), Vec<usize>> = BTreeMap::new();

    for (i, c) in input.candidates.iter().enumerate() {
        let day = input.slot_days[c.slot_idx];
        by_event.entry(c.event_idx).or_default().push(i);
        by_slot_room.entry((c.slot_idx, c.room_idx)).or_default().push(i);
        by_slot_professor
            .entry((c.slot_idx, c.professor_idx))
            .or_default()
            .push(i);
        by_professor_day
            .entry((c.professor_idx, day))
            .or_default()
            .push(i);
        by_formation_day
            .entry((input.event_formations[c.event_idx], day))
            .or_default()
            .push(i);
    }

    let sum_of = |group: &[usize]| -> Expression {
        let mut sum = Expression::from(0.0);
        for &i in group {
            sum = sum + xs[i];
        }
        sum
    };

    let mut model = pvars.minimise(Expression::from(0.0)).using(default_solver);

    // Exactly one placement per event that has candidates
    for group in by_event.values() {
        model = model.with(sum_of(group).eq(1.0));
    }
    // At most one exam per (slot, room)
    for group in by_slot_room.values() {
        model = model.with(sum_of(group).leq(1.0));
    }
    // At most one exam per (slot, professor)
    for group in by_slot_professor.values() {
        model = model.with(sum_of(group).leq(1.0));
    }
    // Per-day professor cap, reduced by committed exams
    for ((professor_idx, day), group) in &by_professor_day {
        let committed = input
            .committed_professor_days
            .get(&(*professor_idx, *day))
            .copied()
            .unwrap_or(0);
        let rhs = (input.professor_caps[*professor_idx] - committed).max(0);
        model = model.with(sum_of(group).leq(rhs as f64));
    }
    // Per-day formation cap
    for group in by_formation_day.values() {
        model = model.with(sum_of(group).leq(input.formation_daily_cap as f64));
    }

    match model.solve() {
        Ok(sol) => Some(
            (0..input.candidates.len())
                .filter(|&i| sol.value(xs[i]) > 0.5)
                .collect(),
        ),
        Err(_) => None,
    }
}
