// ==========================================
// Exam Timetabling Engine - Scheduler Configuration
// ==========================================
// Every policy knob of a generation run lives here, caller-visible.
// Pool caps and daily caps are deliberately not hidden constants: the
// caller constructs (or deserializes) the config and hands it to the
// engine.
// ==========================================

use crate::engine::strategy::AssignmentStrategy;
use serde::{Deserialize, Serialize};

/// Default number of candidates retrieved per resource pool.
pub const DEFAULT_POOL_CAP: usize = 15;

/// Default maximum exams per formation per calendar day.
pub const DEFAULT_FORMATION_DAILY_CAP: u32 = 2;

/// Default maximum exams a professor supervises per calendar day.
/// Also the schema default for `professors.daily_cap` and the threshold
/// used by the overload detector.
pub const DEFAULT_PROFESSOR_DAILY_CAP: i64 = 3;

/// Fixed daily slot starts (hours).
pub const DEFAULT_SLOT_START_HOURS: [u32; 4] = [8, 10, 14, 16];

/// Nominal length of one slot in minutes.
pub const DEFAULT_NOMINAL_SLOT_MIN: i64 = 120;

/// Fallback exam duration in minutes when an event carries none.
pub const DEFAULT_EXAM_DURATION_MIN: i64 = 120;

/// Default wall-clock budget for the constraint solve, in seconds.
pub const DEFAULT_SOLVER_BUDGET_SECS: u64 = 45;

/// Scheduler policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Max candidates per pool (events, rooms, professors)
    #[serde(default = "default_pool_cap")]
    pub pool_cap: usize,

    /// Max exams per formation per day
    #[serde(default = "default_formation_daily_cap")]
    pub formation_daily_cap: u32,

    /// Daily slot start hours
    #[serde(default = "default_slot_start_hours")]
    pub slot_start_hours: Vec<u32>,

    /// Nominal slot length in minutes (used for seeding overlap checks)
    #[serde(default = "default_nominal_slot_min")]
    pub nominal_slot_min: i64,

    /// Fallback exam duration in minutes
    #[serde(default = "default_exam_duration_min")]
    pub default_exam_duration_min: i64,

    /// Constraint solve budget in seconds
    #[serde(default = "default_solver_budget_secs")]
    pub solver_budget_secs: u64,

    /// Which assigner runs (greedy or constraint_model)
    #[serde(default)]
    pub strategy: AssignmentStrategy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            pool_cap: DEFAULT_POOL_CAP,
            formation_daily_cap: DEFAULT_FORMATION_DAILY_CAP,
            slot_start_hours: DEFAULT_SLOT_START_HOURS.to_vec(),
            nominal_slot_min: DEFAULT_NOMINAL_SLOT_MIN,
            default_exam_duration_min: DEFAULT_EXAM_DURATION_MIN,
            solver_budget_secs: DEFAULT_SOLVER_BUDGET_SECS,
            strategy: AssignmentStrategy::default(),
        }
    }
}

fn default_pool_cap() -> usize {
    DEFAULT_POOL_CAP
}

fn default_formation_daily_cap() -> u32 {
    DEFAULT_FORMATION_DAILY_CAP
}

fn default_slot_start_hours() -> Vec<u32> {
    DEFAULT_SLOT_START_HOURS.to_vec()
}

fn default_nominal_slot_min() -> i64 {
    DEFAULT_NOMINAL_SLOT_MIN
}

fn default_exam_duration_min() -> i64 {
    DEFAULT_EXAM_DURATION_MIN
}

fn default_solver_budget_secs() -> u64 {
    DEFAULT_SOLVER_BUDGET_SECS
}
