// ==========================================
// Exam Timetabling Engine - Core Library
// ==========================================
// Persistence-aware exam scheduling: assigns exam events to time slot,
// room and professor triples against a SQLite store whose guard
// triggers are the final authority on conflicts.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Engine layer - scheduling logic
pub mod engine;

// Configuration layer - scheduler knobs
pub mod config;

// Database infrastructure (connection setup / schema / guard triggers)
pub mod db;

// Logging
pub mod logging;

// API layer - caller-facing surface
pub mod api;

// ==========================================
// Re-export core types
// ==========================================

// Domain types
pub use domain::types::{ExamStatus, SessionStatus};

// Domain entities
pub use domain::{
    ConflictFinding, ConflictKind, ExamEvent, GenerationSession, Professor, Room, RoomOccupancy,
    ScheduledExam,
};

// Configuration
pub use config::SchedulerConfig;

// Engine
pub use engine::{
    AssignmentStrategy, ConflictIndex, GenerationEngine, GenerationOutcome, GenerationRequest,
    GreedyAssigner, ModelAssigner, SlotGenerator,
};

// API
pub use api::{ApiError, ApiResult, ReportApi, ScheduleApi};

// ==========================================
// Constants
// ==========================================

// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
