// ==========================================
// Exam Timetabling Engine - Engine Layer
// ==========================================
// Scheduling logic lives here: slot grid, resource pools, the in-memory
// conflict index and the two assigners. Engines never build SQL; they
// go through the repository layer.
// ==========================================

pub mod catalog;
pub mod conflict_index;
pub mod greedy;
pub mod model;
pub mod orchestrator;
pub mod slots;
pub mod strategy;

// Re-export the engine surface
pub use catalog::{ResourceCatalog, ResourcePools};
pub use conflict_index::ConflictIndex;
pub use greedy::{AssignmentReport, GreedyAssigner};
pub use model::{ModelAssigner, ModelSolveOutcome};
pub use orchestrator::{GenerationEngine, GenerationOutcome, GenerationRequest};
pub use slots::SlotGenerator;
pub use strategy::AssignmentStrategy;
