use serde::{Deserialize, Serialize};

use crate::models::{TimetableSlot, UnplacedTask};

/// Mirrors the three outcomes the error-handling design distinguishes:
/// a complete solve, a time-bounded partial solve, or an over-constrained
/// input the solver could not satisfy at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Success,
    Partial,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveStats {
    pub total_lessons: usize,
    pub total_tasks: usize,
    pub singles_created: usize,
    pub doubles_created: usize,
    pub constraints_added: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveOutcome {
    pub success: bool,
    pub status: SolveStatus,
    pub slots: Vec<TimetableSlot>,
    pub unplaced_tasks: Vec<UnplacedTask>,
    pub conflicts: u32,
    pub solving_time: f64,
    pub stats: SolveStats,
    pub message: String,
}
