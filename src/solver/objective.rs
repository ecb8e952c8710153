use crate::models::{Task, TaskKind};

/// Tier-1 placement reward, per single task (`B = 1,000,000`).
pub const SINGLE_WEIGHT: f64 = 1_000_000.0;
/// Tier-1 placement reward, per double task (`B = 2,000,000`).
pub const DOUBLE_WEIGHT: f64 = 2_000_000.0;
/// Tier-2 clumping penalty magnitude in Phase 2.
pub const PHASE2_PENALTY: f64 = 100_000.0;
/// Tier-2 clumping penalty magnitude in Phase 3.
pub const PHASE3_PENALTY: f64 = 10.0;

/// `w = B · |classIds|`, the `presence[task]` column's objective cost. The
/// per-class scaling keeps a parallel lesson (one decision, many classes)
/// competitive against a serial lesson that would otherwise need one
/// decision per class.
///
/// HiGHS column costs are fixed at column-creation time (see
/// `variables::build_task_variables`), so this is computed up front rather
/// than accumulated into a separate objective expression afterward the way
/// an LP-builder's `Expression` type would.
pub fn placement_weight(task: &Task) -> f64 {
    let base = match task.kind {
        TaskKind::Single => SINGLE_WEIGHT,
        TaskKind::Double => DOUBLE_WEIGHT,
    };
    base * task.class_ids.len().max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_weight_outscales_single_weight() {
        assert!(DOUBLE_WEIGHT > SINGLE_WEIGHT);
    }

    #[test]
    fn phase2_penalty_never_approaches_placement_reward() {
        assert!(SINGLE_WEIGHT > PHASE2_PENALTY * 1000.0);
    }
}
