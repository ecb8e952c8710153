//! Constraint-optimization engine: turns a school's lessons and classes
//! into a weekly timetable via a phased 0/1 integer-programming solve.
//!
//! No direct Google OR-Tools CP-SAT binding exists in the Rust ecosystem
//! this crate draws on, so the engine expresses the same boolean
//! scheduling model as a linear 0/1 program solved directly against the
//! [`highs`] crate's `RowProblem`/`Model` API, rather than through a
//! builder such as `good_lp`: `good_lp`'s `SolverModel::solve()` only
//! returns `Ok` when HiGHS reports a proven-optimal status, so a
//! time-limited phase that finds a feasible incumbent but can't finish
//! proving it optimal would come back as an `Err` indistinguishable from
//! total infeasibility. Querying `highs::Model::solve()`'s status and
//! column values directly lets [`phases::run_phase`] treat `TimeLimit`
//! and `SolutionLimit` as usable, partial results — the phased driver's
//! whole reason for having per-phase time budgets in the first place.

pub mod constraints;
pub mod extract;
pub mod objective;
pub mod phases;
pub mod result;
pub mod variables;

pub use phases::solve;
pub use result::{SolveOutcome, SolveStats, SolveStatus};

use thiserror::Error;

/// Engine-level error taxonomy: input validation failures and internal
/// inconsistencies. "No feasible solution" and "partial solution" are not
/// errors — they are [`SolveStatus`] values on an `Ok` result.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("engine inconsistency: {0}")]
    Inconsistent(String),
}
