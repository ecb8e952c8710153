use highs::{Col, RowProblem, VarType};
use std::collections::HashMap;

use crate::models::{SchoolConfig, Task, TaskKind};

use super::objective::placement_weight;

/// The period domain a task may legally start in: every period for a
/// single, only `validDoubleStarts` for a double.
pub fn task_periods(config: &SchoolConfig, kind: TaskKind) -> Vec<u32> {
    match kind {
        TaskKind::Single => (1..=config.number_of_periods).collect(),
        TaskKind::Double => config.valid_double_starts(),
    }
}

/// Adds a binary (0/1 integer) column and records it in `order` — the same
/// sequence HiGHS assigns raw column indices in, since columns are numbered
/// in creation order. Reading a solved model back zips `order` against the
/// raw solution vector instead of inspecting `Col`'s own representation.
fn add_binary_column(problem: &mut RowProblem, order: &mut Vec<Col>, cost: f64) -> Col {
    let col = problem.add_column(cost, 0.0..=1.0);
    problem.add_integrality(col, VarType::Integer);
    order.push(col);
    col
}

/// Handles for every `place`/`presence` decision variable in one phase's
/// model. Rebuilt fresh at the start of every phase — see
/// [`crate::solver::phases`].
pub struct TaskVariables {
    presence: Vec<Col>,
    place: HashMap<(usize, usize, u32), Col>,
}

pub fn build_task_variables(
    problem: &mut RowProblem,
    order: &mut Vec<Col>,
    config: &SchoolConfig,
    tasks: &[Task],
) -> TaskVariables {
    let mut presence = Vec::with_capacity(tasks.len());
    let mut place = HashMap::new();
    for task in tasks {
        presence.push(add_binary_column(problem, order, placement_weight(task)));
        for day in 0..config.num_days() {
            for &period in &task_periods(config, task.kind) {
                place.insert(
                    (task.id, day, period),
                    add_binary_column(problem, order, 0.0),
                );
            }
        }
    }
    TaskVariables { presence, place }
}

impl TaskVariables {
    pub fn place_at(&self, task_id: usize, day: usize, period: u32) -> Option<Col> {
        self.place.get(&(task_id, day, period)).copied()
    }

    pub fn presence_of(&self, task_id: usize) -> Col {
        self.presence[task_id]
    }
}

/// A `(class, subject, day)` group with at least two candidate tasks — the
/// unit the Tier-2 distribution penalty and the Phase-1 hard limit both
/// operate on. Groups of size one can never clump and are skipped.
pub struct DistributionGroup {
    pub day: usize,
    pub task_ids: Vec<usize>,
}

pub fn distribution_groups(config: &SchoolConfig, tasks: &[Task]) -> Vec<DistributionGroup> {
    let mut by_class_subject: HashMap<(String, String), Vec<usize>> = HashMap::new();
    for task in tasks {
        let Some(subject) = task.primary_subject() else {
            continue;
        };
        for class_id in &task.class_ids {
            by_class_subject
                .entry((class_id.clone(), subject.to_string()))
                .or_default()
                .push(task.id);
        }
    }

    let mut groups = Vec::new();
    for task_ids in by_class_subject.into_values() {
        if task_ids.len() < 2 {
            continue;
        }
        for day in 0..config.num_days() {
            groups.push(DistributionGroup {
                day,
                task_ids: task_ids.clone(),
            });
        }
    }
    groups
}

/// Auxiliary `overflow = max(count - 1, 0)` columns backing the Tier-2
/// distribution penalty, one per [`DistributionGroup`], cost `-penalty`
/// baked in at creation since HiGHS column costs are fixed once a column
/// exists. Bounded below at zero, unbounded above; left unconstrained
/// relative to its group's placement count until
/// [`crate::solver::constraints::add_overflow_linking`] ties the two
/// together — the objective's `-penalty * overflow` term gives the solver
/// every incentive to keep it at its tight lower bound.
pub fn build_overflow_variables(
    problem: &mut RowProblem,
    order: &mut Vec<Col>,
    groups: &[DistributionGroup],
    penalty: f64,
) -> Vec<Col> {
    groups
        .iter()
        .map(|_| {
            let col = problem.add_column(-penalty, 0.0..=f64::INFINITY);
            order.push(col);
            col
        })
        .collect()
}
