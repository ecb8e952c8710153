use highs::{Col, RowProblem};
use std::collections::{HashMap, HashSet};

use crate::models::{SchoolConfig, Task, TaskKind};

use super::variables::{task_periods, DistributionGroup, TaskVariables};

/// `Σ place[task, *, *] = presence[task]` for every task. The mechanism by
/// which an unplaced task is representable in a feasible solution rather
/// than forcing infeasibility.
pub fn add_task_presence_linkage(
    problem: &mut RowProblem,
    config: &SchoolConfig,
    tasks: &[Task],
    vars: &TaskVariables,
    constraints_added: &mut usize,
) {
    for task in tasks {
        let mut row: Vec<(Col, f64)> = Vec::new();
        for day in 0..config.num_days() {
            for &period in &task_periods(config, task.kind) {
                if let Some(col) = vars.place_at(task.id, day, period) {
                    row.push((col, 1.0));
                }
            }
        }
        row.push((vars.presence_of(task.id), -1.0));
        problem.add_row(0.0..=0.0, &row);
        *constraints_added += 1;
    }
}

/// Accumulates, for every `(key, day, period)` cell touched by any task
/// whose `key_fn` returns a non-empty key set, the sum of `place` variables
/// occupying that cell. A double contributes to both its start period and
/// the period after it.
fn accumulate_occupancy<'a>(
    config: &SchoolConfig,
    tasks: &'a [Task],
    vars: &TaskVariables,
    key_fn: impl Fn(&'a Task) -> Vec<&'a str>,
) -> HashMap<(&'a str, usize, u32), Vec<Col>> {
    let mut acc: HashMap<(&str, usize, u32), Vec<Col>> = HashMap::new();
    for task in tasks {
        let keys = key_fn(task);
        if keys.is_empty() {
            continue;
        }
        for day in 0..config.num_days() {
            for &period in &task_periods(config, task.kind) {
                let Some(col) = vars.place_at(task.id, day, period) else {
                    continue;
                };
                let cells: &[u32] = match task.kind {
                    TaskKind::Single => &[period],
                    TaskKind::Double => &[period, period + 1],
                };
                for &cell in cells {
                    for &key in &keys {
                        acc.entry((key, day, cell)).or_default().push(col);
                    }
                }
            }
        }
    }
    acc
}

/// Teacher non-overlap, restricted to teachers appearing in at least two
/// distinct lessons — a teacher bound to a single lesson is already covered
/// transitively through that lesson's class non-overlap constraints and its
/// own presence linkage (see `DESIGN.md` for why this grouping is airtight).
pub fn add_teacher_non_overlap(
    problem: &mut RowProblem,
    config: &SchoolConfig,
    tasks: &[Task],
    vars: &TaskVariables,
    constraints_added: &mut usize,
) {
    let mut lessons_by_teacher: HashMap<&str, HashSet<usize>> = HashMap::new();
    for task in tasks {
        for teacher in &task.teacher_ids {
            lessons_by_teacher
                .entry(teacher.as_str())
                .or_default()
                .insert(task.lesson_index);
        }
    }
    let eligible: HashSet<&str> = lessons_by_teacher
        .into_iter()
        .filter(|(_, lessons)| lessons.len() >= 2)
        .map(|(teacher, _)| teacher)
        .collect();

    let acc = accumulate_occupancy(config, tasks, vars, |task| {
        task.teacher_ids
            .iter()
            .filter(|t| eligible.contains(t.as_str()))
            .map(|s| s.as_str())
            .collect()
    });
    for cols in acc.into_values() {
        let row: Vec<(Col, f64)> = cols.into_iter().map(|c| (c, 1.0)).collect();
        problem.add_row(f64::NEG_INFINITY..=1.0, &row);
        *constraints_added += 1;
    }
}

/// Class non-overlap. Every task (including multiple tasks of the same
/// lesson) contends for the same cells, since a lesson's placement applies
/// to every class in `classIds` simultaneously.
pub fn add_class_non_overlap(
    problem: &mut RowProblem,
    config: &SchoolConfig,
    tasks: &[Task],
    vars: &TaskVariables,
    constraints_added: &mut usize,
) {
    let acc = accumulate_occupancy(config, tasks, vars, |task| {
        task.class_ids.iter().map(|s| s.as_str()).collect()
    });
    for cols in acc.into_values() {
        let row: Vec<(Col, f64)> = cols.into_iter().map(|c| (c, 1.0)).collect();
        problem.add_row(f64::NEG_INFINITY..=1.0, &row);
        *constraints_added += 1;
    }
}

/// Phase 1's hard subject-per-day limit: for every `(class, subject, day)`
/// group, at most one placed task. Replaced by the Tier-2 soft penalty in
/// Phase 2 and 3.
pub fn add_phase1_subject_distribution(
    problem: &mut RowProblem,
    config: &SchoolConfig,
    tasks: &[Task],
    vars: &TaskVariables,
    constraints_added: &mut usize,
) {
    for group in super::variables::distribution_groups(config, tasks) {
        let mut row: Vec<(Col, f64)> = Vec::new();
        for &task_id in &group.task_ids {
            let task = &tasks[task_id];
            for &period in &task_periods(config, task.kind) {
                if let Some(col) = vars.place_at(task.id, group.day, period) {
                    row.push((col, 1.0));
                }
            }
        }
        problem.add_row(f64::NEG_INFINITY..=1.0, &row);
        *constraints_added += 1;
    }
}

/// Ties each overflow variable to `count - 1` for its group, where `count`
/// is the number of placed tasks of that `(class, subject, day)` group. The
/// objective's penalty term does the rest: since overflow is otherwise
/// unconstrained below, the solver drives it down to exactly
/// `max(count - 1, 0)`.
pub fn add_overflow_linking(
    problem: &mut RowProblem,
    config: &SchoolConfig,
    tasks: &[Task],
    vars: &TaskVariables,
    groups: &[DistributionGroup],
    overflow: &[Col],
    constraints_added: &mut usize,
) {
    for (group, &overflow_col) in groups.iter().zip(overflow) {
        let mut row: Vec<(Col, f64)> = Vec::new();
        for &task_id in &group.task_ids {
            let task = &tasks[task_id];
            for &period in &task_periods(config, task.kind) {
                if let Some(col) = vars.place_at(task.id, group.day, period) {
                    row.push((col, 1.0));
                }
            }
        }
        row.push((overflow_col, -1.0));
        // count - overflow <= 1, i.e. count - 1 <= overflow
        problem.add_row(f64::NEG_INFINITY..=1.0, &row);
        *constraints_added += 1;
    }
}
