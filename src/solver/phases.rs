use std::collections::HashMap;
use std::time::Instant;

use highs::{HighsModelStatus, RowProblem, Sense};
use tracing::{info, warn};

use crate::models::{build_tasks, Class, Lesson, SchoolConfig, Task, TaskKind};

use super::constraints::{
    add_class_non_overlap, add_overflow_linking, add_phase1_subject_distribution,
    add_task_presence_linkage, add_teacher_non_overlap,
};
use super::extract::{diagnostics_and_slots, extract_assignments};
use super::objective::{PHASE2_PENALTY, PHASE3_PENALTY};
use super::result::{SolveOutcome, SolveStats, SolveStatus};
use super::variables::{build_overflow_variables, build_task_variables, distribution_groups};
use super::EngineError;

pub const PHASE1_BUDGET_SECS: f64 = 3600.0;
pub const PHASE2_BUDGET_SECS: f64 = 1200.0;
pub const PHASE3_BUDGET_SECS: f64 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    One,
    Two,
    Three,
}

impl Phase {
    fn budget(self, max_time_limit: f64) -> f64 {
        let default_budget = match self {
            Phase::One => PHASE1_BUDGET_SECS,
            Phase::Two => PHASE2_BUDGET_SECS,
            Phase::Three => PHASE3_BUDGET_SECS,
        };
        default_budget.min(max_time_limit)
    }

    fn label(self) -> &'static str {
        match self {
            Phase::One => "phase1",
            Phase::Two => "phase2",
            Phase::Three => "phase3",
        }
    }
}

struct PhaseAttempt {
    assignments: HashMap<usize, (usize, u32)>,
    unplaced_task_ids: Vec<usize>,
    constraints_added: usize,
    solved: bool,
    status_message: String,
}

/// Entry point for the whole engine: validates the input, derives tasks,
/// and runs the three-phase solve described in the component design.
///
/// Phase 1 builds the hard subject-distribution limit and accepts only a
/// fully-placed result. Phase 2 relaxes that into a heavy soft penalty.
/// Phase 3 drops the penalty to a token weight so the solver has
/// essentially no reason left to decline a placement. Every phase discards
/// the prior phase's model and variables entirely before rebuilding —
/// [`crate::models::build_tasks`]'s deterministic enumeration is what lets
/// task ids stay meaningful across the rebuilds.
///
/// `allow_relaxation` gates Phase 2 and 3: when `false`, the driver reports
/// whatever Phase 1 produced even if some tasks remain unplaced, rather than
/// relaxing the hard per-day subject limit to chase full coverage.
pub fn solve(
    config: &SchoolConfig,
    lessons: &[Lesson],
    classes: &[Class],
    max_time_limit: f64,
    allow_relaxation: bool,
) -> Result<SolveOutcome, EngineError> {
    config.validate().map_err(EngineError::InvalidInput)?;
    for lesson in lessons {
        for class_id in &lesson.class_ids {
            if !classes.iter().any(|c| &c.id == class_id) {
                return Err(EngineError::InvalidInput(format!(
                    "lesson {} references unknown class {}",
                    lesson.id, class_id
                )));
            }
        }
    }

    let tasks = build_tasks(lessons);
    let started = Instant::now();

    let mut attempt = run_phase(Phase::One, config, &tasks, Phase::One.budget(max_time_limit))?;
    if allow_relaxation && !attempt.unplaced_task_ids.is_empty() {
        let phase2 = run_phase(Phase::Two, config, &tasks, Phase::Two.budget(max_time_limit))?;
        attempt = if phase2.unplaced_task_ids.is_empty() {
            phase2
        } else {
            run_phase(Phase::Three, config, &tasks, Phase::Three.budget(max_time_limit))?
        };
    }

    let solving_time = started.elapsed().as_secs_f64();
    let (slots, unplaced_tasks) = diagnostics_and_slots(
        config,
        lessons,
        classes,
        &tasks,
        &attempt.assignments,
        &attempt.unplaced_task_ids,
    );

    let status = if !attempt.solved {
        SolveStatus::Failed
    } else if unplaced_tasks.is_empty() {
        SolveStatus::Success
    } else {
        SolveStatus::Partial
    };
    let success = matches!(status, SolveStatus::Success | SolveStatus::Partial);

    let total_tasks = tasks.len();
    let message = match status {
        SolveStatus::Success => format!("placed all {total_tasks} tasks"),
        SolveStatus::Partial => format!(
            "placed {} of {total_tasks} tasks; {} unplaced",
            total_tasks - unplaced_tasks.len(),
            unplaced_tasks.len()
        ),
        SolveStatus::Failed => format!("no feasible solution: {}", attempt.status_message),
    };

    Ok(SolveOutcome {
        success,
        status,
        slots,
        unplaced_tasks,
        conflicts: 0,
        solving_time,
        stats: SolveStats {
            total_lessons: lessons.len(),
            total_tasks,
            singles_created: tasks.iter().filter(|t| t.kind == TaskKind::Single).count(),
            doubles_created: tasks.iter().filter(|t| t.kind == TaskKind::Double).count(),
            constraints_added: attempt.constraints_added,
        },
        message,
    })
}

/// Statuses HiGHS can return a usable incumbent under. `Optimal` proves it;
/// `TimeLimit`/`SolutionLimit` mean the phase's budget ran out before a
/// proof completed, but `get_solution()` still carries the best feasible
/// assignment found so far — the partial-solution path this whole phased
/// design exists to support, not a failure mode to collapse into one.
fn has_usable_incumbent(status: HighsModelStatus) -> bool {
    matches!(
        status,
        HighsModelStatus::Optimal | HighsModelStatus::TimeLimit | HighsModelStatus::SolutionLimit
    )
}

fn run_phase(
    phase: Phase,
    config: &SchoolConfig,
    tasks: &[Task],
    budget_secs: f64,
) -> Result<PhaseAttempt, EngineError> {
    let phase_started = Instant::now();
    let mut problem = RowProblem::new();
    let mut order = Vec::new();
    let task_vars = build_task_variables(&mut problem, &mut order, config, tasks);

    let groups = if phase == Phase::One {
        Vec::new()
    } else {
        distribution_groups(config, tasks)
    };
    let penalty = match phase {
        Phase::One => 0.0,
        Phase::Two => PHASE2_PENALTY,
        Phase::Three => PHASE3_PENALTY,
    };
    let overflow_vars = if phase == Phase::One {
        Vec::new()
    } else {
        build_overflow_variables(&mut problem, &mut order, &groups, penalty)
    };

    let mut constraints_added = 0usize;
    add_task_presence_linkage(&mut problem, config, tasks, &task_vars, &mut constraints_added);
    add_teacher_non_overlap(&mut problem, config, tasks, &task_vars, &mut constraints_added);
    add_class_non_overlap(&mut problem, config, tasks, &task_vars, &mut constraints_added);
    if phase == Phase::One {
        add_phase1_subject_distribution(
            &mut problem,
            config,
            tasks,
            &task_vars,
            &mut constraints_added,
        );
    } else {
        add_overflow_linking(
            &mut problem,
            config,
            tasks,
            &task_vars,
            &groups,
            &overflow_vars,
            &mut constraints_added,
        );
    }

    let mut model = problem.optimise(Sense::Maximise);
    model.set_option("time_limit", budget_secs);

    let elapsed_ms = || phase_started.elapsed().as_millis();

    let solved_model = model.solve();
    let status = solved_model.status();

    if !has_usable_incumbent(status) {
        warn!(
            phase = phase.label(),
            elapsed_ms = elapsed_ms(),
            status = ?status,
            "phase produced no usable incumbent"
        );
        return Ok(PhaseAttempt {
            assignments: HashMap::new(),
            unplaced_task_ids: tasks.iter().map(|t| t.id).collect(),
            constraints_added,
            solved: false,
            status_message: format!("{status:?}"),
        });
    }

    let solution = solved_model.get_solution();
    let value_of: HashMap<_, _> = order
        .iter()
        .copied()
        .zip(solution.columns().iter().copied())
        .collect();
    let (assignments, unplaced_task_ids) = extract_assignments(&value_of, config, tasks, &task_vars);

    let status_message = if matches!(status, HighsModelStatus::Optimal) {
        "solved to optimality".to_string()
    } else {
        format!("time exhausted at status {status:?}; using best incumbent found")
    };

    info!(
        phase = phase.label(),
        elapsed_ms = elapsed_ms(),
        unplaced = unplaced_task_ids.len(),
        status = ?status,
        "phase complete"
    );

    Ok(PhaseAttempt {
        assignments,
        unplaced_task_ids,
        constraints_added,
        solved: true,
        status_message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayOfWeek, GradeLabel, IntervalSlot, TimetableSlot};
    use std::collections::HashSet;

    fn single_day_config(periods: u32) -> SchoolConfig {
        SchoolConfig {
            number_of_periods: periods,
            interval_slots: vec![],
            days_of_week: vec![DayOfWeek {
                name: "Mon".into(),
                abbreviation: "M".into(),
            }],
        }
    }

    #[test]
    fn minimal_feasible_instance_places_every_task() {
        let config = single_day_config(4);
        let classes = vec![Class {
            id: "C1".into(),
            name: "C1".into(),
            grade: GradeLabel::Numeric(1),
        }];
        let lessons = vec![Lesson {
            id: "L1".into(),
            name: "L1".into(),
            subject_ids: vec!["math".into()],
            teacher_ids: vec!["T1".into()],
            class_ids: vec!["C1".into()],
            number_of_singles: 2,
            number_of_doubles: 1,
            color: String::new(),
        }];

        let outcome = solve(&config, &lessons, &classes, 30.0, true).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.conflicts, 0);
        assert!(outcome.unplaced_tasks.is_empty());
        assert_eq!(outcome.slots.len(), 4);
    }

    #[test]
    fn rejects_lesson_with_unknown_class() {
        let config = single_day_config(4);
        let lessons = vec![Lesson {
            id: "L1".into(),
            name: "L1".into(),
            subject_ids: vec![],
            teacher_ids: vec![],
            class_ids: vec!["ghost".into()],
            number_of_singles: 1,
            number_of_doubles: 0,
            color: String::new(),
        }];
        assert!(solve(&config, &lessons, &[], 30.0, true).is_err());
    }

    // The scenarios below were originally a standalone `tests/scenarios.rs`
    // integration-test crate; folded in here to keep every test inline
    // alongside the code it exercises.

    fn days(names: &[&str]) -> Vec<DayOfWeek> {
        names
            .iter()
            .map(|n| DayOfWeek {
                name: n.to_string(),
                abbreviation: n[..1].to_string(),
            })
            .collect()
    }

    fn scenario_config(periods: u32, day_names: &[&str], intervals: &[u32]) -> SchoolConfig {
        SchoolConfig {
            number_of_periods: periods,
            interval_slots: intervals
                .iter()
                .map(|&p| IntervalSlot {
                    after_period: p,
                    duration: 10,
                })
                .collect(),
            days_of_week: days(day_names),
        }
    }

    fn scenario_class(id: &str) -> Class {
        Class {
            id: id.to_string(),
            name: id.to_string(),
            grade: GradeLabel::Numeric(1),
        }
    }

    fn scenario_lesson(
        id: &str,
        subject: &str,
        teachers: &[&str],
        classes: &[&str],
        singles: u32,
        doubles: u32,
    ) -> Lesson {
        Lesson {
            id: id.to_string(),
            name: id.to_string(),
            subject_ids: vec![subject.to_string()],
            teacher_ids: teachers.iter().map(|s| s.to_string()).collect(),
            class_ids: classes.iter().map(|s| s.to_string()).collect(),
            number_of_singles: singles,
            number_of_doubles: doubles,
            color: String::new(),
        }
    }

    /// No two slots share `(teacherId, day, periodNumber)` for any teacher on
    /// the slot's lesson, and no two slots share `(classId, day, periodNumber)`.
    fn assert_no_overlaps(slots: &[TimetableSlot], lessons: &[Lesson]) {
        let teachers_of: HashMap<&str, &[String]> = lessons
            .iter()
            .map(|l| (l.id.as_str(), l.teacher_ids.as_slice()))
            .collect();

        let mut teacher_cells: HashSet<(&str, &str, u32)> = HashSet::new();
        let mut class_cells: HashSet<(&str, &str, u32)> = HashSet::new();
        for slot in slots {
            let key_c = (slot.class_id.as_str(), slot.day.as_str(), slot.period_number);
            assert!(
                class_cells.insert(key_c),
                "class {} double-booked at {} period {}",
                slot.class_id,
                slot.day,
                slot.period_number
            );
            if let Some(teachers) = teachers_of.get(slot.lesson_id.as_str()) {
                for teacher in *teachers {
                    let key_t = (teacher.as_str(), slot.day.as_str(), slot.period_number);
                    assert!(
                        teacher_cells.insert(key_t),
                        "teacher {} double-booked at {} period {}",
                        teacher,
                        slot.day,
                        slot.period_number
                    );
                }
            }
        }
    }

    #[test]
    fn s1_minimal_feasible_instance() {
        let config = scenario_config(4, &["Mon"], &[]);
        let classes = vec![scenario_class("C1")];
        let lessons = vec![scenario_lesson("L1", "math", &["T1"], &["C1"], 2, 1)];

        let outcome = solve(&config, &lessons, &classes, 30.0, true).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.conflicts, 0);
        assert!(outcome.unplaced_tasks.is_empty());
        assert_eq!(outcome.slots.len(), 4);

        let periods: HashSet<u32> = outcome.slots.iter().map(|s| s.period_number).collect();
        assert_eq!(periods.len(), 4);
        assert!(outcome.slots.iter().all(|s| s.day == "Mon"));
        assert_no_overlaps(&outcome.slots, &lessons);
    }

    #[test]
    fn s2_interval_forbids_double_spanning_it() {
        let config = scenario_config(3, &["Mon"], &[2]);
        let classes = vec![scenario_class("C1")];
        let lessons = vec![scenario_lesson("L1", "math", &["T1"], &["C1"], 0, 1)];

        let outcome = solve(&config, &lessons, &classes, 30.0, true).unwrap();
        assert!(outcome.success);
        assert!(outcome.unplaced_tasks.is_empty());

        let start = outcome
            .slots
            .iter()
            .find(|s| s.is_double_start)
            .expect("double should be placed");
        assert_eq!(start.period_number, 1);
        let end = outcome
            .slots
            .iter()
            .find(|s| s.is_double_end)
            .expect("matching double end");
        assert_eq!(end.period_number, 2);
    }

    #[test]
    fn s2_second_double_is_unplaced_with_diagnostic() {
        let config = scenario_config(3, &["Mon"], &[2]);
        let classes = vec![scenario_class("C1")];
        let lessons = vec![scenario_lesson("L1", "math", &["T1"], &["C1"], 0, 2)];

        let outcome = solve(&config, &lessons, &classes, 30.0, true).unwrap();
        assert_eq!(outcome.unplaced_tasks.len(), 1);
        assert!(!outcome.unplaced_tasks[0].diagnostic.is_empty());
    }

    #[test]
    fn s3_teacher_conflict_resolved_across_periods() {
        let config = scenario_config(2, &["Mon"], &[]);
        let classes = vec![scenario_class("C1")];
        let lessons = vec![
            scenario_lesson("L1", "math", &["T1"], &["C1"], 1, 0),
            scenario_lesson("L2", "science", &["T1"], &["C1"], 1, 0),
        ];

        let outcome = solve(&config, &lessons, &classes, 30.0, true).unwrap();
        assert!(outcome.success);
        assert!(outcome.unplaced_tasks.is_empty());
        assert_eq!(outcome.slots.len(), 2);

        let periods: HashSet<u32> = outcome.slots.iter().map(|s| s.period_number).collect();
        assert_eq!(periods, HashSet::from([1, 2]));
        assert_no_overlaps(&outcome.slots, &lessons);
    }

    #[test]
    fn s4_parallel_classes_synchronize() {
        let config = scenario_config(4, &["Mon"], &[]);
        let classes = vec![scenario_class("A"), scenario_class("B")];
        let lessons = vec![scenario_lesson("L1", "math", &["T1"], &["A", "B"], 1, 0)];

        let outcome = solve(&config, &lessons, &classes, 30.0, true).unwrap();
        assert_eq!(outcome.slots.len(), 2);

        let a = outcome.slots.iter().find(|s| s.class_id == "A").unwrap();
        let b = outcome.slots.iter().find(|s| s.class_id == "B").unwrap();
        assert_eq!(a.day, b.day);
        assert_eq!(a.period_number, b.period_number);
    }

    #[test]
    fn s5_distribution_enforced_in_phase1() {
        let config = scenario_config(6, &["Mon", "Tue", "Wed", "Thu", "Fri"], &[]);
        let classes = vec![scenario_class("C1")];
        let lessons = vec![scenario_lesson("L1", "math", &["T1"], &["C1"], 2, 0)];

        let outcome = solve(&config, &lessons, &classes, 30.0, true).unwrap();
        assert!(outcome.success);
        assert!(outcome.unplaced_tasks.is_empty());

        let days_used: HashSet<&str> = outcome.slots.iter().map(|s| s.day.as_str()).collect();
        assert_eq!(days_used.len(), 2, "the two singles must land on different days");
    }

    #[test]
    fn s6_phase3_force_places_everything_via_clumping() {
        let day_names = ["Mon", "Tue", "Wed", "Thu", "Fri"];
        let config = scenario_config(6, &day_names, &[]);
        let classes = vec![scenario_class("C1")];
        // singles = days + 1 forces at least one day to host two instances of
        // the same subject once Phase 1's hard per-day limit is relaxed.
        let lessons = vec![scenario_lesson("L1", "math", &["T1"], &["C1"], 6, 0)];

        let outcome = solve(&config, &lessons, &classes, 60.0, true).unwrap();
        assert!(outcome.success);
        assert!(
            outcome.unplaced_tasks.is_empty(),
            "phase 3 should place every task: {:?}",
            outcome.unplaced_tasks
        );

        let mut per_day: HashMap<&str, u32> = HashMap::new();
        for slot in &outcome.slots {
            *per_day.entry(slot.day.as_str()).or_insert(0) += 1;
        }
        assert!(
            per_day.values().any(|&count| count >= 2),
            "at least one day must carry two instances of the subject"
        );
    }

    #[test]
    fn allow_relaxation_false_stops_at_phase1_result() {
        let day_names = ["Mon", "Tue", "Wed", "Thu", "Fri"];
        let config = scenario_config(6, &day_names, &[]);
        let classes = vec![scenario_class("C1")];
        let lessons = vec![scenario_lesson("L1", "math", &["T1"], &["C1"], 6, 0)];

        let outcome = solve(&config, &lessons, &classes, 60.0, false).unwrap();
        assert!(
            !outcome.unplaced_tasks.is_empty(),
            "phase 1's hard per-day limit should leave the 6th single unplaced"
        );
        assert_eq!(outcome.status, SolveStatus::Partial);
    }

    #[test]
    fn determinism_same_input_same_output() {
        let config = scenario_config(5, &["Mon", "Tue"], &[]);
        let classes = vec![scenario_class("C1")];
        let lessons = vec![scenario_lesson("L1", "math", &["T1"], &["C1"], 3, 1)];

        let first = solve(&config, &lessons, &classes, 30.0, true).unwrap();
        let second = solve(&config, &lessons, &classes, 30.0, true).unwrap();

        let key = |slots: &[TimetableSlot]| -> Vec<(String, String, u32, bool, bool)> {
            let mut keys: Vec<_> = slots
                .iter()
                .map(|s| {
                    (
                        s.class_id.clone(),
                        s.day.clone(),
                        s.period_number,
                        s.is_double_start,
                        s.is_double_end,
                    )
                })
                .collect();
            keys.sort();
            keys
        };
        assert_eq!(key(&first.slots), key(&second.slots));
    }
}
