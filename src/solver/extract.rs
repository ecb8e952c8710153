use highs::Col;
use std::collections::{HashMap, HashSet};

use crate::models::{
    Class, Lesson, SchoolConfig, Task, TaskKind, TaskType, TimetableSlot, UnplacedTask,
};

use super::variables::{task_periods, TaskVariables};

/// Reads `presence`/`place` back from a solved model's raw column values. A
/// task with `presence = 0` is unplaced; otherwise its unique chosen
/// `(day, period)` is located by scanning its period domain for the set
/// `place` variable. `value_of` maps each [`Col`] to the solved column value
/// it was assigned — built by zipping a phase's creation-order column list
/// against `highs::Solution::columns()`, see [`super::phases`].
pub fn extract_assignments(
    value_of: &HashMap<Col, f64>,
    config: &SchoolConfig,
    tasks: &[Task],
    vars: &TaskVariables,
) -> (HashMap<usize, (usize, u32)>, Vec<usize>) {
    let mut assignments = HashMap::new();
    let mut unplaced = Vec::new();

    let value = |col: Col| value_of.get(&col).copied().unwrap_or(0.0);

    for task in tasks {
        if value(vars.presence_of(task.id)) < 0.5 {
            unplaced.push(task.id);
            continue;
        }
        let mut chosen = None;
        'search: for day in 0..config.num_days() {
            for &period in &task_periods(config, task.kind) {
                if let Some(col) = vars.place_at(task.id, day, period) {
                    if value(col) > 0.5 {
                        chosen = Some((day, period));
                        break 'search;
                    }
                }
            }
        }
        match chosen {
            Some(slot) => {
                assignments.insert(task.id, slot);
            }
            None => unplaced.push(task.id),
        }
    }

    (assignments, unplaced)
}

/// Turns raw `(task -> (day, period))` assignments into output slot
/// records, and unplaced task ids into diagnosed `UnplacedTask` records.
pub fn diagnostics_and_slots(
    config: &SchoolConfig,
    lessons: &[Lesson],
    classes: &[Class],
    tasks: &[Task],
    assignments: &HashMap<usize, (usize, u32)>,
    unplaced_task_ids: &[usize],
) -> (Vec<TimetableSlot>, Vec<UnplacedTask>) {
    let lesson_by_id: HashMap<&str, &Lesson> =
        lessons.iter().map(|l| (l.id.as_str(), l)).collect();
    let class_by_id: HashMap<&str, &Class> = classes.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut slots = Vec::new();
    let mut teacher_busy: HashMap<&str, HashSet<(usize, u32)>> = HashMap::new();
    let mut class_busy: HashMap<&str, HashSet<(usize, u32)>> = HashMap::new();

    for task in tasks {
        let Some(&(day, period)) = assignments.get(&task.id) else {
            continue;
        };
        let day_name = config.days_of_week[day].name.clone();
        let cells: &[u32] = match task.kind {
            TaskKind::Single => &[period],
            TaskKind::Double => &[period, period + 1],
        };

        for teacher in &task.teacher_ids {
            teacher_busy
                .entry(teacher.as_str())
                .or_default()
                .extend(cells.iter().map(|&c| (day, c)));
        }

        for class_id in &task.class_ids {
            class_busy
                .entry(class_id.as_str())
                .or_default()
                .extend(cells.iter().map(|&c| (day, c)));

            match task.kind {
                TaskKind::Single => slots.push(TimetableSlot {
                    class_id: class_id.clone(),
                    lesson_id: task.lesson_id.clone(),
                    day: day_name.clone(),
                    period_number: period,
                    is_double_start: false,
                    is_double_end: false,
                }),
                TaskKind::Double => {
                    slots.push(TimetableSlot {
                        class_id: class_id.clone(),
                        lesson_id: task.lesson_id.clone(),
                        day: day_name.clone(),
                        period_number: period,
                        is_double_start: true,
                        is_double_end: false,
                    });
                    slots.push(TimetableSlot {
                        class_id: class_id.clone(),
                        lesson_id: task.lesson_id.clone(),
                        day: day_name.clone(),
                        period_number: period + 1,
                        is_double_start: false,
                        is_double_end: true,
                    });
                }
            }
        }
    }

    let total_cells = (config.num_days() * config.number_of_periods as usize).max(1) as f64;
    let utilization =
        |busy: &HashMap<&str, HashSet<(usize, u32)>>, key: &str| -> f64 {
            busy.get(key).map(|s| s.len() as f64).unwrap_or(0.0) / total_cells
        };

    let mut unplaced = Vec::new();
    for &task_id in unplaced_task_ids {
        let task = &tasks[task_id];
        let lesson = lesson_by_id.get(task.lesson_id.as_str());
        let task_type = match task.kind {
            TaskKind::Single => TaskType::Single,
            TaskKind::Double => TaskType::Double,
        };
        let teacher_util = task
            .teacher_ids
            .iter()
            .map(|t| utilization(&teacher_busy, t.as_str()))
            .fold(0.0_f64, f64::max);

        for class_id in &task.class_ids {
            let class = class_by_id.get(class_id.as_str());
            let class_util = utilization(&class_busy, class_id.as_str());
            let diagnostic = diagnose(
                teacher_util,
                class_util,
                task.required_consecutive(),
                config,
                &teacher_busy,
                &class_busy,
                task,
            );

            unplaced.push(UnplacedTask {
                lesson_id: task.lesson_id.clone(),
                class_id: class_id.clone(),
                lesson_name: lesson.map(|l| l.name.clone()).unwrap_or_default(),
                class_name: class.map(|c| c.name.clone()).unwrap_or_default(),
                teacher_name: task.teacher_ids.join(", "),
                task_type,
                diagnostic,
            });
        }
    }

    (slots, unplaced)
}

fn diagnose(
    teacher_util: f64,
    class_util: f64,
    required_consecutive: u32,
    config: &SchoolConfig,
    teacher_busy: &HashMap<&str, HashSet<(usize, u32)>>,
    class_busy: &HashMap<&str, HashSet<(usize, u32)>>,
    task: &Task,
) -> String {
    if teacher_util >= 1.0 {
        return "teacher fully booked".to_string();
    }
    if class_util >= 1.0 {
        return "class fully booked".to_string();
    }
    if teacher_util > 0.90 {
        return "teacher critically loaded".to_string();
    }
    if class_util > 0.90 {
        return "class critically loaded".to_string();
    }
    if teacher_util > 0.70 && class_util > 0.70 {
        let free = free_slot_intersection(config, teacher_busy, class_busy, task);
        if free.is_empty() {
            return "no overlapping free slot".to_string();
        }
        if (free.len() as u32) < required_consecutive {
            return "insufficient consecutive free slots".to_string();
        }
        return "interval or distribution constraints".to_string();
    }
    if teacher_util < 0.30 {
        return "likely over-constrained globally".to_string();
    }
    "generic constraint block".to_string()
}

fn free_slot_intersection(
    config: &SchoolConfig,
    teacher_busy: &HashMap<&str, HashSet<(usize, u32)>>,
    class_busy: &HashMap<&str, HashSet<(usize, u32)>>,
    task: &Task,
) -> HashSet<(usize, u32)> {
    let mut free = HashSet::new();
    for day in 0..config.num_days() {
        for period in 1..=config.number_of_periods {
            let teacher_free = task.teacher_ids.iter().all(|t| {
                !teacher_busy
                    .get(t.as_str())
                    .is_some_and(|busy| busy.contains(&(day, period)))
            });
            let class_free = task.class_ids.iter().all(|c| {
                !class_busy
                    .get(c.as_str())
                    .is_some_and(|busy| busy.contains(&(day, period)))
            });
            if teacher_free && class_free {
                free.insert((day, period));
            }
        }
    }
    free
}
