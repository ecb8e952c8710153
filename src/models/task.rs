use serde::{Deserialize, Serialize};

use super::Lesson;

/// Whether a task occupies one period (`Single`) or two consecutive
/// periods on the same day (`Double`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    Single,
    Double,
}

/// One scheduling decision unit: a single required occurrence of a lesson.
/// A lesson with `s` singles and `d` doubles yields `s + d` tasks.
///
/// `id` is the task's position in the deterministic enumeration produced by
/// [`build_tasks`] — stable across phase rebuilds, since the phased driver
/// discards and recreates the variable set between phases but must still be
/// able to map a task back to the same index every time.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: usize,
    pub lesson_index: usize,
    pub lesson_id: String,
    pub kind: TaskKind,
    pub occurrence: u32,
    pub class_ids: Vec<String>,
    pub teacher_ids: Vec<String>,
    pub subject_ids: Vec<String>,
}

impl Task {
    pub fn primary_subject(&self) -> Option<&str> {
        self.subject_ids.first().map(|s| s.as_str())
    }

    pub fn required_consecutive(&self) -> u32 {
        match self.kind {
            TaskKind::Single => 1,
            TaskKind::Double => 2,
        }
    }
}

/// Derives the full task list from a lesson set, in a deterministic order:
/// lessons in input order, singles before doubles within a lesson, and
/// occurrences in ascending index within each kind. This enumeration is the
/// sole source of task indices and must be reproduced identically on every
/// phase rebuild.
pub fn build_tasks(lessons: &[Lesson]) -> Vec<Task> {
    let mut tasks = Vec::new();
    for (lesson_index, lesson) in lessons.iter().enumerate() {
        for occurrence in 0..lesson.number_of_singles {
            tasks.push(Task {
                id: tasks.len(),
                lesson_index,
                lesson_id: lesson.id.clone(),
                kind: TaskKind::Single,
                occurrence,
                class_ids: lesson.class_ids.clone(),
                teacher_ids: lesson.teacher_ids.clone(),
                subject_ids: lesson.subject_ids.clone(),
            });
        }
        for occurrence in 0..lesson.number_of_doubles {
            tasks.push(Task {
                id: tasks.len(),
                lesson_index,
                lesson_id: lesson.id.clone(),
                kind: TaskKind::Double,
                occurrence,
                class_ids: lesson.class_ids.clone(),
                teacher_ids: lesson.teacher_ids.clone(),
                subject_ids: lesson.subject_ids.clone(),
            });
        }
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: &str, singles: u32, doubles: u32) -> Lesson {
        Lesson {
            id: id.to_string(),
            name: id.to_string(),
            subject_ids: vec![],
            teacher_ids: vec![],
            class_ids: vec!["c1".to_string()],
            number_of_singles: singles,
            number_of_doubles: doubles,
            color: String::new(),
        }
    }

    #[test]
    fn yields_singles_plus_doubles_tasks() {
        let tasks = build_tasks(&[lesson("l1", 2, 1)]);
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].kind, TaskKind::Single);
        assert_eq!(tasks[1].kind, TaskKind::Single);
        assert_eq!(tasks[2].kind, TaskKind::Double);
    }

    #[test]
    fn ids_are_stable_sequential_indices() {
        let tasks = build_tasks(&[lesson("l1", 1, 1), lesson("l2", 1, 0)]);
        let ids: Vec<usize> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn rebuild_from_same_input_is_identical() {
        let lessons = vec![lesson("l1", 2, 1), lesson("l2", 0, 1)];
        let a = build_tasks(&lessons);
        let b = build_tasks(&lessons);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.lesson_id, y.lesson_id);
            assert_eq!(x.kind, y.kind);
        }
    }
}
