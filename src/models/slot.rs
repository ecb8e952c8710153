use serde::{Deserialize, Serialize};

/// `"single"` or `"double"`, as carried in `UnplacedTask::task_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Single,
    Double,
}

/// One occupied `(class, day, period)` cell in the output timetable. A
/// placed double emits two of these per class: one flagged `is_double_start`
/// at the start period, one flagged `is_double_end` at the next period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableSlot {
    pub class_id: String,
    pub lesson_id: String,
    pub day: String,
    pub period_number: u32,
    #[serde(default)]
    pub is_double_start: bool,
    #[serde(default)]
    pub is_double_end: bool,
}

/// A task that the solver could not place, with a best-effort diagnostic
/// naming the resource constraint most likely responsible.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnplacedTask {
    pub lesson_id: String,
    pub class_id: String,
    pub lesson_name: String,
    pub class_name: String,
    pub teacher_name: String,
    pub task_type: TaskType,
    pub diagnostic: String,
}
