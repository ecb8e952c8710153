use serde::{Deserialize, Serialize};

/// A grade label, accepted as either a number or a free-form string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GradeLabel {
    Numeric(i64),
    Named(String),
}

/// A class (a cohort of students) that lessons are scheduled against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub grade: GradeLabel,
}

/// A parallel teaching block: one scheduling decision that, once placed,
/// occupies the same `(day, period)` for every class in `class_ids`
/// simultaneously, taught by the teachers in `teacher_ids`.
///
/// This is the fundamental modelling decision carried through the rest of
/// the engine — parallel classes share a single decision rather than one
/// decision per class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "lessonName")]
    pub name: String,
    #[serde(default)]
    pub subject_ids: Vec<String>,
    #[serde(default)]
    pub teacher_ids: Vec<String>,
    #[serde(default)]
    pub class_ids: Vec<String>,
    #[serde(default)]
    pub number_of_singles: u32,
    #[serde(default)]
    pub number_of_doubles: u32,
    #[serde(default)]
    pub color: String,
}

impl Lesson {
    /// The subject used as the distribution grouping key. Only the first
    /// subject is considered, even for multi-subject lessons.
    pub fn primary_subject(&self) -> Option<&str> {
        self.subject_ids.first().map(|s| s.as_str())
    }

    pub fn total_tasks(&self) -> u32 {
        self.number_of_singles + self.number_of_doubles
    }
}
