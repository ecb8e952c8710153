//! Input validation for solver requests.
//!
//! Checks structural integrity of a `SchoolConfig`/`Lesson`/`Class` triple
//! before the engine builds a model from it. Detects:
//! - Duplicate lesson or class IDs
//! - Out-of-range period/interval values
//! - Lessons referencing classes that don't exist
//!
//! Failures here are surfaced verbatim as HTTP 400, per the error-handling
//! design's propagation policy — they never reach the solver.

use std::collections::HashSet;

use crate::models::{Class, Lesson, SchoolConfig};

pub type ValidationResult = Result<(), Vec<ValidationError>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    DuplicateId,
    InvalidConfig,
    InvalidReference,
    InvalidCount,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a complete solver request. Checks:
/// 1. `schoolConfig` invariants (`validate()` on the config itself).
/// 2. No duplicate lesson IDs, no duplicate class IDs.
/// 3. Every `lesson.classIds` entry names a known class.
/// 4. `numberOfSingles`/`numberOfDoubles` are not both zero (an empty task
///    set for a lesson is pointless input, not a solver concern).
pub fn validate_request(
    config: &SchoolConfig,
    lessons: &[Lesson],
    classes: &[Class],
) -> ValidationResult {
    let mut errors = Vec::new();

    if let Err(message) = config.validate() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidConfig,
            message,
        ));
    }

    let mut class_ids = HashSet::new();
    for class in classes {
        if !class_ids.insert(class.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("duplicate class id: {}", class.id),
            ));
        }
    }

    let mut lesson_ids = HashSet::new();
    for lesson in lessons {
        if !lesson_ids.insert(lesson.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("duplicate lesson id: {}", lesson.id),
            ));
        }

        if lesson.number_of_singles == 0 && lesson.number_of_doubles == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCount,
                format!("lesson '{}' has neither singles nor doubles", lesson.id),
            ));
        }

        for class_id in &lesson.class_ids {
            if !class_ids.contains(class_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidReference,
                    format!(
                        "lesson '{}' references unknown class '{}'",
                        lesson.id, class_id
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
