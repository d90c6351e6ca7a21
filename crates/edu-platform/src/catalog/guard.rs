use tracing::{debug, warn};

use super::domain::Course;
use super::enrollment::EnrollmentField;
use super::update::CourseUpdate;

/// What the guard did to a record before a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveSync {
    Unchanged,
    CurrentToLegacy,
    LegacyToCurrent,
    /// Both fields were written in the same save; the current field won.
    ConflictResolved,
}

/// What the guard did to an update document before it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSync {
    /// No `$push` clause touching enrollment.
    Unchanged,
    MirroredToLegacy,
    MirroredToCurrent,
    /// Both fields already carried their own append.
    AlreadyPaired,
}

/// Keeps `studentsEnrolled` and `studentsEnroled` identical across saves and
/// push-style updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrollmentGuard;

impl EnrollmentGuard {
    pub fn new() -> Self {
        Self
    }

    /// Save hook. Copies whichever enrollment field was modified onto the other.
    pub fn before_save(&self, course: &mut Course) -> SaveSync {
        let enrollment = course.enrollment_mut();
        let current = enrollment.is_modified(EnrollmentField::Current);
        let legacy = enrollment.is_modified(EnrollmentField::Legacy);

        let outcome = match (current, legacy) {
            (false, false) => SaveSync::Unchanged,
            (true, false) => {
                enrollment.mirror_from(EnrollmentField::Current);
                SaveSync::CurrentToLegacy
            }
            (false, true) => {
                enrollment.mirror_from(EnrollmentField::Legacy);
                SaveSync::LegacyToCurrent
            }
            (true, true) => {
                enrollment.mirror_from(EnrollmentField::Current);
                SaveSync::ConflictResolved
            }
        };

        if outcome == SaveSync::ConflictResolved {
            warn!(
                course_id = %course.id.0,
                "both enrollment fields modified in one save; keeping studentsEnrolled"
            );
        } else if outcome != SaveSync::Unchanged {
            debug!(course_id = %course.id.0, ?outcome, "synchronized enrollment fields");
        }

        outcome
    }

    /// Update interceptor. An append to only one enrollment field is mirrored onto
    /// the other; anything else is left exactly as given.
    pub fn before_update(&self, update: &mut CourseUpdate) -> UpdateSync {
        let Some(push) = update.push.as_mut() else {
            return UpdateSync::Unchanged;
        };

        match (push.current.is_some(), push.legacy.is_some()) {
            (false, false) => UpdateSync::Unchanged,
            (true, true) => UpdateSync::AlreadyPaired,
            (true, false) => {
                push.legacy = push.current.clone();
                UpdateSync::MirroredToLegacy
            }
            (false, true) => {
                push.current = push.legacy.clone();
                UpdateSync::MirroredToCurrent
            }
        }
    }
}
