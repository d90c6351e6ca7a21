use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{Course, CourseId, CourseValidationError, NewCourse, UserId};
use super::guard::{EnrollmentGuard, SaveSync};
use super::repository::{CourseRepository, RepositoryError};
use super::update::CourseUpdate;

/// Service composing the enrollment guard with a course repository. Every
/// write goes through here so the guard's hooks cannot be skipped.
pub struct CourseService<R> {
    guard: EnrollmentGuard,
    repository: Arc<R>,
}

static COURSE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_course_id() -> CourseId {
    let id = COURSE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CourseId(format!("course-{id:06}"))
}

impl<R> CourseService<R>
where
    R: CourseRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_guard(EnrollmentGuard::new(), repository)
    }

    pub fn with_guard(guard: EnrollmentGuard, repository: Arc<R>) -> Self {
        Self { guard, repository }
    }

    /// Validate and insert a new course. The returned [`SaveSync`] says how the
    /// initial enrollment fields were reconciled.
    pub fn create(&self, new: NewCourse) -> Result<(Course, SaveSync), CatalogServiceError> {
        let mut course = Course::from_new(next_course_id(), new, Utc::now())?;
        let sync = self.guard.before_save(&mut course);
        let stored = self.repository.insert(course)?;
        info!(course_id = %stored.id.0, ?sync, "course created");
        Ok((stored, sync))
    }

    /// Whole-record save of a previously fetched course.
    pub fn save(&self, mut course: Course) -> Result<(Course, SaveSync), CatalogServiceError> {
        let sync = self.guard.before_save(&mut course);
        let stored = self.repository.save(course)?;
        Ok((stored, sync))
    }

    /// Partial update; the guard rewrites `$push` clauses before the store runs them.
    pub fn update(
        &self,
        course_id: &CourseId,
        mut update: CourseUpdate,
    ) -> Result<Course, CatalogServiceError> {
        update.validate()?;
        self.guard.before_update(&mut update);
        let course = self
            .repository
            .find_one_and_update(course_id, &update)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(course)
    }

    pub fn enroll_student(
        &self,
        course_id: &CourseId,
        student: UserId,
    ) -> Result<Course, CatalogServiceError> {
        let course = self.update(course_id, CourseUpdate::enroll(student.clone()))?;
        info!(course_id = %course_id.0, student_id = %student.0, "student enrolled");
        Ok(course)
    }

    /// Replace the enrolled students wholesale and save the record.
    pub fn replace_students(
        &self,
        course_id: &CourseId,
        students: Vec<UserId>,
    ) -> Result<Course, CatalogServiceError> {
        let mut course = self.get(course_id)?;
        course.enrollment_mut().set_current(students);
        let (stored, _) = self.save(course)?;
        Ok(stored)
    }

    pub fn get(&self, course_id: &CourseId) -> Result<Course, CatalogServiceError> {
        let course = self
            .repository
            .fetch(course_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(course)
    }

    pub fn list(&self) -> Result<Vec<Course>, CatalogServiceError> {
        Ok(self.repository.list()?)
    }
}

/// Error raised by the course service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogServiceError {
    #[error(transparent)]
    Validation(#[from] CourseValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
