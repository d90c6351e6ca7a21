use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::domain::{Course, CourseId};
use super::update::CourseUpdate;

/// Storage abstraction so the catalog service can run against any document store.
///
/// Implementations persist records exactly as handed over; enrollment
/// reconciliation happens in the service before these are called.
pub trait CourseRepository: Send + Sync {
    fn insert(&self, course: Course) -> Result<Course, RepositoryError>;
    fn save(&self, course: Course) -> Result<Course, RepositoryError>;
    /// Applies `update` to the matching record and returns the updated document.
    fn find_one_and_update(
        &self,
        id: &CourseId,
        update: &CourseUpdate,
    ) -> Result<Option<Course>, RepositoryError>;
    fn fetch(&self, id: &CourseId) -> Result<Option<Course>, RepositoryError>;
    fn list(&self) -> Result<Vec<Course>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store used when no database is configured, and in tests.
#[derive(Default, Clone)]
pub struct InMemoryCourseRepository {
    records: Arc<Mutex<BTreeMap<String, Course>>>,
}

impl InMemoryCourseRepository {
    pub fn len(&self) -> usize {
        self.records.lock().expect("catalog mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CourseRepository for InMemoryCourseRepository {
    fn insert(&self, mut course: Course) -> Result<Course, RepositoryError> {
        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        if guard.contains_key(&course.id.0) {
            return Err(RepositoryError::Conflict);
        }
        course.enrollment_mut().mark_persisted();
        guard.insert(course.id.0.clone(), course.clone());
        Ok(course)
    }

    fn save(&self, mut course: Course) -> Result<Course, RepositoryError> {
        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        if !guard.contains_key(&course.id.0) {
            return Err(RepositoryError::NotFound);
        }
        course.enrollment_mut().mark_persisted();
        guard.insert(course.id.0.clone(), course.clone());
        Ok(course)
    }

    fn find_one_and_update(
        &self,
        id: &CourseId,
        update: &CourseUpdate,
    ) -> Result<Option<Course>, RepositoryError> {
        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        let Some(record) = guard.get_mut(&id.0) else {
            return Ok(None);
        };
        record.apply_update(update);
        record.enrollment_mut().mark_persisted();
        Ok(Some(record.clone()))
    }

    fn fetch(&self, id: &CourseId) -> Result<Option<Course>, RepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        Ok(guard.get(&id.0).cloned())
    }

    fn list(&self) -> Result<Vec<Course>, RepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}
