
use std::sync::Arc;

use crate::catalog::{
    Course, CourseId, CourseRepository, CourseService, CourseUpdate, InMemoryCourseRepository,
    NewCourse, RepositoryError, UserId,
};

pub(super) fn student(id: &str) -> UserId {
    UserId(id.to_string())
}

pub(super) fn new_course() -> NewCourse {
    NewCourse {
        course_name: Some("Distributed Systems in Practice".to_string()),
        course_description: Some("Consensus, replication and failure handling".to_string()),
        instructor: student("instructor-42"),
        what_you_will_learn: Some("How to reason about partial failure".to_string()),
        price: Some(1299),
        thumbnail: None,
        tag: vec!["systems".to_string(), "backend".to_string()],
        category: None,
        instructions: vec!["Bring a laptop".to_string()],
        status: None,
        students_enrolled: None,
        students_enroled: None,
    }
}

pub(super) fn memory_service() -> (
    Arc<InMemoryCourseRepository>,
    CourseService<InMemoryCourseRepository>,
) {
    let repository = Arc::new(InMemoryCourseRepository::default());
    let service = CourseService::new(repository.clone());
    (repository, service)
}

/// Repository that stores nothing and fails every call.
pub(super) struct OfflineRepository;

impl CourseRepository for OfflineRepository {
    fn insert(&self, _course: Course) -> Result<Course, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save(&self, _course: Course) -> Result<Course, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_one_and_update(
        &self,
        _id: &CourseId,
        _update: &CourseUpdate,
    ) -> Result<Option<Course>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &CourseId) -> Result<Option<Course>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Course>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
