//! Course catalog: records, the enrollment guard, storage contract, service, and routes.
//!
//! A course stores its enrolled students twice, under `studentsEnrolled` and the
//! older `studentsEnroled` key. [`EnrollmentGuard`] keeps the two identical on
//! whole-record saves and on `$push` updates; [`CourseService`] is the only write
//! path and runs the guard before handing records to a [`CourseRepository`].

pub mod domain;
pub mod enrollment;
pub mod guard;
pub mod repository;
pub mod router;
pub mod service;
pub mod update;

#[cfg(test)]
mod tests;

pub use domain::{
    CategoryId, Course, CourseId, CourseStatus, CourseValidationError, NewCourse, ReviewId,
    SectionId, UserId,
};
pub use enrollment::{EnrollmentField, EnrollmentSet};
pub use guard::{EnrollmentGuard, SaveSync, UpdateSync};
pub use repository::{CourseRepository, InMemoryCourseRepository, RepositoryError};
pub use router::{course_router, ApiResponse};
pub use service::{CatalogServiceError, CourseService};
pub use update::{CoursePatch, CourseUpdate, EnrollmentPush, PushValue};
