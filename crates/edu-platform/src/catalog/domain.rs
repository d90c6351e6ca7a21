use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enrollment::EnrollmentSet;
use super::update::{CoursePatch, CourseUpdate};

/// Identifier wrapper for catalog courses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseId(pub String);

/// Reference to a platform user (instructor or student).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub String);

/// Publication state of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseStatus {
    Draft,
    Published,
}

/// Course document as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: CourseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_description: Option<String>,
    pub instructor: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub what_you_will_learn: Option<String>,
    #[serde(default)]
    pub course_content: Vec<SectionId>,
    #[serde(default)]
    pub rating_and_reviews: Vec<ReviewId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub tag: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(flatten)]
    enrollment: EnrollmentSet,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CourseStatus>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Builds a course from a creation request. Enrollment fields supplied by the
    /// caller are marked modified so the guard reconciles them on insert.
    pub fn from_new(
        id: CourseId,
        new: NewCourse,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CourseValidationError> {
        new.validate()?;

        let mut enrollment = EnrollmentSet::new();
        if let Some(students) = new.students_enrolled {
            enrollment.set_current(students);
        }
        if let Some(students) = new.students_enroled {
            enrollment.set_legacy(students);
        }

        Ok(Self {
            id,
            course_name: new.course_name,
            course_description: new.course_description,
            instructor: new.instructor,
            what_you_will_learn: new.what_you_will_learn,
            course_content: Vec::new(),
            rating_and_reviews: Vec::new(),
            price: new.price,
            thumbnail: new.thumbnail,
            tag: new.tag,
            category: new.category,
            enrollment,
            instructions: new.instructions,
            status: new.status,
            created_at,
        })
    }

    pub fn enrollment(&self) -> &EnrollmentSet {
        &self.enrollment
    }

    pub fn enrollment_mut(&mut self) -> &mut EnrollmentSet {
        &mut self.enrollment
    }

    /// Applies a partial update exactly as written: `$set` fields first, then each
    /// `$push` clause. Store implementations call this after the update has passed
    /// through the enrollment guard.
    pub fn apply_update(&mut self, update: &CourseUpdate) {
        if let Some(patch) = &update.set {
            self.apply_patch(patch);
        }

        if let Some(push) = &update.push {
            for (field, value) in push.clauses() {
                for student in value.students() {
                    self.enrollment.add(field, student.clone());
                }
            }
        }
    }

    fn apply_patch(&mut self, patch: &CoursePatch) {
        let patch = patch.clone();
        if let Some(name) = patch.course_name {
            self.course_name = Some(name);
        }
        if let Some(description) = patch.course_description {
            self.course_description = Some(description);
        }
        if let Some(learn) = patch.what_you_will_learn {
            self.what_you_will_learn = Some(learn);
        }
        if let Some(price) = patch.price {
            self.price = Some(price);
        }
        if let Some(thumbnail) = patch.thumbnail {
            self.thumbnail = Some(thumbnail);
        }
        if let Some(tag) = patch.tag {
            self.tag = tag;
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(instructions) = patch.instructions {
            self.instructions = instructions;
        }
        if let Some(status) = patch.status {
            self.status = Some(status);
        }
    }
}

/// Creation payload accepted by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub course_description: Option<String>,
    pub instructor: UserId,
    #[serde(default)]
    pub what_you_will_learn: Option<String>,
    #[serde(default)]
    pub price: Option<u32>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub tag: Vec<String>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub status: Option<CourseStatus>,
    #[serde(default)]
    pub students_enrolled: Option<Vec<UserId>>,
    #[serde(default)]
    pub students_enroled: Option<Vec<UserId>>,
}

impl NewCourse {
    pub fn validate(&self) -> Result<(), CourseValidationError> {
        if self.instructor.0.trim().is_empty() {
            return Err(CourseValidationError::MissingInstructor);
        }
        validate_tags(&self.tag)
    }
}

pub(crate) fn validate_tags(tags: &[String]) -> Result<(), CourseValidationError> {
    if tags.iter().all(|tag| tag.trim().is_empty()) {
        return Err(CourseValidationError::MissingTags);
    }
    Ok(())
}

/// Schema violations rejected before a course reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourseValidationError {
    #[error("course requires an instructor")]
    MissingInstructor,
    #[error("course requires at least one tag")]
    MissingTags,
}
