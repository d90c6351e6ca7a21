use serde::{Deserialize, Serialize};

use super::domain::{validate_tags, CategoryId, CourseStatus, CourseValidationError, UserId};
use super::enrollment::EnrollmentField;

/// Partial update document in the `$set` / `$push` shape the store understands.
///
/// Enrollment fields can only be reached through `$push`; `$set` rejects them at
/// deserialization so every partial write to enrollment passes the guard's interceptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CourseUpdate {
    #[serde(rename = "$set", default, skip_serializing_if = "Option::is_none")]
    pub set: Option<CoursePatch>,
    #[serde(rename = "$push", default, skip_serializing_if = "Option::is_none")]
    pub push: Option<EnrollmentPush>,
}

impl CourseUpdate {
    /// Appends one student to `studentsEnrolled`.
    pub fn enroll(student: UserId) -> Self {
        Self::push(EnrollmentField::Current, PushValue::One(student))
    }

    pub fn push(field: EnrollmentField, value: PushValue) -> Self {
        let mut push = EnrollmentPush::default();
        *push.slot_mut(field) = Some(value);
        Self {
            set: None,
            push: Some(push),
        }
    }

    pub fn with_set(mut self, patch: CoursePatch) -> Self {
        self.set = Some(patch);
        self
    }

    pub fn validate(&self) -> Result<(), CourseValidationError> {
        match self.set.as_ref().and_then(|patch| patch.tag.as_deref()) {
            Some(tags) => validate_tags(tags),
            None => Ok(()),
        }
    }
}

/// Scalar course fields that may be overwritten in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CoursePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub what_you_will_learn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CourseStatus>,
}

/// `$push` clause addressing the enrollment fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnrollmentPush {
    #[serde(
        rename = "studentsEnrolled",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub current: Option<PushValue>,
    #[serde(
        rename = "studentsEnroled",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub legacy: Option<PushValue>,
}

impl EnrollmentPush {
    pub fn get(&self, field: EnrollmentField) -> Option<&PushValue> {
        match field {
            EnrollmentField::Current => self.current.as_ref(),
            EnrollmentField::Legacy => self.legacy.as_ref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, field: EnrollmentField) -> &mut Option<PushValue> {
        match field {
            EnrollmentField::Current => &mut self.current,
            EnrollmentField::Legacy => &mut self.legacy,
        }
    }

    /// Present clauses in application order.
    pub fn clauses(&self) -> impl Iterator<Item = (EnrollmentField, &PushValue)> {
        [EnrollmentField::Current, EnrollmentField::Legacy]
            .into_iter()
            .filter_map(move |field| self.get(field).map(|value| (field, value)))
    }
}

/// Value appended by a `$push`: a single id or `{"$each": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PushValue {
    One(UserId),
    Each {
        #[serde(rename = "$each")]
        each: Vec<UserId>,
    },
}

impl PushValue {
    pub fn students(&self) -> &[UserId] {
        match self {
            PushValue::One(student) => std::slice::from_ref(student),
            PushValue::Each { each } => each,
        }
    }
}
