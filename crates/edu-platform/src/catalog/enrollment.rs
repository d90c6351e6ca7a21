use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::domain::UserId;

/// The two aliased enrolled-students fields stored on a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrollmentField {
    /// `studentsEnrolled`
    Current,
    /// `studentsEnroled`, kept for older consumers.
    Legacy,
}

impl EnrollmentField {
    pub fn other(self) -> Self {
        match self {
            EnrollmentField::Current => EnrollmentField::Legacy,
            EnrollmentField::Legacy => EnrollmentField::Current,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ModifiedFields {
    current: bool,
    legacy: bool,
}

/// Enrolled students of a course, stored twice under the current and legacy keys.
///
/// Both lists behave as sets: adding a student that is already present is a no-op.
/// Every mutation marks the touched field as modified until the record is persisted,
/// which is what the enrollment guard inspects before a save.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollmentSet {
    #[serde(rename = "studentsEnrolled", default)]
    current: Vec<UserId>,
    #[serde(rename = "studentsEnroled", default)]
    legacy: Vec<UserId>,
    #[serde(skip)]
    modified: ModifiedFields,
}

impl EnrollmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &[UserId] {
        &self.current
    }

    pub fn legacy(&self) -> &[UserId] {
        &self.legacy
    }

    pub fn get(&self, field: EnrollmentField) -> &[UserId] {
        match field {
            EnrollmentField::Current => &self.current,
            EnrollmentField::Legacy => &self.legacy,
        }
    }

    pub fn set_current<I>(&mut self, students: I)
    where
        I: IntoIterator<Item = UserId>,
    {
        self.replace(EnrollmentField::Current, students);
    }

    pub fn set_legacy<I>(&mut self, students: I)
    where
        I: IntoIterator<Item = UserId>,
    {
        self.replace(EnrollmentField::Legacy, students);
    }

    /// Overwrites one field, dropping duplicate ids while keeping first-seen order.
    pub fn replace<I>(&mut self, field: EnrollmentField, students: I)
    where
        I: IntoIterator<Item = UserId>,
    {
        let mut seen = HashSet::new();
        let deduped: Vec<UserId> = students
            .into_iter()
            .filter(|student| seen.insert(student.clone()))
            .collect();
        *self.field_mut(field) = deduped;
        self.mark_modified(field);
    }

    /// Appends a student to one field. Returns `false` when the id was already there.
    pub fn add(&mut self, field: EnrollmentField, student: UserId) -> bool {
        let slot = self.field_mut(field);
        if slot.contains(&student) {
            return false;
        }
        slot.push(student);
        self.mark_modified(field);
        true
    }

    pub fn is_modified(&self, field: EnrollmentField) -> bool {
        match field {
            EnrollmentField::Current => self.modified.current,
            EnrollmentField::Legacy => self.modified.legacy,
        }
    }

    /// True when both fields hold the same students, ignoring order.
    pub fn is_consistent(&self) -> bool {
        let current: HashSet<&UserId> = self.current.iter().collect();
        let legacy: HashSet<&UserId> = self.legacy.iter().collect();
        current == legacy
    }

    /// Clears modification tracking once the record has been written.
    pub fn mark_persisted(&mut self) {
        self.modified = ModifiedFields::default();
    }

    /// Overwrites the other field with a copy of `source`.
    pub(crate) fn mirror_from(&mut self, source: EnrollmentField) {
        let copy = self.get(source).to_vec();
        *self.field_mut(source.other()) = copy;
    }

    fn field_mut(&mut self, field: EnrollmentField) -> &mut Vec<UserId> {
        match field {
            EnrollmentField::Current => &mut self.current,
            EnrollmentField::Legacy => &mut self.legacy,
        }
    }

    fn mark_modified(&mut self, field: EnrollmentField) {
        match field {
            EnrollmentField::Current => self.modified.current = true,
            EnrollmentField::Legacy => self.modified.legacy = true,
        }
    }
}

impl PartialEq for EnrollmentSet {
    fn eq(&self, other: &Self) -> bool {
        self.current == other.current && self.legacy == other.legacy
    }
}

impl Eq for EnrollmentSet {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<UserId> {
        raw.iter().map(|id| UserId(id.to_string())).collect()
    }

    #[test]
    fn replace_drops_duplicates_and_marks_field() {
        let mut set = EnrollmentSet::new();
        set.set_current(ids(&["a", "b", "a", "c"]));

        assert_eq!(set.current(), ids(&["a", "b", "c"]).as_slice());
        assert!(set.is_modified(EnrollmentField::Current));
        assert!(!set.is_modified(EnrollmentField::Legacy));
    }

    #[test]
    fn add_is_a_no_op_for_existing_student() {
        let mut set = EnrollmentSet::new();
        assert!(set.add(EnrollmentField::Legacy, UserId("a".into())));
        set.mark_persisted();

        assert!(!set.add(EnrollmentField::Legacy, UserId("a".into())));
        assert!(!set.is_modified(EnrollmentField::Legacy));
        assert_eq!(set.legacy().len(), 1);
    }

    #[test]
    fn mirrored_field_is_an_independent_copy() {
        let mut set = EnrollmentSet::new();
        set.set_current(ids(&["a", "b"]));
        set.mirror_from(EnrollmentField::Current);
        set.add(EnrollmentField::Current, UserId("c".into()));

        assert_eq!(set.legacy(), ids(&["a", "b"]).as_slice());
        assert!(!set.is_consistent());
    }

    #[test]
    fn consistency_ignores_order() {
        let mut set = EnrollmentSet::new();
        set.set_current(ids(&["a", "b"]));
        set.set_legacy(ids(&["b", "a"]));
        assert!(set.is_consistent());
    }

    #[test]
    fn deserialized_records_start_clean() {
        let set: EnrollmentSet = serde_json::from_str(
            r#"{"studentsEnrolled":["u1"],"studentsEnroled":["u1"]}"#,
        )
        .expect("valid json");
        assert!(!set.is_modified(EnrollmentField::Current));
        assert!(!set.is_modified(EnrollmentField::Legacy));
        assert_eq!(set.current(), ids(&["u1"]).as_slice());
    }
}
