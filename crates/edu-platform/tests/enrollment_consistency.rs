use std::sync::Arc;

use edu_platform::catalog::{
    CourseRepository, CourseService, CourseUpdate, EnrollmentField, EnrollmentGuard,
    EnrollmentPush, InMemoryCourseRepository, NewCourse, PushValue, SaveSync, UpdateSync, UserId,
};

fn ids(raw: &[&str]) -> Vec<UserId> {
    raw.iter().map(|id| UserId(id.to_string())).collect()
}

fn course_request(students: &[&str]) -> NewCourse {
    NewCourse {
        course_name: Some("Web Development Bootcamp".to_string()),
        course_description: None,
        instructor: UserId("instructor-1".to_string()),
        what_you_will_learn: None,
        price: Some(2499),
        thumbnail: Some("https://media.example.com/thumb.png".to_string()),
        tag: vec!["web".to_string()],
        category: None,
        instructions: Vec::new(),
        status: None,
        students_enrolled: Some(ids(students)),
        students_enroled: None,
    }
}

#[test]
fn saving_an_extended_current_set_updates_the_legacy_set() {
    let repository = Arc::new(InMemoryCourseRepository::default());
    let service = CourseService::new(repository.clone());
    let (course, _) = service
        .create(course_request(&["A", "B"]))
        .expect("course created");

    let mut loaded = service.get(&course.id).expect("course loads");
    loaded.enrollment_mut().set_current(ids(&["A", "B", "C"]));
    let (_, sync) = service.save(loaded).expect("course saved");
    assert_eq!(sync, SaveSync::CurrentToLegacy);

    let stored = repository
        .fetch(&course.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.enrollment().legacy(), ids(&["A", "B", "C"]).as_slice());
}

#[test]
fn saving_a_modified_legacy_set_updates_the_current_set() {
    let repository = Arc::new(InMemoryCourseRepository::default());
    let service = CourseService::new(repository.clone());
    let (course, _) = service.create(course_request(&["A"])).expect("course created");

    let mut loaded = service.get(&course.id).expect("course loads");
    loaded.enrollment_mut().set_legacy(ids(&["Q", "A"]));
    let (saved, sync) = service.save(loaded).expect("course saved");
    assert_eq!(sync, SaveSync::LegacyToCurrent);

    assert_eq!(saved.enrollment().current(), ids(&["Q", "A"]).as_slice());
    assert!(saved.enrollment().is_consistent());
}

#[test]
fn every_service_write_leaves_aliases_consistent() {
    let repository = Arc::new(InMemoryCourseRepository::default());
    let service = CourseService::new(repository.clone());
    let (course, _) = service.create(course_request(&[])).expect("course created");

    for student in ["s1", "s2", "s1", "s3"] {
        service
            .enroll_student(&course.id, UserId(student.to_string()))
            .expect("enrolled");
    }
    service
        .update(
            &course.id,
            CourseUpdate::push(EnrollmentField::Legacy, PushValue::One(UserId("s4".into()))),
        )
        .expect("legacy push applied");

    for course in repository.list().expect("list succeeds") {
        assert!(course.enrollment().is_consistent(), "{course:?}");
        assert_eq!(course.enrollment().current().len(), 4);
    }
}

#[test]
fn interceptor_mirrors_append_and_is_idempotent() {
    let guard = EnrollmentGuard::new();
    let mut update = CourseUpdate::enroll(UserId("X".into()));

    assert_eq!(guard.before_update(&mut update), UpdateSync::MirroredToLegacy);
    let push = update.push.clone().expect("push clause");
    assert_eq!(push.legacy, Some(PushValue::One(UserId("X".into()))));

    let once = update.clone();
    guard.before_update(&mut update);
    assert_eq!(update, once);
}

#[test]
fn explicit_double_append_is_not_doubled() {
    let guard = EnrollmentGuard::new();
    let mut update = CourseUpdate {
        set: None,
        push: Some(EnrollmentPush {
            current: Some(PushValue::One(UserId("X".into()))),
            legacy: Some(PushValue::One(UserId("X".into()))),
        }),
    };
    let original = update.clone();

    assert_eq!(guard.before_update(&mut update), UpdateSync::AlreadyPaired);
    assert_eq!(update, original);
}

#[test]
fn direct_store_writes_bypass_the_guard() {
    let repository = InMemoryCourseRepository::default();
    let service = CourseService::new(Arc::new(repository.clone()));
    let (course, _) = service.create(course_request(&["A"])).expect("course created");

    // Straight to the store: nothing mirrors the append.
    repository
        .find_one_and_update(&course.id, &CourseUpdate::enroll(UserId("B".into())))
        .expect("update runs")
        .expect("record present");

    let stored = service.get(&course.id).expect("course loads");
    assert!(!stored.enrollment().is_consistent());

    // The next save through the service does not repair it either: no field was modified.
    let mut loaded = stored.clone();
    assert_eq!(EnrollmentGuard::new().before_save(&mut loaded), SaveSync::Unchanged);
}
