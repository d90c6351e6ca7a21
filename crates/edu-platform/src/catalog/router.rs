use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::{Course, CourseId, NewCourse, UserId};
use super::repository::CourseRepository;
use super::service::CourseService;
use super::update::CourseUpdate;
use crate::error::AppError;

/// Success envelope shared by the catalog endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrollRequest {
    pub(crate) student_id: UserId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReplaceStudentsRequest {
    pub(crate) students: Vec<UserId>,
}

type CourseResult = Result<Json<ApiResponse<Course>>, AppError>;

/// Router builder exposing the course catalog endpoints.
pub fn course_router<R>(service: Arc<CourseService<R>>) -> Router
where
    R: CourseRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/course",
            post(create_handler::<R>).get(list_handler::<R>),
        )
        .route(
            "/api/v1/course/:course_id",
            get(get_handler::<R>).patch(update_handler::<R>),
        )
        .route(
            "/api/v1/course/:course_id/enroll",
            post(enroll_handler::<R>),
        )
        .route(
            "/api/v1/course/:course_id/students",
            put(replace_students_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<CourseService<R>>>,
    payload: Result<Json<NewCourse>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Course>>), AppError>
where
    R: CourseRepository + 'static,
{
    let Json(new) = payload?;
    let (course, _) = service.create(new)?;
    Ok((StatusCode::CREATED, ApiResponse::ok(course)))
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<CourseService<R>>>,
) -> Result<Json<ApiResponse<Vec<Course>>>, AppError>
where
    R: CourseRepository + 'static,
{
    Ok(ApiResponse::ok(service.list()?))
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<CourseService<R>>>,
    Path(course_id): Path<String>,
) -> CourseResult
where
    R: CourseRepository + 'static,
{
    Ok(ApiResponse::ok(service.get(&CourseId(course_id))?))
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<CourseService<R>>>,
    Path(course_id): Path<String>,
    payload: Result<Json<CourseUpdate>, JsonRejection>,
) -> CourseResult
where
    R: CourseRepository + 'static,
{
    let Json(update) = payload?;
    Ok(ApiResponse::ok(service.update(&CourseId(course_id), update)?))
}

pub(crate) async fn enroll_handler<R>(
    State(service): State<Arc<CourseService<R>>>,
    Path(course_id): Path<String>,
    payload: Result<Json<EnrollRequest>, JsonRejection>,
) -> CourseResult
where
    R: CourseRepository + 'static,
{
    let Json(request) = payload?;
    let course = service.enroll_student(&CourseId(course_id), request.student_id)?;
    Ok(ApiResponse::ok(course))
}

pub(crate) async fn replace_students_handler<R>(
    State(service): State<Arc<CourseService<R>>>,
    Path(course_id): Path<String>,
    payload: Result<Json<ReplaceStudentsRequest>, JsonRejection>,
) -> CourseResult
where
    R: CourseRepository + 'static,
{
    let Json(request) = payload?;
    let course = service.replace_students(&CourseId(course_id), request.students)?;
    Ok(ApiResponse::ok(course))
}
