use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use types::{NewTeacher, Teacher, TeacherId};

#[utoipa::path(
    get,
    path = "/v1/teachers",
    responses((status = 200, description = "All teachers", body = [Teacher]))
)]
pub async fn list(State(state): State<AppState>, _user: AuthUser) -> Json<Vec<Teacher>> {
    Json(state.store.list_teachers())
}

#[utoipa::path(
    get,
    path = "/v1/teachers/{id}",
    params(("id" = String, Path, description = "Teacher ID")),
    responses((status = 200, body = Teacher), (status = 404, description = "Unknown teacher"))
)]
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Teacher>, ApiError> {
    Ok(Json(state.store.get_teacher(&TeacherId(id))?))
}

#[utoipa::path(
    post,
    path = "/v1/teachers",
    request_body = NewTeacher,
    responses((status = 201, body = Teacher))
)]
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(new): Json<NewTeacher>,
) -> Result<(StatusCode, Json<Teacher>), ApiError> {
    user.require_admin()?;
    Ok((StatusCode::CREATED, Json(state.store.create_teacher(new))))
}

#[utoipa::path(
    put,
    path = "/v1/teachers/{id}",
    params(("id" = String, Path, description = "Teacher ID")),
    request_body = NewTeacher,
    responses((status = 200, body = Teacher))
)]
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(new): Json<NewTeacher>,
) -> Result<Json<Teacher>, ApiError> {
    user.require_admin()?;
    Ok(Json(state.store.update_teacher(&TeacherId(id), new)?))
}

#[utoipa::path(
    delete,
    path = "/v1/teachers/{id}",
    params(("id" = String, Path, description = "Teacher ID")),
    responses((status = 204, description = "Deleted, with their subjects and entries"))
)]
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    user.require_admin()?;
    state.store.delete_teacher(&TeacherId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
