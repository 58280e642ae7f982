use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use types::{NewSubject, Subject, SubjectId};

#[utoipa::path(
    get,
    path = "/v1/subjects",
    responses((status = 200, description = "All subjects", body = [Subject]))
)]
pub async fn list(State(state): State<AppState>, _user: AuthUser) -> Json<Vec<Subject>> {
    Json(state.store.list_subjects())
}

#[utoipa::path(
    get,
    path = "/v1/subjects/{id}",
    params(("id" = String, Path, description = "Subject ID")),
    responses((status = 200, body = Subject), (status = 404, description = "Unknown subject"))
)]
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Subject>, ApiError> {
    Ok(Json(state.store.get_subject(&SubjectId(id))?))
}

#[utoipa::path(
    post,
    path = "/v1/subjects",
    request_body = NewSubject,
    responses((status = 201, body = Subject), (status = 422, description = "Dangling class or teacher"))
)]
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(new): Json<NewSubject>,
) -> Result<(StatusCode, Json<Subject>), ApiError> {
    user.require_admin()?;
    Ok((StatusCode::CREATED, Json(state.store.create_subject(new)?)))
}

#[utoipa::path(
    put,
    path = "/v1/subjects/{id}",
    params(("id" = String, Path, description = "Subject ID")),
    request_body = NewSubject,
    responses((status = 200, body = Subject))
)]
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(new): Json<NewSubject>,
) -> Result<Json<Subject>, ApiError> {
    user.require_admin()?;
    Ok(Json(state.store.update_subject(&SubjectId(id), new)?))
}

#[utoipa::path(
    delete,
    path = "/v1/subjects/{id}",
    params(("id" = String, Path, description = "Subject ID")),
    responses((status = 204, description = "Deleted, with its entries"))
)]
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    user.require_admin()?;
    state.store.delete_subject(&SubjectId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
