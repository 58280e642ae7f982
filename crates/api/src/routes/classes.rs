use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use types::{ClassId, NewSchoolClass, SchoolClass};

#[utoipa::path(
    get,
    path = "/v1/classes",
    responses((status = 200, description = "All classes", body = [SchoolClass]))
)]
pub async fn list(State(state): State<AppState>, _user: AuthUser) -> Json<Vec<SchoolClass>> {
    Json(state.store.list_classes())
}

#[utoipa::path(
    get,
    path = "/v1/classes/{id}",
    params(("id" = String, Path, description = "Class ID")),
    responses((status = 200, body = SchoolClass), (status = 404, description = "Unknown class"))
)]
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SchoolClass>, ApiError> {
    Ok(Json(state.store.get_class(&ClassId(id))?))
}

#[utoipa::path(
    post,
    path = "/v1/classes",
    request_body = NewSchoolClass,
    responses((status = 201, body = SchoolClass))
)]
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(new): Json<NewSchoolClass>,
) -> Result<(StatusCode, Json<SchoolClass>), ApiError> {
    user.require_admin()?;
    Ok((StatusCode::CREATED, Json(state.store.create_class(new))))
}

#[utoipa::path(
    put,
    path = "/v1/classes/{id}",
    params(("id" = String, Path, description = "Class ID")),
    request_body = NewSchoolClass,
    responses((status = 200, body = SchoolClass))
)]
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(new): Json<NewSchoolClass>,
) -> Result<Json<SchoolClass>, ApiError> {
    user.require_admin()?;
    Ok(Json(state.store.update_class(&ClassId(id), new)?))
}

#[utoipa::path(
    delete,
    path = "/v1/classes/{id}",
    params(("id" = String, Path, description = "Class ID")),
    responses((status = 204, description = "Deleted, with subjects and entries"))
)]
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    user.require_admin()?;
    state.store.delete_class(&ClassId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
