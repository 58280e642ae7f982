use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use types::{NewRoom, Room, RoomId};

#[utoipa::path(
    get,
    path = "/v1/rooms",
    responses((status = 200, description = "All rooms", body = [Room]))
)]
pub async fn list(State(state): State<AppState>, _user: AuthUser) -> Json<Vec<Room>> {
    Json(state.store.list_rooms())
}

#[utoipa::path(
    get,
    path = "/v1/rooms/{id}",
    params(("id" = String, Path, description = "Room ID")),
    responses((status = 200, body = Room), (status = 404, description = "Unknown room"))
)]
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Room>, ApiError> {
    Ok(Json(state.store.get_room(&RoomId(id))?))
}

#[utoipa::path(
    post,
    path = "/v1/rooms",
    request_body = NewRoom,
    responses((status = 201, body = Room), (status = 422, description = "Zero capacity"))
)]
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(new): Json<NewRoom>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    user.require_admin()?;
    Ok((StatusCode::CREATED, Json(state.store.create_room(new)?)))
}

#[utoipa::path(
    put,
    path = "/v1/rooms/{id}",
    params(("id" = String, Path, description = "Room ID")),
    request_body = NewRoom,
    responses((status = 200, body = Room))
)]
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(new): Json<NewRoom>,
) -> Result<Json<Room>, ApiError> {
    user.require_admin()?;
    Ok(Json(state.store.update_room(&RoomId(id), new)?))
}

#[utoipa::path(
    delete,
    path = "/v1/rooms/{id}",
    params(("id" = String, Path, description = "Room ID")),
    responses((status = 204, description = "Deleted, with entries using it"))
)]
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    user.require_admin()?;
    state.store.delete_room(&RoomId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
