use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use types::{NewTimeSlot, SlotId, TimeSlot};

#[utoipa::path(
    get,
    path = "/v1/slots",
    responses((status = 200, description = "All time slots, order-sorted", body = [TimeSlot]))
)]
pub async fn list(State(state): State<AppState>, _user: AuthUser) -> Json<Vec<TimeSlot>> {
    Json(state.store.list_slots())
}

#[utoipa::path(
    get,
    path = "/v1/slots/{id}",
    params(("id" = String, Path, description = "Slot ID")),
    responses((status = 200, body = TimeSlot), (status = 404, description = "Unknown slot"))
)]
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TimeSlot>, ApiError> {
    Ok(Json(state.store.get_slot(&SlotId(id))?))
}

#[utoipa::path(
    post,
    path = "/v1/slots",
    request_body = NewTimeSlot,
    responses((status = 201, body = TimeSlot), (status = 422, description = "Bad time or duplicate order"))
)]
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(new): Json<NewTimeSlot>,
) -> Result<(StatusCode, Json<TimeSlot>), ApiError> {
    user.require_admin()?;
    Ok((StatusCode::CREATED, Json(state.store.create_slot(new)?)))
}

#[utoipa::path(
    put,
    path = "/v1/slots/{id}",
    params(("id" = String, Path, description = "Slot ID")),
    request_body = NewTimeSlot,
    responses((status = 200, body = TimeSlot))
)]
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(new): Json<NewTimeSlot>,
) -> Result<Json<TimeSlot>, ApiError> {
    user.require_admin()?;
    Ok(Json(state.store.update_slot(&SlotId(id), new)?))
}

#[utoipa::path(
    delete,
    path = "/v1/slots/{id}",
    params(("id" = String, Path, description = "Slot ID")),
    responses((status = 204, description = "Deleted, with entries using it"))
)]
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    user.require_admin()?;
    state.store.delete_slot(&SlotId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
