use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use types::{EntryFilter, EntryId, EntryPatch, TimetableEntry};
use utoipa::ToSchema;

#[utoipa::path(
    get,
    path = "/v1/entries",
    params(
        ("classId" = Option<String>, Query, description = "Filter by class"),
        ("teacherId" = Option<String>, Query, description = "Filter by teacher"),
        ("day" = Option<String>, Query, description = "Filter by day (mon..fri)")
    ),
    responses((status = 200, description = "Timetable entries, day/slot-sorted", body = [TimetableEntry]))
)]
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<EntryFilter>,
) -> Json<Vec<TimetableEntry>> {
    Json(state.store.list_entries(&filter))
}

#[utoipa::path(
    get,
    path = "/v1/entries/{id}",
    params(("id" = String, Path, description = "Entry ID")),
    responses((status = 200, body = TimetableEntry), (status = 404, description = "Unknown entry"))
)]
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TimetableEntry>, ApiError> {
    Ok(Json(state.store.get_entry(&EntryId(id))?))
}

#[utoipa::path(
    put,
    path = "/v1/entries/{id}",
    params(("id" = String, Path, description = "Entry ID")),
    request_body = EntryPatch,
    responses(
        (status = 200, description = "Entry reassigned", body = TimetableEntry),
        (status = 409, description = "Target cell already taken for the class")
    )
)]
pub async fn assign(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<EntryPatch>,
) -> Result<Json<TimetableEntry>, ApiError> {
    user.require_admin()?;
    Ok(Json(state.store.assign_entry(&EntryId(id), patch)?))
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwapEntriesIn {
    pub entry_a: EntryId,
    pub entry_b: EntryId,
}

#[utoipa::path(
    post,
    path = "/v1/entries/swap",
    request_body = SwapEntriesIn,
    responses(
        (status = 200, description = "Subjects exchanged", body = [TimetableEntry]),
        (status = 409, description = "Swap would collide or crosses classes")
    )
)]
pub async fn swap(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<SwapEntriesIn>,
) -> Result<Json<Vec<TimetableEntry>>, ApiError> {
    user.require_admin()?;
    let (a, b) = state.store.swap_entries(&input.entry_a, &input.entry_b)?;
    Ok(Json(vec![a, b]))
}
