use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use types::{NewSwapRequest, Role, SwapRequest, SwapRequestId, SwapStatus, TeacherId};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct SwapFilter {
    #[serde(default)]
    pub teacher: Option<TeacherId>,
    #[serde(default)]
    pub status: Option<SwapStatus>,
}

#[utoipa::path(
    get,
    path = "/v1/swap-requests",
    params(
        ("teacher" = Option<String>, Query, description = "Requests involving this teacher"),
        ("status" = Option<String>, Query, description = "pending, approved or rejected")
    ),
    responses((status = 200, description = "Swap requests, oldest first", body = [SwapRequest]))
)]
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<SwapFilter>,
) -> Json<Vec<SwapRequest>> {
    Json(
        state
            .store
            .list_swap_requests(filter.teacher.as_ref(), filter.status),
    )
}

#[utoipa::path(
    get,
    path = "/v1/swap-requests/{id}",
    params(("id" = String, Path, description = "Swap request ID")),
    responses((status = 200, body = SwapRequest), (status = 404, description = "Unknown request"))
)]
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SwapRequest>, ApiError> {
    Ok(Json(state.store.get_swap_request(&SwapRequestId(id))?))
}

#[utoipa::path(
    post,
    path = "/v1/swap-requests",
    request_body = NewSwapRequest,
    responses(
        (status = 201, description = "Request filed", body = SwapRequest),
        (status = 403, description = "Requester does not teach entry A"),
        (status = 409, description = "The exchange could never apply")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(new): Json<NewSwapRequest>,
) -> Result<(StatusCode, Json<SwapRequest>), ApiError> {
    let from = match (user.role, user.teacher_id.as_ref(), new.from_teacher.as_ref()) {
        // Teachers always file as themselves; naming someone else is rejected
        // rather than ignored.
        (Role::Teacher, Some(own), Some(explicit)) if explicit != own => {
            return Err(ApiError::BadRequest(
                "fromTeacher does not match the requesting teacher".into(),
            ))
        }
        (Role::Teacher, Some(own), _) => own.clone(),
        (Role::Admin, _, Some(explicit)) => explicit.clone(),
        (Role::Admin, _, None) => {
            return Err(ApiError::BadRequest(
                "admins must name fromTeacher when filing a swap request".into(),
            ))
        }
        _ => {
            return Err(ApiError::Forbidden(
                "swap requests are filed by teachers".into(),
            ))
        }
    };
    let req = state.store.create_swap_request(&from, new)?;
    Ok((StatusCode::CREATED, Json(req)))
}

#[utoipa::path(
    post,
    path = "/v1/swap-requests/{id}/approve",
    params(("id" = String, Path, description = "Swap request ID")),
    responses(
        (status = 200, description = "Approved and applied", body = SwapRequest),
        (status = 403, description = "Only the addressed teacher or an admin may decide"),
        (status = 409, description = "Already decided, or the swap no longer fits")
    )
)]
pub async fn approve(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SwapRequest>, ApiError> {
    let decider = user.acting_teacher()?.cloned();
    Ok(Json(
        state
            .store
            .approve_swap_request(&SwapRequestId(id), decider.as_ref())?,
    ))
}

#[utoipa::path(
    post,
    path = "/v1/swap-requests/{id}/reject",
    params(("id" = String, Path, description = "Swap request ID")),
    responses(
        (status = 200, description = "Rejected", body = SwapRequest),
        (status = 403, description = "Only the addressed teacher or an admin may decide"),
        (status = 409, description = "Already decided")
    )
)]
pub async fn reject(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SwapRequest>, ApiError> {
    let decider = user.acting_teacher()?.cloned();
    Ok(Json(
        state
            .store
            .reject_swap_request(&SwapRequestId(id), decider.as_ref())?,
    ))
}
