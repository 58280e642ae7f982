use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use rand::Rng;
use types::{GenerateReport, GenerateRequest};

#[utoipa::path(
    post,
    path = "/v1/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Timetable replaced for the scope", body = GenerateReport),
        (status = 422, description = "Missing prerequisites or too few slots")
    )
)]
pub async fn generate(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateReport>, ApiError> {
    user.require_admin()?;

    // Scope ids must exist before anything is deleted.
    if let Some(c) = &req.class_id {
        state.store.get_class(c)?;
    }
    if let Some(t) = &req.teacher_id {
        state.store.get_teacher(t)?;
    }

    let seed = req.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let catalog = state.store.catalog();
    timetable_core::validate(&catalog).map_err(|e| ApiError::Unprocessable(e.to_string()))?;

    let entries = generator::generate(
        &catalog,
        req.class_id.as_ref(),
        req.teacher_id.as_ref(),
        seed,
    )?;

    // The store trusts this batch, so double-check it refers only to live rows.
    for e in &entries {
        timetable_core::validate_entry(&catalog, e)
            .map_err(|err| ApiError::Internal(err.to_string()))?;
    }

    let created = entries.len();
    let replaced = state.store.replace_entries(
        req.class_id.as_ref(),
        req.teacher_id.as_ref(),
        entries.clone(),
    );
    tracing::info!(seed, created, replaced, "timetable generated");

    Ok(Json(GenerateReport {
        class_id: req.class_id,
        teacher_id: req.teacher_id,
        seed,
        replaced,
        created,
        entries,
    }))
}
