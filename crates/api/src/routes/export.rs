use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use export::{build_view, ExportFormat};
use serde::Deserialize;
use types::{ClassId, EntryFilter};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    #[serde(default)]
    pub class_id: Option<ClassId>,
}

#[utoipa::path(
    get,
    path = "/v1/export/{format}",
    params(
        ("format" = String, Path, description = "csv, xlsx, pdf or html"),
        ("classId" = Option<String>, Query, description = "Limit to one class")
    ),
    responses(
        (status = 200, description = "Timetable file download"),
        (status = 400, description = "Unknown format")
    )
)]
pub async fn export(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(format): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let format = ExportFormat::parse(&format)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown export format: {format}")))?;
    if let Some(c) = &query.class_id {
        state.store.get_class(c)?;
    }

    let catalog = state.store.catalog();
    let entries = state.store.list_entries(&EntryFilter {
        class_id: query.class_id.clone(),
        ..Default::default()
    });
    let view = build_view(&catalog, &entries, query.class_id.as_ref());
    let bytes = export::render(&view, format).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        bytes,
    )
        .into_response())
}
