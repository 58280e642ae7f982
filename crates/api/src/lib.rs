pub mod auth;
pub mod config;
pub mod error;
pub mod state;
pub mod telemetry;
pub mod routes {
    pub mod classes;
    pub mod entries;
    pub mod export;
    pub mod generate;
    pub mod health;
    pub mod rooms;
    pub mod slots;
    pub mod subjects;
    pub mod swaps;
    pub mod teachers;
}

use axum::{
    routing::{get, post},
    Router,
};
use state::AppState;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::classes::list,
            routes::classes::get,
            routes::classes::create,
            routes::classes::update,
            routes::classes::delete,
            routes::teachers::list,
            routes::teachers::get,
            routes::teachers::create,
            routes::teachers::update,
            routes::teachers::delete,
            routes::rooms::list,
            routes::rooms::get,
            routes::rooms::create,
            routes::rooms::update,
            routes::rooms::delete,
            routes::slots::list,
            routes::slots::get,
            routes::slots::create,
            routes::slots::update,
            routes::slots::delete,
            routes::subjects::list,
            routes::subjects::get,
            routes::subjects::create,
            routes::subjects::update,
            routes::subjects::delete,
            routes::entries::list,
            routes::entries::get,
            routes::entries::assign,
            routes::entries::swap,
            routes::generate::generate,
            routes::swaps::list,
            routes::swaps::get,
            routes::swaps::create,
            routes::swaps::approve,
            routes::swaps::reject,
            routes::export::export,
        ),
        components(schemas(
            types::SchoolClass, types::NewSchoolClass, types::Teacher, types::NewTeacher,
            types::Room, types::NewRoom, types::TimeSlot, types::NewTimeSlot,
            types::Subject, types::NewSubject, types::TimetableEntry, types::EntryPatch,
            types::EntryFilter, types::SwapRequest, types::NewSwapRequest, types::SwapStatus,
            types::GenerateRequest, types::GenerateReport, types::DayOfWeek, types::Role,
            types::ClassId, types::SubjectId, types::TeacherId, types::RoomId,
            types::SlotId, types::EntryId, types::SwapRequestId,
            routes::entries::SwapEntriesIn,
            routes::swaps::SwapFilter
        )),
        tags(
            (name = "timetable", description = "School timetable management API")
        )
    )]
pub struct ApiDoc;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(routes::health::health))
        .route(
            "/v1/classes",
            get(routes::classes::list).post(routes::classes::create),
        )
        .route(
            "/v1/classes/:id",
            get(routes::classes::get)
                .put(routes::classes::update)
                .delete(routes::classes::delete),
        )
        .route(
            "/v1/teachers",
            get(routes::teachers::list).post(routes::teachers::create),
        )
        .route(
            "/v1/teachers/:id",
            get(routes::teachers::get)
                .put(routes::teachers::update)
                .delete(routes::teachers::delete),
        )
        .route(
            "/v1/rooms",
            get(routes::rooms::list).post(routes::rooms::create),
        )
        .route(
            "/v1/rooms/:id",
            get(routes::rooms::get)
                .put(routes::rooms::update)
                .delete(routes::rooms::delete),
        )
        .route(
            "/v1/slots",
            get(routes::slots::list).post(routes::slots::create),
        )
        .route(
            "/v1/slots/:id",
            get(routes::slots::get)
                .put(routes::slots::update)
                .delete(routes::slots::delete),
        )
        .route(
            "/v1/subjects",
            get(routes::subjects::list).post(routes::subjects::create),
        )
        .route(
            "/v1/subjects/:id",
            get(routes::subjects::get)
                .put(routes::subjects::update)
                .delete(routes::subjects::delete),
        )
        .route("/v1/entries", get(routes::entries::list))
        .route("/v1/entries/swap", post(routes::entries::swap))
        .route(
            "/v1/entries/:id",
            get(routes::entries::get).put(routes::entries::assign),
        )
        .route("/v1/generate", post(routes::generate::generate))
        .route(
            "/v1/swap-requests",
            get(routes::swaps::list).post(routes::swaps::create),
        )
        .route("/v1/swap-requests/:id", get(routes::swaps::get))
        .route("/v1/swap-requests/:id/approve", post(routes::swaps::approve))
        .route("/v1/swap-requests/:id/reject", post(routes::swaps::reject))
        .route("/v1/export/:format", get(routes::export::export))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(telemetry::stack())
        .with_state(state)
}
