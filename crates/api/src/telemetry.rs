use std::time::Duration;
use tower::layer::util::{Identity, Stack};
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::HttpMakeClassifier;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

pub fn stack() -> ServiceBuilder<
    Stack<
        TimeoutLayer,
        Stack<CorsLayer, Stack<RequestBodyLimitLayer, Stack<TraceLayer<HttpMakeClassifier>, Identity>>>,
    >,
> {
    let trace = TraceLayer::new_for_http();
    let cors = CorsLayer::permissive();
    let timeout = TimeoutLayer::new(Duration::from_secs(30));
    let limit = RequestBodyLimitLayer::new(1024 * 1024);

    ServiceBuilder::new()
        .layer(trace)
        .layer(limit)
        .layer(cors)
        .layer(timeout)
}
