use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{adapters::inbound::http::ServiceFactory, app_state::AppState, routes};

pub fn create(factory: Arc<dyn ServiceFactory>, app_url: String) -> Router<()> {
    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/auth", routes::auth::router())
        .nest("/board", routes::board::router())
        .nest("/hours", routes::hours::router())
        .merge(routes::dashboard::router())
        .merge(routes::directory::router());

    let app_state = AppState::new(factory);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin.to_str().unwrap_or_default() == app_url
        }));

    app.with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
