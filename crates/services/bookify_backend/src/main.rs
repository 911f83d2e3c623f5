// File: services/bookify_backend/src/main.rs
use axum::{routing::get, Router};
use bookify_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

mod adapters;
mod app_state;
mod service_factory;

use app_state::AppState;

#[tokio::main]
async fn main() {
    let config = Arc::new(load_config().expect("Failed to load config"));
    bookify_common::logging::init();

    let state = AppState::new(config.clone()).expect("Failed to initialize application state");

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Bookify API!" }))
        .merge(bookify_booking::routes::routes(state.booking_state.clone()));

    let app = Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.unwrap();
    info!("starting server at http://{addr}");
    info!("API endpoints available at http://{addr}/api");

    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();
}
