pub mod app_state;
pub mod commands;
pub mod configuration;
pub mod data_models;
pub mod db;
pub mod errors;
pub mod matcher;
pub mod notifier;
pub mod parser;
mod routes;
pub mod scheduler;
pub mod supervisor;
pub mod telegram;

use crate::app_state::AppState;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .route("/health_check", get(routes::health_check))
        .route("/snapshot", get(routes::snapshot))
        .route(
            "/keywords/:user_id",
            get(routes::keywords)
                .post(routes::add_keyword)
                .delete(routes::remove_keyword),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
