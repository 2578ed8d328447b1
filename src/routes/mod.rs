use crate::app_state::AppState;
use crate::commands::{self, Command, Reply};
use crate::data_models::{Product, UserId};
use crate::errors::AppErrors;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct KeywordRequest {
    #[validate(length(min = 1, max = 100))]
    pub keyword: String,
}

pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn snapshot(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.snapshot.products())
}

pub async fn keywords(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Vec<String>> {
    Json(state.preferences.list(&UserId::new(user_id)))
}

pub async fn add_keyword(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<KeywordRequest>,
) -> Result<Json<Reply>, AppErrors> {
    request.validate()?;
    let user = UserId::new(user_id);
    let reply =
        commands::execute_blocking(state.preferences, user, Command::Add(request.keyword)).await?;
    Ok(Json(reply))
}

pub async fn remove_keyword(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<KeywordRequest>,
) -> Result<Json<Reply>, AppErrors> {
    request.validate()?;
    let user = UserId::new(user_id);
    let reply =
        commands::execute_blocking(state.preferences, user, Command::Remove(request.keyword))
            .await?;
    Ok(Json(reply))
}
