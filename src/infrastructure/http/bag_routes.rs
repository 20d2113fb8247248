//! Bag API routes - The working chaos bag

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::services::BagView;
use crate::domain::value_objects::{DrawCue, Token, TokenKind};
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DifficultyRequest {
    pub difficulty: String,
}

#[derive(Debug, Serialize)]
pub struct DrawnToken {
    #[serde(flatten)]
    pub token: Token,
    pub cue: DrawCue,
}

#[derive(Debug, Serialize)]
pub struct DrawResponse {
    /// Null when the bag was empty
    pub drawn: Option<DrawnToken>,
    pub bag: BagView,
}

fn parse_token(id: &str) -> Result<TokenKind, (StatusCode, String)> {
    TokenKind::from_id(id).ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown token: {}", id)))
}

/// Current bag state
pub async fn get_bag(State(state): State<Arc<AppState>>) -> Json<BagView> {
    Json(state.campaign_service.bag().await)
}

/// Draw one token
pub async fn draw(State(state): State<Arc<AppState>>) -> Json<DrawResponse> {
    let (outcome, bag) = state.campaign_service.draw().await;
    let drawn = outcome.map(|outcome| DrawnToken {
        token: *outcome.token.token(),
        cue: outcome.token.cue(),
    });

    Json(DrawResponse { drawn, bag })
}

/// Return every drawn token to the bag
pub async fn return_all(State(state): State<Arc<AppState>>) -> Json<BagView> {
    Json(state.campaign_service.return_all().await)
}

/// Empty the bag
pub async fn clear(State(state): State<Arc<AppState>>) -> Json<BagView> {
    Json(state.campaign_service.clear_bag().await)
}

/// Add one of a token
pub async fn add_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<BagView>, (StatusCode, String)> {
    let kind = parse_token(&token)?;
    Ok(Json(state.campaign_service.add_token(kind).await))
}

/// Remove one of a token
pub async fn remove_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<BagView>, (StatusCode, String)> {
    let kind = parse_token(&token)?;
    Ok(Json(state.campaign_service.remove_token(kind).await))
}

/// Replace the bag with a difficulty preset
pub async fn load_difficulty(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DifficultyRequest>,
) -> Json<BagView> {
    Json(state.campaign_service.load_difficulty(req.difficulty).await)
}
