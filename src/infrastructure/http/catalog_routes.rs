//! Catalog API routes - Static token, difficulty, and campaign-type tables

use axum::Json;
use serde::Serialize;

use crate::domain::value_objects::{
    CampaignTemplate, DifficultyPreset, DrawCue, Token, CAMPAIGN_TEMPLATES, CATALOG,
    DIFFICULTY_PRESETS,
};

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    #[serde(flatten)]
    pub token: Token,
    pub cue: DrawCue,
}

/// List every token in catalog order
pub async fn list_tokens() -> Json<Vec<TokenResponse>> {
    Json(
        CATALOG
            .iter()
            .map(|token| TokenResponse {
                token: *token,
                cue: token.id.cue(),
            })
            .collect(),
    )
}

/// List the difficulty presets
pub async fn list_difficulties() -> Json<&'static [DifficultyPreset]> {
    Json(&DIFFICULTY_PRESETS)
}

/// List the campaign-type templates
pub async fn list_campaign_types() -> Json<&'static [CampaignTemplate]> {
    Json(&CAMPAIGN_TEMPLATES)
}
