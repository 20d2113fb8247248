//! Campaign API routes
//!
//! `/api/campaigns` manages the list; `/api/campaign` edits whichever
//! campaign is active.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::application::services::SessionError;
use crate::domain::aggregates::{Campaign, CampaignSummary};
use crate::domain::entities::InvestigatorEdit;
use crate::domain::services::StatisticsReport;
use crate::domain::value_objects::CampaignId;
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    #[serde(default)]
    pub name: String,
    pub campaign_type: String,
    pub difficulty: String,
}

#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct ModificationRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct XpRequest {
    pub xp: u32,
}

#[derive(Debug, Deserialize)]
pub struct ResolutionRequest {
    #[serde(default)]
    pub resolution: String,
}

fn session_error(e: SessionError) -> (StatusCode, String) {
    let status = match e {
        SessionError::NoActiveCampaign => StatusCode::CONFLICT,
        SessionError::CampaignNotFound(_) => StatusCode::NOT_FOUND,
        SessionError::Aggregate(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, e.to_string())
}

type CampaignResult = Result<Json<Campaign>, (StatusCode, String)>;

fn respond(result: Result<Campaign, SessionError>) -> CampaignResult {
    result.map(Json).map_err(session_error)
}

// ============================================================================
// Campaign list
// ============================================================================

/// List campaign summaries
pub async fn list_campaigns(State(state): State<Arc<AppState>>) -> Json<Vec<CampaignSummary>> {
    Json(state.campaign_service.list_campaigns().await)
}

/// Create a campaign and make it active
pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCampaignRequest>,
) -> (StatusCode, Json<Campaign>) {
    let campaign = state
        .campaign_service
        .create_campaign(&req.name, &req.campaign_type, &req.difficulty)
        .await;
    (StatusCode::CREATED, Json(campaign))
}

/// Get a campaign by ID
pub async fn get_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> CampaignResult {
    let id = CampaignId::from(id);
    state
        .campaign_service
        .get_campaign(&id)
        .await
        .map(Json)
        .ok_or_else(|| session_error(SessionError::CampaignNotFound(id)))
}

/// Delete a campaign
pub async fn delete_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .campaign_service
        .delete_campaign(&CampaignId::from(id))
        .await
        .map_err(session_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Make a campaign active
pub async fn select_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> CampaignResult {
    respond(state.campaign_service.select_campaign(&CampaignId::from(id)).await)
}

/// Deactivate the active campaign
pub async fn close_campaign(State(state): State<Arc<AppState>>) -> StatusCode {
    state.campaign_service.close_campaign().await;
    StatusCode::NO_CONTENT
}

// ============================================================================
// Active campaign
// ============================================================================

/// Get the active campaign
pub async fn get_active(State(state): State<Arc<AppState>>) -> CampaignResult {
    state
        .campaign_service
        .active_campaign()
        .await
        .map(Json)
        .ok_or_else(|| session_error(SessionError::NoActiveCampaign))
}

/// Draw statistics for the active campaign
pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatisticsReport>, (StatusCode, String)> {
    state
        .campaign_service
        .statistics()
        .await
        .map(Json)
        .map_err(session_error)
}

pub async fn reset_statistics(State(state): State<Arc<AppState>>) -> CampaignResult {
    respond(state.campaign_service.reset_statistics().await)
}

pub async fn set_notes(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NotesRequest>,
) -> CampaignResult {
    respond(state.campaign_service.set_notes(req.notes).await)
}

/// Add a bag-modification note
pub async fn add_modification(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ModificationRequest>,
) -> CampaignResult {
    respond(state.campaign_service.add_modification(req.text).await)
}

pub async fn remove_modification(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> CampaignResult {
    respond(state.campaign_service.remove_modification(index).await)
}

/// Flip a scenario's completion
pub async fn toggle_scenario(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> CampaignResult {
    respond(state.campaign_service.toggle_scenario(index).await)
}

pub async fn set_scenario_xp(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(req): Json<XpRequest>,
) -> CampaignResult {
    respond(state.campaign_service.set_scenario_xp(index, req.xp).await)
}

pub async fn set_scenario_resolution(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(req): Json<ResolutionRequest>,
) -> CampaignResult {
    respond(
        state
            .campaign_service
            .set_scenario_resolution(index, req.resolution)
            .await,
    )
}

pub async fn add_investigator(State(state): State<Arc<AppState>>) -> CampaignResult {
    respond(state.campaign_service.add_investigator().await)
}

/// Apply one field edit to an investigator
pub async fn edit_investigator(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(edit): Json<InvestigatorEdit>,
) -> CampaignResult {
    respond(state.campaign_service.edit_investigator(index, edit).await)
}

pub async fn remove_investigator(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> CampaignResult {
    respond(state.campaign_service.remove_investigator(index).await)
}
