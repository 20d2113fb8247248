//! HTTP REST API routes

mod auth_routes;
mod bag_routes;
mod campaign_routes;
mod catalog_routes;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Auth routes
        .route("/api/auth/signup", post(auth_routes::signup))
        .route("/api/auth/login", post(auth_routes::login))
        .route("/api/auth/logout", post(auth_routes::logout))
        .route("/api/auth/me", get(auth_routes::me))
        // Catalog routes
        .route("/api/catalog/tokens", get(catalog_routes::list_tokens))
        .route(
            "/api/catalog/difficulties",
            get(catalog_routes::list_difficulties),
        )
        .route(
            "/api/catalog/campaign-types",
            get(catalog_routes::list_campaign_types),
        )
        // Bag routes
        .route("/api/bag", get(bag_routes::get_bag))
        .route("/api/bag/draw", post(bag_routes::draw))
        .route("/api/bag/return", post(bag_routes::return_all))
        .route("/api/bag/clear", post(bag_routes::clear))
        .route("/api/bag/difficulty", put(bag_routes::load_difficulty))
        .route("/api/bag/tokens/{token}/add", post(bag_routes::add_token))
        .route(
            "/api/bag/tokens/{token}/remove",
            post(bag_routes::remove_token),
        )
        // Campaign list routes
        .route("/api/campaigns", get(campaign_routes::list_campaigns))
        .route("/api/campaigns", post(campaign_routes::create_campaign))
        .route("/api/campaigns/close", post(campaign_routes::close_campaign))
        .route("/api/campaigns/{id}", get(campaign_routes::get_campaign))
        .route("/api/campaigns/{id}", delete(campaign_routes::delete_campaign))
        .route(
            "/api/campaigns/{id}/select",
            post(campaign_routes::select_campaign),
        )
        // Active campaign routes
        .route("/api/campaign", get(campaign_routes::get_active))
        .route(
            "/api/campaign/statistics",
            get(campaign_routes::get_statistics),
        )
        .route(
            "/api/campaign/statistics/reset",
            post(campaign_routes::reset_statistics),
        )
        .route("/api/campaign/notes", put(campaign_routes::set_notes))
        .route(
            "/api/campaign/modifications",
            post(campaign_routes::add_modification),
        )
        .route(
            "/api/campaign/modifications/{index}",
            delete(campaign_routes::remove_modification),
        )
        .route(
            "/api/campaign/scenarios/{index}/toggle",
            post(campaign_routes::toggle_scenario),
        )
        .route(
            "/api/campaign/scenarios/{index}/xp",
            put(campaign_routes::set_scenario_xp),
        )
        .route(
            "/api/campaign/scenarios/{index}/resolution",
            put(campaign_routes::set_scenario_resolution),
        )
        .route(
            "/api/campaign/investigators",
            post(campaign_routes::add_investigator),
        )
        .route(
            "/api/campaign/investigators/{index}",
            patch(campaign_routes::edit_investigator),
        )
        .route(
            "/api/campaign/investigators/{index}",
            delete(campaign_routes::remove_investigator),
        )
}
