//! Auth API routes

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::application::ports::outbound::{Account, AuthError};
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn auth_error(state: &AppState, e: AuthError) -> (StatusCode, String) {
    let status = match e {
        AuthError::EmailInUse => StatusCode::CONFLICT,
        AuthError::InvalidEmail | AuthError::WeakPassword(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AuthError::UserNotFound | AuthError::WrongPassword => StatusCode::UNAUTHORIZED,
        AuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        AuthError::Backend(ref cause) => {
            tracing::error!("Identity backend failure: {}", cause);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.user_message(state.config.locale))
}

/// Create an account and sign in
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Account>), (StatusCode, String)> {
    let account = state
        .campaign_service
        .signup(&req.email, &req.password, req.display_name.as_deref())
        .await
        .map_err(|e| auth_error(&state, e))?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// Sign in
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Account>, (StatusCode, String)> {
    let account = state
        .campaign_service
        .login(&req.email, &req.password)
        .await
        .map_err(|e| auth_error(&state, e))?;

    Ok(Json(account))
}

/// Sign out
pub async fn logout(State(state): State<Arc<AppState>>) -> StatusCode {
    state.campaign_service.logout().await;
    StatusCode::NO_CONTENT
}

/// The signed-in account, or null
pub async fn me(State(state): State<Arc<AppState>>) -> Json<Option<Account>> {
    Json(state.campaign_service.current_account().await)
}
