//! Auth handlers

use crate::core::config::AppState;
use crate::core::error::Result;
use crate::core::extract::JsonBody;
use axum::{extract::State, http::StatusCode, Json};
use events_common::{AuthResponse, LoginRequest, SignupRequest};
use tracing::{info, warn};

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    info!("POST /api/auth/signup - {:?}", req.email);

    match state.auth.signup(req).await {
        Ok(session) => {
            info!("User {} registered successfully", session.user.email);
            Ok((StatusCode::CREATED, Json(session)))
        }
        Err(e) => {
            warn!("Signup failed: {}", e);
            Err(e)
        }
    }
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    info!("POST /api/auth/login - {:?}", req.email);

    let session = state.auth.login(req).await?;
    info!("User {} logged in successfully", session.user.email);
    Ok(Json(session))
}
