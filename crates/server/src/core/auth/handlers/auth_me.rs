use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use axum::extract::State;
use axum::Json;
use events_common::UserInfo;

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, ctx: Ctx) -> Result<Json<UserInfo>> {
    // `ctx` only exists if the middleware accepted the token.
    // A valid token for a user that is gone is still unauthorized.
    let user = state.auth.get_user(ctx.user_id()).await.map_err(|e| match e {
        Error::NotFound(_) => Error::Unauthorized(format!("Unknown account {}", ctx.email())),
        other => other,
    })?;

    Ok(Json(user))
}
