use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::Caller;
use crate::database::models::UserSummary;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /auth/userinfo - the caller's account, re-read from the store
pub async fn userinfo(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<UserSummary> {
    let user = state.auth().user_info(&caller).await?;
    Ok(ApiResponse::success(user))
}

/// POST /auth/logout - revoke the presented token
pub async fn logout(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<()> {
    state.auth().logout(&caller).await?;
    Ok(ApiResponse::empty())
}
