use axum::extract::State;

use crate::app::AppState;
use crate::database::models::UserSummary;
use crate::handlers::extract::JsonBody;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::auth::{LoginRequest, LoginResponse, RegisterRequest};

/// POST /auth/register - redeem a registration key and create an account
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> ApiResult<UserSummary> {
    let user = state.auth().register(request).await?;
    Ok(ApiResponse::success(user))
}

/// POST /auth/login - exchange name and password for a bearer token
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let response = state.auth().login(request).await?;
    Ok(ApiResponse::success(response))
}
