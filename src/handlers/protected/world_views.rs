use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::Caller;
use crate::database::models::{NewWorldView, WorldView, WorldViewChanges};
use crate::handlers::extract::{JsonBody, ListQuery, PathParam, QueryParams};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Paged;

/// GET /worldviews - the caller's world views, most recently touched first
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Paged<WorldView>> {
    let page = state.world_views().list(caller.user_id, query.page()).await?;
    Ok(ApiResponse::success(page))
}

/// GET /worldviews/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<WorldView> {
    let world_view = state.world_views().get(caller.user_id, id).await?;
    Ok(ApiResponse::success(world_view))
}

/// POST /worldviews
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    JsonBody(body): JsonBody<NewWorldView>,
) -> ApiResult<WorldView> {
    let created = state.world_views().create(caller.user_id, body).await?;
    Ok(ApiResponse::created(created))
}

/// PUT /worldviews/:id - absent fields are left unchanged
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<WorldViewChanges>,
) -> ApiResult<WorldView> {
    let updated = state.world_views().update(caller.user_id, id, body).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /worldviews/:id - also removes every character, snapshot, event,
/// misc, novel and chapter under it
pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<()> {
    state.world_views().delete(caller.user_id, id).await?;
    Ok(ApiResponse::empty())
}
