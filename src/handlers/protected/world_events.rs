use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::Caller;
use crate::database::models::{NewWorldEvent, WorldEvent, WorldEventChanges};
use crate::handlers::extract::{JsonBody, ListQuery, PathParam, QueryParams};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Paged;

pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Paged<WorldEvent>> {
    let page = state
        .world_events()
        .list(caller.user_id, query.world_view_id, query.page())
        .await?;
    Ok(ApiResponse::success(page))
}

/// GET /world-events/list/:worldViewId - whole timeline, latest first
pub async fn timeline(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(world_view_id): PathParam<i32>,
) -> ApiResult<Vec<WorldEvent>> {
    let events = state
        .world_events()
        .timeline(caller.user_id, world_view_id)
        .await?;
    Ok(ApiResponse::success(events))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<WorldEvent> {
    let event = state.world_events().get(caller.user_id, id).await?;
    Ok(ApiResponse::success(event))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    JsonBody(body): JsonBody<NewWorldEvent>,
) -> ApiResult<WorldEvent> {
    let created = state.world_events().create(caller.user_id, body).await?;
    Ok(ApiResponse::created(created))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<WorldEventChanges>,
) -> ApiResult<WorldEvent> {
    let updated = state.world_events().update(caller.user_id, id, body).await?;
    Ok(ApiResponse::success(updated))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<()> {
    state.world_events().delete(caller.user_id, id).await?;
    Ok(ApiResponse::empty())
}
