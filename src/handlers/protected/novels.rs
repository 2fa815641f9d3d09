use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::Caller;
use crate::database::models::{NewNovel, Novel, NovelChanges};
use crate::handlers::extract::{JsonBody, ListQuery, PathParam, QueryParams};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Paged;

pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Paged<Novel>> {
    let page = state
        .novels()
        .list(caller.user_id, query.world_view_id, query.page())
        .await?;
    Ok(ApiResponse::success(page))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Novel> {
    let novel = state.novels().get(caller.user_id, id).await?;
    Ok(ApiResponse::success(novel))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    JsonBody(body): JsonBody<NewNovel>,
) -> ApiResult<Novel> {
    let created = state.novels().create(caller.user_id, body).await?;
    Ok(ApiResponse::created(created))
}

/// PUT /novels/:id - title and description only; a novel never changes world
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<NovelChanges>,
) -> ApiResult<Novel> {
    let updated = state.novels().update(caller.user_id, id, body).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /novels/:id - chapters and their bodies go with it
pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<()> {
    state.novels().delete(caller.user_id, id).await?;
    Ok(ApiResponse::empty())
}
