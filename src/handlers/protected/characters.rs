use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::Caller;
use crate::database::models::{Character, CharacterChanges, NewCharacter};
use crate::handlers::extract::{JsonBody, ListQuery, PathParam, QueryParams};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Paged;

pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Paged<Character>> {
    let page = state
        .characters()
        .list(caller.user_id, query.world_view_id, query.page())
        .await?;
    Ok(ApiResponse::success(page))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Character> {
    let character = state.characters().get(caller.user_id, id).await?;
    Ok(ApiResponse::success(character))
}

/// POST /characters - the world view must belong to the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    JsonBody(body): JsonBody<NewCharacter>,
) -> ApiResult<Character> {
    let created = state.characters().create(caller.user_id, body).await?;
    Ok(ApiResponse::created(created))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<CharacterChanges>,
) -> ApiResult<Character> {
    let updated = state.characters().update(caller.user_id, id, body).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /characters/:id - snapshots go with it
pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<()> {
    state.characters().delete(caller.user_id, id).await?;
    Ok(ApiResponse::empty())
}
