use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::Caller;
use crate::database::models::{CharacterSnapshot, NewSnapshot, SnapshotChanges};
use crate::handlers::extract::{JsonBody, ListQuery, PathParam, QueryParams};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Paged;

/// GET /character-snapshots - filterable by `worldViewId` and `characterId`
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Paged<CharacterSnapshot>> {
    let page = state
        .snapshots()
        .list(caller.user_id, query.snapshot_filter(), query.page())
        .await?;
    Ok(ApiResponse::success(page))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<CharacterSnapshot> {
    let snapshot = state.snapshots().get(caller.user_id, id).await?;
    Ok(ApiResponse::success(snapshot))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    JsonBody(body): JsonBody<NewSnapshot>,
) -> ApiResult<CharacterSnapshot> {
    let created = state.snapshots().create(caller.user_id, body).await?;
    Ok(ApiResponse::created(created))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<SnapshotChanges>,
) -> ApiResult<CharacterSnapshot> {
    let updated = state.snapshots().update(caller.user_id, id, body).await?;
    Ok(ApiResponse::success(updated))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<()> {
    state.snapshots().delete(caller.user_id, id).await?;
    Ok(ApiResponse::empty())
}
