use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::Caller;
use crate::database::models::{Misc, MiscChanges, NewMisc};
use crate::handlers::extract::{JsonBody, ListQuery, PathParam, QueryParams};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Paged;

pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Paged<Misc>> {
    let page = state
        .miscs()
        .list(caller.user_id, query.world_view_id, query.page())
        .await?;
    Ok(ApiResponse::success(page))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Misc> {
    let misc = state.miscs().get(caller.user_id, id).await?;
    Ok(ApiResponse::success(misc))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    JsonBody(body): JsonBody<NewMisc>,
) -> ApiResult<Misc> {
    let created = state.miscs().create(caller.user_id, body).await?;
    Ok(ApiResponse::created(created))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<MiscChanges>,
) -> ApiResult<Misc> {
    let updated = state.miscs().update(caller.user_id, id, body).await?;
    Ok(ApiResponse::success(updated))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<()> {
    state.miscs().delete(caller.user_id, id).await?;
    Ok(ApiResponse::empty())
}
