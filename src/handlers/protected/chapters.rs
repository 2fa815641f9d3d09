use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::Caller;
use crate::database::models::Chapter;
use crate::handlers::extract::{JsonBody, PathParam};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::chapters::{ChapterDetail, ChapterPatch, NewChapterRequest};

/// GET /novels/:novelId/chapters - table of contents in reading order
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(novel_id): PathParam<i32>,
) -> ApiResult<Vec<Chapter>> {
    let chapters = state.chapters().list(caller.user_id, novel_id).await?;
    Ok(ApiResponse::success(chapters))
}

/// GET /novels/:novelId/chapters/:id - row plus prose body
pub async fn show(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam((novel_id, id)): PathParam<(i32, i32)>,
) -> ApiResult<ChapterDetail> {
    let chapter = state.chapters().get(caller.user_id, novel_id, id).await?;
    Ok(ApiResponse::success(chapter))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam(novel_id): PathParam<i32>,
    JsonBody(body): JsonBody<NewChapterRequest>,
) -> ApiResult<ChapterDetail> {
    let created = state.chapters().create(caller.user_id, novel_id, body).await?;
    Ok(ApiResponse::created(created))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam((novel_id, id)): PathParam<(i32, i32)>,
    JsonBody(body): JsonBody<ChapterPatch>,
) -> ApiResult<ChapterDetail> {
    let updated = state
        .chapters()
        .update(caller.user_id, novel_id, id, body)
        .await?;
    Ok(ApiResponse::success(updated))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    PathParam((novel_id, id)): PathParam<(i32, i32)>,
) -> ApiResult<()> {
    state.chapters().delete(caller.user_id, novel_id, id).await?;
    Ok(ApiResponse::empty())
}
