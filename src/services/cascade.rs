use std::future::Future;

use tracing::warn;

use crate::database::models::ChapterFile;
use crate::database::DbResult;
use crate::services::chapter_content::{ChapterContentStore, ChapterLocation};
use crate::services::error::ServiceResult;

/// Runs a transactional row deletion while keeping chapter bodies in step.
///
/// The bodies known up front are moved aside first. If the transaction
/// commits they are dropped, otherwise restored. Chapters that appeared
/// between the listing and the delete are removed after the commit.
/// Returns false when the parent row was not found.
pub async fn delete_with_content<F>(
    content: &ChapterContentStore,
    owner: i32,
    planned: Vec<ChapterFile>,
    delete: F,
) -> ServiceResult<bool>
where
    F: Future<Output = DbResult<Option<Vec<ChapterFile>>>>,
{
    let planned: Vec<ChapterLocation> = planned
        .into_iter()
        .map(|file| ChapterLocation::of_file(owner, file))
        .collect();
    let staged = content.stage_removal(&planned).await?;

    match delete.await {
        Ok(Some(removed)) => {
            staged.commit().await;
            for file in removed {
                let location = ChapterLocation::of_file(owner, file);
                if planned.contains(&location) {
                    continue;
                }
                if let Err(e) = content.delete(&location).await {
                    warn!(chapter = %location.uuid, error = %e, "orphaned chapter content left behind");
                }
            }
            Ok(true)
        }
        Ok(None) => {
            staged.rollback().await;
            Ok(false)
        }
        Err(e) => {
            staged.rollback().await;
            Err(e.into())
        }
    }
}
