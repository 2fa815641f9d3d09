//! Flat-file storage for chapter prose.
//!
//! Layout: `{base}/{owner_id}/{world_view_id}/{novel_id}/{chapter_uuid}.txt`.
//! Nothing else in the crate builds these paths.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::database::models::ChapterFile;

const CONTENT_EXT: &str = "txt";
const STAGED_SUFFIX: &str = "removing";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("chapter content I/O failed at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ContentError {
    fn io(path: &Path, source: io::Error) -> Self {
        ContentError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type ContentResult<T> = Result<T, ContentError>;

/// Address of one chapter body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChapterLocation {
    pub owner_id: i32,
    pub world_view_id: i32,
    pub novel_id: i32,
    pub uuid: Uuid,
}

impl ChapterLocation {
    pub fn new(owner_id: i32, world_view_id: i32, novel_id: i32, uuid: Uuid) -> Self {
        Self {
            owner_id,
            world_view_id,
            novel_id,
            uuid,
        }
    }

    pub fn of_file(owner_id: i32, file: ChapterFile) -> Self {
        Self::new(owner_id, file.world_view_id, file.novel_id, file.uuid)
    }
}

pub struct ChapterContentStore {
    base: PathBuf,
}

impl ChapterContentStore {
    /// Creates the base directory if it doesn't exist
    pub async fn open(base: impl AsRef<Path>) -> ContentResult<Self> {
        let base = base.as_ref().to_path_buf();
        fs::create_dir_all(&base)
            .await
            .map_err(|e| ContentError::io(&base, e))?;
        Ok(Self { base })
    }

    pub fn path_for(&self, location: &ChapterLocation) -> PathBuf {
        self.base
            .join(location.owner_id.to_string())
            .join(location.world_view_id.to_string())
            .join(location.novel_id.to_string())
            .join(format!("{}.{}", location.uuid, CONTENT_EXT))
    }

    /// A body that was never written reads as empty text
    pub async fn read(&self, location: &ChapterLocation) -> ContentResult<String> {
        let path = self.path_for(location);
        match fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(ContentError::io(&path, e)),
        }
    }

    /// Replaces the whole body. Concurrent writers race; the last rename wins.
    pub async fn write(&self, location: &ChapterLocation, text: &str) -> ContentResult<()> {
        self.stage_write(location, text).await?.commit().await
    }

    /// Writes the new body beside the live file without touching it.
    /// Finish with [`StagedWrite::commit`] or [`StagedWrite::discard`].
    pub async fn stage_write(&self, location: &ChapterLocation, text: &str) -> ContentResult<StagedWrite> {
        let path = self.path_for(location);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| ContentError::io(dir, e))?;
        }

        let tmp = path.with_extension(format!("{}.{}", CONTENT_EXT, Uuid::new_v4().simple()));
        if let Err(e) = fs::write(&tmp, text.as_bytes()).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ContentError::io(&tmp, e));
        }

        debug!(chapter = %location.uuid, bytes = text.len(), "chapter content staged");
        Ok(StagedWrite { tmp, path })
    }

    /// Missing files are not an error
    pub async fn delete(&self, location: &ChapterLocation) -> ContentResult<()> {
        let path = self.path_for(location);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ContentError::io(&path, e)),
        }
    }

    /// Moves the bodies aside so a row deletion can still be undone.
    /// Finish with [`StagedRemoval::commit`] or [`StagedRemoval::rollback`].
    pub async fn stage_removal(&self, locations: &[ChapterLocation]) -> ContentResult<StagedRemoval> {
        let mut staged = StagedRemoval { moves: Vec::new() };

        for location in locations {
            let path = self.path_for(location);
            let aside = staged_path(&path);
            match fs::rename(&path, &aside).await {
                Ok(()) => staged.moves.push((path, aside)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    staged.rollback().await;
                    return Err(ContentError::io(&path, e));
                }
            }
        }

        Ok(staged)
    }
}

fn staged_path(path: &Path) -> PathBuf {
    path.with_extension(format!("{}.{}", CONTENT_EXT, STAGED_SUFFIX))
}

/// A new chapter body waiting to replace the live one
#[derive(Debug)]
#[must_use = "a staged body is invisible until committed"]
pub struct StagedWrite {
    tmp: PathBuf,
    path: PathBuf,
}

impl StagedWrite {
    /// Moves the staged body into place
    pub async fn commit(self) -> ContentResult<()> {
        if let Err(e) = fs::rename(&self.tmp, &self.path).await {
            let _ = fs::remove_file(&self.tmp).await;
            return Err(ContentError::io(&self.path, e));
        }
        Ok(())
    }

    /// Drops the staged body; the live file is untouched
    pub async fn discard(self) {
        if let Err(e) = fs::remove_file(&self.tmp).await {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.tmp.display(), error = %e, "failed to remove staged chapter content");
            }
        }
    }
}

/// Chapter bodies moved aside pending a database commit
#[derive(Debug)]
#[must_use = "staged files stay aside until committed or rolled back"]
pub struct StagedRemoval {
    moves: Vec<(PathBuf, PathBuf)>,
}

impl StagedRemoval {
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// The rows are gone: drop the staged files
    pub async fn commit(self) {
        for (_, aside) in self.moves {
            if let Err(e) = fs::remove_file(&aside).await {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %aside.display(), error = %e, "failed to remove staged chapter content");
                }
            }
        }
    }

    /// The rows survived: put the files back
    pub async fn rollback(self) {
        for (original, aside) in self.moves {
            if let Err(e) = fs::rename(&aside, &original).await {
                error!(
                    path = %original.display(),
                    error = %e,
                    "failed to restore staged chapter content"
                );
            }
        }
    }
}
