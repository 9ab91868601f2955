//! Relocation of icon images between stage folders
//!
//! A move copies first and deletes last, so an interrupted move leaves the image
//! in both folders rather than in neither. Re-running the same move finishes the
//! cleanup.

use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

use super::layout::ProjectLayout;
use crate::error::{StudioError, StudioResult};
use crate::project::Stage;

/// What a move actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The image was copied to the destination and the source removed
    Moved,
    /// The destination already held the image
    AlreadyPresent,
}

/// Moves icon images inside one project
#[derive(Debug, Clone)]
pub struct IconMover {
    layout: ProjectLayout,
}

impl IconMover {
    pub fn new(layout: ProjectLayout) -> Self {
        Self { layout }
    }

    /// Move the image of `id` from the `from` stage folder to the `to` stage folder
    ///
    /// Fails with [`StudioError::Io`] when the copy itself fails, including when
    /// neither folder holds the image. Failing to delete the source after a
    /// successful copy is only logged.
    pub async fn move_image(&self, id: &str, from: Stage, to: Stage) -> StudioResult<MoveOutcome> {
        let source = self.layout.stage_image_path(from, id)?;
        let destination = self.layout.stage_image_path(to, id)?;

        if from == to {
            return Ok(MoveOutcome::AlreadyPresent);
        }

        if fs::try_exists(&destination).await? {
            if fs::try_exists(&source).await? {
                debug!("Finishing interrupted move of {} to {}", id, to);
                remove_source(id, &source).await;
            }
            return Ok(MoveOutcome::AlreadyPresent);
        }

        self.layout.ensure_stage_directory(to).await?;

        let partial = destination.with_extension("png.part");
        if let Err(e) = fs::copy(&source, &partial).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StudioError::Io(e));
        }
        if let Err(e) = fs::rename(&partial, &destination).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StudioError::Io(e));
        }
        if !fs::try_exists(&destination).await? {
            return Err(StudioError::Io(std::io::Error::other(format!(
                "copy of {} did not land at {}",
                id,
                destination.display()
            ))));
        }

        remove_source(id, &source).await;
        info!("Moved icon {} from {} to {}", id, from, to);
        Ok(MoveOutcome::Moved)
    }
}

async fn remove_source(id: &str, source: &Path) {
    if let Err(e) = fs::remove_file(source).await {
        warn!(
            "Icon {} was copied but its old image {} could not be removed: {}",
            id,
            source.display(),
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup_with_image(stage: Stage, id: &str) -> (TempDir, ProjectLayout) {
        let temp_dir = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp_dir.path());
        layout.ensure_stage_directory(stage).await.unwrap();
        fs::write(layout.stage_image_path(stage, id).unwrap(), b"png-bytes")
            .await
            .unwrap();
        (temp_dir, layout)
    }

    #[tokio::test]
    async fn test_move_creates_destination_and_removes_source() {
        let (_temp_dir, layout) = setup_with_image(Stage::Requested, "camera").await;
        let mover = IconMover::new(layout.clone());

        let outcome = mover
            .move_image("camera", Stage::Requested, Stage::Finished)
            .await
            .unwrap();

        assert_eq!(outcome, MoveOutcome::Moved);
        assert!(!layout.image_exists(Stage::Requested, "camera").await.unwrap());
        let moved = fs::read(layout.stage_image_path(Stage::Finished, "camera").unwrap())
            .await
            .unwrap();
        assert_eq!(moved, b"png-bytes");
        assert!(!layout.stage_dir(Stage::Finished).join("camera.png.part").exists());
    }

    #[tokio::test]
    async fn test_move_twice_is_idempotent() {
        let (_temp_dir, layout) = setup_with_image(Stage::Requested, "camera").await;
        let mover = IconMover::new(layout.clone());

        mover
            .move_image("camera", Stage::Requested, Stage::Finished)
            .await
            .unwrap();
        let second = mover
            .move_image("camera", Stage::Requested, Stage::Finished)
            .await
            .unwrap();

        assert_eq!(second, MoveOutcome::AlreadyPresent);
        assert!(layout.image_exists(Stage::Finished, "camera").await.unwrap());
        assert!(!layout.image_exists(Stage::Requested, "camera").await.unwrap());
    }

    #[tokio::test]
    async fn test_rerun_after_interrupted_move_cleans_source() {
        let (_temp_dir, layout) = setup_with_image(Stage::Requested, "camera").await;
        // Simulate a crash between copy and delete
        layout.ensure_stage_directory(Stage::Finished).await.unwrap();
        fs::copy(
            layout.stage_image_path(Stage::Requested, "camera").unwrap(),
            layout.stage_image_path(Stage::Finished, "camera").unwrap(),
        )
        .await
        .unwrap();

        let outcome = IconMover::new(layout.clone())
            .move_image("camera", Stage::Requested, Stage::Finished)
            .await
            .unwrap();

        assert_eq!(outcome, MoveOutcome::AlreadyPresent);
        assert!(layout.image_exists(Stage::Finished, "camera").await.unwrap());
        assert!(!layout.image_exists(Stage::Requested, "camera").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_source_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp_dir.path());

        let err = IconMover::new(layout.clone())
            .move_image("ghost", Stage::Requested, Stage::Finished)
            .await
            .unwrap_err();

        assert!(matches!(err, StudioError::Io(_)));
        assert!(!layout.image_exists(Stage::Finished, "ghost").await.unwrap());
    }

    #[tokio::test]
    async fn test_same_stage_is_noop() {
        let (_temp_dir, layout) = setup_with_image(Stage::Finished, "camera").await;
        let outcome = IconMover::new(layout.clone())
            .move_image("camera", Stage::Finished, Stage::Finished)
            .await
            .unwrap();
        assert_eq!(outcome, MoveOutcome::AlreadyPresent);
        assert!(layout.image_exists(Stage::Finished, "camera").await.unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_undeletable_source_still_counts_as_moved() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp_dir, layout) = setup_with_image(Stage::Requested, "camera").await;
        layout.ensure_stage_directory(Stage::Finished).await.unwrap();
        let source_dir = layout.stage_dir(Stage::Requested);
        std::fs::set_permissions(&source_dir, std::fs::Permissions::from_mode(0o555)).unwrap();

        let result = IconMover::new(layout.clone())
            .move_image("camera", Stage::Requested, Stage::Finished)
            .await;
        std::fs::set_permissions(&source_dir, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(result.unwrap(), MoveOutcome::Moved);
        let moved = fs::read(layout.stage_image_path(Stage::Finished, "camera").unwrap())
            .await
            .unwrap();
        assert_eq!(moved, b"png-bytes");
    }
}
