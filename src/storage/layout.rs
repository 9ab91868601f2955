//! On-disk convention for a single project
//!
//! ```text
//! <project-root>/
//!   project.json
//!   config.json
//!   changelog.json
//!   properties/<icon>.json
//!   requested/<icon>.png
//!   finished/<icon>.png
//! ```

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::document::{read_document, write_document, Document};
use crate::error::{StudioError, StudioResult};
use crate::project::{ProjectManifest, Stage};

pub const PROJECT_FILE: &str = "project.json";
pub const CONFIG_FILE: &str = "config.json";
pub const CHANGELOG_FILE: &str = "changelog.json";
pub const PROPERTIES_DIR: &str = "properties";
pub const IMAGE_EXTENSION: &str = "png";

/// Check that an icon id can be used as a file stem
pub fn validate_icon_id(id: &str) -> StudioResult<()> {
    let invalid = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StudioError::InvalidIconId(id.to_string()));
    }
    Ok(())
}

/// Paths and document access for one project folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_file(&self) -> PathBuf {
        self.root.join(PROJECT_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn changelog_file(&self) -> PathBuf {
        self.root.join(CHANGELOG_FILE)
    }

    pub fn properties_dir(&self) -> PathBuf {
        self.root.join(PROPERTIES_DIR)
    }

    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.as_str())
    }

    /// Metadata document location for an icon
    pub fn metadata_path(&self, id: &str) -> StudioResult<PathBuf> {
        validate_icon_id(id)?;
        Ok(self.properties_dir().join(format!("{id}.json")))
    }

    /// Image location for an icon while it sits in `stage`
    pub fn stage_image_path(&self, stage: Stage, id: &str) -> StudioResult<PathBuf> {
        validate_icon_id(id)?;
        Ok(self.stage_dir(stage).join(format!("{id}.{IMAGE_EXTENSION}")))
    }

    /// Whether the project manifest exists
    pub async fn exists(&self) -> StudioResult<bool> {
        Ok(fs::try_exists(self.project_file()).await?)
    }

    /// Create the folder for a stage if absent
    pub async fn ensure_stage_directory(&self, stage: Stage) -> StudioResult<PathBuf> {
        let dir = self.stage_dir(stage);
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Create the project root and the metadata folder if absent
    pub async fn ensure_properties_directory(&self) -> StudioResult<PathBuf> {
        let dir = self.properties_dir();
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Whether the icon's image is present in `stage`
    pub async fn image_exists(&self, stage: Stage, id: &str) -> StudioResult<bool> {
        let path = self.stage_image_path(stage, id)?;
        Ok(fs::try_exists(&path).await?)
    }

    pub async fn read_icon_metadata(&self, id: &str) -> StudioResult<Document> {
        let path = self.metadata_path(id)?;
        read_document(&path).await.map_err(|e| match e {
            StudioError::NotFound(_) => StudioError::not_found(format!("metadata for icon {id}")),
            other => other,
        })
    }

    pub async fn write_icon_metadata(&self, id: &str, metadata: &Document) -> StudioResult<()> {
        let path = self.metadata_path(id)?;
        self.ensure_properties_directory().await?;
        write_document(&path, metadata).await
    }

    pub async fn read_manifest(&self) -> StudioResult<ProjectManifest> {
        read_document(&self.project_file()).await
    }

    pub async fn write_manifest(&self, manifest: &ProjectManifest) -> StudioResult<()> {
        fs::create_dir_all(&self.root).await?;
        write_document(&self.project_file(), manifest).await?;
        debug!(
            "Wrote project manifest for {} ({} requested, {} finished)",
            manifest.id,
            manifest.requested.len(),
            manifest.finished.len()
        );
        Ok(())
    }

    /// Create empty configuration and changelog documents when missing
    pub async fn init_placeholders(&self) -> StudioResult<()> {
        fs::create_dir_all(&self.root).await?;
        for path in [self.config_file(), self.changelog_file()] {
            if !fs::try_exists(&path).await? {
                write_document(&path, &Document::Object(Default::default())).await?;
            }
        }
        Ok(())
    }

    pub async fn read_config(&self) -> StudioResult<Document> {
        read_document(&self.config_file()).await
    }

    pub async fn write_config(&self, config: &Document) -> StudioResult<()> {
        write_document(&self.config_file(), config).await
    }

    pub async fn read_changelog(&self) -> StudioResult<Document> {
        read_document(&self.changelog_file()).await
    }

    pub async fn write_changelog(&self, changelog: &Document) -> StudioResult<()> {
        write_document(&self.changelog_file(), changelog).await
    }
}
