//! Project aggregate
//!
//! A [`Project`] is the in-memory view of one project folder: its identity,
//! its title and which icons sit in which [`Stage`]. Category changes go
//! through [`Project::set_icon_category`], which moves the image on disk
//! before the membership sets change.
//!
//! Per icon the lifecycle is:
//!
//! ```text
//! unimported --import--> requested <--set_icon_category--> finished
//! unimported --import--> finished
//! ```

mod detect;
mod stage;

pub use detect::{detect_project_kind, ProjectKind};
pub use stage::Stage;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{StudioError, StudioResult};
use crate::storage::{validate_icon_id, Document, IconMover, MoveOutcome, ProjectLayout};

/// Persisted form of a project (`project.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub finished: BTreeSet<String>,
    #[serde(default)]
    pub requested: BTreeSet<String>,
}

impl ProjectManifest {
    /// A project with no icons
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            finished: BTreeSet::new(),
            requested: BTreeSet::new(),
        }
    }

    pub fn icons(&self, stage: Stage) -> &BTreeSet<String> {
        match stage {
            Stage::Requested => &self.requested,
            Stage::Finished => &self.finished,
        }
    }

    fn icons_mut(&mut self, stage: Stage) -> &mut BTreeSet<String> {
        match stage {
            Stage::Requested => &mut self.requested,
            Stage::Finished => &mut self.finished,
        }
    }

    pub fn stage_of(&self, id: &str) -> Option<Stage> {
        Stage::ALL
            .into_iter()
            .find(|stage| self.icons(*stage).contains(id))
    }

    /// Fail when an icon is listed in both stages
    pub fn check_disjoint(&self) -> StudioResult<()> {
        match self.requested.intersection(&self.finished).next() {
            Some(id) => Err(StudioError::serialization(format!(
                "project {} lists icon {} as both requested and finished",
                self.id, id
            ))),
            None => Ok(()),
        }
    }
}

/// Identity of a project as shown to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: String,
    pub title: String,
}

/// An open project
#[derive(Debug)]
pub struct Project {
    manifest: ProjectManifest,
    layout: ProjectLayout,
    mover: IconMover,
}

impl Project {
    /// Load an existing project folder
    pub async fn open(layout: ProjectLayout) -> StudioResult<Self> {
        let manifest = layout.read_manifest().await.map_err(|e| match e {
            StudioError::NotFound(_) => {
                StudioError::not_found(format!("project at {}", layout.root().display()))
            }
            other => other,
        })?;
        manifest.check_disjoint()?;
        debug!(
            "Opened project {} with {} requested and {} finished icons",
            manifest.id,
            manifest.requested.len(),
            manifest.finished.len()
        );
        Ok(Self::from_parts(manifest, layout))
    }

    /// Write a fresh project folder and return it open
    pub async fn create(layout: ProjectLayout, manifest: ProjectManifest) -> StudioResult<Self> {
        manifest.check_disjoint()?;
        layout.write_manifest(&manifest).await?;
        layout.init_placeholders().await?;
        Ok(Self::from_parts(manifest, layout))
    }

    fn from_parts(manifest: ProjectManifest, layout: ProjectLayout) -> Self {
        let mover = IconMover::new(layout.clone());
        Self {
            manifest,
            layout,
            mover,
        }
    }

    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    pub fn title(&self) -> &str {
        &self.manifest.title
    }

    pub fn info(&self) -> ProjectInfo {
        ProjectInfo {
            id: self.manifest.id.clone(),
            title: self.manifest.title.clone(),
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn manifest(&self) -> &ProjectManifest {
        &self.manifest
    }

    /// Icons currently in `stage`
    pub fn icons_in(&self, stage: Stage) -> &BTreeSet<String> {
        self.manifest.icons(stage)
    }

    pub fn stage_of(&self, id: &str) -> Option<Stage> {
        self.manifest.stage_of(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.stage_of(id).is_some()
    }

    pub async fn set_title(&mut self, title: impl Into<String>) -> StudioResult<()> {
        self.manifest.title = title.into();
        self.persist().await
    }

    /// Write the current membership sets to `project.json`
    pub async fn persist(&self) -> StudioResult<()> {
        self.layout.write_manifest(&self.manifest).await
    }

    /// Move an imported icon into `target`
    ///
    /// Returns whether the category changed. The sets only change after the
    /// image is in place; if the manifest then fails to write, the error is
    /// [`StudioError::Persist`] and the in-memory state already reflects the
    /// move, so [`Project::persist`] can be retried.
    pub async fn set_icon_category(&mut self, id: &str, target: Stage) -> StudioResult<bool> {
        let current = self
            .stage_of(id)
            .ok_or_else(|| StudioError::UnknownIcon(id.to_string()))?;
        if current == target {
            return Ok(false);
        }

        let outcome = self.mover.move_image(id, current, target).await?;
        if outcome == MoveOutcome::AlreadyPresent {
            debug!("Image of {} was already in {}", id, target);
        }

        self.manifest.icons_mut(current).remove(id);
        self.manifest.icons_mut(target).insert(id.to_string());

        self.persist()
            .await
            .map_err(|e| StudioError::persist(id, e))?;
        info!("Icon {} is now {}", id, target);
        Ok(true)
    }

    /// Add an icon that has never been part of the project
    ///
    /// Only the import pipelines create icons. An untracked image already on
    /// disk for `id` is kept and moved into `stage`; otherwise the given image
    /// is copied in. Either way the image is in place before the icon becomes
    /// visible in the sets.
    pub(crate) async fn admit_icon(
        &mut self,
        id: &str,
        stage: Stage,
        metadata: &Document,
        image: Option<&Path>,
    ) -> StudioResult<()> {
        validate_icon_id(id)?;
        if self.contains(id) {
            return Err(StudioError::AlreadyImported(id.to_string()));
        }

        if self.layout.image_exists(stage.other(), id).await? {
            debug!("Adopting untracked image of {} from {}", id, stage.other());
            self.mover.move_image(id, stage.other(), stage).await?;
        }
        if let Some(image) = image {
            if !self.layout.image_exists(stage, id).await? {
                self.copy_image_into(id, stage, image).await?;
            }
        }
        self.layout.write_icon_metadata(id, metadata).await?;
        self.manifest.icons_mut(stage).insert(id.to_string());
        if let Err(e) = self.persist().await {
            self.manifest.icons_mut(stage).remove(id);
            return Err(e);
        }
        debug!("Admitted icon {} as {}", id, stage);
        Ok(())
    }

    /// Replace an imported icon's image in its current stage folder
    pub async fn replace_image(&mut self, id: &str, image: &Path) -> StudioResult<()> {
        let stage = self
            .stage_of(id)
            .ok_or_else(|| StudioError::UnknownIcon(id.to_string()))?;
        self.copy_image_into(id, stage, image).await?;
        info!("Replaced image of {}", id);
        Ok(())
    }

    /// Save an edited icon: optional new image, target stage, then metadata
    pub async fn update_icon(
        &mut self,
        id: &str,
        metadata: &Document,
        image: Option<&Path>,
        target: Stage,
    ) -> StudioResult<()> {
        if !self.contains(id) {
            return Err(StudioError::UnknownIcon(id.to_string()));
        }
        if let Some(image) = image {
            self.replace_image(id, image).await?;
        }
        self.set_icon_category(id, target).await?;
        self.save_icon_metadata(id, metadata).await
    }

    pub async fn save_icon_metadata(&self, id: &str, metadata: &Document) -> StudioResult<()> {
        self.layout.write_icon_metadata(id, metadata).await
    }

    pub async fn load_icon_metadata(&self, id: &str) -> StudioResult<Document> {
        self.layout.read_icon_metadata(id).await
    }

    pub async fn load_config(&self) -> StudioResult<Document> {
        self.layout.read_config().await
    }

    pub async fn save_config(&self, config: &Document) -> StudioResult<()> {
        self.layout.write_config(config).await
    }

    pub async fn load_changelog(&self) -> StudioResult<Document> {
        self.layout.read_changelog().await
    }

    pub async fn save_changelog(&self, changelog: &Document) -> StudioResult<()> {
        self.layout.write_changelog(changelog).await
    }

    async fn copy_image_into(&self, id: &str, stage: Stage, image: &Path) -> StudioResult<()> {
        let destination = self.layout.stage_image_path(stage, id)?;
        self.layout.ensure_stage_directory(stage).await?;
        let partial = destination.with_extension("png.part");
        if let Err(e) = fs::copy(image, &partial).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StudioError::Io(e));
        }
        fs::rename(&partial, &destination).await?;
        Ok(())
    }
}
