//! Session context for one open project
//!
//! A [`Session`] holds at most one open [`Project`] and exposes every
//! operation a front end needs. It is not shared; concurrent callers talk to it
//! through a [`SessionHandle`], which forwards typed commands to a single
//! worker task so that operations on the open project never overlap.

mod worker;

pub use worker::SessionHandle;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::archive::{ArchiveExtractor, ZipExtractor};
use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use crate::import::{import_pack, import_request, RequestImport};
use crate::project::{detect_project_kind, Project, ProjectInfo, ProjectKind, Stage};
use crate::storage::{project_id_from_path, Document, ProjectLayout};

/// One icon as shown to users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconDetails {
    pub id: String,
    pub stage: Stage,
    pub metadata: Document,
}

/// Explicit context holding the open project
pub struct Session {
    config: StudioConfig,
    extractor: Arc<dyn ArchiveExtractor>,
    project: Option<Project>,
}

impl Session {
    /// Create a session that extracts requests as zip archives
    pub fn new(config: StudioConfig) -> Self {
        Self::with_extractor(config, Arc::new(ZipExtractor))
    }

    pub fn with_extractor(config: StudioConfig, extractor: Arc<dyn ArchiveExtractor>) -> Self {
        Self {
            config,
            extractor,
            project: None,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.project.is_some()
    }

    /// The open project
    pub fn project(&self) -> StudioResult<&Project> {
        self.project.as_ref().ok_or(StudioError::NoProjectOpen)
    }

    fn project_mut(&mut self) -> StudioResult<&mut Project> {
        self.project.as_mut().ok_or(StudioError::NoProjectOpen)
    }

    /// Classify `path` without opening it
    pub async fn detect(&self, path: &Path) -> StudioResult<ProjectKind> {
        detect_project_kind(path, &self.config.pack).await
    }

    /// Open the project or pack at `path`, replacing any open project
    ///
    /// A pack is converted on first open. Later opens of the same pack reuse the
    /// project already created under the projects directory.
    pub async fn open(&mut self, path: &Path) -> StudioResult<ProjectInfo> {
        let project = match self.detect(path).await? {
            ProjectKind::Project => Project::open(ProjectLayout::new(path)).await?,
            ProjectKind::Pack => {
                let existing =
                    ProjectLayout::new(self.config.project_root(&project_id_from_path(path)?));
                if existing.exists().await? {
                    debug!(
                        "Pack {} was already converted to {}",
                        path.display(),
                        existing.root().display()
                    );
                    Project::open(existing).await?
                } else {
                    import_pack(path, &self.config).await?
                }
            }
            ProjectKind::None => {
                return Err(StudioError::not_found(format!(
                    "project or icon pack at {}",
                    path.display()
                )))
            }
        };
        Ok(self.replace_project(project))
    }

    /// Convert the pack at `path` (overwriting an earlier conversion) and open it
    pub async fn convert(&mut self, pack_root: &Path) -> StudioResult<ProjectInfo> {
        let project = import_pack(pack_root, &self.config).await?;
        Ok(self.replace_project(project))
    }

    fn replace_project(&mut self, project: Project) -> ProjectInfo {
        let info = project.info();
        if let Some(previous) = self.project.replace(project) {
            debug!("Closed project {}", previous.id());
        }
        info!("Opened project {} ({})", info.id, info.title);
        info
    }

    /// Close the open project, if any
    pub fn close(&mut self) -> Option<ProjectInfo> {
        let closed = self.project.take().map(|project| project.info());
        if let Some(info) = &closed {
            info!("Closed project {}", info.id);
        }
        closed
    }

    pub fn info(&self) -> StudioResult<ProjectInfo> {
        Ok(self.project()?.info())
    }

    pub async fn set_title(&mut self, title: String) -> StudioResult<()> {
        self.project_mut()?.set_title(title).await
    }

    /// Icon ids in `stage`, sorted
    pub fn icons(&self, stage: Stage) -> StudioResult<Vec<String>> {
        Ok(self.project()?.icons_in(stage).iter().cloned().collect())
    }

    /// Stage and metadata of one icon
    pub async fn icon(&self, id: &str) -> StudioResult<IconDetails> {
        let project = self.project()?;
        let stage = project
            .stage_of(id)
            .ok_or_else(|| StudioError::UnknownIcon(id.to_string()))?;
        let metadata = project.load_icon_metadata(id).await?;
        Ok(IconDetails {
            id: id.to_string(),
            stage,
            metadata,
        })
    }

    pub async fn set_icon_category(&mut self, id: &str, target: Stage) -> StudioResult<bool> {
        self.project_mut()?.set_icon_category(id, target).await
    }

    pub async fn update_icon(
        &mut self,
        id: &str,
        metadata: &Document,
        image: Option<&Path>,
        target: Stage,
    ) -> StudioResult<()> {
        self.project_mut()?
            .update_icon(id, metadata, image, target)
            .await
    }

    /// Merge a request archive into the open project
    pub async fn import_request(&mut self, archive: &Path) -> StudioResult<RequestImport> {
        let extractor = Arc::clone(&self.extractor);
        let project = self.project.as_mut().ok_or(StudioError::NoProjectOpen)?;
        import_request(project, archive, extractor.as_ref(), &self.config).await
    }

    pub async fn config_document(&self) -> StudioResult<Document> {
        self.project()?.load_config().await
    }

    pub async fn set_config_document(&self, document: &Document) -> StudioResult<()> {
        self.project()?.save_config(document).await
    }

    pub async fn changelog(&self) -> StudioResult<Document> {
        self.project()?.load_changelog().await
    }

    pub async fn set_changelog(&self, document: &Document) -> StudioResult<()> {
        self.project()?.save_changelog(document).await
    }
}

/// Where a project argument points: an existing folder, else a project id
pub fn resolve_project_path(config: &StudioConfig, arg: &str) -> PathBuf {
    let path = PathBuf::from(arg);
    if path.exists() {
        path
    } else {
        config.project_root(arg)
    }
}
