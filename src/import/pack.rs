use futures::future::FutureExt;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use crate::manifest::parse_pack;
use crate::project::{Project, ProjectManifest, Stage};
use crate::storage::{copy_dir_recursive, project_id_from_path, ProjectLayout};

/// Create a project below `config.projects_dir` from the icon pack at `pack_root`
///
/// Every icon listed in the pack manifest starts out finished. A failure at
/// any step aborts the import and leaves whatever was already written; running
/// the import again overwrites it file by file.
pub async fn import_pack(pack_root: &Path, config: &StudioConfig) -> StudioResult<Project> {
    config.validate()?;
    let icons = parse_pack(pack_root, &config.pack).await?;
    let project_id = project_id_from_path(pack_root)?;
    let layout = ProjectLayout::new(config.project_root(&project_id));
    info!(
        "Importing pack {} as project {} ({} icons)",
        pack_root.display(),
        project_id,
        icons.len()
    );

    let resource_dir = pack_root.join(&config.pack.resource_dir);
    if !fs::try_exists(&resource_dir).await? {
        return Err(StudioError::not_found(format!(
            "resource folder {}",
            resource_dir.display()
        )));
    }
    let finished_dir = layout.ensure_stage_directory(Stage::Finished).await?;
    let copied = copy_dir_recursive(&resource_dir, &finished_dir).await?;
    debug!("Copied {} images into {}", copied, finished_dir.display());

    layout.ensure_properties_directory().await?;
    let writes: Vec<_> = icons
        .iter()
        .map(|(id, metadata)| layout.write_icon_metadata(id, metadata).boxed())
        .collect();
    stream::iter(writes)
        .buffer_unordered(config.import_concurrency)
        .try_collect::<Vec<()>>()
        .await?;

    let mut manifest = ProjectManifest::new(project_id, config.default_title.clone());
    manifest.finished = icons.into_keys().collect();
    let project = Project::create(layout, manifest).await?;

    info!(
        "Created project {} with {} finished icons",
        project.id(),
        project.icons_in(Stage::Finished).len()
    );
    Ok(project)
}
