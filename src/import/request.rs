use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::archive::ArchiveExtractor;
use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use crate::manifest::parse_pack;
use crate::project::{Project, Stage};
use crate::storage::layout::IMAGE_EXTENSION;

/// What a request import changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestImport {
    /// Icons seen for the first time
    pub admitted: Vec<String>,
    /// Icons that were already part of the project and are requested again
    pub rerequested: Vec<String>,
    /// Number of icons that came with an image
    pub images: usize,
}

impl RequestImport {
    pub fn total(&self) -> usize {
        self.admitted.len() + self.rerequested.len()
    }
}

/// Merge the request archive at `archive` into `project`
///
/// Extraction and manifest failures are reported as [`StudioError::Import`].
/// Icons are merged one by one; a failure stops the loop but icons merged
/// before it stay in the project.
pub async fn import_request(
    project: &mut Project,
    archive: &Path,
    extractor: &dyn ArchiveExtractor,
    config: &StudioConfig,
) -> StudioResult<RequestImport> {
    let cache_dir = config.cache_dir();
    fs::create_dir_all(&cache_dir).await?;
    let scratch = tempfile::Builder::new()
        .prefix("request-")
        .tempdir_in(&cache_dir)?;
    info!(
        "Importing request {} into project {}",
        archive.display(),
        project.id()
    );

    extractor
        .extract(archive, scratch.path())
        .await
        .map_err(StudioError::import)?;
    let icons = parse_pack(scratch.path(), &config.pack)
        .await
        .map_err(StudioError::import)?;
    let images = index_images(scratch.path()).await?;
    debug!(
        "Request lists {} icons and ships {} images",
        icons.len(),
        images.len()
    );

    let mut report = RequestImport::default();
    for (id, metadata) in &icons {
        let image = images.get(id).map(PathBuf::as_path);
        if image.is_some() {
            report.images += 1;
        }

        if project.contains(id) {
            project.set_icon_category(id, Stage::Requested).await?;
            // Drawn artwork always wins over the image shipped with a request
            if let Some(image) = image {
                if !project.layout().image_exists(Stage::Requested, id).await? {
                    project.replace_image(id, image).await?;
                }
            }
            project.save_icon_metadata(id, metadata).await?;
            report.rerequested.push(id.clone());
        } else {
            project
                .admit_icon(id, Stage::Requested, metadata, image)
                .await?;
            report.admitted.push(id.clone());
        }
    }

    if let Err(e) = scratch.close() {
        warn!("Failed to remove request scratch directory: {}", e);
    }
    info!(
        "Merged {} requested icons into {} ({} new)",
        report.total(),
        project.id(),
        report.admitted.len()
    );
    Ok(report)
}

/// Map icon id to the first `<id>.png` found in the extracted tree
async fn index_images(root: &Path) -> StudioResult<HashMap<String, PathBuf>> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut images = HashMap::new();
        for entry in WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(IMAGE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                images
                    .entry(stem.to_string())
                    .or_insert_with(|| path.to_path_buf());
            }
        }
        images
    })
    .await
    .map_err(|e| StudioError::Io(std::io::Error::other(e)))
}
