//! Icon manifest parsing
//!
//! Packs and request archives describe their icons in an Android
//! `appfilter.xml`. [`parse_pack`] turns that file (plus an optional
//! `drawable.xml` with categories) into one metadata document per icon id.

pub mod appfilter;
pub mod xml;

pub use appfilter::{ComponentRef, IconEntry};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::PackLayoutConfig;
use crate::error::{StudioError, StudioResult};
use crate::storage::Document;

/// File name searched for when no configured manifest location exists
pub const MANIFEST_FILE_NAME: &str = "appfilter.xml";

/// Icon id to metadata document
pub type IconManifest = BTreeMap<String, Document>;

/// Parse the icon manifest found under `root`
pub async fn parse_pack(root: &Path, pack: &PackLayoutConfig) -> StudioResult<IconManifest> {
    let manifest_path = locate_manifest(root, pack).await?.ok_or_else(|| {
        StudioError::not_found(format!("{} under {}", MANIFEST_FILE_NAME, root.display()))
    })?;
    debug!("Parsing icon manifest {}", manifest_path.display());

    let content = fs::read_to_string(&manifest_path).await?;
    let document =
        xml::parse_document(&content).map_err(|e| StudioError::parse(&manifest_path, e))?;
    let mut icons =
        appfilter::extract_icons(&document).map_err(|e| StudioError::parse(&manifest_path, e))?;

    let drawable_path = root.join(&pack.drawable_manifest);
    if fs::try_exists(&drawable_path).await? {
        let content = fs::read_to_string(&drawable_path).await?;
        let document =
            xml::parse_document(&content).map_err(|e| StudioError::parse(&drawable_path, e))?;
        appfilter::apply_categories(&document, &mut icons);
    }

    icons
        .into_iter()
        .map(|(id, entry)| -> StudioResult<(String, Document)> {
            Ok((id, serde_json::to_value(entry)?))
        })
        .collect()
}

/// Find the manifest: configured candidates first, then any `appfilter.xml` in the tree
pub async fn locate_manifest(root: &Path, pack: &PackLayoutConfig) -> StudioResult<Option<PathBuf>> {
    for candidate in &pack.manifest_candidates {
        let path = root.join(candidate);
        if fs::try_exists(&path).await? {
            return Ok(Some(path));
        }
    }

    let root = root.to_path_buf();
    let found = tokio::task::spawn_blocking(move || {
        WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .find(|entry| entry.file_type().is_file() && entry.file_name() == MANIFEST_FILE_NAME)
            .map(|entry| entry.into_path())
    })
    .await
    .map_err(|e| StudioError::Io(std::io::Error::other(e)))?;

    Ok(found)
}
