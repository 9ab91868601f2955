//! Archive extraction for incoming request bundles

use async_trait::async_trait;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

use crate::error::{StudioError, StudioResult};

/// Unpacks an archive into a directory
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    /// Extract every file of `archive` below `dest_dir`, returning how many were written
    async fn extract(&self, archive: &Path, dest_dir: &Path) -> StudioResult<usize>;
}

/// Zip extraction on the blocking thread pool
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipExtractor;

#[async_trait]
impl ArchiveExtractor for ZipExtractor {
    async fn extract(&self, archive: &Path, dest_dir: &Path) -> StudioResult<usize> {
        let archive = archive.to_path_buf();
        let dest_dir = dest_dir.to_path_buf();
        tokio::task::spawn_blocking(move || extract_zip(&archive, &dest_dir))
            .await
            .map_err(|e| StudioError::archive(format!("extraction task failed: {e}")))?
    }
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> StudioResult<usize> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(StudioError::archive)?;
    std::fs::create_dir_all(dest_dir)?;
    let mut written = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(StudioError::archive)?;
        let rel_path: PathBuf = entry
            .enclosed_name()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| StudioError::archive(format!("unsafe entry path: {}", entry.name())))?;
        let out_path = dest_dir.join(&rel_path);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut outfile = File::create(&out_path)?;
        std::io::copy(&mut entry, &mut outfile)
            .map_err(|e| StudioError::archive(format!("failed to inflate {}: {e}", rel_path.display())))?;
        written += 1;
    }

    debug!(
        "Extracted {} files from {} into {}",
        written,
        archive_path.display(),
        dest_dir.display()
    );
    Ok(written)
}
