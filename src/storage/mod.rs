//! Storage layer for icon projects
//!
//! This module owns every filesystem mutation made on behalf of a project:
//! JSON documents, the per-project folder convention and image moves between
//! stage folders.

pub mod document;
pub mod layout;
pub mod mover;

pub use document::{read_document, write_document, Document};
pub use layout::{validate_icon_id, ProjectLayout};
pub use mover::{IconMover, MoveOutcome};

use std::path::Path;
use tokio::fs;

use crate::error::{StudioError, StudioResult};

/// Derive a project id from the last component of a pack or project path
pub fn project_id_from_path(path: &Path) -> StudioResult<String> {
    path.components()
        .next_back()
        .and_then(|c| match c {
            std::path::Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .map(|s| s.to_string())
        .ok_or_else(|| {
            StudioError::config(format!(
                "Could not determine project id from path: {}",
                path.display()
            ))
        })
}

/// Copy every file of `from` into `to`, descending into subfolders
///
/// Existing files in `to` are overwritten. Returns the number of files copied.
pub async fn copy_dir_recursive(from: &Path, to: &Path) -> StudioResult<usize> {
    fs::create_dir_all(to).await?;
    let mut copied = 0;
    let mut entries = fs::read_dir(from).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let target_path = to.join(entry.file_name());

        if entry.file_type().await?.is_dir() {
            copied += Box::pin(copy_dir_recursive(&path, &target_path)).await?;
        } else {
            fs::copy(&path, &target_path).await?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_id_from_path() {
        let path = Path::new("/home/user/packs/my-pack");
        assert_eq!(project_id_from_path(path).unwrap(), "my-pack");

        let path = Path::new("/home/user/packs/other-pack/");
        assert_eq!(project_id_from_path(path).unwrap(), "other-pack");

        assert!(project_id_from_path(Path::new("/")).is_err());
    }

    #[tokio::test]
    async fn test_copy_dir_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let from = temp_dir.path().join("from");
        std::fs::create_dir_all(from.join("nested")).unwrap();
        std::fs::write(from.join("a.png"), b"a").unwrap();
        std::fs::write(from.join("nested").join("b.png"), b"b").unwrap();

        let to = temp_dir.path().join("to");
        let copied = copy_dir_recursive(&from, &to).await.unwrap();

        assert_eq!(copied, 2);
        assert!(to.join("a.png").exists());
        assert!(to.join("nested").join("b.png").exists());
    }
}
