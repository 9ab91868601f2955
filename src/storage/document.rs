//! Structured document I/O
//!
//! Every JSON document in a project goes through these two functions.

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tokio::fs;

use crate::error::{StudioError, StudioResult};

/// A schema-less structured document
pub type Document = serde_json::Value;

/// Read a JSON document
pub async fn read_document<T: DeserializeOwned>(path: &Path) -> StudioResult<T> {
    let content = fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StudioError::not_found(path.display())
        } else {
            StudioError::Io(e)
        }
    })?;
    serde_json::from_str(&content).map_err(StudioError::serialization)
}

/// Write a JSON document, replacing any previous content
///
/// The parent directory must exist. Content goes to a sibling temp file first
/// and is renamed over the target, so readers never see a half-written document.
pub async fn write_document<T: Serialize + ?Sized>(path: &Path, data: &T) -> StudioResult<()> {
    let content = serde_json::to_string_pretty(data)?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content).await?;
    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(StudioError::Io(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");
        let doc = json!({"name": "Camera", "tags": ["photo", "lens"]});

        write_document(&path, &doc).await.unwrap();
        let read: Document = read_document(&path).await.unwrap();

        assert_eq!(read, doc);
        assert!(!temp_dir.path().join("doc.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_document::<Document>(&temp_dir.path().join("missing.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_read_malformed_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").await.unwrap();

        let err = read_document::<Document>(&path).await.unwrap_err();
        assert!(matches!(err, StudioError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent").join("doc.json");
        let err = write_document(&path, &json!({})).await.unwrap_err();
        assert!(matches!(err, StudioError::Io(_)));
    }
}
