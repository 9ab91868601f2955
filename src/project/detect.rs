use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::fs;

use crate::config::PackLayoutConfig;
use crate::error::StudioResult;
use crate::storage::layout::PROJECT_FILE;

/// What a folder handed to the studio turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    /// Neither a project nor a pack
    None,
    /// An icon pack source tree that still needs converting
    Pack,
    /// A project folder with a `project.json`
    Project,
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Pack => "pack",
            Self::Project => "project",
        })
    }
}

/// Classify a folder as project, pack or neither
pub async fn detect_project_kind(path: &Path, pack: &PackLayoutConfig) -> StudioResult<ProjectKind> {
    if fs::try_exists(path.join(PROJECT_FILE)).await? {
        return Ok(ProjectKind::Project);
    }

    if fs::try_exists(path.join(&pack.resource_dir)).await? {
        for candidate in &pack.manifest_candidates {
            if fs::try_exists(path.join(candidate)).await? {
                return Ok(ProjectKind::Pack);
            }
        }
    }

    Ok(ProjectKind::None)
}
