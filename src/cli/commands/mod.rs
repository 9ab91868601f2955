//! Command implementation modules

pub mod icons;
pub mod project;

pub use icons::{run_import_request, run_list, run_move, run_show};
pub use project::{run_convert, run_detect, run_info, run_title};

use anyhow::{Context, Result};

use crate::config::StudioConfig;
use crate::project::ProjectInfo;
use crate::session::{resolve_project_path, SessionHandle};

/// Open the project named by a command argument
pub(crate) async fn open_project(
    handle: &SessionHandle,
    config: &StudioConfig,
    project: &str,
) -> Result<ProjectInfo> {
    let path = resolve_project_path(config, project);
    handle
        .open(&path)
        .await
        .with_context(|| format!("Failed to open project {}", path.display()))
}
