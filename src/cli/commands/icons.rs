//! Icon level commands: list, show, move and import-request

use anyhow::{Context, Result};
use std::path::Path;

use super::open_project;
use crate::config::StudioConfig;
use crate::project::Stage;
use crate::session::SessionHandle;

pub async fn run_list(
    handle: &SessionHandle,
    config: &StudioConfig,
    project: &str,
    stage: Stage,
) -> Result<()> {
    open_project(handle, config, project).await?;
    for id in handle.icons(stage).await? {
        println!("{id}");
    }
    Ok(())
}

pub async fn run_show(
    handle: &SessionHandle,
    config: &StudioConfig,
    project: &str,
    icon: &str,
) -> Result<()> {
    open_project(handle, config, project).await?;
    let details = handle
        .icon(icon)
        .await
        .with_context(|| format!("Failed to load icon {icon}"))?;
    println!("{}", serde_json::to_string_pretty(&details)?);
    Ok(())
}

pub async fn run_move(
    handle: &SessionHandle,
    config: &StudioConfig,
    project: &str,
    icon: &str,
    stage: Stage,
) -> Result<()> {
    open_project(handle, config, project).await?;
    let changed = handle
        .set_icon_category(icon, stage)
        .await
        .with_context(|| format!("Failed to move icon {icon} to {stage}"))?;
    if changed {
        println!("Moved {icon} to {stage}");
    } else {
        println!("{icon} is already {stage}");
    }
    Ok(())
}

pub async fn run_import_request(
    handle: &SessionHandle,
    config: &StudioConfig,
    project: &str,
    archive: &Path,
) -> Result<()> {
    let info = open_project(handle, config, project).await?;
    let report = handle
        .import_request(archive)
        .await
        .with_context(|| format!("Failed to import request {}", archive.display()))?;

    println!(
        "Merged {} icons into {} ({} new, {} requested again, {} with images)",
        report.total(),
        info.id,
        report.admitted.len(),
        report.rerequested.len(),
        report.images
    );
    Ok(())
}
