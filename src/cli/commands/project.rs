//! Project level commands: detect, convert, info and title

use anyhow::{Context, Result};
use std::path::Path;

use super::open_project;
use crate::config::StudioConfig;
use crate::session::SessionHandle;

pub async fn run_detect(handle: &SessionHandle, path: &Path) -> Result<()> {
    let kind = handle
        .detect(path)
        .await
        .with_context(|| format!("Failed to inspect {}", path.display()))?;
    println!("{kind}");
    Ok(())
}

pub async fn run_convert(handle: &SessionHandle, pack: &Path) -> Result<()> {
    let info = handle
        .convert(pack)
        .await
        .with_context(|| format!("Failed to convert icon pack {}", pack.display()))?;
    let finished = handle.icons(crate::project::Stage::Finished).await?;
    println!(
        "Created project {} with {} finished icons",
        info.id,
        finished.len()
    );
    Ok(())
}

pub async fn run_info(handle: &SessionHandle, config: &StudioConfig, project: &str) -> Result<()> {
    let info = open_project(handle, config, project).await?;
    println!("id:    {}", info.id);
    println!("title: {}", info.title);
    Ok(())
}

pub async fn run_title(
    handle: &SessionHandle,
    config: &StudioConfig,
    project: &str,
    title: String,
) -> Result<()> {
    let info = open_project(handle, config, project).await?;
    handle
        .set_title(title.clone())
        .await
        .context("Failed to save project title")?;
    println!("Renamed {} to {:?}", info.id, title);
    Ok(())
}
