//! Command routing and execution

use anyhow::{Context, Result};

use crate::cli::args::{Cli, Commands};
use crate::cli::commands::*;
use crate::config::StudioConfig;
use crate::session::{Session, SessionHandle};

/// Load configuration, start the session worker and run one command
pub async fn execute_command(cli: Cli) -> Result<()> {
    let config = StudioConfig::load(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;
    let handle = SessionHandle::spawn(Session::new(config.clone()));

    match cli.command {
        Commands::Detect { path } => run_detect(&handle, &path).await,
        Commands::Convert { pack } => run_convert(&handle, &pack).await,
        Commands::Info { project } => run_info(&handle, &config, &project).await,
        Commands::List { project, stage } => run_list(&handle, &config, &project, stage).await,
        Commands::Show { project, icon } => run_show(&handle, &config, &project, &icon).await,
        Commands::Move {
            project,
            icon,
            stage,
        } => run_move(&handle, &config, &project, &icon, stage).await,
        Commands::ImportRequest { project, archive } => {
            run_import_request(&handle, &config, &project, &archive).await
        }
        Commands::Title { project, title } => run_title(&handle, &config, &project, title).await,
    }
}
