//! CLI argument structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::project::Stage;

/// Manage icon pack projects and incoming icon requests
#[derive(Parser)]
#[command(name = "iconstudio")]
#[command(about = "iconstudio - Manage icon pack projects and icon requests", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file (default: ./iconstudio.toml when present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Project arguments accept a folder path or the id of a project in the projects directory
#[derive(Subcommand)]
pub enum Commands {
    /// Tell whether a folder is a project, an icon pack or neither
    Detect {
        /// Folder to inspect
        path: PathBuf,
    },

    /// Convert an icon pack into a project (overwrites an earlier conversion)
    Convert {
        /// Root of the icon pack source tree
        pack: PathBuf,
    },

    /// Show the id and title of a project
    Info {
        /// Project folder, project id or icon pack
        project: String,
    },

    /// List the icons in one stage
    List {
        /// Project folder, project id or icon pack
        project: String,

        /// Stage to list
        #[arg(value_enum)]
        stage: Stage,
    },

    /// Show the stage and metadata of one icon
    Show {
        /// Project folder, project id or icon pack
        project: String,

        /// Icon id
        icon: String,
    },

    /// Move an icon to another stage
    #[command(name = "move")]
    Move {
        /// Project folder, project id or icon pack
        project: String,

        /// Icon id
        icon: String,

        /// Target stage
        #[arg(value_enum)]
        stage: Stage,
    },

    /// Merge a request archive into a project
    #[command(name = "import-request")]
    ImportRequest {
        /// Project folder, project id or icon pack
        project: String,

        /// Zip archive containing appfilter.xml and optional images
        archive: PathBuf,
    },

    /// Set the title of a project
    Title {
        /// Project folder, project id or icon pack
        project: String,

        /// New title
        title: String,
    },
}
