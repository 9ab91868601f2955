//! # iconstudio
//!
//! Storage and import pipelines for icon pack projects.
//!
//! A project tracks icons through two stages, requested and finished. Icons
//! enter a project by converting an Android icon pack or by merging a request
//! archive, and move between stages with their images following them on disk.
//!
//! ## Usage
//!
//! ```bash
//! iconstudio convert path/to/pack
//! iconstudio import-request pack requests.zip
//! iconstudio move pack camera finished
//! ```
//!
//! ## Modules
//!
//! - `archive` - Extraction of request archives
//! - `cli` - Command line front end
//! - `config` - Configuration loaded from TOML and the environment
//! - `error` - Error type shared by every layer
//! - `import` - Pack and request import pipelines
//! - `manifest` - `appfilter.xml` parsing
//! - `project` - Project aggregate, stages and kind detection
//! - `session` - Explicit open-project context and its worker
//! - `storage` - Project folder layout, JSON documents and image moves
pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod manifest;
pub mod project;
pub mod session;
pub mod storage;

pub use error::{StudioError, StudioResult};
