//! Configuration for the icon studio
//!
//! Values come from an optional TOML file and are then overridden by
//! `ICONSTUDIO_*` environment variables.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::{StudioError, StudioResult};

/// File looked up in the working directory when no config path is given
pub const DEFAULT_CONFIG_FILE: &str = "iconstudio.toml";

/// Environment variable overriding [`StudioConfig::projects_dir`]
pub const PROJECTS_DIR_ENV: &str = "ICONSTUDIO_PROJECTS_DIR";

/// Environment variable overriding [`StudioConfig::cache_dir`]
pub const CACHE_DIR_ENV: &str = "ICONSTUDIO_CACHE_DIR";

/// Get the default directory that holds all projects
pub fn default_projects_dir() -> PathBuf {
    ProjectDirs::from("com", "iconstudio", "iconstudio")
        .map(|dirs| dirs.data_dir().join("projects"))
        .unwrap_or_else(|| PathBuf::from("projects"))
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Directory containing one folder per project
    #[serde(default = "default_projects_dir")]
    pub projects_dir: PathBuf,

    /// Scratch space for request extraction (default: sibling `cache` of `projects_dir`)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Title given to projects created from a pack
    #[serde(default = "default_title")]
    pub default_title: String,

    /// Maximum number of icons written concurrently during an import
    #[serde(default = "default_import_concurrency")]
    pub import_concurrency: usize,

    /// Where things live inside an icon pack
    #[serde(default)]
    pub pack: PackLayoutConfig,
}

/// Locations inside an icon pack, relative to the pack root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackLayoutConfig {
    /// Folder holding the density-independent icon images
    #[serde(default = "default_resource_dir")]
    pub resource_dir: PathBuf,

    /// Candidate locations of the icon manifest, tried in order
    #[serde(default = "default_manifest_candidates")]
    pub manifest_candidates: Vec<PathBuf>,

    /// Optional category manifest
    #[serde(default = "default_drawable_manifest")]
    pub drawable_manifest: PathBuf,
}

impl Default for PackLayoutConfig {
    fn default() -> Self {
        Self {
            resource_dir: default_resource_dir(),
            manifest_candidates: default_manifest_candidates(),
            drawable_manifest: default_drawable_manifest(),
        }
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self::with_projects_dir(default_projects_dir())
    }
}

impl StudioConfig {
    /// Create config with a custom projects directory
    pub fn with_projects_dir(projects_dir: PathBuf) -> Self {
        Self {
            projects_dir,
            cache_dir: None,
            default_title: default_title(),
            import_concurrency: default_import_concurrency(),
            pack: PackLayoutConfig::default(),
        }
    }

    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when it exists,
    /// then apply environment overrides
    pub async fn load(path: Option<&Path>) -> StudioResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path).await?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE)).await?
            }
            None => Self::default(),
        };
        config.merge_env_vars();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub async fn from_file(path: &Path) -> StudioResult<Self> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StudioError::not_found(format!("config file {}", path.display()))
            } else {
                StudioError::Io(e)
            }
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(toml::from_str(&content)?)
    }

    /// Apply `ICONSTUDIO_*` environment overrides
    pub fn merge_env_vars(&mut self) {
        self.merge_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn merge_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(PROJECTS_DIR_ENV).filter(|v| !v.is_empty()) {
            self.projects_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(CACHE_DIR_ENV).filter(|v| !v.is_empty()) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
    }

    /// Reject values the pipelines cannot work with
    pub fn validate(&self) -> StudioResult<()> {
        if self.import_concurrency == 0 {
            return Err(StudioError::config("import_concurrency must be at least 1"));
        }
        if self.pack.manifest_candidates.is_empty() {
            return Err(StudioError::config(
                "pack.manifest_candidates must name at least one location",
            ));
        }
        Ok(())
    }

    /// Scratch directory used while importing requests
    pub fn cache_dir(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => self
                .projects_dir
                .parent()
                .map(|parent| parent.join("cache"))
                .unwrap_or_else(|| PathBuf::from("cache")),
        }
    }

    /// Root folder of the project with the given id
    pub fn project_root(&self, project_id: &str) -> PathBuf {
        self.projects_dir.join(project_id)
    }
}

fn default_title() -> String {
    "Unknown".to_string()
}

fn default_import_concurrency() -> usize {
    8
}

fn default_resource_dir() -> PathBuf {
    PathBuf::from("app/src/main/res/drawable-nodpi")
}

fn default_manifest_candidates() -> Vec<PathBuf> {
    vec![
        PathBuf::from("app/src/main/res/xml/appfilter.xml"),
        PathBuf::from("app/src/main/assets/appfilter.xml"),
        PathBuf::from("appfilter.xml"),
    ]
}

fn default_drawable_manifest() -> PathBuf {
    PathBuf::from("app/src/main/res/xml/drawable.xml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = StudioConfig::with_projects_dir(PathBuf::from("/data/projects"));
        assert_eq!(config.default_title, "Unknown");
        assert_eq!(config.import_concurrency, 8);
        assert_eq!(config.cache_dir(), PathBuf::from("/data/cache"));
        assert_eq!(
            config.project_root("pack-one"),
            PathBuf::from("/data/projects/pack-one")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let vars = HashMap::from([
            (PROJECTS_DIR_ENV, "/srv/icons".to_string()),
            (CACHE_DIR_ENV, String::new()),
        ]);
        let mut config = StudioConfig::with_projects_dir(PathBuf::from("/data/projects"));
        config.merge_env_from(|key| vars.get(key).cloned());

        assert_eq!(config.projects_dir, PathBuf::from("/srv/icons"));
        // Empty values are ignored
        assert_eq!(config.cache_dir, None);
    }

    #[tokio::test]
    async fn test_from_file_partial() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("iconstudio.toml");
        std::fs::write(
            &path,
            r#"
projects_dir = "/tmp/icon-projects"
import_concurrency = 2

[pack]
resource_dir = "res/drawable"
"#,
        )
        .unwrap();

        let config = StudioConfig::from_file(&path).await.unwrap();
        assert_eq!(config.projects_dir, PathBuf::from("/tmp/icon-projects"));
        assert_eq!(config.import_concurrency, 2);
        assert_eq!(config.pack.resource_dir, PathBuf::from("res/drawable"));
        assert_eq!(config.pack.manifest_candidates.len(), 3);
        assert_eq!(config.default_title, "Unknown");
    }

    #[tokio::test]
    async fn test_missing_config_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = StudioConfig::from_file(&temp_dir.path().join("nope.toml"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = StudioConfig::default();
        config.import_concurrency = 0;
        assert!(matches!(config.validate(), Err(StudioError::Config(_))));
    }
}
