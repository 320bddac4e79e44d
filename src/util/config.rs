//! Configuration file support for xcgen.
//!
//! xcgen supports two configuration file locations:
//! - Global: `~/.xcgen/config.toml` - User-wide defaults
//! - Project: `.xcgen/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{SchemeAutogenerationMode, TargetNameMode};

/// xcgen configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation settings
    pub generate: GenerateConfig,
}

/// Generation-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Worker threads for the pipeline (None = one per CPU)
    pub jobs: Option<usize>,

    /// Overrides the project's target name mode (auto, qualified, label)
    pub target_name_mode: Option<TargetNameMode>,

    /// Overrides the project's scheme autogeneration mode (none, auto, all)
    pub scheme_autogeneration_mode: Option<SchemeAutogenerationMode>,

    /// Directory the `.xcodeproj` is written into
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration, or defaults if the file doesn't exist.
    ///
    /// A file that exists but does not parse is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.generate.jobs.is_some() {
            self.generate.jobs = other.generate.jobs;
        }
        if other.generate.target_name_mode.is_some() {
            self.generate.target_name_mode = other.generate.target_name_mode;
        }
        if other.generate.scheme_autogeneration_mode.is_some() {
            self.generate.scheme_autogeneration_mode = other.generate.scheme_autogeneration_mode;
        }
        if other.generate.output_dir.is_some() {
            self.generate.output_dir = other.generate.output_dir;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.xcgen/config.toml)
/// 2. Global config (~/.xcgen/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path)?);
    }

    config.merge(Config::load_or_default(project_path)?);

    Ok(config)
}

/// Get the global xcgen config directory (~/.xcgen).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".xcgen"))
}

/// Get the global config path (~/.xcgen/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.xcgen/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".xcgen").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_generate_section() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "[generate]\njobs = 4\ntarget_name_mode = \"qualified\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.generate.jobs, Some(4));
        assert_eq!(
            config.generate.target_name_mode,
            Some(TargetNameMode::Qualified)
        );
        assert_eq!(config.generate.scheme_autogeneration_mode, None);
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = project_config_path(tmp.path());
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(&global, "[generate]\njobs = 2\noutput_dir = \"out\"\n").unwrap();
        std::fs::write(&project, "[generate]\njobs = 8\n").unwrap();

        let config = load_config(Some(&global), &project).unwrap();
        assert_eq!(config.generate.jobs, Some(8));
        assert_eq!(config.generate.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_missing_files_use_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, &tmp.path().join("nope.toml")).unwrap();
        assert!(config.generate.jobs.is_none());
    }

    #[test]
    fn test_invalid_mode_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[generate]\nscheme_autogeneration_mode = \"sometimes\"\n").unwrap();

        let err = load_config(None, &path).unwrap_err();
        assert!(format!("{:#}", err).contains("sometimes"));
    }
}
