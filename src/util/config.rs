//! Configuration file support for cmext.
//!
//! cmext supports two configuration file locations:
//! - Global: `~/.cmext/config.toml` - User-wide defaults
//! - Project: `.cmext/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.
//!
//! ```toml
//! [build]
//! jobs = 4
//! parallel = 8
//! build-temp = "build/temp"
//! generator = "Ninja"
//! ninja-dir = "/opt/ninja/bin"
//!
//! [platforms]
//! win-arm64 = "ARM64"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// cmext configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Extra platform-name to CMake architecture entries
    pub platforms: BTreeMap<String, String>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Default number of parallel jobs passed as `-jN` (None = CMake's default)
    pub jobs: Option<usize>,

    /// Job count for the overall build invocation
    pub parallel: Option<usize>,

    /// Root of the per-target scratch directories
    pub build_temp: Option<PathBuf>,

    /// Default CMake generator
    pub generator: Option<String>,

    /// Directory searched for the ninja executable before PATH
    pub ninja_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        config
            .validated()
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    /// Normalize and check values the TOML types cannot express.
    ///
    /// `jobs = 0` means no explicit job count. `parallel = 0` is rejected.
    pub fn validated(mut self) -> Result<Self> {
        if self.build.jobs == Some(0) {
            self.build.jobs = None;
        }
        if self.build.parallel == Some(0) {
            bail!("`build.parallel` must be at least 1");
        }
        Ok(self)
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.parallel.is_some() {
            self.build.parallel = other.build.parallel;
        }
        if other.build.build_temp.is_some() {
            self.build.build_temp = other.build.build_temp;
        }
        if other.build.generator.is_some() {
            self.build.generator = other.build.generator;
        }
        if other.build.ninja_dir.is_some() {
            self.build.ninja_dir = other.build.ninja_dir;
        }

        self.platforms.extend(other.platforms);
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.cmext/config.toml)
/// 2. Global config (~/.cmext/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global cmext config directory (~/.cmext).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".cmext"))
}

/// Get the global config path (~/.cmext/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.cmext/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".cmext").join("config.toml")
}

/// Load the configuration that applies to `project_root`.
pub fn load_for_project(project_root: &Path) -> Config {
    let global = global_config_path().unwrap_or_default();
    load_config(&global, &project_config_path(project_root))
}
