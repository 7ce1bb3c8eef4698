//! Build requests and build modes.
//!
//! A [`BuildRequest`] describes one extension build as handed over by the
//! packaging front end. It is constructed once and never mutated after the
//! resolver sees it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Version embedded into the native build when none is requested.
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Default root for per-target scratch directories.
pub const DEFAULT_BUILD_TEMP: &str = "build/temp";

/// Debug or release build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildMode {
    Debug,
    #[default]
    Release,
}

impl BuildMode {
    /// The CMake configuration name (`Debug`, `Release`).
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Debug => "Debug",
            BuildMode::Release => "Release",
        }
    }

    /// Uppercased form used to key per-configuration CMake variables.
    pub fn as_upper(&self) -> &'static str {
        match self {
            BuildMode::Debug => "DEBUG",
            BuildMode::Release => "RELEASE",
        }
    }

    /// Mode selected by a debug toggle.
    pub fn from_debug(debug: bool) -> Self {
        if debug {
            BuildMode::Debug
        } else {
            BuildMode::Release
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildMode::Debug),
            "release" => Ok(BuildMode::Release),
            other => Err(format!(
                "unknown build mode `{}` (expected `debug` or `release`)",
                other
            )),
        }
    }
}

/// A single extension build request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildRequest {
    source_dir: PathBuf,
    name: String,
    output_dir: PathBuf,
    mode: BuildMode,
    jobs: Option<usize>,
    generator: Option<String>,
    extra_args: Vec<String>,
    architectures: Vec<String>,
    version: Option<String>,
    build_temp: PathBuf,
}

impl BuildRequest {
    /// Create a request for building extension `name` from `source_dir`
    /// into `output_dir`.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        name: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        BuildRequest {
            source_dir: source_dir.into(),
            name: name.into(),
            output_dir: output_dir.into(),
            mode: BuildMode::default(),
            jobs: None,
            generator: None,
            extra_args: Vec::new(),
            architectures: Vec::new(),
            version: None,
            build_temp: PathBuf::from(DEFAULT_BUILD_TEMP),
        }
    }

    /// Set the build mode.
    pub fn mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    /// Request an explicit number of parallel jobs. Zero means none.
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs.filter(|&j| j > 0);
        self
    }

    /// Request an explicit CMake generator.
    pub fn generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator.filter(|g| !g.trim().is_empty());
        self
    }

    /// Add raw configure-stage arguments.
    pub fn extra_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Add target architectures for cross-compilation.
    pub fn architectures(mut self, archs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.architectures.extend(archs.into_iter().map(|a| a.into()));
        self
    }

    /// Set the version string embedded into the native build.
    pub fn version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    /// Set the root under which the per-target scratch directory lives.
    pub fn build_temp(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_temp = dir.into();
        self
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn build_mode(&self) -> BuildMode {
        self.mode
    }

    pub fn job_count(&self) -> Option<usize> {
        self.jobs
    }

    pub fn requested_generator(&self) -> Option<&str> {
        self.generator.as_deref()
    }

    pub fn extra_arg_list(&self) -> &[String] {
        &self.extra_args
    }

    pub fn architecture_list(&self) -> &[String] {
        &self.architectures
    }

    /// The version to embed, falling back to [`DEFAULT_VERSION`].
    pub fn version_info(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// The private scratch directory for this target.
    pub fn scratch_dir(&self) -> PathBuf {
        self.build_temp.join(&self.name)
    }
}
