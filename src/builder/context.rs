//! Toolchain context - the ambient state a build is resolved against.
//!
//! The process environment is read exactly once, into [`EnvOverrides`],
//! and combined with toolchain probes into a [`ToolchainContext`]. The
//! resolver never touches `std::env` itself.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::builder::toolchain::{
    detect_compiler_family, find_cmake, find_interpreter, CompilerFamily, GeneratorProbe,
    OsFamily, FAST_GENERATOR,
};
use crate::core::request::BuildMode;
use crate::resolver::platform::{host_plat_name, ArchTable};
use crate::resolver::ResolveError;

/// Job count for the overall `cmake --build` invocation.
pub const DEFAULT_BUILD_PARALLEL: usize = 8;

/// Environment variables the resolver honours.
pub mod vars {
    pub const CONDA_PREFIX: &str = "CONDA_PREFIX";
    pub const DEBUG: &str = "DEBUG";
    pub const CMAKE_GENERATOR: &str = "CMAKE_GENERATOR";
    pub const CMAKE_ARGS: &str = "CMAKE_ARGS";
    pub const ARCHFLAGS: &str = "ARCHFLAGS";
    pub const CMAKE_BUILD_PARALLEL_LEVEL: &str = "CMAKE_BUILD_PARALLEL_LEVEL";
    pub const CC: &str = "CC";
    pub const CXX: &str = "CXX";
}

/// Snapshot of the environment variables that influence resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvOverrides {
    pub conda_prefix: Option<String>,
    pub debug: Option<String>,
    pub generator: Option<String>,
    pub cmake_args: Option<String>,
    pub archflags: Option<String>,
    pub parallel_level: Option<String>,
    pub cc: Option<String>,
    pub cxx: Option<String>,
}

impl EnvOverrides {
    /// Sample the current process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build a snapshot from explicit key/value pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut env = EnvOverrides::default();

        for (key, value) in vars {
            let slot = match key.as_ref() {
                vars::CONDA_PREFIX => &mut env.conda_prefix,
                vars::DEBUG => &mut env.debug,
                vars::CMAKE_GENERATOR => &mut env.generator,
                vars::CMAKE_ARGS => &mut env.cmake_args,
                vars::ARCHFLAGS => &mut env.archflags,
                vars::CMAKE_BUILD_PARALLEL_LEVEL => &mut env.parallel_level,
                vars::CC => &mut env.cc,
                vars::CXX => &mut env.cxx,
                _ => continue,
            };
            *slot = Some(value.into());
        }

        env
    }

    /// Generator named by `CMAKE_GENERATOR`, if non-empty.
    pub fn generator(&self) -> Option<&str> {
        self.generator.as_deref().filter(|g| !g.is_empty())
    }

    /// `CMAKE_ARGS`, whitespace-split with empty tokens discarded.
    pub fn extra_cmake_args(&self) -> Vec<String> {
        self.cmake_args
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Whether `CMAKE_BUILD_PARALLEL_LEVEL` is present at all.
    pub fn parallel_level_set(&self) -> bool {
        self.parallel_level.is_some()
    }

    /// Build mode selected by `DEBUG`, parsed as an integer toggle.
    pub fn debug_mode(&self) -> Result<Option<BuildMode>, ResolveError> {
        let Some(ref raw) = self.debug else {
            return Ok(None);
        };

        raw.trim()
            .parse::<i64>()
            .map(|v| Some(BuildMode::from_debug(v != 0)))
            .map_err(|_| ResolveError::MalformedEnv {
                var: vars::DEBUG.to_string(),
                value: raw.clone(),
            })
    }
}

/// Inputs to [`ToolchainContext::detect`] that come from the command line
/// or config files rather than the environment.
#[derive(Debug, Clone, Default)]
pub struct DetectOptions {
    pub compiler: Option<CompilerFamily>,
    pub plat_name: Option<String>,
    pub interpreter: Option<PathBuf>,
    pub arch_overrides: BTreeMap<String, String>,
    pub build_parallel: Option<usize>,
}

/// Read-only snapshot of the toolchain a build is resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainContext {
    /// Compiler family CMake will drive
    pub compiler: CompilerFamily,

    /// Host OS family
    pub os: OsFamily,

    /// Platform tag used to look up the `-A` architecture
    pub plat_name: String,

    /// Environment overrides sampled at detection time
    pub env: EnvOverrides,

    /// Located Ninja executable, if installed
    pub fast_generator: Option<PathBuf>,

    /// Interpreter path embedded into the native build
    pub interpreter: PathBuf,

    /// CMake program
    pub cmake: PathBuf,

    /// Platform to architecture lookup
    pub arch_table: ArchTable,

    /// Fixed job count passed to the overall build step
    pub build_parallel: usize,
}

impl ToolchainContext {
    /// Create a context with host defaults and no fast generator.
    pub fn new(compiler: CompilerFamily, os: OsFamily, env: EnvOverrides) -> Self {
        ToolchainContext {
            compiler,
            os,
            plat_name: host_plat_name(),
            env,
            fast_generator: None,
            interpreter: PathBuf::from("python3"),
            cmake: PathBuf::from("cmake"),
            arch_table: ArchTable::default(),
            build_parallel: DEFAULT_BUILD_PARALLEL,
        }
    }

    /// Sample the toolchain: compiler family, CMake, interpreter and
    /// the fast-generator capability.
    pub fn detect(
        opts: &DetectOptions,
        env: EnvOverrides,
        probe: &dyn GeneratorProbe,
    ) -> Result<Self, ResolveError> {
        let os = OsFamily::host();

        let compiler = opts.compiler.unwrap_or_else(|| {
            detect_compiler_family(env.cc.as_deref(), env.cxx.as_deref(), os)
        });

        let cmake = find_cmake().ok_or(ResolveError::CMakeNotFound)?;

        let interpreter = match opts.interpreter {
            Some(ref path) => path.clone(),
            None => find_interpreter().ok_or(ResolveError::InterpreterNotFound)?,
        };

        let fast_generator = probe.locate(FAST_GENERATOR);
        match fast_generator {
            Some(ref path) => tracing::debug!("found {} at {}", FAST_GENERATOR, path.display()),
            None => tracing::debug!("{} not available", FAST_GENERATOR),
        }

        let mut arch_table = ArchTable::default();
        arch_table.extend(opts.arch_overrides.clone());

        let ctx = ToolchainContext {
            compiler,
            os,
            plat_name: opts.plat_name.clone().unwrap_or_else(host_plat_name),
            env,
            fast_generator,
            interpreter,
            cmake,
            arch_table,
            build_parallel: opts
                .build_parallel
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_BUILD_PARALLEL),
        };

        tracing::debug!(
            "toolchain: compiler={} os={:?} plat={}",
            ctx.compiler,
            ctx.os,
            ctx.plat_name
        );

        Ok(ctx)
    }

    pub fn with_plat_name(mut self, plat_name: impl Into<String>) -> Self {
        self.plat_name = plat_name.into();
        self
    }

    pub fn with_fast_generator(mut self, path: Option<PathBuf>) -> Self {
        self.fast_generator = path;
        self
    }

    pub fn with_interpreter(mut self, path: impl Into<PathBuf>) -> Self {
        self.interpreter = path.into();
        self
    }

    pub fn with_cmake(mut self, path: impl Into<PathBuf>) -> Self {
        self.cmake = path.into();
        self
    }

    pub fn with_arch_table(mut self, table: ArchTable) -> Self {
        self.arch_table = table;
        self
    }

    pub fn with_build_parallel(mut self, jobs: usize) -> Self {
        self.build_parallel = jobs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_picks_known_keys() {
        let env = EnvOverrides::from_vars([
            ("CMAKE_ARGS", "-DFOO=1  -DBAR=2 "),
            ("CMAKE_GENERATOR", "Ninja"),
            ("HOME", "/home/user"),
        ]);

        assert_eq!(env.generator(), Some("Ninja"));
        assert_eq!(env.extra_cmake_args(), vec!["-DFOO=1", "-DBAR=2"]);
        assert!(!env.parallel_level_set());
        assert_eq!(env.conda_prefix, None);
    }

    #[test]
    fn test_empty_generator_is_unset() {
        let env = EnvOverrides::from_vars([("CMAKE_GENERATOR", "")]);
        assert_eq!(env.generator(), None);
    }

    #[test]
    fn test_parallel_level_presence() {
        let env = EnvOverrides::from_vars([("CMAKE_BUILD_PARALLEL_LEVEL", "")]);
        assert!(env.parallel_level_set());
    }

    #[test]
    fn test_debug_mode_parsing() {
        let mode = |v: &str| EnvOverrides::from_vars([("DEBUG", v)]).debug_mode();

        assert_eq!(EnvOverrides::default().debug_mode(), Ok(None));
        assert_eq!(mode("0"), Ok(Some(BuildMode::Release)));
        assert_eq!(mode(" 1 "), Ok(Some(BuildMode::Debug)));
        assert_eq!(mode("2"), Ok(Some(BuildMode::Debug)));
        assert!(matches!(mode("yes"), Err(ResolveError::MalformedEnv { .. })));
        assert!(matches!(mode(""), Err(ResolveError::MalformedEnv { .. })));
    }

    #[test]
    fn test_context_defaults() {
        let ctx = ToolchainContext::new(CompilerFamily::Gcc, OsFamily::Linux, EnvOverrides::default());
        assert_eq!(ctx.build_parallel, DEFAULT_BUILD_PARALLEL);
        assert_eq!(ctx.fast_generator, None);
        assert_eq!(ctx.arch_table, ArchTable::default());
    }
}
