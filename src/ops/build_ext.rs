//! Implementation of `cmext build` and `cmext plan`.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::builder::context::{DetectOptions, EnvOverrides, ToolchainContext};
use crate::builder::executor::{execute_plan, ProcessRunner, StepRunner};
use crate::builder::toolchain::{CompilerFamily, PathProbe};
use crate::core::plan::ResolvedPlan;
use crate::core::request::{BuildMode, BuildRequest};
use crate::resolver::{resolve, ResolveError};
use crate::util::config::Config;
use crate::util::diagnostic::Diagnostic;
use crate::util::fs::remove_dir_all_if_exists;

/// Options for the build and plan commands.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Directory containing CMakeLists.txt
    pub source_dir: PathBuf,

    /// Extension (target) name
    pub name: String,

    /// Directory the compiled module must land in
    pub output_dir: PathBuf,

    /// Explicit build mode (None = `DEBUG` env, then release)
    pub mode: Option<BuildMode>,

    /// Number of parallel jobs
    pub jobs: Option<usize>,

    /// Explicit CMake generator
    pub generator: Option<String>,

    /// Raw configure arguments appended after everything else
    pub extra_args: Vec<String>,

    /// Target architectures (macOS)
    pub architectures: Vec<String>,

    /// Version embedded into the native build
    pub version: Option<String>,

    /// Root of the per-target scratch directory
    pub build_temp: Option<PathBuf>,

    /// Platform tag override for architecture lookup
    pub plat_name: Option<String>,

    /// Compiler family override
    pub compiler: Option<CompilerFamily>,

    /// Host interpreter override
    pub interpreter: Option<PathBuf>,

    /// Remove the scratch directory before configuring
    pub clean: bool,

    /// Stream CMake output
    pub verbose: bool,
}

/// Build the request from options, config and environment.
///
/// Command-line options win over config, which wins over the environment.
pub fn make_request(
    opts: &BuildOptions,
    env: &EnvOverrides,
    config: &Config,
) -> Result<BuildRequest, ResolveError> {
    let mode = match opts.mode {
        Some(mode) => mode,
        None => env.debug_mode()?.unwrap_or_default(),
    };

    let build_temp = opts
        .build_temp
        .clone()
        .or_else(|| config.build.build_temp.clone());

    let mut request = BuildRequest::new(&opts.source_dir, &opts.name, &opts.output_dir)
        .mode(mode)
        .jobs(opts.jobs.or(config.build.jobs))
        .generator(opts.generator.clone().or_else(|| config.build.generator.clone()))
        .extra_args(opts.extra_args.iter().cloned())
        .architectures(opts.architectures.iter().cloned())
        .version(opts.version.clone());

    if let Some(dir) = build_temp {
        request = request.build_temp(dir);
    }

    Ok(request)
}

/// Sample the toolchain for this build.
pub fn detect_context(
    opts: &BuildOptions,
    env: EnvOverrides,
    config: &Config,
) -> Result<ToolchainContext, ResolveError> {
    let detect = DetectOptions {
        compiler: opts.compiler,
        plat_name: opts.plat_name.clone(),
        interpreter: opts.interpreter.clone(),
        arch_overrides: config.platforms.clone(),
        build_parallel: config.build.parallel,
    };

    let probe = PathProbe::new().with_search_dir(config.build.ninja_dir.clone());
    ToolchainContext::detect(&detect, env, &probe)
}

/// Resolve the plan for `opts` against the current environment.
pub fn plan(opts: &BuildOptions, config: &Config) -> Result<ResolvedPlan> {
    let env = EnvOverrides::from_env();
    let request = make_request(opts, &env, config)?;
    let ctx = detect_context(opts, env, config)?;

    warn_if_not_cmake_project(&request);

    Ok(resolve(&request, &ctx)?)
}

/// Resolve and run configure, build and install.
pub fn build(opts: &BuildOptions, config: &Config) -> Result<ResolvedPlan> {
    let plan = plan(opts, config)?;
    let mut runner = ProcessRunner::new().verbose(opts.verbose);
    run_plan(&plan, &mut runner, opts.clean)?;
    Ok(plan)
}

/// Run an already resolved plan.
pub fn run_plan(plan: &ResolvedPlan, runner: &mut dyn StepRunner, clean: bool) -> Result<()> {
    let start = Instant::now();

    if clean {
        remove_dir_all_if_exists(plan.scratch_dir())?;
    }

    execute_plan(plan, runner)?;

    std::fs::metadata(&plan.output_dir).with_context(|| {
        format!(
            "install finished but output directory `{}` is missing",
            plan.output_dir.display()
        )
    })?;

    tracing::info!(
        "extension built into {} in {:.2}s",
        plan.output_dir.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

fn warn_if_not_cmake_project(request: &BuildRequest) {
    let source = request.source_dir();
    if source.is_dir() && !source.join("CMakeLists.txt").exists() {
        let diag = Diagnostic::warning("source directory has no CMakeLists.txt")
            .with_location(source);
        tracing::warn!("{}", diag.format(false).trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::executor::ExecError;
    use crate::builder::toolchain::OsFamily;
    use crate::core::plan::StepKind;
    use crate::test_support::RecordingRunner;
    use tempfile::TempDir;

    fn opts(tmp: &TempDir) -> BuildOptions {
        let source = tmp.path().join("native");
        std::fs::create_dir_all(&source).unwrap();
        BuildOptions {
            source_dir: source,
            name: "py_ext".to_string(),
            output_dir: tmp.path().join("pkg"),
            ..Default::default()
        }
    }

    #[test]
    fn test_mode_from_debug_env() {
        let tmp = TempDir::new().unwrap();
        let env = EnvOverrides::from_vars([("DEBUG", "1")]);

        let req = make_request(&opts(&tmp), &env, &Config::default()).unwrap();
        assert_eq!(req.build_mode(), BuildMode::Debug);

        let mut explicit = opts(&tmp);
        explicit.mode = Some(BuildMode::Release);
        let req = make_request(&explicit, &env, &Config::default()).unwrap();
        assert_eq!(req.build_mode(), BuildMode::Release);
    }

    #[test]
    fn test_malformed_debug_env() {
        let tmp = TempDir::new().unwrap();
        let env = EnvOverrides::from_vars([("DEBUG", "on")]);

        let err = make_request(&opts(&tmp), &env, &Config::default()).unwrap_err();
        assert!(matches!(err, ResolveError::MalformedEnv { .. }));
    }

    #[test]
    fn test_cli_overrides_config() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.build.jobs = Some(2);
        config.build.generator = Some("Unix Makefiles".to_string());
        config.build.build_temp = Some(PathBuf::from("cfg-temp"));

        let req = make_request(&opts(&tmp), &EnvOverrides::default(), &config).unwrap();
        assert_eq!(req.job_count(), Some(2));
        assert_eq!(req.requested_generator(), Some("Unix Makefiles"));
        assert_eq!(req.scratch_dir(), PathBuf::from("cfg-temp").join("py_ext"));

        let mut cli = opts(&tmp);
        cli.jobs = Some(4);
        cli.generator = Some("Ninja".to_string());
        let req = make_request(&cli, &EnvOverrides::default(), &config).unwrap();
        assert_eq!(req.job_count(), Some(4));
        assert_eq!(req.requested_generator(), Some("Ninja"));
    }

    #[test]
    fn test_run_plan_propagates_configure_failure() {
        let tmp = TempDir::new().unwrap();
        let request = BuildRequest::new(tmp.path(), "py_ext", tmp.path().join("pkg"))
            .build_temp(tmp.path().join("build"));
        let ctx = ToolchainContext::new(CompilerFamily::Gcc, OsFamily::Linux, EnvOverrides::default());
        let plan = resolve(&request, &ctx).unwrap();

        let mut runner = RecordingRunner::new().fail_on(StepKind::Configure, 1, "CMake Error at CMakeLists.txt");
        let err = run_plan(&plan, &mut runner, false).unwrap_err();

        assert_eq!(runner.kinds(), vec![StepKind::Configure]);
        let exec = err.downcast_ref::<ExecError>().unwrap();
        assert_eq!(exec.step(), Some(StepKind::Configure));
        assert!(exec.to_string().contains("CMake Error at CMakeLists.txt"));
    }

    #[test]
    fn test_clean_cannot_escape_build_temp() {
        let tmp = TempDir::new().unwrap();
        let precious = tmp.path().join("precious");
        std::fs::create_dir_all(&precious).unwrap();
        std::fs::write(precious.join("keep.txt"), "keep").unwrap();
        let ctx = ToolchainContext::new(CompilerFamily::Gcc, OsFamily::Linux, EnvOverrides::default());

        for name in [precious.display().to_string(), "../precious".to_string()] {
            let request = BuildRequest::new(tmp.path(), name, tmp.path().join("pkg"))
                .build_temp(tmp.path().join("build"));
            let err = resolve(&request, &ctx).unwrap_err();
            assert!(matches!(err, ResolveError::InvalidTargetName(_)));
        }

        assert!(precious.join("keep.txt").exists());
    }

    #[test]
    fn test_zero_jobs_from_config_is_unset() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.build.jobs = Some(0);

        let request = make_request(&opts(&tmp), &EnvOverrides::default(), &config).unwrap();
        assert_eq!(request.job_count(), None);

        let ctx = ToolchainContext::new(CompilerFamily::Gcc, OsFamily::Linux, EnvOverrides::default());
        let plan = resolve(&request, &ctx).unwrap();
        assert!(plan.build_args.is_empty());
        assert_eq!(
            plan.step(StepKind::Build).unwrap().args,
            vec!["--build", ".", "-j", "8"]
        );
    }

    #[test]
    fn test_run_plan_clean_removes_scratch() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("pkg");
        std::fs::create_dir_all(&out).unwrap();
        let request = BuildRequest::new(tmp.path(), "py_ext", &out).build_temp(tmp.path().join("build"));
        let ctx = ToolchainContext::new(CompilerFamily::Gcc, OsFamily::Linux, EnvOverrides::default());
        let plan = resolve(&request, &ctx).unwrap();

        std::fs::create_dir_all(plan.scratch_dir()).unwrap();
        let stale = plan.scratch_dir().join("CMakeCache.txt");
        std::fs::write(&stale, "stale").unwrap();

        let mut runner = RecordingRunner::new();
        run_plan(&plan, &mut runner, true).unwrap();

        assert!(!stale.exists());
        assert!(plan.scratch_dir().is_dir());
        assert_eq!(runner.kinds().len(), 3);
    }
}
