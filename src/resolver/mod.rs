//! Build configuration resolution.
//!
//! [`resolve`] turns a [`BuildRequest`] and a [`ToolchainContext`] into a
//! [`ResolvedPlan`]. It is a pure function of its inputs apart from
//! checking that the source directory exists: the environment has already
//! been sampled into the context, and nothing is spawned here.
//!
//! Configure arguments are emitted in a fixed order:
//! 1. Output, interpreter, build type and version definitions
//! 2. Runtime search path for co-located libraries
//! 3. Generator selection
//! 4. macOS architectures
//! 5. Raw extra arguments (`CMAKE_ARGS`, then the request's own)

mod archflags;
mod errors;
pub mod generator;
pub mod platform;

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use crate::builder::context::ToolchainContext;
use crate::core::plan::{ProcessStep, ResolvedPlan, StepKind};
use crate::core::request::BuildRequest;

pub use archflags::parse_archflags;
pub use errors::ResolveError;
pub use generator::{GeneratorArgs, GeneratorSource};
pub use platform::ArchTable;

/// CMake variable that receives the version string.
pub const VERSION_INFO_DEFINE: &str = "EXAMPLE_VERSION_INFO";

/// Library directory, relative to `CONDA_PREFIX`, the module is linked
/// to search at load time.
pub const CONDA_RUNTIME_SUBDIR: &str = "lib/python3.10/site-packages/lib";

/// Resolve the full configure/build/install plan for one extension.
pub fn resolve(request: &BuildRequest, ctx: &ToolchainContext) -> Result<ResolvedPlan, ResolveError> {
    if !request.source_dir().is_dir() {
        return Err(ResolveError::SourceDirMissing(request.source_dir().to_path_buf()));
    }
    check_target_name(request.name())?;

    let source_dir = absolute(request.source_dir());
    let output_dir = absolute(request.output_dir());
    let mode = request.build_mode();

    let mut configure_args = vec![
        "-DPYTHON_BUILD=ON".to_string(),
        format!("-DCMAKE_LIBRARY_OUTPUT_DIRECTORY={}{}", output_dir.display(), MAIN_SEPARATOR),
        format!("-DPYTHON_EXECUTABLE={}", ctx.interpreter.display()),
        format!("-DCMAKE_INSTALL_PREFIX={}{}", output_dir.display(), MAIN_SEPARATOR),
        format!("-DCMAKE_BUILD_TYPE={}", mode),
        format!("-D{}={}", VERSION_INFO_DEFINE, request.version_info()),
    ];
    let mut build_args = Vec::new();

    if let Some(rpath) = runtime_search_path(ctx) {
        configure_args.push(format!("-DCMAKE_SHARED_LINKER_FLAGS=-Wl,-rpath,{}", rpath));
    }

    let requested = request
        .requested_generator()
        .map(|g| (g, GeneratorSource::Request))
        .or_else(|| ctx.env.generator().map(|g| (g, GeneratorSource::Environment)));

    let selection = generator::select(requested, mode, &output_dir, ctx)?;
    configure_args.extend(selection.configure);
    build_args.extend(selection.build);

    let archs = target_architectures(request, ctx)?;
    if !archs.is_empty() {
        configure_args.push(format!("-DCMAKE_OSX_ARCHITECTURES={}", archs.join(";")));
    }

    configure_args.extend(ctx.env.extra_cmake_args());
    configure_args.extend(request.extra_arg_list().iter().cloned());

    if !ctx.env.parallel_level_set() {
        if let Some(jobs) = request.job_count() {
            build_args.push(format!("-j{}", jobs));
        }
    }

    let scratch_dir = request.scratch_dir();

    let configure = ProcessStep::new(StepKind::Configure, &ctx.cmake, &scratch_dir)
        .arg(source_dir.display().to_string())
        .args(configure_args.iter().cloned());

    let build = ProcessStep::new(StepKind::Build, &ctx.cmake, &scratch_dir)
        .args(["--build", ".", "-j"])
        .arg(ctx.build_parallel.to_string())
        .args(build_args.iter().cloned());

    let mut install = ProcessStep::new(StepKind::Install, &ctx.cmake, &scratch_dir)
        .args(["--install", "."]);
    if selection.multi_config {
        install = install.args(["--config", mode.as_str()]);
    }

    tracing::debug!("configure args: {:?}", configure_args);
    tracing::debug!("build args: {:?}", build_args);

    Ok(ResolvedPlan {
        configure_args,
        build_args,
        output_dir,
        scratch_dir,
        steps: vec![configure, build, install],
    })
}

/// Runtime library directory under `CONDA_PREFIX`, for non-MSVC linkers.
fn runtime_search_path(ctx: &ToolchainContext) -> Option<String> {
    if ctx.compiler.is_msvc() {
        return None;
    }
    let prefix = ctx.env.conda_prefix.as_deref().filter(|p| !p.is_empty())?;
    Some(format!("{}/{}", prefix.trim_end_matches('/'), CONDA_RUNTIME_SUBDIR))
}

/// Architectures for a macOS universal or cross build.
fn target_architectures(
    request: &BuildRequest,
    ctx: &ToolchainContext,
) -> Result<Vec<String>, ResolveError> {
    if !ctx.os.is_darwin() {
        if !request.architecture_list().is_empty() {
            tracing::warn!("ignoring target architectures: only supported on macOS hosts");
        }
        return Ok(Vec::new());
    }

    let mut archs = match ctx.env.archflags {
        Some(ref flags) => parse_archflags(flags)?,
        None => Vec::new(),
    };

    for arch in request.architecture_list() {
        if !archs.contains(arch) {
            archs.push(arch.clone());
        }
    }

    Ok(archs)
}

/// The scratch directory is `<build-temp>/<name>`, so the name must be one
/// normal path component.
fn check_target_name(name: &str) -> Result<(), ResolveError> {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if !single || name.contains(['/', '\\']) {
        return Err(ResolveError::InvalidTargetName(name.to_string()));
    }
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
