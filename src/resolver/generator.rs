//! CMake generator selection.
//!
//! Non-MSVC toolchains prefer Ninja when it is installed. MSVC toolchains
//! keep whatever generator CMake picks, but multi-config Visual Studio
//! generators need an explicit architecture and per-config output paths.

use std::path::Path;

use crate::builder::context::ToolchainContext;
use crate::builder::toolchain::FAST_GENERATOR;
use crate::core::request::BuildMode;

use super::errors::ResolveError;

/// Generator-name fragments that mark a single-config generator.
const SINGLE_CONFIG_MARKERS: &[&str] = &["NMake", "Ninja"];

/// Generator-name fragments that already carry an architecture.
const ARCH_MARKERS: &[&str] = &["ARM", "Win64"];

/// Where a generator name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorSource {
    /// The build request asked for it
    Request,
    /// `CMAKE_GENERATOR`, which CMake reads on its own
    Environment,
}

/// Arguments contributed by generator selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorArgs {
    pub configure: Vec<String>,
    pub build: Vec<String>,
    /// Whether the generator selects the configuration at build time
    pub multi_config: bool,
}

/// Whether the generator bakes the build mode in at configure time.
pub fn is_single_config(generator: &str) -> bool {
    SINGLE_CONFIG_MARKERS.iter().any(|m| generator.contains(m))
}

/// Whether the generator name embeds an architecture (`... Win64`).
pub fn has_arch_marker(generator: &str) -> bool {
    ARCH_MARKERS.iter().any(|m| generator.contains(m))
}

/// Compute the generator-dependent configure and build arguments.
pub fn select(
    generator: Option<(&str, GeneratorSource)>,
    mode: BuildMode,
    output_dir: &Path,
    ctx: &ToolchainContext,
) -> Result<GeneratorArgs, ResolveError> {
    if ctx.compiler.is_msvc() {
        select_msvc(generator, mode, output_dir, ctx)
    } else {
        Ok(select_default(generator, ctx))
    }
}

fn select_default(generator: Option<(&str, GeneratorSource)>, ctx: &ToolchainContext) -> GeneratorArgs {
    let mut args = GeneratorArgs::default();

    match generator {
        None => push_fast_generator(&mut args, ctx),
        Some((FAST_GENERATOR, _)) => push_fast_generator(&mut args, ctx),
        Some((name, GeneratorSource::Request)) => args.configure.push(format!("-G{}", name)),
        Some((_, GeneratorSource::Environment)) => {}
    }

    args
}

fn push_fast_generator(args: &mut GeneratorArgs, ctx: &ToolchainContext) {
    match ctx.fast_generator {
        Some(ref ninja) => {
            args.configure.push(format!("-G{}", FAST_GENERATOR));
            args.configure
                .push(format!("-DCMAKE_MAKE_PROGRAM:FILEPATH={}", ninja.display()));
        }
        None => {
            tracing::debug!("{} not installed, using CMake's default generator", FAST_GENERATOR);
        }
    }
}

fn select_msvc(
    generator: Option<(&str, GeneratorSource)>,
    mode: BuildMode,
    output_dir: &Path,
    ctx: &ToolchainContext,
) -> Result<GeneratorArgs, ResolveError> {
    let mut args = GeneratorArgs::default();
    let name = generator.map(|(n, _)| n).unwrap_or("");

    if let Some((name, GeneratorSource::Request)) = generator {
        args.configure.push(format!("-G{}", name));
    }

    let single_config = is_single_config(name);
    let contains_arch = has_arch_marker(name);

    if !single_config && !contains_arch {
        let arch = ctx
            .arch_table
            .get(&ctx.plat_name)
            .ok_or_else(|| ResolveError::UnknownPlatform {
                plat_name: ctx.plat_name.clone(),
                known: ctx.arch_table.platforms(),
            })?;
        args.configure.push("-A".to_string());
        args.configure.push(arch.to_string());
    }

    if !single_config {
        args.configure.push(format!(
            "-DCMAKE_LIBRARY_OUTPUT_DIRECTORY_{}={}",
            mode.as_upper(),
            output_dir.display()
        ));
        args.build.push("--config".to_string());
        args.build.push(mode.as_str().to_string());
        args.multi_config = true;
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::context::EnvOverrides;
    use crate::builder::toolchain::{CompilerFamily, OsFamily};
    use crate::resolver::platform::ArchTable;
    use std::path::PathBuf;

    fn msvc() -> ToolchainContext {
        ToolchainContext::new(CompilerFamily::Msvc, OsFamily::Windows, EnvOverrides::default())
            .with_plat_name("win-amd64")
    }

    #[test]
    fn test_markers() {
        assert!(is_single_config("NMake Makefiles"));
        assert!(is_single_config("Ninja Multi-Config"));
        assert!(!is_single_config("Visual Studio 17 2022"));
        assert!(has_arch_marker("Visual Studio 15 2017 Win64"));
        assert!(has_arch_marker("Visual Studio 15 2017 ARM"));
        assert!(!has_arch_marker("Visual Studio 17 2022"));
    }

    #[test]
    fn test_env_generator_left_to_cmake() {
        let ctx = ToolchainContext::new(CompilerFamily::Gcc, OsFamily::Linux, EnvOverrides::default())
            .with_fast_generator(Some(PathBuf::from("/opt/ninja")));
        let args = select(
            Some(("Unix Makefiles", GeneratorSource::Environment)),
            BuildMode::Release,
            Path::new("/out"),
            &ctx,
        )
        .unwrap();
        assert_eq!(args, GeneratorArgs::default());
    }

    #[test]
    fn test_requested_generator_is_passed() {
        let ctx = ToolchainContext::new(CompilerFamily::Clang, OsFamily::Linux, EnvOverrides::default());
        let args = select(
            Some(("Unix Makefiles", GeneratorSource::Request)),
            BuildMode::Release,
            Path::new("/out"),
            &ctx,
        )
        .unwrap();
        assert_eq!(args.configure, vec!["-GUnix Makefiles"]);
    }

    #[test]
    fn test_msvc_nmake_is_single_config() {
        let args = select(
            Some(("NMake Makefiles", GeneratorSource::Environment)),
            BuildMode::Debug,
            Path::new("/out"),
            &msvc(),
        )
        .unwrap();
        assert!(args.configure.is_empty());
        assert!(args.build.is_empty());
        assert!(!args.multi_config);
    }

    #[test]
    fn test_msvc_multi_config_without_arch() {
        let args = select(None, BuildMode::Debug, Path::new("/out"), &msvc()).unwrap();
        assert_eq!(
            args.configure,
            vec!["-A", "x64", "-DCMAKE_LIBRARY_OUTPUT_DIRECTORY_DEBUG=/out"]
        );
        assert_eq!(args.build, vec!["--config", "Debug"]);
        assert!(args.multi_config);
    }

    #[test]
    fn test_msvc_unknown_platform() {
        let ctx = msvc().with_plat_name("win-riscv64");
        let err = select(None, BuildMode::Release, Path::new("/out"), &ctx).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownPlatform { ref plat_name, .. } if plat_name == "win-riscv64"));
    }

    #[test]
    fn test_msvc_platform_from_custom_table() {
        let table = ArchTable::empty().with("win-riscv64", "RISCV64");
        let ctx = msvc().with_plat_name("win-riscv64").with_arch_table(table);

        let args = select(None, BuildMode::Release, Path::new("/out"), &ctx).unwrap();
        assert_eq!(&args.configure[..2], &["-A", "RISCV64"]);

        let empty = msvc().with_arch_table(ArchTable::empty());
        let err = select(None, BuildMode::Release, Path::new("/out"), &empty).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownPlatform {
                plat_name: "win-amd64".to_string(),
                known: Vec::new(),
            }
        );
    }
}
