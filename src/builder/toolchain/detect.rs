//! Toolchain detection functions.

use std::path::{Path, PathBuf};

use super::{CompilerFamily, OsFamily};
use crate::util::process::ProcessBuilder;

/// Detect the compiler family CMake will use.
///
/// Checks `CC`, then `CXX`, then falls back to the host default:
/// MSVC on Windows, Apple Clang on macOS, GCC everywhere else.
pub fn detect_compiler_family(cc: Option<&str>, cxx: Option<&str>, os: OsFamily) -> CompilerFamily {
    for compiler in [cc, cxx].into_iter().flatten() {
        let compiler = compiler.trim();
        if compiler.is_empty() {
            continue;
        }
        if let Some(family) = family_from_name(Path::new(compiler)) {
            return family;
        }
        if let Some(family) = family_from_version(compiler) {
            return family;
        }
    }

    match os {
        OsFamily::Windows => CompilerFamily::Msvc,
        OsFamily::Darwin => CompilerFamily::AppleClang,
        _ => CompilerFamily::Gcc,
    }
}

/// Classify a compiler by its binary name.
fn family_from_name(cc: &Path) -> Option<CompilerFamily> {
    let name = cc
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    if name == "cl" || name == "clang-cl" {
        Some(CompilerFamily::Msvc)
    } else if name.contains("clang") {
        Some(CompilerFamily::Clang)
    } else if name.contains("gcc") || name.contains("g++") {
        Some(CompilerFamily::Gcc)
    } else {
        None
    }
}

/// Classify a compiler from its `--version` banner.
fn family_from_version(cc: &str) -> Option<CompilerFamily> {
    let output = ProcessBuilder::new(cc).arg("--version").exec().ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout).to_lowercase();

    if stdout.contains("apple") && stdout.contains("clang") {
        Some(CompilerFamily::AppleClang)
    } else if stdout.contains("clang") {
        Some(CompilerFamily::Clang)
    } else if stdout.contains("gcc") || stdout.contains("free software foundation") {
        Some(CompilerFamily::Gcc)
    } else {
        tracing::debug!("could not classify compiler `{}` from --version", cc);
        None
    }
}

/// Find CMake.
pub fn find_cmake() -> Option<PathBuf> {
    which::which("cmake").ok()
}

/// Find the host interpreter whose path gets embedded into the build.
pub fn find_interpreter() -> Option<PathBuf> {
    ["python3", "python"]
        .iter()
        .find_map(|name| which::which(name).ok())
}
