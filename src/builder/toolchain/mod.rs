//! Toolchain identity for CMake-driven builds.
//!
//! The resolver only needs coarse facts about the host: which compiler
//! family CMake will pick up, which OS family it runs on, and whether the
//! Ninja generator is installed. Detection lives in [`detect`].
//!
//! Compiler family detection priority:
//! 1. Explicit `--compiler` selection
//! 2. Environment variables (CC, CXX)
//! 3. Host default (MSVC on Windows, Apple Clang on macOS, GCC elsewhere)

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

mod detect;

pub use detect::{detect_compiler_family, find_cmake, find_interpreter};

/// Name of the fast parallel generator.
pub const FAST_GENERATOR: &str = "Ninja";

/// The family of the C/C++ compiler CMake will use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompilerFamily {
    /// GCC (GNU Compiler Collection)
    Gcc,
    /// Clang/LLVM
    Clang,
    /// Apple Clang (macOS)
    AppleClang,
    /// Microsoft Visual C++
    Msvc,
}

impl CompilerFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerFamily::Gcc => "gcc",
            CompilerFamily::Clang => "clang",
            CompilerFamily::AppleClang => "apple-clang",
            CompilerFamily::Msvc => "msvc",
        }
    }

    /// Whether this compiler drives Visual Studio style generators.
    pub fn is_msvc(&self) -> bool {
        matches!(self, CompilerFamily::Msvc)
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompilerFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gcc" | "gnu" => Ok(CompilerFamily::Gcc),
            "clang" | "llvm" => Ok(CompilerFamily::Clang),
            "apple-clang" | "appleclang" => Ok(CompilerFamily::AppleClang),
            "msvc" | "cl" => Ok(CompilerFamily::Msvc),
            other => Err(format!(
                "unknown compiler family `{}` (expected gcc, clang, apple-clang or msvc)",
                other
            )),
        }
    }
}

/// Host operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Windows,
    Darwin,
    Linux,
    Other,
}

impl OsFamily {
    /// Detect the family of the running host.
    pub fn host() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a Rust `target_os` style name to a family.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => OsFamily::Windows,
            "macos" | "ios" | "darwin" => OsFamily::Darwin,
            "linux" => OsFamily::Linux,
            _ => OsFamily::Other,
        }
    }

    pub fn is_darwin(&self) -> bool {
        matches!(self, OsFamily::Darwin)
    }
}

/// Capability probe for a generator's executable.
///
/// A miss is not an error: callers fall back to CMake's default generator.
pub trait GeneratorProbe {
    /// Locate the executable backing `generator`, if installed.
    fn locate(&self, generator: &str) -> Option<PathBuf>;
}

/// Probe that looks in an optional directory, then on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct PathProbe {
    search_dir: Option<PathBuf>,
}

impl PathProbe {
    pub fn new() -> Self {
        PathProbe::default()
    }

    /// Check `dir` before falling back to `PATH`.
    pub fn with_search_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.search_dir = dir;
        self
    }

    fn executable_name(generator: &str) -> Option<&'static str> {
        match generator {
            FAST_GENERATOR => Some("ninja"),
            _ => None,
        }
    }

    fn in_dir(dir: &Path, exe: &str) -> Option<PathBuf> {
        let candidates = [
            dir.join(exe),
            dir.join(format!("{}{}", exe, std::env::consts::EXE_SUFFIX)),
        ];
        candidates.into_iter().find(|p| p.is_file())
    }
}

impl GeneratorProbe for PathProbe {
    fn locate(&self, generator: &str) -> Option<PathBuf> {
        let exe = Self::executable_name(generator)?;

        if let Some(ref dir) = self.search_dir {
            if let Some(path) = Self::in_dir(dir, exe) {
                return Some(path);
            }
            tracing::debug!("{} not found in {}", exe, dir.display());
        }

        which::which(exe).ok()
    }
}
