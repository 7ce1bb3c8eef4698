//! Resolution error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error while resolving a build plan.
///
/// All variants are fatal and are raised before any process is spawned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("source directory does not exist: {}", .0.display())]
    SourceDirMissing(PathBuf),

    #[error("invalid extension name `{0}`")]
    InvalidTargetName(String),

    #[error("no CMake architecture known for platform `{plat_name}`")]
    UnknownPlatform {
        plat_name: String,
        known: Vec<String>,
    },

    #[error("malformed ARCHFLAGS: `{0}`")]
    MalformedArchFlags(String),

    #[error("malformed value for `{var}`: `{value}`")]
    MalformedEnv { var: String, value: String },

    #[error("CMake not found")]
    CMakeNotFound,

    #[error("no host interpreter found")]
    InterpreterNotFound,
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::SourceDirMissing(path) => {
                Diagnostic::error(format!("source directory `{}` does not exist", path.display()))
                    .with_location(path.clone())
                    .with_suggestion("Pass the directory containing CMakeLists.txt")
            }

            ResolveError::InvalidTargetName(name) => {
                Diagnostic::error(format!("invalid extension name `{}`", name))
                    .with_context("the name keys the build directory and must be a single path component")
                    .with_suggestion("Use a plain module name such as `_core`, without `/`, `\\` or `..`")
            }

            ResolveError::UnknownPlatform { plat_name, known } => {
                let mut diag = Diagnostic::error(format!(
                    "no CMake architecture known for platform `{}`",
                    plat_name
                ));

                if !known.is_empty() {
                    diag = diag.with_context(format!("known platforms: {}", known.join(", ")));
                }

                diag.with_suggestion(format!(
                    "Add `{} = \"<arch>\"` under [platforms] in .cmext/config.toml",
                    plat_name
                ))
                .with_suggestion("Use a generator that embeds the architecture, or Ninja")
            }

            ResolveError::MalformedArchFlags(value) => {
                Diagnostic::error("could not parse ARCHFLAGS")
                    .with_context(format!("ARCHFLAGS=\"{}\"", value))
                    .with_suggestion("Every `-arch` must be followed by a name, e.g. `-arch arm64`")
            }

            ResolveError::MalformedEnv { var, value } => {
                Diagnostic::error(format!("malformed value for `{}`", var))
                    .with_context(format!("{}=\"{}\"", var, value))
                    .with_suggestion(format!("Unset `{}` or give it an integer value", var))
            }

            ResolveError::CMakeNotFound => Diagnostic::error("CMake not found")
                .with_context("CMake is required to configure and build the extension")
                .with_suggestion("Install CMake and ensure it's in your PATH"),

            ResolveError::InterpreterNotFound => Diagnostic::error("no host interpreter found")
                .with_context("looked for `python3` and `python` on PATH")
                .with_suggestion("Pass the interpreter explicitly with `--python <path>`"),
        }
    }
}
