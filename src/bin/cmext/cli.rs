//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cmext::builder::toolchain::CompilerFamily;
use cmext::core::request::BuildMode;
use cmext::ops::BuildOptions;

/// cmext - Build CMake extension modules for a host interpreter
#[derive(Parser)]
#[command(name = "cmext")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure, build and install an extension
    Build(BuildArgs),

    /// Print the resolved build plan as JSON without running it
    Plan(BuildArgs),

    /// Show the detected toolchain
    Toolchain(ToolchainArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Directory containing CMakeLists.txt
    pub source_dir: PathBuf,

    /// Extension name
    #[arg(short, long)]
    pub name: String,

    /// Directory the compiled module is placed in
    #[arg(short, long)]
    pub out_dir: PathBuf,

    /// Build in debug mode
    #[arg(long, conflicts_with = "release")]
    pub debug: bool,

    /// Build in release mode
    #[arg(short, long)]
    pub release: bool,

    /// Number of parallel jobs
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: Option<u32>,

    /// CMake generator
    #[arg(short = 'G', long)]
    pub generator: Option<String>,

    /// Target architecture (macOS, repeatable)
    #[arg(long = "arch")]
    pub architectures: Vec<String>,

    /// Version embedded into the native build
    #[arg(long)]
    pub version_info: Option<String>,

    /// Root of the per-target build directory
    #[arg(long)]
    pub build_temp: Option<PathBuf>,

    /// Platform tag used to pick the Visual Studio architecture
    #[arg(long)]
    pub plat_name: Option<String>,

    /// Compiler family (gcc, clang, apple-clang, msvc)
    #[arg(long)]
    pub compiler: Option<CompilerFamily>,

    /// Host interpreter to embed
    #[arg(long, env = "PYTHON_EXECUTABLE")]
    pub python: Option<PathBuf>,

    /// Remove the build directory before configuring
    #[arg(long)]
    pub clean: bool,

    /// Extra arguments passed to the CMake configure step
    #[arg(last = true)]
    pub cmake_args: Vec<String>,
}

impl BuildArgs {
    /// Convert to build options.
    pub fn into_options(self, verbose: bool) -> BuildOptions {
        let mode = if self.debug {
            Some(BuildMode::Debug)
        } else if self.release {
            Some(BuildMode::Release)
        } else {
            None
        };

        BuildOptions {
            source_dir: self.source_dir,
            name: self.name,
            output_dir: self.out_dir,
            mode,
            jobs: self.jobs.map(|j| j as usize),
            generator: self.generator,
            extra_args: self.cmake_args,
            architectures: self.architectures,
            version: self.version_info,
            build_temp: self.build_temp,
            plat_name: self.plat_name,
            compiler: self.compiler,
            interpreter: self.python,
            clean: self.clean,
            verbose,
        }
    }
}

#[derive(Args)]
pub struct ToolchainArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,

    /// Compiler family (gcc, clang, apple-clang, msvc)
    #[arg(long)]
    pub compiler: Option<CompilerFamily>,

    /// Host interpreter to embed
    #[arg(long, env = "PYTHON_EXECUTABLE")]
    pub python: Option<PathBuf>,
}
