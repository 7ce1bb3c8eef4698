//! cmext CLI - resolve and drive CMake builds of extension modules

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use cmext::builder::executor::ExecError;
use cmext::resolver::ResolveError;
use cmext::util::diagnostic::{emit, suggestions, Diagnostic};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("cmext=debug")
    } else {
        EnvFilter::new("cmext=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match cli.command {
        Commands::Build(args) => commands::build::execute(args, cli.verbose),
        Commands::Plan(args) => commands::plan::execute(args, cli.verbose),
        Commands::Toolchain(args) => commands::toolchain::execute(args),
    }
}

fn report(err: &anyhow::Error, color: bool) {
    if let Some(resolve) = err.downcast_ref::<ResolveError>() {
        emit(&resolve.to_diagnostic(), color);
        return;
    }

    if let Some(ExecError::StepFailed { command, .. }) = err.downcast_ref::<ExecError>() {
        let diag = Diagnostic::error(format!("{:#}", err))
            .with_context(format!("command: {}", command))
            .with_suggestion(suggestions::BUILD_FAILED)
            .with_suggestion(suggestions::INSPECT_PLAN);
        emit(&diag, color);
        return;
    }

    eprintln!("error: {:#}", err);
}
