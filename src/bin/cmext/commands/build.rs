//! `cmext build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use cmext::ops::build;
use cmext::util::config::load_for_project;

pub fn execute(args: BuildArgs, verbose: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = load_for_project(&cwd);

    let opts = args.into_options(verbose);
    let plan = build(&opts, &config)?;

    eprintln!("    Finished `{}` -> {}", opts.name, plan.output_dir.display());

    Ok(())
}
