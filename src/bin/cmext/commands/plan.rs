//! `cmext plan` command

use anyhow::Result;

use crate::cli::BuildArgs;
use cmext::ops::plan;
use cmext::util::config::load_for_project;

pub fn execute(args: BuildArgs, verbose: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = load_for_project(&cwd);

    let plan = plan(&args.into_options(verbose), &config)?;
    println!("{}", plan.to_json()?);

    Ok(())
}
