//! `cmext toolchain` command

use anyhow::Result;

use crate::cli::ToolchainArgs;
use cmext::builder::context::{DetectOptions, EnvOverrides, ToolchainContext};
use cmext::builder::toolchain::PathProbe;
use cmext::builder::util::{detect_tool_version, parse_cmake_version};
use cmext::util::config::load_for_project;

pub fn execute(args: ToolchainArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = load_for_project(&cwd);

    let opts = DetectOptions {
        compiler: args.compiler,
        interpreter: args.python,
        arch_overrides: config.platforms.clone(),
        build_parallel: config.build.parallel,
        ..Default::default()
    };
    let probe = PathProbe::new().with_search_dir(config.build.ninja_dir.clone());
    let ctx = ToolchainContext::detect(&opts, EnvOverrides::from_env(), &probe)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ctx)?);
        return Ok(());
    }

    show_toolchain(&ctx);
    Ok(())
}

fn show_toolchain(ctx: &ToolchainContext) {
    println!("Toolchain:");
    println!();
    println!("  Compiler:    {}", ctx.compiler);
    println!("  OS:          {:?}", ctx.os);
    println!("  Platform:    {}", ctx.plat_name);

    match ctx.arch_table.get(&ctx.plat_name) {
        Some(arch) if ctx.compiler.is_msvc() => println!("    Arch:      {}", arch),
        _ => {}
    }

    println!("  CMake:       {}", ctx.cmake.display());
    match detect_tool_version(&ctx.cmake, parse_cmake_version) {
        Ok(version) => println!("               version {}", version),
        Err(e) => tracing::debug!("{:#}", e),
    }

    match ctx.fast_generator {
        Some(ref ninja) => println!("  Ninja:       {}", ninja.display()),
        None => println!("  Ninja:       not found"),
    }
    println!("  Interpreter: {}", ctx.interpreter.display());
    println!("  Build jobs:  {}", ctx.build_parallel);

    println!();

    println!("Environment:");
    let env = &ctx.env;
    let vars = [
        ("CC", &env.cc),
        ("CXX", &env.cxx),
        ("CMAKE_GENERATOR", &env.generator),
        ("CMAKE_ARGS", &env.cmake_args),
        ("CMAKE_BUILD_PARALLEL_LEVEL", &env.parallel_level),
        ("ARCHFLAGS", &env.archflags),
        ("CONDA_PREFIX", &env.conda_prefix),
        ("DEBUG", &env.debug),
    ];
    for (name, value) in vars {
        if let Some(value) = value {
            println!("  {}={}", name, value);
        }
    }
}
