#![allow(clippy::print_stdout)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use minipack::{Compiler, StatsOptions, TransformRegistry, config::Config};

#[derive(Parser, Debug)]
#[command(name = "minipack", version, about = "Bundle CommonJS modules into one script per entry")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "minipack.toml")]
    config: PathBuf,

    /// Project root; defaults to the `root` key or the config file's directory
    #[arg(long)]
    root: Option<PathBuf>,

    /// Print the full build report as JSON
    #[arg(long)]
    json: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = std::path::absolute(&cli.config)
        .with_context(|| format!("cannot locate {}", cli.config.display()))?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("/"));
    let root_override = cli
        .root
        .as_deref()
        .map(std::path::absolute)
        .transpose()
        .context("cannot locate project root")?;

    let config = Config::load(&config_path)?;
    let (options, plugins) =
        config.into_build(base_dir, root_override.as_deref(), &TransformRegistry::with_builtins())?;
    debug!("Build options: {options:?}");

    let out_dir = options.output.path.clone();
    let compiler = Compiler::with_plugins(options, &plugins);
    let stats = compiler.run().context("build failed")?;

    if cli.json {
        let report = serde_json::to_string_pretty(&stats.to_json(&StatsOptions::all()))?;
        println!("{report}");
    } else {
        for chunk in &stats.chunks {
            println!(
                "{}  {} module(s)  {}",
                chunk.name,
                chunk.module_ids.len(),
                out_dir.join(&chunk.filename).display()
            );
        }
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
