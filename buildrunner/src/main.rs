//! Build-pipeline task runner.
//!
//! Runs the `compile-*-js` tasks for the koheron websocket client: CoffeeScript
//! sources are concatenated, compiled by `coffee`, optionally minified by the
//! Closure Compiler, and written under the project root.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use buildrunner::exit_codes;
use buildrunner::io::closure::ClosureCompiler;
use buildrunner::io::config::{BuildConfig, CONFIG_FILE_NAME, load_config};
use buildrunner::io::transpiler::CoffeeTranspiler;
use buildrunner::logging;
use buildrunner::pipeline::{PipelineContext, PipelineOptions, run_tasks};
use clap::{Parser, Subcommand};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "buildrunner",
    version,
    about = "Build-pipeline task runner for the koheron websocket client"
)]
struct Cli {
    /// Project root; source globs and output directories are relative to it.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Configuration file (defaults to `<root>/buildrunner.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the named tasks in order, stopping at the first failure.
    Run {
        #[arg(required = true)]
        tasks: Vec<String>,
    },
    /// Print registered task names.
    List,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FAILED);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.root.join(CONFIG_FILE_NAME));
    let cfg = load_config(&config_path)?;
    debug!(config = %config_path.display(), "loaded config");

    match cli.command {
        Command::Run { tasks } => cmd_run(&cli.root, &cfg, &tasks),
        Command::List => cmd_list(&cfg),
    }
}

fn cmd_run(root: &Path, cfg: &BuildConfig, names: &[String]) -> Result<()> {
    let registry = cfg.registry()?;
    let root = root
        .canonicalize()
        .with_context(|| format!("resolve project root {}", root.display()))?;

    let transpiler = CoffeeTranspiler {
        command: cfg.transpiler.command.clone(),
        timeout: cfg.tool_timeout(),
        output_limit_bytes: cfg.tool_output_limit_bytes,
    };
    let optimizer = ClosureCompiler {
        java: cfg.closure.java.clone(),
        root: root.clone(),
        timeout: cfg.tool_timeout(),
        output_limit_bytes: cfg.tool_output_limit_bytes,
    };
    let ctx = PipelineContext {
        root: &root,
        transpiler: &transpiler,
        optimizer: &optimizer,
        options: PipelineOptions::from(cfg),
    };

    run_tasks(&registry, names, &ctx, |outcome| {
        println!(
            "task: name={} outputs={} elapsed_ms={}",
            outcome.name,
            outcome.written.len(),
            outcome.elapsed.as_millis()
        );
    })?;
    Ok(())
}

fn cmd_list(cfg: &BuildConfig) -> Result<()> {
    let registry = cfg.registry()?;
    for name in registry.names() {
        println!("{name}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_with_several_tasks() {
        let cli = Cli::parse_from(["buildrunner", "run", "compile-tests-js", "compile-math-js"]);
        let Command::Run { tasks } = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(tasks, vec!["compile-tests-js", "compile-math-js"]);
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["buildrunner", "list", "--root", "/tmp/project"]);
        assert!(matches!(cli.command, Command::List));
        assert_eq!(cli.root, PathBuf::from("/tmp/project"));
    }

    #[test]
    fn run_requires_a_task_name() {
        assert!(Cli::try_parse_from(["buildrunner", "run"]).is_err());
    }
}
