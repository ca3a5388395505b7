//! Stepchain CLI - run config-driven pipelines.
//!
//! Logs go to stderr (or to the file given with `-o`); the final value is
//! printed to stdout as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stepchain::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "stepchain")]
#[command(about = "Run a pipeline defined in a JSON or TOML config file", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve, validate and run the pipeline described by a config file
    Run {
        /// Config file path
        #[arg(short, long, env = "STEPCHAIN_CONFIG")]
        config: PathBuf,

        /// Write log output to this file instead of stderr
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only check that the pipeline is runnable
        #[arg(long)]
        dry_run: bool,

        /// Record and print every step's input and output
        #[arg(long, conflicts_with = "dry_run")]
        trace: bool,
    },
    /// List the registered steps and validators
    List {
        /// Only show references containing this text
        #[arg(long)]
        search: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            output,
            dry_run,
            trace,
        } => run(&config, output.as_deref(), dry_run, trace),
        Commands::List { search } => {
            list_references(search.as_deref());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(output: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format(|buf, record| writeln!(buf, "{}", record.args()));

    if let Some(path) = output {
        let file = File::create(path)
            .with_context(|| format!("could not open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init()?;
    Ok(())
}

fn banner(title: &str) {
    log::info!("{}", "=".repeat(32));
    log::info!("{}", title);
    log::info!("{}", "=".repeat(32));
}

fn run(config_path: &Path, output: Option<&Path>, dry_run: bool, trace: bool) -> Result<()> {
    init_logging(output)?;

    banner("Loading Pipeline...");
    log::info!("Using config file: {}", config_path.display());
    let config = PipelineConfig::from_path(config_path)?;

    let registry = Registry::with_builtins();
    let runner = ConfigRunner::new(&registry)
        .with_options(RunOptions::new().with_progress(report_progress));

    banner("Running pipeline");

    if dry_run {
        let description = runner.dry_run(&config)?;
        println!("{}", serde_json::to_string_pretty(&description)?);
        return Ok(());
    }

    let value = if trace {
        let chain = runner.assemble(&config)?;
        let input = chain.validate()?;
        let mut debugger = PipelineDebugger::new(chain.pipeline().clone());
        let result = debugger.invoke(input);
        print_trace(debugger.trace());
        result?
    } else {
        runner.run(&config)?
    };

    println!("{}", value.to_json());
    Ok(())
}

fn report_progress(update: ProgressUpdate) {
    match update {
        ProgressUpdate::StepStarted { name, index, total } => {
            log::info!("‣ Entering {} ({}/{})", name, index + 1, total);
        }
        ProgressUpdate::StepSkipped { name, .. } => {
            log::info!("⤼ Skipping {}", name);
        }
        ProgressUpdate::Error { step, message } => {
            log::warn!("✗ {} failed: {}", step.as_deref().unwrap_or("pipeline"), message);
        }
        ProgressUpdate::Completed {
            total_duration_ms,
            steps_executed,
            steps_skipped,
        } => {
            log::debug!(
                "{} steps executed, {} skipped in {}ms",
                steps_executed,
                steps_skipped,
                total_duration_ms
            );
        }
        _ => {}
    }
}

fn print_trace(trace: &Trace<Value>) {
    banner("Trace");
    for entry in trace {
        match &entry.outcome {
            TraceOutcome::Output(output) => {
                log::info!("{:>3}. {}: {} → {}", entry.index + 1, entry.step, entry.input, output)
            }
            TraceOutcome::Error(message) => {
                log::info!("{:>3}. {}: {} ✗ {}", entry.index + 1, entry.step, entry.input, message)
            }
        }
    }
}

fn list_references(search: Option<&str>) {
    let registry = Registry::with_builtins();
    let wanted: Option<Vec<String>> = search.map(|query| registry.search(query));

    println!("Available references ({} total):", registry.len());
    println!();

    for namespace in registry.namespaces() {
        let Some(ns) = registry.namespace(namespace) else {
            continue;
        };
        let rows: Vec<_> = ns
            .entries()
            .map(|(name, entry)| (format!("{}.{}", namespace, name), entry.kind()))
            .filter(|(reference, _)| wanted.as_ref().map_or(true, |w| w.contains(reference)))
            .collect();
        if rows.is_empty() {
            continue;
        }

        println!("  📁 {}", namespace);
        for (reference, kind) in rows {
            println!("      • {} [{}]", reference, kind);
        }
        println!();
    }
}
