//! Flow graph synthesis CLI.
//!
//! Provides the `flowsynth` binary with two subcommands over a problem file
//! (types, procs, graph and samples in one JSON document):
//!
//! - `check` validates the graph, runs the samples and prints a JSON report.
//! - `synthesize` searches for a completion that passes every sample and
//!   prints (or writes) the resulting graph.

mod problem;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::{info, Level};

use flowsynth_check::GraphContext;
use flowsynth_core::NominalTypes;
use flowsynth_synth::{SynthesisConfig, Synthesizer};

use problem::{CliError, ProblemFile};

/// Environment variable consulted when `--max-population` is not given.
const MAX_POPULATION_VAR: &str = "FLOWSYNTH_MAX_POPULATION";

/// Flow graph checker and synthesizer.
#[derive(Parser)]
#[command(name = "flowsynth", about = "Flow graph checker and synthesizer")]
struct Cli {
    /// Log search and verification progress to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate a graph and verify it against its samples.
    Check {
        /// Path to the problem file.
        problem: PathBuf,
    },
    /// Complete a graph until it passes every sample.
    Synthesize {
        /// Path to the problem file.
        problem: PathBuf,

        /// Population cap (default: $FLOWSYNTH_MAX_POPULATION, else unbounded).
        #[arg(long)]
        max_population: Option<usize>,

        /// Give up after this many expansions.
        #[arg(long)]
        max_expansions: Option<usize>,

        /// Write the graph here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match cli.command {
        Commands::Check { problem } => run_check(&problem),
        Commands::Synthesize {
            problem,
            max_population,
            max_expansions,
            out,
        } => {
            let config = SynthesisConfig {
                max_population: max_population.or_else(max_population_from_env),
                max_expansions,
            };
            run_synthesize(&problem, config, out.as_deref())
        }
    };
    process::exit(exit_code);
}

fn max_population_from_env() -> Option<usize> {
    std::env::var(MAX_POPULATION_VAR).ok()?.trim().parse().ok()
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 = working code can be generated, 2 = it cannot,
/// 3 = I/O or parse error.
fn run_check(path: &Path) -> i32 {
    let ctx = match ProblemFile::load(path).and_then(ProblemFile::into_context) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {e}");
            return 3;
        }
    };

    let mut messages = Vec::new();
    let matches = ctx.matches_samples_with(|m| messages.push(m.to_string()));
    let report = serde_json::json!({
        "can_generate_working_code": ctx.can_generate_working_code(),
        "can_be_fixed_with_synthesis": ctx.can_be_fixed_with_synthesis(),
        "score": ctx.score(),
        "matches_samples": matches,
        "sample_messages": messages,
        "problems": ctx.problems(),
    });
    let json = serde_json::to_string_pretty(&report)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize report: {e}\"}}"));
    println!("{json}");

    if ctx.can_generate_working_code() {
        0
    } else {
        2
    }
}

/// Execute the synthesize subcommand.
///
/// Returns exit code: 0 = solution found, 1 = no solution, 2 = the graph
/// needs human intervention, 3 = I/O or parse error.
fn run_synthesize(path: &Path, config: SynthesisConfig, out: Option<&Path>) -> i32 {
    let ctx = match ProblemFile::load(path).and_then(ProblemFile::into_context) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {e}");
            return 3;
        }
    };

    if !ctx.can_be_fixed_with_synthesis() {
        eprintln!("Graph cannot be fixed by synthesis:");
        for problem in ctx.problems().iter().filter(|p| p.needs_human_intervention) {
            eprintln!("  - {problem}");
        }
        return 2;
    }

    let mut synth = Synthesizer::new(config);
    let solution = synth.synthesize(&ctx);
    let stats = synth.stats();
    info!(
        expansions = stats.expansions,
        generated = stats.generated,
        discarded = stats.discarded,
        peak_population = stats.peak_population,
        "search finished"
    );

    let Some(solution) = solution else {
        eprintln!("No solution found after {} expansion(s)", stats.expansions);
        return 1;
    };

    match write_graph(&solution, out) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e}");
            3
        }
    }
}

fn write_graph(ctx: &GraphContext<NominalTypes>, out: Option<&Path>) -> Result<(), CliError> {
    let json = ctx.graph().to_json_pretty()?;
    match out {
        Some(path) => std::fs::write(path, json).map_err(|source| CliError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
