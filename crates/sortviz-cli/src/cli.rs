use std::io::{self, Write};
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use sortviz_core::{Algorithm, SpeedLevel};
use sortviz_runtime::{SessionConfig, SessionEvent, SortSession, pump};
use tracing::info;

use crate::error::{CliError, Result};
use crate::logging::init_tracing;
use crate::render::{JsonlRenderer, TextRenderer};

#[derive(Debug, Parser)]
#[command(
    name = "sortviz",
    about = "Watch sorting algorithms work, one compare and swap at a time",
    version
)]
pub struct Cli {
    /// Raise log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sort a sequence and stream every step.
    Run(RunArgs),

    /// List the available algorithms.
    Algorithms(AlgorithmsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Jsonl,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Algorithm key or name (bubble, selection, insertion, merge, quick, radix).
    #[arg(short, long)]
    pub algorithm: Option<Algorithm>,

    /// Number of generated elements (5-200).
    #[arg(short = 'n', long)]
    pub size: Option<usize>,

    /// Speed level, 1 (500 ms per step) to 10 (5 ms per step).
    #[arg(short, long, value_parser = parse_speed)]
    pub speed: Option<SpeedLevel>,

    /// Seed for reproducible sequences.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip all pacing delays.
    #[arg(long)]
    pub instant: bool,

    /// TOML or JSON session config; flags override its fields.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Sort these values instead of a generated sequence.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub values: Vec<u32>,

    /// In text mode, print progress and the summary only.
    #[arg(long)]
    pub no_steps: bool,
}

#[derive(Debug, Args)]
pub struct AlgorithmsArgs {
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let stdout = io::stdout();
    run(cli, &mut stdout.lock())
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run_sort(args, out),
        Commands::Algorithms(args) => list_algorithms(&args, out),
    }
}

/// Resolve the session configuration: file first, then flags.
pub fn resolve_config(args: &RunArgs) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm;
    }
    if let Some(size) = args.size {
        config.size = size;
    }
    if let Some(speed) = args.speed {
        config.speed = speed.get();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn run_sort(args: RunArgs, out: &mut dyn Write) -> Result<()> {
    let config = resolve_config(&args)?;
    let mut session = SortSession::new(config)?;
    session.set_unpaced(args.instant);
    if !args.values.is_empty() {
        session.load_sequence(args.values)?;
    }
    info!(
        algorithm = session.algorithm().key(),
        len = session.values().len(),
        speed = %session.speed(),
        "starting run"
    );

    let events = session.subscribe();
    session.start()?;
    let terminal = match args.format {
        OutputFormat::Text => pump(&events, &mut TextRenderer::new(&mut *out, !args.no_steps))?,
        OutputFormat::Jsonl => pump(&events, &mut JsonlRenderer::new(&mut *out))?,
    };
    session.wait();

    match terminal {
        Some(SessionEvent::Completed(_)) => {
            if args.format == OutputFormat::Text {
                let sorted: Vec<String> = session.values().iter().map(u32::to_string).collect();
                writeln!(out, "output: {}", sorted.join(" "))?;
            }
            out.flush()?;
            Ok(())
        }
        Some(SessionEvent::Failed { cause, .. }) => Err(CliError::RunFailed { cause }),
        Some(_) => Err(CliError::RunCancelled),
        None => Err(CliError::Disconnected),
    }
}

fn list_algorithms(args: &AlgorithmsArgs, out: &mut dyn Write) -> Result<()> {
    for algorithm in Algorithm::ALL {
        match args.format {
            OutputFormat::Text => writeln!(
                out,
                "{:<10} {:<15} {:<11} {}",
                algorithm.key(),
                algorithm.name(),
                algorithm.complexity(),
                algorithm.description()
            )?,
            OutputFormat::Jsonl => {
                let line = json!({
                    "key": algorithm.key(),
                    "name": algorithm.name(),
                    "complexity": algorithm.complexity(),
                    "description": algorithm.description(),
                });
                serde_json::to_writer(&mut *out, &line)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

fn parse_speed(raw: &str) -> std::result::Result<SpeedLevel, String> {
    let level: u8 = raw.parse().map_err(|_| format!("`{raw}` is not a number"))?;
    SpeedLevel::new(level).map_err(|err| err.to_string())
}
