use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;
use tbdisorder::config::EnsembleConfig;
use tbdisorder::context::SimulationContext;
use tbdisorder::store::JsonConfigStore;
use tracing::{error, info};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Simulation input (lattice, energy scale, disorder declarations).
    #[arg(global = true, short, long, default_value = "data/lattice.json")]
    input: String,

    /// Run parameters as JSON; command line flags take precedence.
    #[arg(global = true, long)]
    config: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Run(cmd::run::RunArgs),
    Inspect(cmd::inspect::InspectArgs),
}

fn main() {
    // stdout carries the reports.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let mut config = match &cli.config {
        Some(path) => {
            info!("⚖️  Loading run parameters from: {}", path);
            EnsembleConfig::load_from_file(path).unwrap_or_else(|e| {
                error!("{}", e);
                process::exit(1);
            })
        }
        None => EnsembleConfig::default(),
    };

    match (&cli.command, matches.subcommand()) {
        (Commands::Run(args), Some((_, sub_matches))) => {
            config.merge_from_cli(&args.config, sub_matches)
        }
        (Commands::Inspect(args), Some((_, sub_matches))) => {
            config.merge_from_cli(&args.config, sub_matches)
        }
        _ => {}
    }

    info!("📂 Loading simulation input: {}", cli.input);
    let store = JsonConfigStore::load_from_file(&cli.input).unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(1);
    });

    let ctx = match SimulationContext::from_store(store, config.threads) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("❌ FATAL ERROR BUILDING SIMULATION CONTEXT:");
            error!("   {}", e);
            process::exit(1);
        }
    };

    let status = match cli.command {
        Commands::Run(args) => cmd::run::run(args, &config, &ctx),
        Commands::Inspect(args) => cmd::inspect::run(args, &config, &ctx),
    };

    if let Err(e) = status {
        error!("{}", e);
        process::exit(1);
    }
}
