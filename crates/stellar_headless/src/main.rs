//! Headless battle runner.
//!
//! Resolves battle scenarios without a game server and prints the results
//! as JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Resolve every location in a scenario
//! cargo run -p stellar_headless -- resolve --scenario scenarios/border_skirmish.ron
//!
//! # Write the report to a file instead of stdout
//! cargo run -p stellar_headless -- resolve --scenario scenarios/border_skirmish.ron --output out/tick.json
//!
//! # Preview a single exchange
//! cargo run -p stellar_headless -- preview --defender-ships 20 --defender-weapons 3 \
//!     --attacker-ships 50 --attacker-weapons 2 --turn-based
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stellar_core::exchange::FleetAggregate;
use stellar_headless::{
    runner::{preview, run_tick, surviving_owners, RunnerError},
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "stellar_headless")]
#[command(about = "Headless combat resolution for scenario testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every contested location in a scenario
    Resolve {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a single exchange between two aggregates
    Preview {
        /// Defending ships
        #[arg(long)]
        defender_ships: u32,

        /// Defending weapons level
        #[arg(long, default_value = "1")]
        defender_weapons: u32,

        /// Attacking ships
        #[arg(long)]
        attacker_ships: u32,

        /// Attacking weapons level
        #[arg(long, default_value = "1")]
        attacker_weapons: u32,

        /// Give the defender the first volley, as at a star
        #[arg(long)]
        turn_based: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Resolve { scenario, output } => cmd_resolve(scenario, output),
        Commands::Preview {
            defender_ships,
            defender_weapons,
            attacker_ships,
            attacker_weapons,
            turn_based,
        } => cmd_preview(
            FleetAggregate::new(defender_ships, defender_weapons),
            FleetAggregate::new(attacker_ships, attacker_weapons),
            turn_based,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Resolve a scenario and emit the tick report
fn cmd_resolve(scenario_path: PathBuf, output: Option<PathBuf>) -> Result<(), RunnerError> {
    let scenario = Scenario::load(&scenario_path)?;
    tracing::info!(
        path = %scenario_path.display(),
        name = %scenario.name,
        locations = scenario.locations.len(),
        "Loaded scenario"
    );

    let report = run_tick(&scenario)?;

    for location in &report.locations {
        tracing::info!(
            location = location.index,
            rounds = location.rounds,
            destroyed = location.destroyed_carriers.len(),
            captures = location.captures.len(),
            survivors = ?surviving_owners(location),
            "Location resolved"
        );
    }
    for failure in report.failures() {
        tracing::warn!(
            location = failure.index,
            error = failure.error.as_deref().unwrap_or_default(),
            "Location did not finish"
        );
    }

    match output {
        Some(path) => {
            report.save(&path)?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// Print a single exchange, including the forces needed to flip it
fn cmd_preview(
    defender: FleetAggregate,
    attacker: FleetAggregate,
    turn_based: bool,
) -> Result<(), RunnerError> {
    let result = preview(defender, attacker, turn_based);
    tracing::debug!(
        defender_won = result.defender_won(),
        defender_lost = result.lost.defender,
        attacker_lost = result.lost.attacker,
        "Exchange resolved"
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
