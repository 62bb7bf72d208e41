//! Resolves every contested location of a scenario tick.
//!
//! Locations are independent, so they are resolved in parallel with rayon.
//! Each location writes into its own achievement ledger and journal; those
//! are merged serially in location order once every location is done, which
//! keeps the report identical regardless of scheduling.

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use stellar_core::achievements::AchievementLedger;
use stellar_core::components::{Carrier, CarrierId, Location, PlayerId, Star};
use stellar_core::exchange::{exchange, ExchangeResult, FleetAggregate};
use stellar_core::orchestrator::CombatResolver;
use stellar_core::result::CombatEvent;
use stellar_core::services::CaptureResult;
use stellar_core::settings::CombatSettings;
use thiserror::Error;
use tracing::{info, warn};

use crate::scenario::{PreparedLocation, Scenario, ScenarioError};
use crate::services::{LocationJournal, ReputationEntry, ScenarioServices};

/// Error type for runner operations.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The scenario could not be loaded or prepared.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    /// Failed to write the report.
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to encode the report.
    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// What happened at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationReport {
    /// Index of the location in the scenario.
    pub index: usize,
    /// Where the battle was fought.
    pub location: Location,
    /// Rounds fought.
    pub rounds: u32,
    /// One event per round.
    pub events: Vec<CombatEvent>,
    /// Carriers removed from the world.
    pub destroyed_carriers: Vec<CarrierId>,
    /// Star captures.
    pub captures: Vec<CaptureResult>,
    /// The star after the battle.
    pub star: Option<Star>,
    /// Surviving carriers.
    pub carriers: Vec<Carrier>,
    /// Collaborator failure that cut the battle short.
    pub error: Option<String>,
}

/// Full result of a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Scenario name.
    pub scenario: String,
    /// Tick resolved.
    pub tick: u64,
    /// Per-location results, in scenario order.
    pub locations: Vec<LocationReport>,
    /// Achievements earned across every location.
    pub achievements: AchievementLedger,
    /// Reputation changes across every location.
    pub reputation: Vec<ReputationEntry>,
}

impl TickReport {
    /// Every event of the tick, in location then round order.
    pub fn events(&self) -> impl Iterator<Item = &CombatEvent> {
        self.locations.iter().flat_map(|l| l.events.iter())
    }

    /// Locations that stopped on a collaborator failure.
    pub fn failures(&self) -> impl Iterator<Item = &LocationReport> {
        self.locations.iter().filter(|l| l.error.is_some())
    }

    /// Save the report as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), RunnerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a report saved with [`TickReport::save`].
    pub fn load(path: &Path) -> Result<Self, RunnerError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

struct ResolvedLocation {
    report: LocationReport,
    ledger: AchievementLedger,
    journal: LocationJournal,
}

/// Resolve every location of `scenario`.
pub fn run_tick(scenario: &Scenario) -> Result<TickReport, RunnerError> {
    let services = ScenarioServices::from_scenario(scenario);
    let locations = scenario.prepare_locations()?;

    info!(
        scenario = %scenario.name,
        tick = scenario.tick,
        locations = locations.len(),
        "Resolving tick"
    );

    let resolved: Vec<ResolvedLocation> = locations
        .into_par_iter()
        .map(|location| resolve_location(&services, scenario.settings, scenario.tick, location))
        .collect();

    let mut achievements = AchievementLedger::new();
    let mut journal = LocationJournal::default();
    let mut reports = Vec::with_capacity(resolved.len());
    for location in resolved {
        achievements.merge(location.ledger);
        journal.merge(location.journal);
        reports.push(location.report);
    }

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    info!(
        events = reports.iter().map(|r| r.events.len()).sum::<usize>(),
        captures = journal.captures.captures.len(),
        failed,
        "Tick resolved"
    );

    Ok(TickReport {
        scenario: scenario.name.clone(),
        tick: scenario.tick,
        locations: reports,
        achievements,
        reputation: journal.reputation.entries(),
    })
}

fn resolve_location(
    services: &ScenarioServices,
    settings: CombatSettings,
    tick: u64,
    mut location: PreparedLocation,
) -> ResolvedLocation {
    let mut ledger = AchievementLedger::new();
    let mut journal = LocationJournal::default();
    let mut events: Vec<CombatEvent> = Vec::new();
    let defender = location.defender;

    let (outcome, place) = {
        let mut field = location.battlefield(tick);
        let place = field.location;
        let mut resolver = CombatResolver::new(settings, journal.collaborators(services));
        let outcome = resolver.resolve(&mut field, &mut ledger, defender, &mut events);
        (outcome, place)
    };

    let (rounds, destroyed_carriers, error) = match outcome {
        Ok(outcome) => (outcome.rounds, outcome.destroyed_carriers, None),
        Err(e) => {
            warn!(location = location.index, error = %e, "Combat aborted");
            let destroyed = location
                .carriers
                .iter()
                .filter(|c| c.is_destroyed())
                .map(|c| c.id)
                .collect();
            (events.len() as u32, destroyed, Some(e.to_string()))
        }
    };
    location
        .carriers
        .retain(|c| !destroyed_carriers.contains(&c.id));

    ResolvedLocation {
        report: LocationReport {
            index: location.index,
            location: place,
            rounds,
            events,
            destroyed_carriers,
            captures: journal.captures.captures.clone(),
            star: location.star,
            carriers: location.carriers,
            error,
        },
        ledger,
        journal,
    }
}

/// Run a single exchange between two hand-built aggregates.
#[must_use]
pub fn preview(
    defender: FleetAggregate,
    attacker: FleetAggregate,
    turn_based: bool,
) -> ExchangeResult {
    exchange(defender, attacker, turn_based, true)
}

/// Owners with carriers left at a location.
#[must_use]
pub fn surviving_owners(report: &LocationReport) -> Vec<PlayerId> {
    let mut owners: Vec<PlayerId> = report
        .carriers
        .iter()
        .filter(|c| c.ships > 0)
        .map(|c| c.owned_by_player_id)
        .collect();
    owners.sort_unstable();
    owners.dedup();
    owners
}
