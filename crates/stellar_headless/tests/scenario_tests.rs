//! End-to-end tests over the bundled scenario files.

use std::path::PathBuf;

use stellar_core::components::{CarrierId, UserId};
use stellar_headless::runner::{run_tick, TickReport};
use stellar_headless::scenario::{Scenario, ScenarioError};
use stellar_test_utils::determinism::verify_parallel_determinism;

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

#[test]
fn bundled_border_skirmish_matches_builtin() {
    let from_file = Scenario::load(scenario_path("border_skirmish.ron")).unwrap();
    let builtin = Scenario::border_skirmish();

    assert_eq!(
        run_tick(&from_file).unwrap(),
        run_tick(&builtin).unwrap()
    );
}

#[test]
fn nebula_brawl_leaves_gifts_alone() {
    let scenario = Scenario::load(scenario_path("nebula_brawl.ron")).unwrap();
    let report = run_tick(&scenario).unwrap();

    let brawl = &report.locations[0];
    assert!(brawl.rounds >= 1);
    assert!(!brawl.destroyed_carriers.contains(&CarrierId(24)));
    let convoy = brawl
        .carriers
        .iter()
        .find(|c| c.id == CarrierId(24))
        .unwrap();
    assert_eq!(convoy.ships, 40);

    // Gifts appear in the opening round's snapshots without taking losses,
    // and are not carried into later rounds.
    let opening = brawl.events[0].combat_result();
    assert_eq!(opening.carrier(CarrierId(24)).unwrap().ships.lost, 0);
    for event in &brawl.events[1..] {
        assert!(event.combat_result().carrier(CarrierId(24)).is_none());
    }
    assert!(brawl
        .events
        .iter()
        .all(|e| e.combat_result().needed.is_some()));
}

#[test]
fn defeated_players_are_left_out_of_achievements() {
    let scenario = Scenario::load(scenario_path("nebula_brawl.ron")).unwrap();
    let report = run_tick(&scenario).unwrap();

    assert!(report.achievements.get(UserId(14)).is_none());
    assert!(report.achievements.get(UserId(11)).is_some());
}

#[test]
fn reports_are_identical_across_threads() {
    let scenario = Scenario::load(scenario_path("nebula_brawl.ron")).unwrap();
    let result = verify_parallel_determinism(4, || {
        serde_json::to_string(&run_tick(&scenario).unwrap()).unwrap()
    });
    result.assert_deterministic();
}

#[test]
fn written_scenario_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let scenario_file = dir.path().join("skirmish.ron");
    let ron = ron::ser::to_string_pretty(&Scenario::border_skirmish(), Default::default()).unwrap();
    std::fs::write(&scenario_file, ron).unwrap();

    let loaded = Scenario::load(&scenario_file).unwrap();
    let report = run_tick(&loaded).unwrap();

    let report_file = dir.path().join("out").join("tick.json");
    report.save(&report_file).unwrap();
    assert_eq!(TickReport::load(&report_file).unwrap(), report);
}

#[test]
fn malformed_scenario_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ron");
    std::fs::write(&path, "Scenario(name: ").unwrap();

    assert!(matches!(
        Scenario::load(&path),
        Err(ScenarioError::ParseError(_))
    ));
}
