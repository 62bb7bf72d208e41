//! Property-based tests for the combat core.

use proptest::prelude::*;
use stellar_core::achievements::AchievementLedger;
use stellar_core::components::{Battlefield, Carrier, PlayerId, Star};
use stellar_core::distribution::distribute_damage;
use stellar_core::exchange::exchange;
use stellar_core::math::Fixed;
use stellar_core::result::CombatEvent;
use stellar_core::settings::CombatSettings;
use stellar_test_utils::determinism::strategies::{arb_carriers, arb_fleet, arb_targets_and_kills};
use stellar_test_utils::determinism::verify_determinism;
use stellar_test_utils::fixtures::{carrier, player, star};
use stellar_test_utils::stubs::StubWorld;

const MAX_OWNERS: u64 = 4;

fn world() -> StubWorld {
    StubWorld::with_players((1..=MAX_OWNERS).map(player).collect())
        .with_weapons(2, 2)
        .with_weapons(3, 3)
}

fn resolve_space(mut carriers: Vec<Carrier>) -> (Vec<Carrier>, Vec<CombatEvent>, u32) {
    let mut world = world();
    let mut ledger = AchievementLedger::new();
    let mut events: Vec<CombatEvent> = Vec::new();
    let defender = carriers[0].owned_by_player_id;
    let rounds = {
        let mut field = Battlefield::in_space(1, 0, 0, &mut carriers);
        world
            .resolver(CombatSettings::default())
            .resolve(&mut field, &mut ledger, defender, &mut events)
            .unwrap()
            .rounds
    };
    (carriers, events, rounds)
}

fn resolve_at_star(
    garrison: Fixed,
    mut carriers: Vec<Carrier>,
) -> (Star, Vec<Carrier>, Vec<CombatEvent>) {
    let mut world = world();
    let mut ledger = AchievementLedger::new();
    let mut events: Vec<CombatEvent> = Vec::new();
    let mut target = star(1, 1, 0).with_ships_actual(garrison);
    {
        let mut field = Battlefield::at_star(1, &mut target, &mut carriers);
        world
            .resolver(CombatSettings::default())
            .resolve(&mut field, &mut ledger, PlayerId(1), &mut events)
            .unwrap();
    }
    (target, carriers, events)
}

/// Garrison with a quarter-ship fraction, defending carriers owned by
/// player 1, attackers spread over players 2 to 4.
fn arb_star_battle() -> impl Strategy<Value = (Fixed, Vec<Carrier>)> {
    (
        0u32..200,
        0u32..4,
        proptest::collection::vec(0u32..150, 0..=3),
        proptest::collection::vec((2u64..=4, 1u32..150), 1..=5),
    )
        .prop_map(|(whole, quarters, defenders, attackers)| {
            let garrison = Fixed::from_num(whole) + Fixed::from_num(quarters) / Fixed::from_num(4);
            let defending = defenders.into_iter().map(|ships| (1, ships));
            let carriers = defending
                .chain(attackers)
                .enumerate()
                .map(|(i, (owner, ships))| carrier(i as u64 + 1, owner, ships))
                .collect();
            (garrison, carriers)
        })
}

fn distinct_owners(carriers: &[Carrier]) -> usize {
    let mut owners: Vec<PlayerId> = carriers
        .iter()
        .filter(|c| c.ships > 0)
        .map(|c| c.owned_by_player_id)
        .collect();
    owners.sort_unstable();
    owners.dedup();
    owners.len()
}

proptest! {
    #[test]
    fn exchange_is_decisive(
        defender in arb_fleet(),
        attacker in arb_fleet(),
        turn_based in any::<bool>(),
    ) {
        let result = exchange(defender, attacker, turn_based, true);

        prop_assert!(result.after.defender == 0 || result.after.attacker == 0);
        prop_assert_eq!(result.before.defender, result.after.defender + result.lost.defender);
        prop_assert_eq!(result.before.attacker, result.after.attacker + result.lost.attacker);

        let needed = result.needed.unwrap();
        prop_assert!(needed.defender == 0 || needed.attacker == 0);
    }

    #[test]
    fn distribution_kills_exactly_what_was_asked(
        (ships, kills) in arb_targets_and_kills(8),
    ) {
        let mut carriers: Vec<Carrier> = ships
            .iter()
            .enumerate()
            .map(|(i, &s)| carrier(i as u64 + 1, 1, s))
            .collect();
        let mut targets: Vec<&mut Carrier> = carriers.iter_mut().collect();

        let distribution = distribute_damage(&mut targets, kills);

        prop_assert_eq!(distribution.total(), kills);
        prop_assert_eq!(distribution.shortfall, 0);
        for ((carrier, lost), before) in carriers.iter().zip(&distribution.losses).zip(&ships) {
            prop_assert_eq!(carrier.ships + lost, *before);
        }
    }

    #[test]
    fn every_round_conserves_ships(carriers in arb_carriers(10, MAX_OWNERS)) {
        let total_before: u64 = carriers.iter().map(|c| u64::from(c.ships)).sum();
        let (after, events, _) = resolve_space(carriers);
        let total_after: u64 = after.iter().map(|c| u64::from(c.ships)).sum();

        let mut lost_in_events = 0u64;
        for event in &events {
            let result = event.combat_result();
            let distributed: u32 = result.carriers.iter().map(|c| c.ships.lost).sum();
            prop_assert_eq!(distributed, result.lost.defender + result.lost.attacker);
            for snapshot in &result.carriers {
                prop_assert_eq!(snapshot.ships.before, snapshot.ships.after + snapshot.ships.lost);
            }
            lost_in_events += u64::from(distributed);
        }

        prop_assert_eq!(total_before, total_after + lost_in_events);
    }

    #[test]
    fn resolution_ends_within_one_round_per_owner(carriers in arb_carriers(12, MAX_OWNERS)) {
        let owners = distinct_owners(&carriers);
        let (_, events, rounds) = resolve_space(carriers);

        prop_assert!(rounds as usize <= owners);
        prop_assert_eq!(events.len(), rounds as usize);
    }

    #[test]
    fn resolution_is_deterministic(carriers in arb_carriers(10, MAX_OWNERS)) {
        let result = verify_determinism(3, || resolve_space(carriers.clone()));
        prop_assert!(result.is_deterministic);
    }

    #[test]
    fn star_battles_distribute_exactly_what_was_lost((garrison, carriers) in arb_star_battle()) {
        let (target, after, events) = resolve_at_star(garrison, carriers);
        prop_assert!(!events.is_empty());

        let mut star_lost_total = 0u32;
        for event in &events {
            let defender = event.context().defender.id;
            let result = event.combat_result();
            let (defending, attacking): (Vec<_>, Vec<_>) = result
                .carriers
                .iter()
                .partition(|c| c.owned_by_player_id == defender);

            let attacker_lost: u32 = attacking.iter().map(|c| c.ships.lost).sum();
            let defender_carriers_lost: u32 = defending.iter().map(|c| c.ships.lost).sum();
            let star_lost = result.star.as_ref().map_or(0, |s| s.ships.lost);

            prop_assert_eq!(attacker_lost, result.lost.attacker);
            prop_assert_eq!(defender_carriers_lost + star_lost, result.lost.defender);
            star_lost_total += star_lost;
        }

        prop_assert!(distinct_owners(&after) <= 1);
        prop_assert_eq!(target.ships_actual, garrison - Fixed::from_num(star_lost_total));
    }

    #[test]
    fn garrison_never_goes_negative(
        garrison in 0u32..100,
        attackers in proptest::collection::vec(1u32..80, 1..4),
    ) {
        let mut world = world();
        let mut ledger = AchievementLedger::new();
        let mut events: Vec<CombatEvent> = Vec::new();
        let mut target = star(1, 1, garrison);
        let mut carriers: Vec<Carrier> = attackers
            .iter()
            .enumerate()
            .map(|(i, &s)| carrier(i as u64 + 1, i as u64 % 3 + 2, s))
            .collect();

        {
            let mut field = Battlefield::at_star(1, &mut target, &mut carriers);
            world
                .resolver(CombatSettings::default())
                .resolve(&mut field, &mut ledger, PlayerId(1), &mut events)
                .unwrap();
        }

        prop_assert!(target.ships_actual >= Fixed::ZERO);
        prop_assert!(!events.is_empty());
        let first = events[0].combat_result();
        let star_lost = first.star.as_ref().map_or(0, |s| s.ships.lost);
        prop_assert!(star_lost <= garrison);
    }
}
