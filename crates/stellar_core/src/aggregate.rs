//! Builds the two aggregate fleets of a battle and runs the exchange.
//!
//! Star battles add the floored garrison and the defender bonus to the
//! defending side and are turn-based. Carrier battles in open space are
//! simultaneous. Both apply the opposing side's weapons debuff and never
//! let a side fight with less than weapons level 1.
//!
//! A side whose total ships do not fit in a `u32` is rejected before the
//! exchange runs, so reported losses always match what gets distributed.

use crate::components::{Carrier, Player, Star};
use crate::error::{CombatError, Result};
use crate::exchange::{exchange, ExchangeResult, FleetAggregate};
use crate::services::WeaponsOracle;
use crate::settings::CombatSettings;

/// Minimum weapons level any side fights with.
pub const MIN_WEAPONS_LEVEL: u32 = 1;

/// Total ships aboard a set of carriers, plus any extra ships (the star's
/// garrison) fighting on the same side.
///
/// # Errors
/// Returns [`CombatError::InvalidState`] when the total does not fit in a
/// `u32`.
pub fn side_ships(carriers: &[&Carrier], extra: u32) -> Result<u32> {
    let carried: u64 = carriers.iter().map(|c| u64::from(c.ships)).sum();
    let total = carried + u64::from(extra);
    u32::try_from(total)
        .map_err(|_| CombatError::InvalidState(format!("side of {total} ships is too large")))
}

fn apply_debuff(weapons_level: u32, debuff: u32) -> u32 {
    weapons_level.saturating_sub(debuff).max(MIN_WEAPONS_LEVEL)
}

/// Resolve a battle at a star.
///
/// The defending side is the star's garrison plus the defender's carriers;
/// the attacking side is every attacking carrier combined.
pub fn resolve_star(
    settings: &CombatSettings,
    weapons: &dyn WeaponsOracle,
    star: &Star,
    defender: &Player,
    attackers: &[Player],
    defender_carriers: &[&Carrier],
    attacker_carriers: &[&Carrier],
) -> Result<ExchangeResult> {
    let defender_ships = side_ships(defender_carriers, star.ships())?;
    let attacker_ships = side_ships(attacker_carriers, 0)?;

    let defender_weapons = weapons
        .star_effective_weapons_level(defender, star, defender_carriers)
        .saturating_add(settings.defender_bonus.weapons_increment());
    let attacker_weapons =
        weapons.carriers_effective_weapons_level(attackers, attacker_carriers, true);

    let defender_debuff = weapons.carriers_weapons_debuff(attacker_carriers);
    let attacker_debuff = weapons.carriers_weapons_debuff(defender_carriers);

    Ok(exchange(
        FleetAggregate::new(defender_ships, apply_debuff(defender_weapons, defender_debuff)),
        FleetAggregate::new(attacker_ships, apply_debuff(attacker_weapons, attacker_debuff)),
        true,
        settings.calculate_needed,
    ))
}

/// Resolve a carrier-only battle in open space.
pub fn resolve_carrier(
    settings: &CombatSettings,
    weapons: &dyn WeaponsOracle,
    defender: &Player,
    attackers: &[Player],
    defender_carriers: &[&Carrier],
    attacker_carriers: &[&Carrier],
) -> Result<ExchangeResult> {
    let defender_ships = side_ships(defender_carriers, 0)?;
    let attacker_ships = side_ships(attacker_carriers, 0)?;

    let defender_weapons = weapons.carriers_effective_weapons_level(
        std::slice::from_ref(defender),
        defender_carriers,
        false,
    );
    let attacker_weapons =
        weapons.carriers_effective_weapons_level(attackers, attacker_carriers, false);

    let defender_debuff = weapons.carriers_weapons_debuff(attacker_carriers);
    let attacker_debuff = weapons.carriers_weapons_debuff(defender_carriers);

    Ok(exchange(
        FleetAggregate::new(defender_ships, apply_debuff(defender_weapons, defender_debuff)),
        FleetAggregate::new(attacker_ships, apply_debuff(attacker_weapons, attacker_debuff)),
        false,
        settings.calculate_needed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CarrierId, PlayerId, SpecialistId, StarId, UserId};
    use crate::exchange::SidePair;
    use crate::math::Fixed;
    use crate::settings::DefenderBonus;

    /// Level 2 for everyone, +1 for a specialist aboard, debuff 3 per
    /// specialist 99.
    struct FlatWeapons;

    impl WeaponsOracle for FlatWeapons {
        fn star_effective_weapons_level(
            &self,
            _defender: &Player,
            star: &Star,
            _defender_carriers: &[&Carrier],
        ) -> u32 {
            2 + u32::from(star.specialist_id.is_some())
        }

        fn carriers_effective_weapons_level(
            &self,
            _players: &[Player],
            carriers: &[&Carrier],
            _at_star: bool,
        ) -> u32 {
            2 + u32::from(carriers.iter().any(|c| c.specialist_id.is_some()))
        }

        fn carriers_weapons_debuff(&self, carriers: &[&Carrier]) -> u32 {
            3 * carriers
                .iter()
                .filter(|c| c.specialist_id == Some(SpecialistId(99)))
                .count() as u32
        }
    }

    fn players() -> (Player, Vec<Player>) {
        (
            Player::new(PlayerId(1), UserId(1), "Defender"),
            vec![Player::new(PlayerId(2), UserId(2), "Attacker")],
        )
    }

    #[test]
    fn test_star_battle_includes_garrison_and_bonus() {
        let (defender, attackers) = players();
        let star = Star::new(StarId(1), PlayerId(1), 0).with_ships_actual(Fixed::from_num(6.8));
        let guard = Carrier::new(CarrierId(1), PlayerId(1), 4);
        let raider = Carrier::new(CarrierId(2), PlayerId(2), 9);

        let result = resolve_star(
            &CombatSettings::default(),
            &FlatWeapons,
            &star,
            &defender,
            &attackers,
            &[&guard],
            &[&raider],
        )
        .unwrap();

        assert_eq!(result.before, SidePair::new(10, 9));
        assert_eq!(result.weapons, SidePair::new(3, 2));
    }

    #[test]
    fn test_star_battle_without_defender_bonus() {
        let (defender, attackers) = players();
        let star = Star::new(StarId(1), PlayerId(1), 5);
        let raider = Carrier::new(CarrierId(2), PlayerId(2), 9);
        let settings = CombatSettings::default().with_defender_bonus(DefenderBonus::Disabled);

        let result =
            resolve_star(&settings, &FlatWeapons, &star, &defender, &attackers, &[], &[&raider])
                .unwrap();

        assert_eq!(result.weapons, SidePair::new(2, 2));
    }

    #[test]
    fn test_debuff_clamps_to_one() {
        let (defender, attackers) = players();
        let guard = Carrier::new(CarrierId(1), PlayerId(1), 4);
        let jammer = Carrier::new(CarrierId(2), PlayerId(2), 4).with_specialist(SpecialistId(99));

        let result = resolve_carrier(
            &CombatSettings::default(),
            &FlatWeapons,
            &defender,
            &attackers,
            &[&guard],
            &[&jammer],
        )
        .unwrap();

        // Defender: 2 - 3 clamps to 1. Attacker: 2 + 1 for the specialist.
        assert_eq!(result.weapons, SidePair::new(1, 3));
    }

    #[test]
    fn test_carrier_battle_is_simultaneous() {
        let (defender, attackers) = players();
        let guard = Carrier::new(CarrierId(1), PlayerId(1), 10);
        let raider = Carrier::new(CarrierId(2), PlayerId(2), 10);

        let result = resolve_carrier(
            &CombatSettings::default(),
            &FlatWeapons,
            &defender,
            &attackers,
            &[&guard],
            &[&raider],
        )
        .unwrap();

        assert_eq!(result.after, SidePair::new(0, 0));
    }

    #[test]
    fn test_needed_follows_settings() {
        let (defender, attackers) = players();
        let guard = Carrier::new(CarrierId(1), PlayerId(1), 10);
        let raider = Carrier::new(CarrierId(2), PlayerId(2), 3);
        let settings = CombatSettings {
            calculate_needed: true,
            ..CombatSettings::default()
        };

        let result =
            resolve_carrier(&settings, &FlatWeapons, &defender, &attackers, &[&guard], &[&raider])
                .unwrap();

        assert!(result.needed.is_some());
    }

    #[test]
    fn test_oversized_side_is_rejected() {
        let (defender, attackers) = players();
        let star = Star::new(StarId(1), PlayerId(1), 10);
        let guard = Carrier::new(CarrierId(1), PlayerId(1), u32::MAX);
        let raider = Carrier::new(CarrierId(2), PlayerId(2), 9);

        let err = resolve_star(
            &CombatSettings::default(),
            &FlatWeapons,
            &star,
            &defender,
            &attackers,
            &[&guard],
            &[&raider],
        )
        .unwrap_err();

        assert!(matches!(err, CombatError::InvalidState(_)));
    }

    #[test]
    fn test_side_ships_at_the_limit() {
        let a = Carrier::new(CarrierId(1), PlayerId(1), u32::MAX - 5);
        let b = Carrier::new(CarrierId(2), PlayerId(1), 5);

        assert_eq!(side_ships(&[&a, &b], 0), Ok(u32::MAX));
        assert!(side_ships(&[&a, &b], 1).is_err());
    }
}
