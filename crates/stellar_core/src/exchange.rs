//! Closed-form volley exchange between two aggregate fleets.
//!
//! Combat proceeds in discrete turns. Every surviving ship on each side fires
//! once per turn and each shot destroys `weapons_level` enemy ships. The side
//! that needs fewer turns to annihilate the other wins; the defender wins
//! ties. In turn-based combat the defender also fires one bonus volley
//! before the attacker can retaliate.
//!
//! Formula:
//! ```text
//! defender_turns = ceil(attacker.ships / defender.weapons)
//! attacker_turns = ceil(defender.ships / attacker.weapons)
//!
//! defender_turns <= attacker_turns:
//!     attacker_after = 0
//!     defender_after = defender.ships - (defender_turns - bonus) * attacker.weapons
//! otherwise:
//!     defender_after = 0
//!     attacker_after = attacker.ships - attacker_turns * defender.weapons
//! ```
//! Remaining ships are clamped at zero.

use serde::{Deserialize, Serialize};

/// Scalar summary of one side of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FleetAggregate {
    /// Total ships on the side.
    pub ships: u32,
    /// Ships destroyed per surviving ship per turn. Must be at least 1.
    pub weapons_level: u32,
}

impl FleetAggregate {
    /// Create a new aggregate.
    #[must_use]
    pub const fn new(ships: u32, weapons_level: u32) -> Self {
        Self {
            ships,
            weapons_level,
        }
    }
}

/// A value reported for each side of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SidePair {
    /// Value for the defending side.
    pub defender: u32,
    /// Value for the attacking side.
    pub attacker: u32,
}

impl SidePair {
    /// Create a new pair.
    #[must_use]
    pub const fn new(defender: u32, attacker: u32) -> Self {
        Self { defender, attacker }
    }
}

/// Outcome of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExchangeResult {
    /// Weapons levels used by each side.
    pub weapons: SidePair,
    /// Ships before the exchange.
    pub before: SidePair,
    /// Ships after the exchange.
    pub after: SidePair,
    /// Ships lost (`before - after`).
    pub lost: SidePair,
    /// Smallest opposing force that would have flipped the outcome, when
    /// requested. The winning side's entry is always zero.
    pub needed: Option<SidePair>,
}

impl ExchangeResult {
    /// Whether the defending side survived the exchange.
    #[must_use]
    pub fn defender_won(&self) -> bool {
        self.after.attacker == 0 && (self.after.defender > 0 || self.before.attacker == 0)
    }
}

/// Compute the outcome of a volley exchange between two aggregates.
///
/// Weapons levels below 1 are treated as 1. The function is pure.
///
/// # Arguments
/// * `defender` - The defending aggregate
/// * `attacker` - The attacking aggregate
/// * `turn_based` - Grant the defender one bonus volley
/// * `calculate_needed` - Populate [`ExchangeResult::needed`]
#[must_use]
pub fn exchange(
    defender: FleetAggregate,
    attacker: FleetAggregate,
    turn_based: bool,
    calculate_needed: bool,
) -> ExchangeResult {
    let defend_power = u64::from(defender.weapons_level.max(1));
    let attack_power = u64::from(attacker.weapons_level.max(1));
    let defender_ships = u64::from(defender.ships);
    let attacker_ships = u64::from(attacker.ships);
    let bonus_turns = u64::from(turn_based);

    let defender_turns = attacker_ships.div_ceil(defend_power);
    let attacker_turns = defender_ships.div_ceil(attack_power);

    let (defender_after, attacker_after, needed) = if defender_turns <= attacker_turns {
        let absorbed = defender_turns.saturating_sub(bonus_turns) * attack_power;
        let needed = SidePair::new(0, saturate(attacker_turns * defend_power + 1));
        (defender_ships.saturating_sub(absorbed), 0, needed)
    } else {
        let absorbed = attacker_turns * defend_power;
        let needed = SidePair::new(
            saturate((defender_turns - bonus_turns) * attack_power + bonus_turns),
            0,
        );
        (0, attacker_ships.saturating_sub(absorbed), needed)
    };

    let before = SidePair::new(defender.ships, attacker.ships);
    let after = SidePair::new(saturate(defender_after), saturate(attacker_after));

    ExchangeResult {
        weapons: SidePair::new(saturate(defend_power), saturate(attack_power)),
        before,
        after,
        lost: SidePair::new(
            before.defender - after.defender,
            before.attacker - after.attacker,
        ),
        needed: calculate_needed.then_some(needed),
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_based_defender_wins() {
        let result = exchange(FleetAggregate::new(10, 1), FleetAggregate::new(5, 1), true, false);

        assert_eq!(result.after, SidePair::new(6, 0));
        assert_eq!(result.lost, SidePair::new(4, 5));
        assert!(result.defender_won());
        assert_eq!(result.needed, None);
    }

    #[test]
    fn test_turn_based_tie_goes_to_defender() {
        let result = exchange(FleetAggregate::new(10, 1), FleetAggregate::new(10, 1), true, false);

        assert_eq!(result.after, SidePair::new(1, 0));
        assert_eq!(result.lost, SidePair::new(9, 10));
    }

    #[test]
    fn test_symmetric_wipe_without_bonus_turn() {
        let result =
            exchange(FleetAggregate::new(10, 1), FleetAggregate::new(10, 1), false, false);

        assert_eq!(result.after, SidePair::new(0, 0));
        assert_eq!(result.lost, SidePair::new(10, 10));
    }

    #[test]
    fn test_attacker_wins() {
        // Defender needs 20 turns, attacker needs 2.
        let result = exchange(FleetAggregate::new(6, 1), FleetAggregate::new(20, 3), true, false);

        assert_eq!(result.after.defender, 0);
        assert_eq!(result.after.attacker, 20 - 2);
        assert!(!result.defender_won());
    }

    #[test]
    fn test_remaining_is_clamped_at_zero() {
        // Both sides need a single turn; the defender's remainder clamps to zero.
        let result = exchange(FleetAggregate::new(2, 5), FleetAggregate::new(5, 10), false, false);

        assert_eq!(result.after, SidePair::new(0, 0));
        assert_eq!(result.lost, SidePair::new(2, 5));
    }

    #[test]
    fn test_zero_weapons_treated_as_one() {
        let result = exchange(FleetAggregate::new(3, 0), FleetAggregate::new(1, 0), true, false);

        assert_eq!(result.weapons, SidePair::new(1, 1));
        assert_eq!(result.after, SidePair::new(3, 0));
    }

    #[test]
    fn test_needed_when_defender_wins() {
        let result = exchange(FleetAggregate::new(10, 2), FleetAggregate::new(5, 1), true, true);

        // Attacker needs 10 turns; beating that takes 10 * 2 + 1 attackers.
        assert_eq!(result.needed, Some(SidePair::new(0, 21)));
    }

    #[test]
    fn test_needed_when_attacker_wins() {
        let result = exchange(FleetAggregate::new(4, 1), FleetAggregate::new(20, 2), true, true);

        // Defender needs 20 turns; (20 - 1) * 2 + 1 defenders hold the star.
        assert_eq!(result.needed, Some(SidePair::new(39, 0)));
    }

    #[test]
    fn test_empty_attacker() {
        let result = exchange(FleetAggregate::new(4, 1), FleetAggregate::new(0, 1), true, false);

        assert_eq!(result.after, SidePair::new(4, 0));
        assert_eq!(result.lost, SidePair::new(0, 0));
        assert!(result.defender_won());
    }

    #[test]
    fn test_determinism() {
        let defender = FleetAggregate::new(777, 3);
        let attacker = FleetAggregate::new(912, 2);

        for _ in 0..100 {
            let first = exchange(defender, attacker, true, true);
            let second = exchange(defender, attacker, true, true);
            assert_eq!(first, second);
        }
    }
}
