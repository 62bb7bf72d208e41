//! Combat policy configuration.
//!
//! Settings are plain data so a game can load them from RON alongside the
//! rest of its galaxy configuration.
//!
//! # Example RON
//!
//! ```ron
//! CombatSettings(
//!     defender_bonus: Enabled,
//!     calculate_needed: false,
//! )
//! ```

use serde::{Deserialize, Serialize};

/// Whether a star's garrison fights with one extra weapons level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DefenderBonus {
    /// Stars defend with +1 weapons.
    #[default]
    Enabled,
    /// No bonus.
    Disabled,
}

impl DefenderBonus {
    /// Weapons level added to a star's defence.
    #[must_use]
    pub const fn weapons_increment(self) -> u32 {
        match self {
            DefenderBonus::Enabled => 1,
            DefenderBonus::Disabled => 0,
        }
    }
}

/// Galaxy-wide combat settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CombatSettings {
    /// Defender bonus policy for star battles.
    #[serde(default)]
    pub defender_bonus: DefenderBonus,
    /// Attach the "ships needed" what-if to every combat result.
    #[serde(default)]
    pub calculate_needed: bool,
}

impl CombatSettings {
    /// Builder method to set the defender bonus policy.
    #[must_use]
    pub const fn with_defender_bonus(mut self, defender_bonus: DefenderBonus) -> Self {
        self.defender_bonus = defender_bonus;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defender_bonus_increment() {
        assert_eq!(DefenderBonus::Enabled.weapons_increment(), 1);
        assert_eq!(DefenderBonus::Disabled.weapons_increment(), 0);
    }

    #[test]
    fn test_parse_from_ron() {
        let settings: CombatSettings =
            ron::from_str("CombatSettings(defender_bonus: Disabled)").unwrap();
        assert_eq!(settings.defender_bonus, DefenderBonus::Disabled);
        assert!(!settings.calculate_needed);
    }
}
