//! Combat participants and their identifiers.
//!
//! Carriers and stars are long-lived entities owned by the game world. The
//! combat core only borrows them for the duration of one resolution and
//! mutates their ship counts; their identity never changes here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::distribution::Damageable;
use crate::math::{fixed_serde, floor_ships, Fixed};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

id_type!(
    /// Unique identifier for a player in a game.
    PlayerId,
    "player"
);
id_type!(
    /// Unique identifier for the user account behind a player.
    UserId,
    "user"
);
id_type!(
    /// Unique identifier for a carrier.
    CarrierId,
    "carrier"
);
id_type!(
    /// Unique identifier for a star.
    StarId,
    "star"
);
id_type!(
    /// Identifier of a specialist type.
    SpecialistId,
    "specialist"
);

/// A player taking part in the game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Player identifier.
    pub id: PlayerId,
    /// User account controlling the player, if any.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Display name.
    #[serde(default)]
    pub alias: String,
    /// Defeated players no longer accrue achievements.
    #[serde(default)]
    pub defeated: bool,
}

impl Player {
    /// Create an active player bound to a user.
    #[must_use]
    pub fn new(id: PlayerId, user_id: UserId, alias: impl Into<String>) -> Self {
        Self {
            id,
            user_id: Some(user_id),
            alias: alias.into(),
            defeated: false,
        }
    }
}

/// A mobile fleet unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Carrier {
    /// Carrier identifier.
    pub id: CarrierId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Owning player.
    pub owned_by_player_id: PlayerId,
    /// Ships aboard.
    pub ships: u32,
    /// Specialist aboard, if any.
    #[serde(default)]
    pub specialist_id: Option<SpecialistId>,
    /// Gift carriers are in transit to another player and never fight.
    #[serde(default)]
    pub is_gift: bool,
}

impl Carrier {
    /// Create a carrier with no specialist.
    #[must_use]
    pub fn new(id: CarrierId, owner: PlayerId, ships: u32) -> Self {
        Self {
            id,
            name: format!("Carrier {}", id.0),
            owned_by_player_id: owner,
            ships,
            specialist_id: None,
            is_gift: false,
        }
    }

    /// Builder method to attach a specialist.
    #[must_use]
    pub fn with_specialist(mut self, specialist: SpecialistId) -> Self {
        self.specialist_id = Some(specialist);
        self
    }

    /// Builder method to mark the carrier as a gift.
    #[must_use]
    pub fn as_gift(mut self) -> Self {
        self.is_gift = true;
        self
    }

    /// Whether this carrier takes part in combat.
    #[must_use]
    pub fn can_fight(&self) -> bool {
        self.ships > 0 && !self.is_gift
    }

    /// Whether this carrier has been wiped out.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.ships == 0
    }
}

impl Damageable for Carrier {
    fn ships(&self) -> u32 {
        self.ships
    }

    fn remove_ships(&mut self, killed: u32) {
        self.ships = self.ships.saturating_sub(killed);
    }
}

/// A stationary combat participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Star {
    /// Star identifier.
    pub id: StarId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Owning player, `None` for unclaimed stars.
    pub owned_by_player_id: Option<PlayerId>,
    /// Fractional garrison accumulator. Floored for combat.
    #[serde(with = "fixed_serde")]
    pub ships_actual: Fixed,
    /// Specialist stationed at the star, if any.
    #[serde(default)]
    pub specialist_id: Option<SpecialistId>,
}

impl Star {
    /// Create an owned star with a whole-number garrison.
    #[must_use]
    pub fn new(id: StarId, owner: PlayerId, ships: u32) -> Self {
        Self {
            id,
            name: format!("Star {}", id.0),
            owned_by_player_id: Some(owner),
            ships_actual: Fixed::from_num(ships),
            specialist_id: None,
        }
    }

    /// Builder method to set a fractional garrison.
    #[must_use]
    pub fn with_ships_actual(mut self, ships_actual: Fixed) -> Self {
        self.ships_actual = ships_actual;
        self
    }

    /// Whole ships available for combat.
    #[must_use]
    pub fn ships(&self) -> u32 {
        floor_ships(self.ships_actual)
    }
}

impl Damageable for Star {
    fn ships(&self) -> u32 {
        Star::ships(self)
    }

    fn remove_ships(&mut self, killed: u32) {
        let remaining = self.ships_actual.saturating_sub(Fixed::saturating_from_num(killed));
        self.ships_actual = remaining.max(Fixed::ZERO);
    }
}

/// Where a battle takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// At a star; the star's garrison defends.
    Star(StarId),
    /// Open space between stars, keyed by the coordinates the carriers share.
    Space {
        /// X coordinate.
        x: i64,
        /// Y coordinate.
        y: i64,
    },
}

/// Exclusive access to everything present at one contested location.
///
/// The caller hands over the location's carriers and star for the duration
/// of one resolution. Destroyed carriers stay in `carriers` with zero ships;
/// their ids are reported back so the caller can remove them from the world.
#[derive(Debug)]
pub struct Battlefield<'a> {
    /// Where the fight happens.
    pub location: Location,
    /// Game tick of the fight.
    pub tick: u64,
    /// The star at the location, if the battle is at a star.
    pub star: Option<&'a mut Star>,
    /// Every carrier present at the location.
    pub carriers: &'a mut [Carrier],
}

impl<'a> Battlefield<'a> {
    /// A battle at a star.
    pub fn at_star(tick: u64, star: &'a mut Star, carriers: &'a mut [Carrier]) -> Self {
        Self {
            location: Location::Star(star.id),
            tick,
            star: Some(star),
            carriers,
        }
    }

    /// A carrier-only battle in open space.
    pub fn in_space(tick: u64, x: i64, y: i64, carriers: &'a mut [Carrier]) -> Self {
        Self {
            location: Location::Space { x, y },
            tick,
            star: None,
            carriers,
        }
    }

    /// Whether the star's garrison takes part.
    #[must_use]
    pub fn is_star_battle(&self) -> bool {
        self.star.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carrier_can_fight() {
        let carrier = Carrier::new(CarrierId(1), PlayerId(1), 5);
        assert!(carrier.can_fight());
        assert!(!carrier.clone().as_gift().can_fight());

        let empty = Carrier::new(CarrierId(2), PlayerId(1), 0);
        assert!(!empty.can_fight());
        assert!(empty.is_destroyed());
    }

    #[test]
    fn test_star_floors_fractional_garrison() {
        let star = Star::new(StarId(1), PlayerId(1), 0).with_ships_actual(Fixed::from_num(4.9));
        assert_eq!(star.ships(), 4);
    }

    #[test]
    fn test_star_losses_keep_fraction() {
        let mut star =
            Star::new(StarId(1), PlayerId(1), 0).with_ships_actual(Fixed::from_num(4.5));
        star.remove_ships(3);
        assert_eq!(star.ships_actual, Fixed::from_num(1.5));
        assert_eq!(Damageable::ships(&star), 1);
    }

    #[test]
    fn test_battlefield_kind() {
        let mut star = Star::new(StarId(1), PlayerId(1), 3);
        let mut carriers = vec![Carrier::new(CarrierId(1), PlayerId(2), 4)];

        assert!(Battlefield::at_star(1, &mut star, &mut carriers).is_star_battle());
        assert!(!Battlefield::in_space(1, 5, 5, &mut carriers).is_star_battle());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(PlayerId(3).to_string(), "player#3");
        assert_eq!(CarrierId(12).to_string(), "carrier#12");
    }
}
