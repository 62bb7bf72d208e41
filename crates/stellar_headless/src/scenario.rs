//! Scenario loading and configuration.
//!
//! A scenario is one tick's worth of contested locations: the players
//! involved, their weapons technology, the specialists in play and every
//! location where hostile carriers meet.
//!
//! # Example RON
//!
//! ```ron
//! Scenario(
//!     name: "Border skirmish",
//!     description: "Two empires collide over a frontier star",
//!     tick: 120,
//!     settings: CombatSettings(defender_bonus: Enabled, calculate_needed: true),
//!     players: [
//!         Player(id: 1, user_id: Some(1), alias: "Vega"),
//!         Player(id: 2, user_id: Some(2), alias: "Orion"),
//!     ],
//!     weapons: {1: 3, 2: 2},
//!     specialists: [
//!         SpecialistSetup(id: 1, name: "Admiral", weapons_bonus: 1),
//!     ],
//!     locations: [
//!         LocationSetup(
//!             star: Some(StarSetup(id: 10, name: "Frontier", owner: Some(1), garrison: "12.5")),
//!             carriers: [
//!                 Carrier(id: 1, owned_by_player_id: 2, ships: 30, specialist_id: Some(1)),
//!             ],
//!         ),
//!     ],
//! )
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stellar_core::components::{
    Battlefield, Carrier, CarrierId, Player, PlayerId, SpecialistId, Star, StarId, UserId,
};
use stellar_core::math::Fixed;
use stellar_core::settings::CombatSettings;
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The scenario parsed but is inconsistent.
    #[error("Invalid scenario: {0}")]
    Invalid(String),
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Game tick the battles happen on.
    #[serde(default)]
    pub tick: u64,
    /// Combat policy.
    #[serde(default)]
    pub settings: CombatSettings,
    /// Every player referenced by a star or carrier.
    pub players: Vec<Player>,
    /// Weapons technology per player. Missing players fight at level 1.
    #[serde(default)]
    pub weapons: BTreeMap<PlayerId, u32>,
    /// Specialists that may appear aboard carriers or at stars.
    #[serde(default)]
    pub specialists: Vec<SpecialistSetup>,
    /// Contested locations.
    pub locations: Vec<LocationSetup>,
}

/// A specialist type and its combat modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialistSetup {
    /// Specialist identifier.
    pub id: SpecialistId,
    /// Display name.
    pub name: String,
    /// Weapons levels added to the side it fights for.
    #[serde(default)]
    pub weapons_bonus: u32,
    /// Weapons levels taken from the opposing side.
    #[serde(default)]
    pub weapons_debuff: u32,
}

/// A star as written in a scenario file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarSetup {
    /// Star identifier.
    pub id: StarId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Owning player.
    #[serde(default)]
    pub owner: Option<PlayerId>,
    /// Garrison as a decimal string, e.g. `"12.5"`.
    #[serde(default = "zero_garrison")]
    pub garrison: String,
    /// Specialist stationed at the star.
    #[serde(default)]
    pub specialist: Option<SpecialistId>,
}

fn zero_garrison() -> String {
    "0".to_string()
}

impl StarSetup {
    /// Build the star this setup describes.
    pub fn build(&self) -> Result<Star, ScenarioError> {
        let ships_actual = Fixed::from_str(self.garrison.trim()).map_err(|e| {
            ScenarioError::Invalid(format!(
                "star {} has unreadable garrison {:?}: {e}",
                self.id, self.garrison
            ))
        })?;
        if ships_actual < Fixed::ZERO {
            return Err(ScenarioError::Invalid(format!(
                "star {} has a negative garrison",
                self.id
            )));
        }

        Ok(Star {
            id: self.id,
            name: self.name.clone(),
            owned_by_player_id: self.owner,
            ships_actual,
            specialist_id: self.specialist,
        })
    }
}

/// One contested location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSetup {
    /// The star at the location; `None` for open space.
    #[serde(default)]
    pub star: Option<StarSetup>,
    /// Coordinates of an open-space location.
    #[serde(default)]
    pub position: (i64, i64),
    /// Player defending the first round. Defaults to the star's owner, then
    /// to the owner of the first carrier listed.
    #[serde(default)]
    pub defender: Option<PlayerId>,
    /// Every carrier present.
    pub carriers: Vec<Carrier>,
}

impl LocationSetup {
    /// The player defending the first round, if anyone is present.
    #[must_use]
    pub fn initial_defender(&self) -> Option<PlayerId> {
        self.defender
            .or_else(|| self.star.as_ref().and_then(|s| s.owner))
            .or_else(|| self.carriers.first().map(|c| c.owned_by_player_id))
    }
}

/// A location ready to be resolved: owned star and carriers plus the
/// first defender.
#[derive(Debug, Clone)]
pub struct PreparedLocation {
    /// Index of the location in the scenario.
    pub index: usize,
    /// The star, for star battles.
    pub star: Option<Star>,
    /// Open-space coordinates.
    pub position: (i64, i64),
    /// Carriers present.
    pub carriers: Vec<Carrier>,
    /// First defender.
    pub defender: PlayerId,
}

impl PreparedLocation {
    /// Borrow the location as a battlefield for `tick`.
    pub fn battlefield(&mut self, tick: u64) -> Battlefield<'_> {
        match self.star.as_mut() {
            Some(star) => Battlefield::at_star(tick, star, &mut self.carriers),
            None => {
                let (x, y) = self.position;
                Battlefield::in_space(tick, x, y, &mut self.carriers)
            }
        }
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check ids are unique and every reference resolves.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut players = BTreeSet::new();
        let mut users: BTreeSet<UserId> = BTreeSet::new();
        for player in &self.players {
            if !players.insert(player.id) {
                return Err(ScenarioError::Invalid(format!("duplicate {}", player.id)));
            }
            if let Some(user) = player.user_id {
                if !users.insert(user) {
                    return Err(ScenarioError::Invalid(format!(
                        "{user} controls more than one player"
                    )));
                }
            }
        }

        let specialists: BTreeSet<SpecialistId> = self.specialists.iter().map(|s| s.id).collect();
        if specialists.len() != self.specialists.len() {
            return Err(ScenarioError::Invalid("duplicate specialist id".into()));
        }
        let check_specialist = |id: Option<SpecialistId>| match id {
            Some(id) if !specialists.contains(&id) => {
                Err(ScenarioError::Invalid(format!("unknown {id}")))
            }
            _ => Ok(()),
        };
        let check_player = |id: PlayerId| {
            if players.contains(&id) {
                Ok(())
            } else {
                Err(ScenarioError::Invalid(format!("unknown {id}")))
            }
        };

        let mut carriers = BTreeSet::new();
        let mut stars = BTreeSet::new();
        for location in &self.locations {
            if let Some(star) = &location.star {
                if !stars.insert(star.id) {
                    return Err(ScenarioError::Invalid(format!("duplicate {}", star.id)));
                }
                if let Some(owner) = star.owner {
                    check_player(owner)?;
                }
                check_specialist(star.specialist)?;
                star.build()?;
            }
            if let Some(defender) = location.defender {
                check_player(defender)?;
            }
            for carrier in &location.carriers {
                if !carriers.insert(carrier.id) {
                    return Err(ScenarioError::Invalid(format!("duplicate {}", carrier.id)));
                }
                check_player(carrier.owned_by_player_id)?;
                check_specialist(carrier.specialist_id)?;
            }
        }

        for player in self.weapons.keys() {
            check_player(*player)?;
        }

        Ok(())
    }

    /// Build every location that has someone to defend it.
    pub fn prepare_locations(&self) -> Result<Vec<PreparedLocation>, ScenarioError> {
        let mut prepared = Vec::with_capacity(self.locations.len());
        for (index, location) in self.locations.iter().enumerate() {
            let Some(defender) = location.initial_defender() else {
                tracing::debug!(location = index, "Skipping empty location");
                continue;
            };
            let star = location.star.as_ref().map(StarSetup::build).transpose()?;
            prepared.push(PreparedLocation {
                index,
                star,
                position: location.position,
                carriers: location.carriers.clone(),
                defender,
            });
        }
        Ok(prepared)
    }

    /// A three-way fight over a single star.
    #[must_use]
    pub fn border_skirmish() -> Self {
        Self {
            name: "Border skirmish".to_string(),
            description: "Two raiders hit a frontier star while a third fleet passes by"
                .to_string(),
            tick: 120,
            settings: CombatSettings::default(),
            players: vec![
                Player::new(PlayerId(1), UserId(1), "Vega"),
                Player::new(PlayerId(2), UserId(2), "Orion"),
                Player::new(PlayerId(3), UserId(3), "Lyra"),
            ],
            weapons: BTreeMap::from([(PlayerId(1), 3), (PlayerId(2), 2), (PlayerId(3), 2)]),
            specialists: vec![SpecialistSetup {
                id: SpecialistId(1),
                name: "Admiral".to_string(),
                weapons_bonus: 1,
                weapons_debuff: 0,
            }],
            locations: vec![
                LocationSetup {
                    star: Some(StarSetup {
                        id: StarId(10),
                        name: "Frontier".to_string(),
                        owner: Some(PlayerId(1)),
                        garrison: "12.5".to_string(),
                        specialist: None,
                    }),
                    position: (0, 0),
                    defender: None,
                    carriers: vec![
                        Carrier::new(CarrierId(1), PlayerId(1), 8),
                        Carrier::new(CarrierId(2), PlayerId(2), 40)
                            .with_specialist(SpecialistId(1)),
                        Carrier::new(CarrierId(3), PlayerId(3), 15),
                    ],
                },
                LocationSetup {
                    star: None,
                    position: (250, -80),
                    defender: Some(PlayerId(3)),
                    carriers: vec![
                        Carrier::new(CarrierId(4), PlayerId(3), 6),
                        Carrier::new(CarrierId(5), PlayerId(2), 9),
                    ],
                },
            ],
        }
    }
}
