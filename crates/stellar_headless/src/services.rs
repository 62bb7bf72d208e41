//! Table-driven collaborators backed by a [`Scenario`].
//!
//! [`ScenarioServices`] answers the read-only lookups (weapons, specialists,
//! players) and is shared by every location of a tick. Star captures and
//! reputation changes go to a [`LocationJournal`], one per location, so
//! locations can be resolved in parallel and their journals applied in
//! location order afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stellar_core::components::{Carrier, Player, PlayerId, SpecialistId, Star};
use stellar_core::error::{CombatError, Result};
use stellar_core::services::{
    CaptureContext, CaptureResult, Collaborators, PlayerDirectory, ReputationLedger,
    SpecialistDirectory, SpecialistSummary, StarCapture, WeaponsOracle,
};

use crate::scenario::{Scenario, SpecialistSetup};

/// Reputation lost per hostile encounter.
pub const HOSTILE_REPUTATION_PENALTY: i32 = 1;

/// Weapons, specialist and player lookups for one scenario.
#[derive(Debug, Clone, Default)]
pub struct ScenarioServices {
    players: BTreeMap<PlayerId, Player>,
    weapons: BTreeMap<PlayerId, u32>,
    specialists: BTreeMap<SpecialistId, SpecialistSetup>,
}

impl ScenarioServices {
    /// Index a scenario's tables.
    #[must_use]
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self {
            players: scenario.players.iter().map(|p| (p.id, p.clone())).collect(),
            weapons: scenario.weapons.clone(),
            specialists: scenario
                .specialists
                .iter()
                .map(|s| (s.id, s.clone()))
                .collect(),
        }
    }

    /// Weapons technology of a player.
    #[must_use]
    pub fn technology(&self, player: PlayerId) -> u32 {
        self.weapons.get(&player).copied().unwrap_or(1)
    }

    fn specialist(&self, id: Option<SpecialistId>) -> Option<&SpecialistSetup> {
        id.and_then(|id| self.specialists.get(&id))
    }

    /// Best weapons bonus among the carriers' specialists.
    fn carrier_bonus(&self, carriers: &[&Carrier]) -> u32 {
        carriers
            .iter()
            .filter_map(|c| self.specialist(c.specialist_id))
            .map(|s| s.weapons_bonus)
            .max()
            .unwrap_or(0)
    }

    fn summary(&self, id: SpecialistId) -> Option<SpecialistSummary> {
        self.specialists.get(&id).map(|s| SpecialistSummary {
            id,
            name: s.name.clone(),
        })
    }
}

impl WeaponsOracle for ScenarioServices {
    fn star_effective_weapons_level(
        &self,
        defender: &Player,
        star: &Star,
        defender_carriers: &[&Carrier],
    ) -> u32 {
        let star_bonus = self
            .specialist(star.specialist_id)
            .map_or(0, |s| s.weapons_bonus);
        self.technology(defender.id) + star_bonus.max(self.carrier_bonus(defender_carriers))
    }

    fn carriers_effective_weapons_level(
        &self,
        players: &[Player],
        carriers: &[&Carrier],
        _at_star: bool,
    ) -> u32 {
        players
            .iter()
            .map(|player| {
                let own: Vec<&Carrier> = carriers
                    .iter()
                    .copied()
                    .filter(|c| c.owned_by_player_id == player.id)
                    .collect();
                self.technology(player.id) + self.carrier_bonus(&own)
            })
            .max()
            .unwrap_or(1)
    }

    fn carriers_weapons_debuff(&self, carriers: &[&Carrier]) -> u32 {
        carriers
            .iter()
            .filter_map(|c| self.specialist(c.specialist_id))
            .map(|s| s.weapons_debuff)
            .sum()
    }
}

impl SpecialistDirectory for ScenarioServices {
    fn carrier_specialist(&self, id: SpecialistId) -> Option<SpecialistSummary> {
        self.summary(id)
    }

    fn star_specialist(&self, id: SpecialistId) -> Option<SpecialistSummary> {
        self.summary(id)
    }
}

impl PlayerDirectory for ScenarioServices {
    fn player(&self, id: PlayerId) -> Result<Player> {
        self.players
            .get(&id)
            .cloned()
            .ok_or(CombatError::PlayerNotFound(id))
    }
}

/// Reputation one player holds towards another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationEntry {
    /// Player whose opinion changed.
    pub player: PlayerId,
    /// Player the opinion is about.
    pub towards: PlayerId,
    /// Accumulated change.
    pub delta: i32,
}

/// Star captures recorded at one location.
#[derive(Debug, Clone, Default)]
pub struct CaptureLog {
    /// Captures, in order.
    pub captures: Vec<CaptureResult>,
}

impl StarCapture for CaptureLog {
    fn capture_star(&mut self, context: CaptureContext<'_>) -> Result<CaptureResult> {
        let captured_by = context
            .attacker_carriers
            .first()
            .map(|c| c.owned_by_player_id)
            .ok_or_else(|| {
                CombatError::collaborator("star capture", "no surviving attacker to take the star")
            })?;

        let captured_from = context.star.owned_by_player_id.replace(captured_by);
        let result = CaptureResult {
            star_id: context.star.id,
            captured_from,
            captured_by,
        };
        self.captures.push(result.clone());
        Ok(result)
    }
}

/// Reputation changes, keyed by `(player, towards)`.
#[derive(Debug, Clone, Default)]
pub struct ReputationBook {
    /// Accumulated change per player pair.
    pub deltas: BTreeMap<(PlayerId, PlayerId), i32>,
}

impl ReputationBook {
    /// Fold another book into this one.
    pub fn merge(&mut self, other: ReputationBook) {
        for (key, delta) in other.deltas {
            *self.deltas.entry(key).or_insert(0) += delta;
        }
    }

    /// Changes as a flat list, ordered by player pair.
    #[must_use]
    pub fn entries(&self) -> Vec<ReputationEntry> {
        self.deltas
            .iter()
            .map(|(&(player, towards), &delta)| ReputationEntry {
                player,
                towards,
                delta,
            })
            .collect()
    }
}

impl ReputationLedger for ReputationBook {
    fn decrease_reputation(
        &mut self,
        player: &Player,
        towards: &Player,
        is_hostile: bool,
    ) -> Result<()> {
        if player.id == towards.id {
            return Err(CombatError::collaborator(
                "reputation",
                format!("{} cannot fight itself", player.id),
            ));
        }
        if is_hostile {
            *self.deltas.entry((player.id, towards.id)).or_insert(0) -=
                HOSTILE_REPUTATION_PENALTY;
        }
        Ok(())
    }
}

/// Everything written by the resolution of one location.
#[derive(Debug, Clone, Default)]
pub struct LocationJournal {
    /// Star captures.
    pub captures: CaptureLog,
    /// Reputation changes.
    pub reputation: ReputationBook,
}

impl LocationJournal {
    /// Fold another journal into this one.
    pub fn merge(&mut self, other: LocationJournal) {
        self.captures.captures.extend(other.captures.captures);
        self.reputation.merge(other.reputation);
    }

    /// Collaborators for one resolution: lookups from `services`, writes
    /// into this journal.
    pub fn collaborators<'a>(&'a mut self, services: &'a ScenarioServices) -> Collaborators<'a> {
        Collaborators {
            weapons: services,
            specialists: services,
            players: services,
            capture: &mut self.captures,
            reputation: &mut self.reputation,
        }
    }
}
