//! Stub collaborators for driving the combat core in tests.
//!
//! [`StubWorld`] bundles one stub per collaborator trait. Weapons levels
//! default to 1 for every player, captures hand the star to the owner of the
//! largest surviving attacker carrier, and reputation calls are recorded in
//! order. Captures and reputation updates can be told to fail.

use std::collections::BTreeMap;

use stellar_core::components::{Carrier, Player, PlayerId, SpecialistId, Star};
use stellar_core::error::{CombatError, Result};
use stellar_core::orchestrator::CombatResolver;
use stellar_core::services::{
    CaptureContext, CaptureResult, Collaborators, PlayerDirectory, ReputationLedger,
    SpecialistDirectory, SpecialistSummary, StarCapture, WeaponsOracle,
};
use stellar_core::settings::CombatSettings;

/// Table-driven weapons levels.
#[derive(Debug, Clone, Default)]
pub struct StubWeapons {
    /// Weapons technology per player; missing players fight at level 1.
    pub levels: BTreeMap<PlayerId, u32>,
    /// Weapons bonus granted by a specialist aboard a carrier or at a star.
    pub specialist_bonus: BTreeMap<SpecialistId, u32>,
    /// Weapons deduction a specialist inflicts on the opposing side.
    pub specialist_debuff: BTreeMap<SpecialistId, u32>,
}

impl StubWeapons {
    fn level(&self, player: PlayerId) -> u32 {
        self.levels.get(&player).copied().unwrap_or(1)
    }

    fn bonus(&self, specialist: Option<SpecialistId>) -> u32 {
        specialist
            .and_then(|id| self.specialist_bonus.get(&id).copied())
            .unwrap_or(0)
    }

    fn best_carrier_bonus(&self, carriers: &[&Carrier]) -> u32 {
        carriers
            .iter()
            .map(|c| self.bonus(c.specialist_id))
            .max()
            .unwrap_or(0)
    }
}

impl WeaponsOracle for StubWeapons {
    fn star_effective_weapons_level(
        &self,
        defender: &Player,
        star: &Star,
        defender_carriers: &[&Carrier],
    ) -> u32 {
        self.level(defender.id)
            + self.bonus(star.specialist_id).max(self.best_carrier_bonus(defender_carriers))
    }

    fn carriers_effective_weapons_level(
        &self,
        players: &[Player],
        carriers: &[&Carrier],
        _at_star: bool,
    ) -> u32 {
        let tech = players.iter().map(|p| self.level(p.id)).max().unwrap_or(1);
        tech + self.best_carrier_bonus(carriers)
    }

    fn carriers_weapons_debuff(&self, carriers: &[&Carrier]) -> u32 {
        carriers
            .iter()
            .filter_map(|c| c.specialist_id)
            .filter_map(|id| self.specialist_debuff.get(&id).copied())
            .sum()
    }
}

/// Specialist names.
#[derive(Debug, Clone, Default)]
pub struct StubSpecialists {
    /// Display names by specialist id.
    pub names: BTreeMap<SpecialistId, String>,
}

impl SpecialistDirectory for StubSpecialists {
    fn carrier_specialist(&self, id: SpecialistId) -> Option<SpecialistSummary> {
        self.names.get(&id).map(|name| SpecialistSummary {
            id,
            name: name.clone(),
        })
    }

    fn star_specialist(&self, id: SpecialistId) -> Option<SpecialistSummary> {
        self.carrier_specialist(id)
    }
}

/// A fixed list of players.
#[derive(Debug, Clone, Default)]
pub struct StubPlayers {
    /// Known players.
    pub players: Vec<Player>,
}

impl PlayerDirectory for StubPlayers {
    fn player(&self, id: PlayerId) -> Result<Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(CombatError::PlayerNotFound(id))
    }
}

/// Hands captured stars to the owner of the largest surviving attacker.
#[derive(Debug, Clone, Default)]
pub struct StubCapture {
    /// Captures performed, in order.
    pub captures: Vec<CaptureResult>,
    /// Reject every capture.
    pub fail: bool,
}

impl StarCapture for StubCapture {
    fn capture_star(&mut self, context: CaptureContext<'_>) -> Result<CaptureResult> {
        if self.fail {
            return Err(CombatError::collaborator("star capture", "capture rejected"));
        }
        let winner = context
            .attacker_carriers
            .first()
            .map(|c| c.owned_by_player_id)
            .ok_or_else(|| CombatError::InvalidState("capture without attackers".into()))?;

        let previous = context.star.owned_by_player_id.replace(winner);
        let result = CaptureResult {
            star_id: context.star.id,
            captured_from: previous,
            captured_by: winner,
        };
        self.captures.push(result.clone());
        Ok(result)
    }
}

/// Records reputation decreases.
#[derive(Debug, Clone, Default)]
pub struct StubReputation {
    /// `(player, towards)` pairs, in call order.
    pub decreases: Vec<(PlayerId, PlayerId)>,
    /// Fail once this many calls have succeeded.
    pub fail_after: Option<usize>,
}

impl ReputationLedger for StubReputation {
    fn decrease_reputation(
        &mut self,
        player: &Player,
        towards: &Player,
        _is_hostile: bool,
    ) -> Result<()> {
        if self.fail_after == Some(self.decreases.len()) {
            return Err(CombatError::collaborator("reputation", "ledger unavailable"));
        }
        self.decreases.push((player.id, towards.id));
        Ok(())
    }
}

/// One stub per collaborator.
#[derive(Debug, Clone, Default)]
pub struct StubWorld {
    /// Weapons lookups.
    pub weapons: StubWeapons,
    /// Specialist lookups.
    pub specialists: StubSpecialists,
    /// Player lookups.
    pub players: StubPlayers,
    /// Star capture.
    pub capture: StubCapture,
    /// Reputation.
    pub reputation: StubReputation,
}

impl StubWorld {
    /// A world with the given players and default stubs.
    #[must_use]
    pub fn with_players(players: Vec<Player>) -> Self {
        Self {
            players: StubPlayers { players },
            ..Self::default()
        }
    }

    /// Builder method to set a player's weapons technology.
    #[must_use]
    pub fn with_weapons(mut self, player: u64, level: u32) -> Self {
        self.weapons.levels.insert(PlayerId(player), level);
        self
    }

    /// Borrow every stub as a collaborator bundle.
    pub fn collaborators(&mut self) -> Collaborators<'_> {
        Collaborators {
            weapons: &self.weapons,
            specialists: &self.specialists,
            players: &self.players,
            capture: &mut self.capture,
            reputation: &mut self.reputation,
        }
    }

    /// A resolver backed by this world.
    pub fn resolver(&mut self, settings: CombatSettings) -> CombatResolver<'_> {
        CombatResolver::new(settings, self.collaborators())
    }
}
