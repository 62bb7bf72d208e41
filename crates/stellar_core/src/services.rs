//! Collaborator traits consumed by the combat core.
//!
//! The combat core never looks up technology, specialists, players, star
//! ownership or reputation itself. Each of those lives elsewhere in the
//! game and is reached through one trait here, so callers can plug in the
//! live game services, a table-driven scenario, or test doubles.
//!
//! # Call Order
//!
//! Within a round the weapons oracle and specialist directory are queried
//! first, then the star capture service (at most once), then the reputation
//! ledger once per attacking owner in each direction. Calls are sequential;
//! an error from any of them aborts the remaining rounds.

use serde::{Deserialize, Serialize};

use crate::components::{Carrier, Player, PlayerId, SpecialistId, Star, StarId};
use crate::error::Result;
use crate::result::CombatEvent;

/// Trimmed specialist descriptor included in result snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecialistSummary {
    /// Specialist identifier.
    pub id: SpecialistId,
    /// Display name.
    pub name: String,
}

/// Effective weapons levels including technology and specialist bonuses.
pub trait WeaponsOracle {
    /// Weapons level of a star's defence, accounting for specialists at the
    /// star and aboard the defending carriers.
    fn star_effective_weapons_level(
        &self,
        defender: &Player,
        star: &Star,
        defender_carriers: &[&Carrier],
    ) -> u32;

    /// Weapons level of a group of carriers. With several owners the
    /// strongest owner's level is used.
    ///
    /// `at_star` is true when the carriers attack a star.
    fn carriers_effective_weapons_level(
        &self,
        players: &[Player],
        carriers: &[&Carrier],
        at_star: bool,
    ) -> u32;

    /// Weapons deduction the given carriers inflict on their opponents.
    fn carriers_weapons_debuff(&self, carriers: &[&Carrier]) -> u32;
}

/// Specialist lookups for result snapshots.
pub trait SpecialistDirectory {
    /// Trimmed descriptor of a carrier specialist.
    fn carrier_specialist(&self, id: SpecialistId) -> Option<SpecialistSummary>;

    /// Trimmed descriptor of a star specialist.
    fn star_specialist(&self, id: SpecialistId) -> Option<SpecialistSummary>;
}

/// Player lookups.
pub trait PlayerDirectory {
    /// Get a player by id.
    ///
    /// # Errors
    /// Returns [`crate::error::CombatError::PlayerNotFound`] for unknown ids.
    fn player(&self, id: PlayerId) -> Result<Player>;
}

/// Everything the star capture service needs to transfer a star.
#[derive(Debug)]
pub struct CaptureContext<'a> {
    /// Game tick of the capture.
    pub tick: u64,
    /// The defeated star. The service sets its new owner.
    pub star: &'a mut Star,
    /// The player who lost the star.
    pub defender: &'a Player,
    /// Every attacking player in the round.
    pub attackers: &'a [Player],
    /// Surviving attacker carriers, largest first.
    pub attacker_carriers: &'a [&'a Carrier],
}

/// Descriptor of a completed star capture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureResult {
    /// The captured star.
    pub star_id: StarId,
    /// Previous owner.
    pub captured_from: Option<PlayerId>,
    /// New owner.
    pub captured_by: PlayerId,
}

/// Star ownership transfer.
pub trait StarCapture {
    /// Transfer a defeated star to one of the attackers.
    ///
    /// Implementations must update `context.star.owned_by_player_id`.
    fn capture_star(&mut self, context: CaptureContext<'_>) -> Result<CaptureResult>;
}

/// Reputation bookkeeping between players.
pub trait ReputationLedger {
    /// Lower `player`'s reputation towards `towards`.
    fn decrease_reputation(&mut self, player: &Player, towards: &Player, is_hostile: bool)
        -> Result<()>;
}

/// Receives one event per resolved round, in round order.
pub trait CombatEventSink {
    /// Record a combat event.
    fn emit(&mut self, event: CombatEvent);
}

impl CombatEventSink for Vec<CombatEvent> {
    fn emit(&mut self, event: CombatEvent) {
        self.push(event);
    }
}

/// The collaborators for one resolution.
pub struct Collaborators<'a> {
    /// Weapons technology lookups.
    pub weapons: &'a dyn WeaponsOracle,
    /// Specialist lookups.
    pub specialists: &'a dyn SpecialistDirectory,
    /// Player lookups.
    pub players: &'a dyn PlayerDirectory,
    /// Star ownership transfer.
    pub capture: &'a mut dyn StarCapture,
    /// Reputation bookkeeping.
    pub reputation: &'a mut dyn ReputationLedger,
}
