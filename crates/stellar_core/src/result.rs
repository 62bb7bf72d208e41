//! Combat results and the events emitted for each round.

use serde::{Deserialize, Serialize};

use crate::components::{CarrierId, Location, Player, PlayerId, StarId};
use crate::exchange::{ExchangeResult, SidePair};
use crate::services::{CaptureResult, SpecialistSummary};

/// Ship counts of one object across a round.
///
/// `before == after + lost` holds after every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ShipTally {
    /// Ships before the round.
    pub before: u32,
    /// Ships lost so far.
    pub lost: u32,
    /// Ships remaining.
    pub after: u32,
}

impl ShipTally {
    /// A tally with no losses yet.
    #[must_use]
    pub const fn untouched(ships: u32) -> Self {
        Self {
            before: ships,
            lost: 0,
            after: ships,
        }
    }

    /// Record ships destroyed.
    pub fn record_loss(&mut self, killed: u32) {
        self.lost += killed;
        self.after -= killed;
    }
}

/// Per-carrier breakdown in a combat result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarrierSnapshot {
    /// Carrier identifier.
    pub id: CarrierId,
    /// Carrier name.
    pub name: String,
    /// Owning player.
    pub owned_by_player_id: PlayerId,
    /// Specialist aboard.
    pub specialist: Option<SpecialistSummary>,
    /// Ship counts.
    #[serde(flatten)]
    pub ships: ShipTally,
}

/// Star breakdown in a combat result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StarSnapshot {
    /// Star identifier.
    pub id: StarId,
    /// Specialist stationed at the star.
    pub specialist: Option<SpecialistSummary>,
    /// Whole-ship counts.
    #[serde(flatten)]
    pub ships: ShipTally,
}

/// Full result of one round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatResult {
    /// Weapons levels used by each side.
    pub weapons: SidePair,
    /// Aggregate ships before the round.
    pub before: SidePair,
    /// Aggregate ships after the round.
    pub after: SidePair,
    /// Aggregate ships lost.
    pub lost: SidePair,
    /// Minimal opposing force for a decisive win, if requested.
    pub needed: Option<SidePair>,
    /// Every carrier in the round's pool, including ones that sat it out.
    pub carriers: Vec<CarrierSnapshot>,
    /// The star, for star battles.
    pub star: Option<StarSnapshot>,
}

impl CombatResult {
    /// Start a result from an exchange, with no object breakdown yet.
    #[must_use]
    pub fn from_exchange(exchange: ExchangeResult) -> Self {
        Self {
            weapons: exchange.weapons,
            before: exchange.before,
            after: exchange.after,
            lost: exchange.lost,
            needed: exchange.needed,
            carriers: Vec::new(),
            star: None,
        }
    }

    /// Snapshot for a carrier, if it took part.
    #[must_use]
    pub fn carrier(&self, id: CarrierId) -> Option<&CarrierSnapshot> {
        self.carriers.iter().find(|c| c.id == id)
    }

    /// Mutable snapshot for a carrier.
    pub fn carrier_mut(&mut self, id: CarrierId) -> Option<&mut CarrierSnapshot> {
        self.carriers.iter_mut().find(|c| c.id == id)
    }

    /// Sum of ships lost by the given owner's carriers.
    ///
    /// Attacker loss achievements use this rather than the side total, so
    /// they differ from counters recorded before per-owner attribution.
    #[must_use]
    pub fn ships_lost_by(&self, owner: PlayerId) -> u32 {
        self.carriers
            .iter()
            .filter(|c| c.owned_by_player_id == owner)
            .map(|c| c.ships.lost)
            .sum()
    }
}

/// Who fought where, for one round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundContext {
    /// Where the round happened.
    pub location: Location,
    /// Game tick.
    pub tick: u64,
    /// The defending player.
    pub defender: Player,
    /// Every attacking player, in order of first appearance among the
    /// attacker carriers (largest first).
    pub attackers: Vec<Player>,
}

/// Event emitted once per resolved round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A round fought at a star.
    PlayerCombatStar {
        /// Round participants.
        context: RoundContext,
        /// The contested star.
        star_id: StarId,
        /// Round result.
        combat_result: CombatResult,
        /// Capture outcome, if the star changed hands.
        capture_result: Option<CaptureResult>,
    },
    /// A carrier-only round in open space.
    PlayerCombatCarrier {
        /// Round participants.
        context: RoundContext,
        /// Round result.
        combat_result: CombatResult,
    },
}

impl CombatEvent {
    /// Round participants.
    #[must_use]
    pub fn context(&self) -> &RoundContext {
        match self {
            CombatEvent::PlayerCombatStar { context, .. }
            | CombatEvent::PlayerCombatCarrier { context, .. } => context,
        }
    }

    /// Round result.
    #[must_use]
    pub fn combat_result(&self) -> &CombatResult {
        match self {
            CombatEvent::PlayerCombatStar { combat_result, .. }
            | CombatEvent::PlayerCombatCarrier { combat_result, .. } => combat_result,
        }
    }

    /// Capture outcome, if any.
    #[must_use]
    pub fn capture_result(&self) -> Option<&CaptureResult> {
        match self {
            CombatEvent::PlayerCombatStar { capture_result, .. } => capture_result.as_ref(),
            CombatEvent::PlayerCombatCarrier { .. } => None,
        }
    }
}
