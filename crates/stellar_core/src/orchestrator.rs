//! Round-by-round resolution of a contested location.
//!
//! A round pits one defending player against every other player present,
//! combined into a single attacking side:
//!
//! 1. Partition the carrier pool into defenders and attackers, largest first
//! 2. Skip if nobody can fight
//! 3. Resolve the aggregate exchange
//! 4. Distribute losses over attackers, then defending carriers and the star
//! 5. Cull destroyed carriers from the working sets
//! 6. Check for star capture
//! 7. Sour reputation between the defender and each attacker
//! 8. Update achievements
//! 9. Emit the round event
//!
//! If the surviving attackers still belong to more than one player, the
//! next round starts with those carriers as the pool and a new defender:
//! the star's owner at a star, otherwise the owner of the first surviving
//! attacker carrier. Every round removes at least one owner from the pool,
//! so resolution ends within one round per owner present.
//!
//! Rounds run strictly in order. A collaborator error aborts the remaining
//! rounds; mutations from completed rounds stay applied.

use std::cmp::Reverse;

use crate::achievements::AchievementLedger;
use crate::aggregate::{resolve_carrier, resolve_star};
use crate::capture::resolve_capture;
use crate::components::{Battlefield, Carrier, CarrierId, Player, PlayerId};
use crate::distribution::{distribute_damage, Damageable};
use crate::error::Result;
use crate::result::{
    CarrierSnapshot, CombatEvent, CombatResult, RoundContext, ShipTally, StarSnapshot,
};
use crate::services::{CaptureResult, Collaborators, CombatEventSink};
use crate::settings::CombatSettings;

/// Result of a single round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Full round result, as emitted.
    pub combat_result: CombatResult,
    /// Capture outcome, if the star changed hands.
    pub capture_result: Option<CaptureResult>,
    /// Carriers destroyed this round.
    pub destroyed_carriers: Vec<CarrierId>,
    /// Indices into [`Battlefield::carriers`] of attacker carriers that
    /// survived, largest (by pre-round ships) first.
    pub surviving_attackers: Vec<usize>,
}

/// Result of resolving a location.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CombatOutcome {
    /// Rounds fought.
    pub rounds: u32,
    /// Every carrier destroyed, for the caller to remove from the world.
    pub destroyed_carriers: Vec<CarrierId>,
    /// Star captures, in round order.
    pub captures: Vec<CaptureResult>,
    /// Result of the first round.
    pub first_result: Option<CombatResult>,
}

/// Resolves combat at one location at a time.
pub struct CombatResolver<'a> {
    settings: CombatSettings,
    services: Collaborators<'a>,
}

impl<'a> CombatResolver<'a> {
    /// Create a resolver.
    #[must_use]
    pub fn new(settings: CombatSettings, services: Collaborators<'a>) -> Self {
        Self { settings, services }
    }

    /// Resolve every round at a location, starting with `defender` defending.
    ///
    /// Emits one event per round into `sink`.
    ///
    /// # Errors
    /// Returns the first collaborator error. Rounds already resolved keep
    /// their mutations and events.
    pub fn resolve(
        &mut self,
        field: &mut Battlefield<'_>,
        ledger: &mut AchievementLedger,
        defender: PlayerId,
        sink: &mut dyn CombatEventSink,
    ) -> Result<CombatOutcome> {
        let mut pool: Vec<usize> = (0..field.carriers.len()).collect();
        let max_rounds = distinct_owners(field.carriers, &pool).len() + 1;
        let mut defender = defender;
        let mut outcome = CombatOutcome::default();

        loop {
            let Some(round) = self.resolve_round(field, ledger, defender, &pool, sink)? else {
                break;
            };

            outcome.rounds += 1;
            outcome
                .destroyed_carriers
                .extend(round.destroyed_carriers.iter().copied());
            outcome.captures.extend(round.capture_result);
            if outcome.first_result.is_none() {
                outcome.first_result = Some(round.combat_result);
            }

            let owners = distinct_owners(field.carriers, &round.surviving_attackers);
            if owners.len() <= 1 {
                break;
            }
            if outcome.rounds as usize >= max_rounds {
                tracing::warn!(
                    rounds = outcome.rounds,
                    owners = owners.len(),
                    "Stopping combat after round limit"
                );
                break;
            }

            defender = field
                .star
                .as_deref()
                .and_then(|star| star.owned_by_player_id)
                .unwrap_or(owners[0]);
            pool = round.surviving_attackers;
        }

        Ok(outcome)
    }

    /// Resolve a single round between `defender` and everyone else in `pool`.
    ///
    /// `pool` holds indices into [`Battlefield::carriers`]. Returns
    /// `Ok(None)`, without touching anything, when no combat can happen.
    pub fn resolve_round(
        &mut self,
        field: &mut Battlefield<'_>,
        ledger: &mut AchievementLedger,
        defender_id: PlayerId,
        pool: &[usize],
        sink: &mut dyn CombatEventSink,
    ) -> Result<Option<RoundOutcome>> {
        let mut defender_idx = fighting(field.carriers, pool, |c| {
            c.owned_by_player_id == defender_id
        });
        if !field.is_star_battle() && defender_idx.is_empty() {
            return Ok(None);
        }

        let mut attacker_idx = fighting(field.carriers, pool, |c| {
            c.owned_by_player_id != defender_id
        });
        if attacker_idx.is_empty() {
            return Ok(None);
        }

        let defender = self.services.players.player(defender_id)?;
        let attackers = distinct_owners(field.carriers, &attacker_idx)
            .into_iter()
            .map(|id| self.services.players.player(id))
            .collect::<Result<Vec<Player>>>()?;

        tracing::debug!(
            tick = field.tick,
            defender = %defender.id,
            attackers = attackers.len(),
            at_star = field.is_star_battle(),
            "Resolving combat round"
        );

        // Exchange. Fails before any mutation if a side is too large.
        let exchange = {
            let defender_carriers = select(field.carriers, &defender_idx);
            let attacker_carriers = select(field.carriers, &attacker_idx);
            match field.star.as_deref() {
                Some(star) => resolve_star(
                    &self.settings,
                    self.services.weapons,
                    star,
                    &defender,
                    &attackers,
                    &defender_carriers,
                    &attacker_carriers,
                ),
                None => resolve_carrier(
                    &self.settings,
                    self.services.weapons,
                    &defender,
                    &attackers,
                    &defender_carriers,
                    &attacker_carriers,
                ),
            }
        }?;

        let mut combat_result = CombatResult::from_exchange(exchange);
        combat_result.carriers = pool
            .iter()
            .map(|&i| self.snapshot_carrier(&field.carriers[i]))
            .collect();
        combat_result.star = field.star.as_deref().map(|star| StarSnapshot {
            id: star.id,
            specialist: star
                .specialist_id
                .and_then(|id| self.services.specialists.star_specialist(id)),
            ships: ShipTally::untouched(star.ships()),
        });

        // Distribution: attackers first, then defending carriers and the star.
        let attacker_losses = {
            let mut targets = select_mut(field.carriers, &attacker_idx);
            distribute_damage(&mut targets, combat_result.lost.attacker)
        };
        let defender_losses = {
            let mut targets: Vec<&mut dyn Damageable> = select_mut(field.carriers, &defender_idx)
                .into_iter()
                .map(|c| c as &mut dyn Damageable)
                .collect();
            if let Some(star) = field.star.as_deref_mut() {
                targets.push(star);
            }
            distribute_damage(&mut targets, combat_result.lost.defender)
        };

        for (&i, &killed) in attacker_idx.iter().zip(&attacker_losses.losses) {
            record_carrier_loss(&mut combat_result, field.carriers[i].id, killed);
        }
        for (k, &killed) in defender_losses.losses.iter().enumerate() {
            match defender_idx.get(k) {
                Some(&i) => record_carrier_loss(&mut combat_result, field.carriers[i].id, killed),
                None => {
                    if let Some(star) = combat_result.star.as_mut() {
                        star.ships.record_loss(killed);
                    }
                }
            }
        }

        #[cfg(feature = "debug-validation")]
        validate_conservation(&combat_result)?;

        // Cull.
        let destroyed_defenders: Vec<usize> = destroyed(field.carriers, &defender_idx);
        let destroyed_attackers: Vec<usize> = destroyed(field.carriers, &attacker_idx);
        defender_idx.retain(|&i| !field.carriers[i].is_destroyed());
        attacker_idx.retain(|&i| !field.carriers[i].is_destroyed());

        let destroyed_carriers: Vec<CarrierId> = destroyed_attackers
            .iter()
            .chain(&destroyed_defenders)
            .map(|&i| field.carriers[i].id)
            .collect();

        // Capture.
        let capture_result = match field.star.as_deref_mut() {
            Some(star) => {
                let defender_carriers = select(field.carriers, &defender_idx);
                let attacker_carriers = select(field.carriers, &attacker_idx);
                resolve_capture(
                    field.tick,
                    star,
                    &defender,
                    &attackers,
                    &defender_carriers,
                    &attacker_carriers,
                    self.services.capture,
                )?
            }
            None => None,
        };

        // Reputation.
        for attacker in &attackers {
            self.services
                .reputation
                .decrease_reputation(&defender, attacker, true)?;
            self.services
                .reputation
                .decrease_reputation(attacker, &defender, true)?;
        }

        // Achievements.
        let defender_carriers_lost = destroyed_defenders.len() as u64;
        let defender_specialists_lost = with_specialist(field.carriers, &destroyed_defenders);

        if !defender.defeated {
            if let Some(user) = defender.user_id {
                let achievements = ledger.entry(user);
                achievements.kills.ships += u64::from(combat_result.lost.attacker);
                achievements.kills.carriers += destroyed_attackers.len() as u64;
                achievements.kills.specialists +=
                    with_specialist(field.carriers, &destroyed_attackers);
                achievements.losses.ships += u64::from(combat_result.lost.defender);
                achievements.losses.carriers += defender_carriers_lost;
                achievements.losses.specialists += defender_specialists_lost;
            }
        }

        for attacker in attackers.iter().filter(|a| !a.defeated) {
            let Some(user) = attacker.user_id else {
                continue;
            };
            let own_destroyed: Vec<usize> = destroyed_attackers
                .iter()
                .copied()
                .filter(|&i| field.carriers[i].owned_by_player_id == attacker.id)
                .collect();

            let achievements = ledger.entry(user);
            achievements.kills.ships += u64::from(combat_result.lost.defender);
            achievements.kills.carriers += defender_carriers_lost;
            achievements.kills.specialists += defender_specialists_lost;
            // Own carriers only. Legacy counters charged every attacker the
            // whole side's `lost.attacker`.
            achievements.losses.ships += u64::from(combat_result.ships_lost_by(attacker.id));
            achievements.losses.carriers += own_destroyed.len() as u64;
            achievements.losses.specialists += with_specialist(field.carriers, &own_destroyed);
        }

        tracing::debug!(
            tick = field.tick,
            defender_lost = combat_result.lost.defender,
            attacker_lost = combat_result.lost.attacker,
            destroyed = destroyed_carriers.len(),
            captured = capture_result.is_some(),
            "Combat round resolved"
        );

        // Emit.
        let context = RoundContext {
            location: field.location,
            tick: field.tick,
            defender,
            attackers,
        };
        let event = match field.star.as_deref() {
            Some(star) => CombatEvent::PlayerCombatStar {
                context,
                star_id: star.id,
                combat_result: combat_result.clone(),
                capture_result: capture_result.clone(),
            },
            None => CombatEvent::PlayerCombatCarrier {
                context,
                combat_result: combat_result.clone(),
            },
        };
        sink.emit(event);

        Ok(Some(RoundOutcome {
            combat_result,
            capture_result,
            destroyed_carriers,
            surviving_attackers: attacker_idx,
        }))
    }

    fn snapshot_carrier(&self, carrier: &Carrier) -> CarrierSnapshot {
        CarrierSnapshot {
            id: carrier.id,
            name: carrier.name.clone(),
            owned_by_player_id: carrier.owned_by_player_id,
            specialist: carrier
                .specialist_id
                .and_then(|id| self.services.specialists.carrier_specialist(id)),
            ships: ShipTally::untouched(carrier.ships),
        }
    }
}

/// Pool members that can fight and match `side`, largest first.
///
/// The sort is stable so equal carriers keep their pool order.
fn fighting(carriers: &[Carrier], pool: &[usize], side: impl Fn(&Carrier) -> bool) -> Vec<usize> {
    let mut indices: Vec<usize> = pool
        .iter()
        .copied()
        .filter(|&i| carriers[i].can_fight() && side(&carriers[i]))
        .collect();
    indices.sort_by_key(|&i| Reverse(carriers[i].ships));
    indices
}

/// Owners of the given carriers, in order of first appearance.
fn distinct_owners(carriers: &[Carrier], indices: &[usize]) -> Vec<PlayerId> {
    let mut owners = Vec::new();
    for &i in indices {
        let owner = carriers[i].owned_by_player_id;
        if !owners.contains(&owner) {
            owners.push(owner);
        }
    }
    owners
}

fn select<'c>(carriers: &'c [Carrier], indices: &[usize]) -> Vec<&'c Carrier> {
    indices.iter().map(|&i| &carriers[i]).collect()
}

/// Disjoint mutable borrows of the given carriers, in index order.
fn select_mut<'c>(carriers: &'c mut [Carrier], indices: &[usize]) -> Vec<&'c mut Carrier> {
    let mut slots: Vec<Option<&mut Carrier>> = carriers.iter_mut().map(Some).collect();
    indices
        .iter()
        .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
        .collect()
}

fn destroyed(carriers: &[Carrier], indices: &[usize]) -> Vec<usize> {
    indices
        .iter()
        .copied()
        .filter(|&i| carriers[i].is_destroyed())
        .collect()
}

fn with_specialist(carriers: &[Carrier], indices: &[usize]) -> u64 {
    indices
        .iter()
        .filter(|&&i| carriers[i].specialist_id.is_some())
        .count() as u64
}

fn record_carrier_loss(result: &mut CombatResult, id: CarrierId, killed: u32) {
    if let Some(snapshot) = result.carrier_mut(id) {
        snapshot.ships.record_loss(killed);
    }
}

#[cfg(feature = "debug-validation")]
fn validate_conservation(result: &CombatResult) -> Result<()> {
    use crate::error::CombatError;

    let star_lost = result.star.as_ref().map_or(0, |s| u64::from(s.ships.lost));
    let carriers_lost: u64 = result.carriers.iter().map(|c| u64::from(c.ships.lost)).sum();
    let distributed = carriers_lost + star_lost;
    let reported = u64::from(result.lost.attacker) + u64::from(result.lost.defender);
    if distributed != reported {
        return Err(CombatError::InvalidState(format!(
            "distributed {distributed} losses, exchange reported {reported}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CarrierId, SpecialistId};

    fn fleet() -> Vec<Carrier> {
        vec![
            Carrier::new(CarrierId(1), PlayerId(1), 3),
            Carrier::new(CarrierId(2), PlayerId(2), 8),
            Carrier::new(CarrierId(3), PlayerId(1), 9),
            Carrier::new(CarrierId(4), PlayerId(3), 8).as_gift(),
            Carrier::new(CarrierId(5), PlayerId(3), 0),
            Carrier::new(CarrierId(6), PlayerId(3), 8).with_specialist(SpecialistId(1)),
        ]
    }

    #[test]
    fn test_fighting_sorts_largest_first_and_skips_gifts() {
        let carriers = fleet();
        let pool: Vec<usize> = (0..carriers.len()).collect();

        let defenders = fighting(&carriers, &pool, |c| c.owned_by_player_id == PlayerId(1));
        let attackers = fighting(&carriers, &pool, |c| c.owned_by_player_id != PlayerId(1));

        assert_eq!(defenders, vec![2, 0]);
        // Stable: carrier 2 precedes carrier 6 at equal ships.
        assert_eq!(attackers, vec![1, 5]);
    }

    #[test]
    fn test_distinct_owners_in_order() {
        let carriers = fleet();
        assert_eq!(
            distinct_owners(&carriers, &[5, 1, 2, 0]),
            vec![PlayerId(3), PlayerId(2), PlayerId(1)]
        );
    }

    #[test]
    fn test_select_mut_follows_index_order() {
        let mut carriers = fleet();
        let selected = select_mut(&mut carriers, &[2, 0, 2]);

        let ids: Vec<CarrierId> = selected.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![CarrierId(3), CarrierId(1)]);
    }

    #[test]
    fn test_with_specialist_counts() {
        let carriers = fleet();
        assert_eq!(with_specialist(&carriers, &[0, 1, 5]), 1);
    }
}
