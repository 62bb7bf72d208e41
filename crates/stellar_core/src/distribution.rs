//! Spreads a side's scalar losses over its concrete carriers and star.
//!
//! Each pass splits the remaining kills evenly over every object that still
//! has ships, with a minimum of one per object, and walks the objects in
//! order. Earlier objects therefore absorb any remainder first. The total
//! removed always equals the requested kills exactly, provided the objects
//! hold at least that many ships between them.

/// Something that can lose ships in combat.
pub trait Damageable {
    /// Whole ships currently available.
    fn ships(&self) -> u32;

    /// Remove `killed` ships. Never called with more than [`Self::ships`].
    fn remove_ships(&mut self, killed: u32);
}

/// Outcome of one distribution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Distribution {
    /// Ships removed from each target, in target order.
    pub losses: Vec<u32>,
    /// Number of passes over the targets.
    pub passes: u32,
    /// Kills that could not be applied because every target was empty.
    pub shortfall: u32,
}

impl Distribution {
    /// Total ships removed.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.losses.iter().sum()
    }
}

/// Remove `ships_to_kill` ships from `targets`, as evenly as possible.
///
/// Targets are mutated in place. Order matters: callers pass the largest
/// targets first so they take the rounding pressure.
pub fn distribute_damage<D>(targets: &mut [&mut D], ships_to_kill: u32) -> Distribution
where
    D: Damageable + ?Sized,
{
    let mut losses = vec![0u32; targets.len()];
    let mut remaining = ships_to_kill;
    let mut passes = 0;

    while remaining > 0 {
        let alive = targets.iter().filter(|t| t.ships() > 0).count();
        if alive == 0 {
            tracing::warn!(
                shortfall = remaining,
                requested = ships_to_kill,
                "Not enough ships to absorb combat losses"
            );
            break;
        }

        let alive = u32::try_from(alive).unwrap_or(u32::MAX);
        let per_target = (remaining / alive).max(1);
        passes += 1;
        tracing::trace!(pass = passes, remaining, per_target, "Distributing damage");

        for (target, lost) in targets.iter_mut().zip(losses.iter_mut()) {
            let ships = target.ships();
            if ships == 0 {
                continue;
            }

            let killed = ships.min(per_target);
            target.remove_ships(killed);
            *lost += killed;
            remaining -= killed;

            if remaining == 0 {
                break;
            }
        }
    }

    Distribution {
        losses,
        passes,
        shortfall: remaining,
    }
}
