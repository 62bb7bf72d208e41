//! Star capture detection.
//!
//! A star falls when its garrison is gone, no defending carrier survived,
//! and the attackers still have ships. The ownership transfer itself belongs
//! to the [`StarCapture`] collaborator.

use crate::components::{Carrier, Player, Star};
use crate::error::Result;
use crate::services::{CaptureContext, CaptureResult, StarCapture};

/// Whether the star's defenders have been wiped out by surviving attackers.
#[must_use]
pub fn is_star_defeated(
    star: &Star,
    defender_carriers: &[&Carrier],
    attacker_carriers: &[&Carrier],
) -> bool {
    let defenders_remaining = star.ships() > 0 || defender_carriers.iter().any(|c| c.ships > 0);
    let attacker_ships: u64 = attacker_carriers.iter().map(|c| u64::from(c.ships)).sum();
    !defenders_remaining && attacker_ships > 0
}

/// Hand a defeated star to the capture service.
///
/// Returns `Ok(None)` when the star holds.
pub fn resolve_capture(
    tick: u64,
    star: &mut Star,
    defender: &Player,
    attackers: &[Player],
    defender_carriers: &[&Carrier],
    attacker_carriers: &[&Carrier],
    capture: &mut dyn StarCapture,
) -> Result<Option<CaptureResult>> {
    if !is_star_defeated(star, defender_carriers, attacker_carriers) {
        return Ok(None);
    }

    let result = capture.capture_star(CaptureContext {
        tick,
        star,
        defender,
        attackers,
        attacker_carriers,
    })?;

    tracing::info!(
        tick,
        star = %result.star_id,
        captured_by = %result.captured_by,
        "Star captured"
    );

    Ok(Some(result))
}
