//! Test fixtures and helpers.
//!
//! Pre-built players, carriers and stars for consistent testing.

use fixed::types::I32F32;
use stellar_core::components::{
    Carrier, CarrierId, Player, PlayerId, SpecialistId, Star, StarId, UserId,
};

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// An active player whose user id matches the player id.
#[must_use]
pub fn player(id: u64) -> Player {
    Player::new(PlayerId(id), UserId(id), format!("Player {id}"))
}

/// A defeated player whose user id matches the player id.
#[must_use]
pub fn defeated_player(id: u64) -> Player {
    Player {
        defeated: true,
        ..player(id)
    }
}

/// A plain carrier.
#[must_use]
pub fn carrier(id: u64, owner: u64, ships: u32) -> Carrier {
    Carrier::new(CarrierId(id), PlayerId(owner), ships)
}

/// A carrier with a specialist aboard.
#[must_use]
pub fn specialist_carrier(id: u64, owner: u64, ships: u32, specialist: u64) -> Carrier {
    carrier(id, owner, ships).with_specialist(SpecialistId(specialist))
}

/// An owned star with a whole-number garrison.
#[must_use]
pub fn star(id: u64, owner: u64, ships: u32) -> Star {
    Star::new(StarId(id), PlayerId(owner), ships)
}

/// Ships left aboard a carrier, by id.
///
/// # Panics
///
/// Panics if the carrier is not in `carriers`.
#[must_use]
pub fn ships_of(carriers: &[Carrier], id: u64) -> u32 {
    carriers
        .iter()
        .find(|c| c.id == CarrierId(id))
        .unwrap_or_else(|| panic!("carrier {id} not in fixture"))
        .ships
}
