//! # Stellar Core
//!
//! Deterministic combat resolution core for the Stellar strategy game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (star garrisons use fixed-point)
//!
//! Everything the engine needs from the rest of the game (weapons
//! technology, specialists, players, star capture, reputation) is reached
//! through the collaborator traits in [`services`], so the same core runs
//! inside the game server, the headless runner and the test suite.
//!
//! ## Crate Structure
//!
//! - [`components`] - Carriers, stars, players and identifiers
//! - [`exchange`] - Closed-form volley exchange between two aggregates
//! - [`aggregate`] - Builds aggregates for star and carrier battles
//! - [`distribution`] - Spreads scalar losses over concrete objects
//! - [`capture`] - Star capture detection
//! - [`orchestrator`] - Round-by-round resolution of a contested location
//! - [`achievements`] - Per-user combat counters
//! - [`result`] - Combat results and emitted events
//! - [`services`] - Collaborator traits
//! - [`settings`] - Combat policy configuration
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod achievements;
pub mod aggregate;
pub mod capture;
pub mod components;
pub mod distribution;
pub mod error;
pub mod exchange;
pub mod math;
pub mod orchestrator;
pub mod result;
pub mod services;
pub mod settings;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::achievements::{AchievementLedger, CombatAchievements, CombatTally};
    pub use crate::components::{
        Battlefield, Carrier, CarrierId, Location, Player, PlayerId, SpecialistId, Star, StarId,
        UserId,
    };
    pub use crate::error::{CombatError, Result};
    pub use crate::exchange::{exchange, ExchangeResult, FleetAggregate};
    pub use crate::math::Fixed;
    pub use crate::orchestrator::{CombatOutcome, CombatResolver, RoundOutcome};
    pub use crate::result::{CombatEvent, CombatResult, RoundContext};
    pub use crate::services::{
        CaptureContext, CaptureResult, Collaborators, CombatEventSink, PlayerDirectory,
        ReputationLedger, SpecialistDirectory, SpecialistSummary, StarCapture, WeaponsOracle,
    };
    pub use crate::settings::{CombatSettings, DefenderBonus};
}
