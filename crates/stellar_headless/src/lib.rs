//! Headless battle runner for scenario testing and CI verification.
//!
//! Loads a RON scenario describing one tick's contested locations, resolves
//! every battle with the combat core and reports the outcome as JSON:
//!
//! - **Balance checks**: replay hand-written battles after a rules change
//! - **CI verification**: the same scenario must always produce the same report
//! - **Previews**: run a single exchange between two aggregates
//!
//! # Example
//!
//! ```bash
//! # Resolve a scenario and print the report
//! cargo run -p stellar_headless -- resolve --scenario scenarios/border_skirmish.ron
//!
//! # Preview an exchange
//! cargo run -p stellar_headless -- preview --defender-ships 20 --defender-weapons 3 \
//!     --attacker-ships 50 --attacker-weapons 2 --turn-based
//! ```

pub mod runner;
pub mod scenario;
pub mod services;

pub use runner::{preview, run_tick, LocationReport, RunnerError, TickReport};
pub use scenario::{Scenario, ScenarioError};
pub use services::{LocationJournal, ScenarioServices};
