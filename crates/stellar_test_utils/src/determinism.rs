//! Determinism testing utilities.
//!
//! Combat results must be identical for identical inputs: the same battle
//! resolved on two servers, or replayed from a saved tick, has to produce
//! the same losses, captures and events.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: star garrisons use fixed-point via
//!   [`stellar_core::math::Fixed`].
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Ledgers and stub tables use `BTreeMap`.
//!
//! - **Unstable sorts**: carriers with equal ship counts must keep their
//!   pool order.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic resolution).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Combat resolution is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario several times and verify every run hashes the same.
///
/// # Arguments
///
/// * `runs` - Number of times to run the scenario
/// * `run` - Builds the scenario, resolves it and returns the state to hash
///
/// # Example
///
/// ```ignore
/// use stellar_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(5, || resolve_three_way_battle());
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<T, F>(runs: usize, run: F) -> DeterminismResult
where
    T: Hash,
    F: Fn() -> T,
{
    let hashes: Vec<u64> = (0..runs).map(|_| compute_hash(&run())).collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

/// Run a scenario on several threads at once using scoped threads.
///
/// Catches non-determinism that only shows up under thread scheduling
/// variations.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn verify_parallel_determinism<T, F>(threads: usize, run: F) -> DeterminismResult
where
    T: Hash,
    F: Fn() -> T + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| s.spawn(|| compute_hash(&run())))
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for combat inputs.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the combat core.
pub mod strategies {
    use proptest::prelude::*;
    use stellar_core::components::{Carrier, CarrierId, PlayerId};
    use stellar_core::exchange::FleetAggregate;

    /// Generate ship counts (0-5000).
    pub fn arb_ships() -> impl Strategy<Value = u32> {
        0u32..5000u32
    }

    /// Generate weapons levels (1-12).
    pub fn arb_weapons_level() -> impl Strategy<Value = u32> {
        1u32..12u32
    }

    /// Generate a fleet aggregate.
    pub fn arb_fleet() -> impl Strategy<Value = FleetAggregate> {
        (arb_ships(), arb_weapons_level())
            .prop_map(|(ships, weapons_level)| FleetAggregate::new(ships, weapons_level))
    }

    /// Generate target ship counts and a kill count that fits them.
    pub fn arb_targets_and_kills(max_targets: usize) -> impl Strategy<Value = (Vec<u32>, u32)> {
        proptest::collection::vec(0u32..200u32, 1..max_targets).prop_flat_map(|ships| {
            let total: u32 = ships.iter().sum();
            (Just(ships), 0..=total)
        })
    }

    /// Generate the carriers present at a location.
    ///
    /// Carrier ids are sequential; owners are drawn from `1..=max_owners`.
    pub fn arb_carriers(
        max_carriers: usize,
        max_owners: u64,
    ) -> impl Strategy<Value = Vec<Carrier>> {
        proptest::collection::vec((1u64..=max_owners, 0u32..300u32), 1..max_carriers).prop_map(
            |specs| {
                specs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (owner, ships))| {
                        Carrier::new(CarrierId(i as u64 + 1), PlayerId(owner), ships)
                    })
                    .collect()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, || 42u64);

        assert!(result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 1);
    }

    #[test]
    fn test_detects_divergence() {
        let counter = std::cell::Cell::new(0u64);
        let result = verify_determinism(2, || {
            counter.set(counter.get() + 1);
            counter.get()
        });

        assert!(!result.is_deterministic);
    }

    #[test]
    fn test_parallel_runs_match() {
        let result = verify_parallel_determinism(4, || vec![1u32, 2, 3]);
        result.assert_deterministic();
    }
}
