//! Per-user combat achievement counters.
//!
//! Counters are held in an [`AchievementLedger`] keyed by user. Locations
//! resolved independently each fill their own ledger; the caller merges
//! them serially afterwards, which keeps concurrent resolutions from racing
//! on a shared user record.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::components::UserId;

/// Ships, carriers and specialist carriers counted by one counter group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CombatTally {
    /// Individual ships.
    pub ships: u64,
    /// Whole carriers.
    pub carriers: u64,
    /// Carriers that had a specialist aboard.
    pub specialists: u64,
}

impl AddAssign for CombatTally {
    fn add_assign(&mut self, rhs: Self) {
        self.ships += rhs.ships;
        self.carriers += rhs.carriers;
        self.specialists += rhs.specialists;
    }
}

/// Combat achievements of one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CombatAchievements {
    /// Enemy losses credited to the user.
    pub kills: CombatTally,
    /// The user's own losses.
    pub losses: CombatTally,
}

impl AddAssign for CombatAchievements {
    fn add_assign(&mut self, rhs: Self) {
        self.kills += rhs.kills;
        self.losses += rhs.losses;
    }
}

/// Combat achievements for every user touched by a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AchievementLedger {
    users: BTreeMap<UserId, CombatAchievements>,
}

impl AchievementLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Achievements of a user, if recorded.
    #[must_use]
    pub fn get(&self, user: UserId) -> Option<&CombatAchievements> {
        self.users.get(&user)
    }

    /// Mutable achievements of a user, created on first use.
    pub fn entry(&mut self, user: UserId) -> &mut CombatAchievements {
        self.users.entry(user).or_default()
    }

    /// Fold another ledger into this one.
    pub fn merge(&mut self, other: AchievementLedger) {
        for (user, achievements) in other.users {
            *self.entry(user) += achievements;
        }
    }

    /// Iterate users in id order.
    pub fn iter(&self) -> impl Iterator<Item = (UserId, &CombatAchievements)> {
        self.users.iter().map(|(id, a)| (*id, a))
    }

    /// Number of users recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no user has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FromIterator<(UserId, CombatAchievements)> for AchievementLedger {
    fn from_iter<I: IntoIterator<Item = (UserId, CombatAchievements)>>(iter: I) -> Self {
        let mut ledger = Self::new();
        for (user, achievements) in iter {
            *ledger.entry(user) += achievements;
        }
        ledger
    }
}
