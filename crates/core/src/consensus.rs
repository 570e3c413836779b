//! Completion vote arithmetic.
//!
//! The voter universe is the project owner plus every currently accepted
//! member. It is recomputed from live membership on every confirmation, so
//! membership changes between votes can move the required majority. Stored
//! votes are never pruned: a voter who later leaves the team still counts.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::DbId;

/// Vote progress toward completing a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// Every stored vote, including those of former members.
    pub current: usize,
    /// Strict majority of the voter universe.
    pub required: usize,
    /// Size of the voter universe (owner included).
    pub total: usize,
}

impl Tally {
    pub fn is_reached(&self) -> bool {
        self.current >= self.required
    }
}

/// Owner plus accepted members, as a set so the owner is never counted twice.
pub fn voter_universe<I>(owner_id: DbId, accepted_members: I) -> BTreeSet<DbId>
where
    I: IntoIterator<Item = DbId>,
{
    let mut universe: BTreeSet<DbId> = accepted_members.into_iter().collect();
    universe.insert(owner_id);
    universe
}

/// Strict majority: more than half of `total_voters`.
pub fn required_votes(total_voters: usize) -> usize {
    total_voters / 2 + 1
}

/// Compare the stored votes with the majority of the live universe.
pub fn tally(universe: &BTreeSet<DbId>, votes: &BTreeSet<DbId>) -> Tally {
    let current = votes.len();
    let total = universe.len();
    Tally {
        current,
        required: required_votes(total),
        total,
    }
}
