//! Shared tavern pool.
//!
//! All players draw shop offers from one pool of card copies. Each card
//! starts with a number of copies that depends on its tier; copies leave
//! the pool when offered and come back when an offer is discarded, a minion
//! is sold, or a player is eliminated.

use serde::{Deserialize, Serialize};

use super::catalog::CardCatalog;
use super::definition::{CardId, MAX_TIER};
use super::keywords::Tribe;
use crate::core::GameRng;

/// Copies of each card per tier (index 0 = tier 1).
pub const COPIES_PER_TIER: [u32; MAX_TIER as usize] = [15, 15, 13, 11, 9, 7];

/// Maximum copies of a card of `tier`.
#[must_use]
pub fn copies_for_tier(tier: u8) -> u32 {
    let idx = usize::from(tier.clamp(1, MAX_TIER)) - 1;
    COPIES_PER_TIER[idx]
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct PoolEntry {
    card: CardId,
    tier: u8,
    remaining: u32,
    max: u32,
}

/// Remaining copies of every shop-eligible card.
///
/// Entries are kept sorted by card id so weighted draws are reproducible.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    entries: Vec<PoolEntry>,
}

impl Pool {
    /// Build a pool from the catalog.
    ///
    /// Tokens are excluded. When `active_tribes` is given, only cards with at
    /// least one active tribe are included; Neutral is always active.
    #[must_use]
    pub fn new(catalog: &CardCatalog, active_tribes: Option<&[Tribe]>) -> Self {
        let is_active = |tribe: Tribe| {
            tribe == Tribe::Neutral || active_tribes.map_or(true, |active| active.contains(&tribe))
        };

        let entries = catalog
            .sorted()
            .into_iter()
            .filter(|def| !def.token)
            .filter(|def| {
                if def.tribes.is_empty() {
                    true
                } else {
                    def.tribes.iter().any(|&t| is_active(t))
                }
            })
            .map(|def| {
                let max = copies_for_tier(def.tier);
                PoolEntry { card: def.id, tier: def.tier, remaining: max, max }
            })
            .collect();

        Self { entries }
    }

    /// Draw up to `count` cards of tier `<= tavern_tier`, weighted by
    /// remaining copies. Stops early when nothing eligible is left.
    pub fn roll(&mut self, tavern_tier: u8, count: usize, rng: &mut GameRng) -> Vec<CardId> {
        let mut drawn = Vec::with_capacity(count);

        for _ in 0..count {
            let weights: Vec<u32> = self
                .entries
                .iter()
                .map(|e| if e.tier <= tavern_tier { e.remaining } else { 0 })
                .collect();

            let Some(idx) = rng.choose_weighted(&weights) else {
                break;
            };
            let entry = &mut self.entries[idx];
            entry.remaining -= 1;
            drawn.push(entry.card);
        }

        drawn
    }

    /// Return a copy to the pool. Never exceeds the card's maximum.
    ///
    /// Returns `false` for cards that are not part of the pool (tokens).
    pub fn return_card(&mut self, card: CardId) -> bool {
        match self.entries.iter_mut().find(|e| e.card == card) {
            Some(entry) => {
                entry.remaining = (entry.remaining + 1).min(entry.max);
                true
            }
            None => {
                log::debug!("{} is not in the pool, not returned", card);
                false
            }
        }
    }

    /// Copies of `card` left in the pool.
    #[must_use]
    pub fn remaining(&self, card: CardId) -> u32 {
        self.entries
            .iter()
            .find(|e| e.card == card)
            .map_or(0, |e| e.remaining)
    }

    /// Total copies left across all cards.
    #[must_use]
    pub fn total_remaining(&self) -> u32 {
        self.entries.iter().map(|e| e.remaining).sum()
    }

    /// Check whether a card is part of the pool.
    #[must_use]
    pub fn contains(&self, card: CardId) -> bool {
        self.entries.iter().any(|e| e.card == card)
    }

    /// Number of distinct cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the pool has no cards at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
