//! Minion instances - runtime minion state.
//!
//! A `Minion` is one copy of a card on a board or in combat. It carries its
//! current stats and keywords; the card definition it came from is only
//! referenced by `card`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::definition::{CardId, MinionDef};
use super::keywords::{Keyword, Keywords, Tribe};
use crate::core::PlayerId;

/// A minion instance.
///
/// Invariant: `health <= max_health`. Buffs raise both; damage only lowers
/// `health`, which may go negative until the next death sweep removes it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Minion {
    /// Card this minion is a copy of.
    pub card: CardId,

    /// Current attack (never negative).
    pub attack: i32,

    /// Current health.
    pub health: i32,

    /// Health ceiling.
    pub max_health: i32,

    /// Tavern tier of the card.
    pub tier: u8,

    /// Current keywords.
    pub keywords: Keywords,

    /// Tribes copied from the definition.
    pub tribes: SmallVec<[Tribe; 2]>,

    /// Owning player, if any.
    pub owner: Option<PlayerId>,

    /// Position on the owning board (0 = left-most).
    pub position: u8,
}

impl Minion {
    /// Create a fresh copy of a card.
    #[must_use]
    pub fn from_def(def: &MinionDef) -> Self {
        Self {
            card: def.id,
            attack: def.attack.max(0),
            health: def.health,
            max_health: def.health,
            tier: def.tier,
            keywords: def.keywords,
            tribes: def.tribes.clone(),
            owner: None,
            position: 0,
        }
    }

    /// Create a vanilla minion without a catalog entry (tests, scripted boards).
    #[must_use]
    pub fn vanilla(card: CardId, attack: i32, health: i32) -> Self {
        Self {
            card,
            attack: attack.max(0),
            health,
            max_health: health,
            tier: 1,
            keywords: Keywords::NONE,
            tribes: SmallVec::new(),
            owner: None,
            position: 0,
        }
    }

    /// Add a keyword (builder pattern).
    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.insert(keyword);
        self
    }

    /// Set the owner (builder pattern).
    #[must_use]
    pub fn with_owner(mut self, owner: PlayerId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Check for a keyword.
    #[must_use]
    pub fn has(&self, keyword: Keyword) -> bool {
        self.keywords.has(keyword)
    }

    /// Check tribe membership. Tribeless minions count as Neutral.
    #[must_use]
    pub fn is_tribe(&self, tribe: Tribe) -> bool {
        if self.tribes.is_empty() {
            tribe == Tribe::Neutral
        } else {
            self.tribes.contains(&tribe)
        }
    }

    /// A minion is alive while its health is positive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply a stat buff. Health buffs raise the ceiling too.
    pub fn buff(&mut self, attack: i32, health: i32) {
        self.attack = (self.attack + attack).max(0);
        self.health += health;
        self.max_health += health;
        if self.health > self.max_health {
            self.health = self.max_health;
        }
    }

    /// Apply one damage instance.
    ///
    /// Divine shield absorbs the whole instance and is consumed. Returns
    /// the health actually lost (0 when absorbed or when `amount` is 0).
    pub fn take_damage(&mut self, amount: i32) -> DamageTaken {
        if amount <= 0 {
            return DamageTaken::None;
        }
        if self.keywords.remove(Keyword::DivineShield) {
            return DamageTaken::Absorbed;
        }
        self.health -= amount;
        DamageTaken::Lost(amount)
    }
}

/// Result of a damage instance on a minion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageTaken {
    /// Zero damage was dealt.
    None,
    /// Divine shield absorbed the hit.
    Absorbed,
    /// Health was reduced by this much.
    Lost(i32),
}
