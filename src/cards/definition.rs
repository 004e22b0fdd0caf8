//! Minion definitions - static card data.
//!
//! `MinionDef` holds the immutable properties of a card: base stats, tier,
//! tribes, keywords and the trigger kinds the card declares. Runtime state
//! (buffs, damage, consumed shields) lives in [`Minion`](super::Minion).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::keywords::{Keyword, Keywords, Tribe};
use crate::abilities::TriggerKind;

/// Highest tavern tier.
pub const MAX_TIER: u8 = 6;

/// Identifier of a card definition (the "kind" of minion, not an instance).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Static minion definition.
///
/// ```
/// use bgsim::abilities::TriggerKind;
/// use bgsim::cards::{CardId, Keyword, MinionDef, Tribe};
///
/// let bot = MinionDef::new(CardId::new(9), "Kaboom Bot", 2, 2, 2)
///     .with_tribe(Tribe::Mech)
///     .with_ability(TriggerKind::OnDeath);
///
/// assert!(bot.declares(TriggerKind::OnDeath));
/// assert!(!bot.keywords.has(Keyword::Taunt));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinionDef {
    /// Unique identifier.
    pub id: CardId,

    /// Display name.
    pub name: String,

    /// Tavern tier (1..=6).
    pub tier: u8,

    /// Base attack.
    pub attack: i32,

    /// Base health.
    pub health: i32,

    /// Tribes; empty means Neutral.
    pub tribes: SmallVec<[Tribe; 2]>,

    /// Base keywords.
    pub keywords: Keywords,

    /// Trigger kinds this card has behavior for.
    pub abilities: SmallVec<[TriggerKind; 2]>,

    /// Tokens are only ever summoned, never offered in shops.
    pub token: bool,
}

impl MinionDef {
    /// Create a vanilla definition.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, tier: u8, attack: i32, health: i32) -> Self {
        Self {
            id,
            name: name.into(),
            tier: tier.clamp(1, MAX_TIER),
            attack,
            health,
            tribes: SmallVec::new(),
            keywords: Keywords::NONE,
            abilities: SmallVec::new(),
            token: false,
        }
    }

    /// Add a tribe (builder pattern).
    #[must_use]
    pub fn with_tribe(mut self, tribe: Tribe) -> Self {
        if !self.tribes.contains(&tribe) {
            self.tribes.push(tribe);
        }
        self
    }

    /// Add a keyword (builder pattern).
    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.insert(keyword);
        self
    }

    /// Declare a triggered ability (builder pattern).
    #[must_use]
    pub fn with_ability(mut self, kind: TriggerKind) -> Self {
        if !self.abilities.contains(&kind) {
            self.abilities.push(kind);
        }
        self
    }

    /// Mark as a token (builder pattern).
    #[must_use]
    pub fn as_token(mut self) -> Self {
        self.token = true;
        self
    }

    /// Check whether the card declares a trigger kind.
    #[must_use]
    pub fn declares(&self, kind: TriggerKind) -> bool {
        self.abilities.contains(&kind)
    }

    /// Check tribe membership. Tribeless cards count as Neutral.
    #[must_use]
    pub fn is_tribe(&self, tribe: Tribe) -> bool {
        if self.tribes.is_empty() {
            tribe == Tribe::Neutral
        } else {
            self.tribes.contains(&tribe)
        }
    }
}
