//! Card catalog for definition lookup.
//!
//! The `CardCatalog` stores every minion definition a match can use.
//! `CardCatalog::standard()` returns the built-in card set whose behaviors
//! are registered by `AbilityRegistry::standard()`.

use rustc_hash::FxHashMap;

use super::definition::{CardId, MinionDef};
use super::keywords::{Keyword, Tribe};
use crate::abilities::TriggerKind;

/// Identifiers of the built-in cards.
pub mod ids {
    use super::CardId;

    pub const WRATH_WEAVER: CardId = CardId::new(1);
    pub const MICRO_MUMMY: CardId = CardId::new(2);
    pub const SCALLYWAG: CardId = CardId::new(3);
    pub const SELLEMENTAL: CardId = CardId::new(4);
    pub const RED_WHELP: CardId = CardId::new(5);
    pub const MICRO_MACHINE: CardId = CardId::new(6);
    pub const MANASABER: CardId = CardId::new(7);
    pub const ANNOY_O_TRON: CardId = CardId::new(8);
    pub const KABOOM_BOT: CardId = CardId::new(9);
    pub const IMPRISONER: CardId = CardId::new(10);
    pub const GLYPH_GUARDIAN: CardId = CardId::new(11);
    pub const DUNE_SNIPER: CardId = CardId::new(12);
    pub const PATIENT_SCOUT: CardId = CardId::new(13);
    pub const DEFLECT_O_BOT: CardId = CardId::new(14);
    pub const BRONZE_WARDEN: CardId = CardId::new(15);
    pub const SECURITY_ROVER: CardId = CardId::new(16);
    pub const CYCLONIAN: CardId = CardId::new(17);
    pub const TUNNEL_BLASTER: CardId = CardId::new(18);
    pub const MAEXXNA: CardId = CardId::new(19);
    pub const GOLDRINN: CardId = CardId::new(20);

    pub const SKY_PIRATE: CardId = CardId::new(101);
    pub const CUBLING: CardId = CardId::new(102);
    pub const IMP: CardId = CardId::new(103);
    pub const GUARD_BOT: CardId = CardId::new(104);
}

/// Registry of minion definitions.
///
/// ```
/// use bgsim::cards::{CardCatalog, CardId, MinionDef};
///
/// let mut catalog = CardCatalog::new();
/// catalog.register(MinionDef::new(CardId::new(1), "Wrath Weaver", 1, 1, 3));
///
/// assert_eq!(catalog.get(CardId::new(1)).unwrap().name, "Wrath Weaver");
/// assert!(catalog.by_name("wrath weaver").is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: FxHashMap<CardId, MinionDef>,
}

impl CardCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, replacing any previous one with the same id.
    ///
    /// Returns the replaced definition.
    pub fn register(&mut self, def: MinionDef) -> Option<MinionDef> {
        self.cards.insert(def.id, def)
    }

    /// Look up a definition.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&MinionDef> {
        self.cards.get(&id)
    }

    /// Check if an id is registered.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Case-insensitive lookup by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&MinionDef> {
        self.cards.values().find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Display name of a card, or `"?"` when unknown.
    #[must_use]
    pub fn name_of(&self, id: CardId) -> &str {
        self.get(id).map_or("?", |d| d.name.as_str())
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All definitions, sorted by id so iteration is deterministic.
    #[must_use]
    pub fn sorted(&self) -> Vec<&MinionDef> {
        let mut defs: Vec<_> = self.cards.values().collect();
        defs.sort_by_key(|d| d.id);
        defs
    }

    /// Non-token definitions of a given tier, sorted by id.
    #[must_use]
    pub fn by_tier(&self, tier: u8) -> Vec<&MinionDef> {
        self.sorted()
            .into_iter()
            .filter(|d| d.tier == tier && !d.token)
            .collect()
    }

    /// The built-in card set.
    #[must_use]
    pub fn standard() -> Self {
        use ids::*;
        use Keyword::*;
        use TriggerKind::*;

        let defs = [
            MinionDef::new(WRATH_WEAVER, "Wrath Weaver", 1, 1, 3).with_tribe(Tribe::Demon),
            MinionDef::new(MICRO_MUMMY, "Micro Mummy", 1, 1, 2)
                .with_tribe(Tribe::Mech)
                .with_tribe(Tribe::Undead)
                .with_keyword(Reborn),
            MinionDef::new(SCALLYWAG, "Scallywag", 1, 2, 1)
                .with_tribe(Tribe::Pirate)
                .with_ability(OnDeath),
            MinionDef::new(SELLEMENTAL, "Sellemental", 1, 2, 2).with_tribe(Tribe::Elemental),
            MinionDef::new(RED_WHELP, "Red Whelp", 1, 1, 2)
                .with_tribe(Tribe::Dragon)
                .with_ability(OnCombatStart),
            MinionDef::new(MICRO_MACHINE, "Micro Machine", 1, 1, 2)
                .with_tribe(Tribe::Mech)
                .with_ability(OnTurnStart),
            MinionDef::new(MANASABER, "Manasaber", 2, 4, 2)
                .with_tribe(Tribe::Beast)
                .with_ability(OnDeath),
            MinionDef::new(ANNOY_O_TRON, "Annoy-o-Tron", 2, 1, 2)
                .with_tribe(Tribe::Mech)
                .with_keyword(Taunt)
                .with_keyword(DivineShield),
            MinionDef::new(KABOOM_BOT, "Kaboom Bot", 2, 2, 2)
                .with_tribe(Tribe::Mech)
                .with_ability(OnDeath),
            MinionDef::new(IMPRISONER, "Imprisoner", 2, 3, 3)
                .with_tribe(Tribe::Demon)
                .with_keyword(Taunt)
                .with_ability(OnDeath),
            MinionDef::new(GLYPH_GUARDIAN, "Glyph Guardian", 2, 2, 4)
                .with_tribe(Tribe::Dragon)
                .with_ability(OnAttack),
            MinionDef::new(DUNE_SNIPER, "Dune Sniper", 2, 3, 2)
                .with_tribe(Tribe::Naga)
                .with_keyword(Ranged),
            MinionDef::new(PATIENT_SCOUT, "Patient Scout", 3, 1, 1),
            MinionDef::new(DEFLECT_O_BOT, "Deflect-o-Bot", 3, 3, 2)
                .with_tribe(Tribe::Mech)
                .with_keyword(DivineShield)
                .with_ability(OnSummon),
            MinionDef::new(BRONZE_WARDEN, "Bronze Warden", 3, 2, 1)
                .with_tribe(Tribe::Dragon)
                .with_keyword(DivineShield)
                .with_keyword(Reborn),
            MinionDef::new(SECURITY_ROVER, "Security Rover", 4, 2, 6)
                .with_tribe(Tribe::Mech)
                .with_ability(OnDamaged),
            MinionDef::new(CYCLONIAN, "Cyclonian", 4, 3, 7)
                .with_tribe(Tribe::Elemental)
                .with_keyword(Windfury),
            MinionDef::new(TUNNEL_BLASTER, "Tunnel Blaster", 5, 3, 7)
                .with_keyword(Taunt)
                .with_ability(OnDeath),
            MinionDef::new(MAEXXNA, "Maexxna", 6, 2, 8)
                .with_tribe(Tribe::Beast)
                .with_keyword(Poisonous),
            MinionDef::new(GOLDRINN, "Goldrinn", 6, 4, 4)
                .with_tribe(Tribe::Beast)
                .with_ability(OnDeath),
            MinionDef::new(SKY_PIRATE, "Sky Pirate", 1, 1, 1)
                .with_tribe(Tribe::Pirate)
                .as_token(),
            MinionDef::new(CUBLING, "Cubling", 1, 0, 1)
                .with_tribe(Tribe::Beast)
                .with_keyword(Taunt)
                .as_token(),
            MinionDef::new(IMP, "Imp", 1, 1, 1).with_tribe(Tribe::Demon).as_token(),
            MinionDef::new(GUARD_BOT, "Guard Bot", 1, 2, 3)
                .with_tribe(Tribe::Mech)
                .with_keyword(Taunt)
                .as_token(),
        ];

        let mut catalog = Self::new();
        for def in defs {
            catalog.register(def);
        }
        catalog
    }
}
