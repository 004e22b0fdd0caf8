//! Combat events and trigger kinds.
//!
//! Events are the unit the ability registry reacts to and the unit the
//! combat log records. Handlers answer events with follow-up events, which
//! the resolver applies through its single event loop.
//!
//! Follow-ups are requests: a `Damage` carries the requested amount and a
//! `Summon` has no slot yet. Once applied, the logged copy carries the
//! outcome (health actually lost, slot assigned).

use serde::{Deserialize, Serialize};

use crate::cards::{CardId, Keywords};
use crate::core::{MinionRef, Side};

/// When a handler fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TriggerKind {
    /// The minion is about to attack.
    OnAttack,
    /// The minion lost health.
    OnDamaged,
    /// The minion died (deathrattle).
    OnDeath,
    /// Another minion was summoned on the same side.
    OnSummon,
    /// Combat begins.
    OnCombatStart,
    /// A shop phase begins.
    OnTurnStart,
}

/// Something that happened (or is requested to happen) in combat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// `attacker` strikes `defender`. Emitted by the resolver only.
    Attack { attacker: MinionRef, defender: MinionRef },

    /// One damage instance. In the log, `amount` is the health actually
    /// lost and `absorbed` tells whether divine shield took the hit.
    Damage {
        source: Option<MinionRef>,
        target: MinionRef,
        amount: i32,
        absorbed: bool,
    },

    /// A minion died at `position`. Emitted by the resolver only.
    Death { minion: MinionRef, card: CardId, position: u8 },

    /// Summon a copy of `card` at `position` on `side`. `reborn` copies come
    /// back with 1 health and without reborn. `slot` is filled in the log.
    Summon {
        side: Side,
        position: u8,
        card: CardId,
        reborn: bool,
        slot: Option<u16>,
    },

    /// Stat change and keyword grant on `target`.
    BuffApplied {
        target: MinionRef,
        attack: i32,
        health: i32,
        grant: Keywords,
    },
}

impl CombatEvent {
    /// Request a damage instance.
    #[must_use]
    pub fn damage(source: Option<MinionRef>, target: MinionRef, amount: i32) -> Self {
        Self::Damage { source, target, amount, absorbed: false }
    }

    /// Request a summon.
    #[must_use]
    pub fn summon(side: Side, position: u8, card: CardId) -> Self {
        Self::Summon { side, position, card, reborn: false, slot: None }
    }

    /// Request a stat buff.
    #[must_use]
    pub fn buff(target: MinionRef, attack: i32, health: i32) -> Self {
        Self::BuffApplied { target, attack, health, grant: Keywords::NONE }
    }

    /// Request a keyword grant.
    #[must_use]
    pub fn grant(target: MinionRef, keywords: Keywords) -> Self {
        Self::BuffApplied { target, attack: 0, health: 0, grant: keywords }
    }

    /// Whether an ability handler may emit this event.
    ///
    /// Attacks and deaths are decided by the resolver alone.
    #[must_use]
    pub fn is_follow_up(&self) -> bool {
        matches!(
            self,
            CombatEvent::Damage { .. } | CombatEvent::Summon { .. } | CombatEvent::BuffApplied { .. }
        )
    }

    /// Short tag for logging.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            CombatEvent::Attack { .. } => "attack",
            CombatEvent::Damage { .. } => "damage",
            CombatEvent::Death { .. } => "death",
            CombatEvent::Summon { .. } => "summon",
            CombatEvent::BuffApplied { .. } => "buff",
        }
    }
}
