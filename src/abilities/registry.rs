//! Ability registry.
//!
//! Maps `(CardId, TriggerKind)` to handler closures. The combat resolver
//! hands every applied event to [`AbilityRegistry::dispatch`], which finds
//! the minions the event concerns and collects the follow-up events their
//! handlers return.
//!
//! ## Routing
//!
//! | Event        | Fires                                              |
//! |--------------|----------------------------------------------------|
//! | `Attack`     | `OnAttack` of the attacker                         |
//! | `Damage`     | `OnDamaged` of the target, if health was lost      |
//! | `Death`      | `OnDeath` of the dead minion                       |
//! | `Summon`     | `OnSummon` of every other friendly minion, L to R  |
//! | `BuffApplied`| nothing                                            |
//!
//! Handlers only read the arena. They may emit `Damage`, `Summon` and
//! `BuffApplied`; anything else is rejected as a malformed interaction.
//! Cards without a registered handler simply do nothing.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::event::{CombatEvent, TriggerKind};
use crate::cards::{CardCatalog, CardId, Minion};
use crate::combat::Arena;
use crate::core::rng::mix64;
use crate::core::{MinionRef, Side};
use crate::error::{ConfigurationError, SimulationError};

/// Events returned by one handler invocation.
pub type FollowUps = SmallVec<[CombatEvent; 4]>;

/// A card behavior.
pub type Handler = Arc<dyn Fn(&TriggerContext<'_>) -> FollowUps + Send + Sync>;

/// What a handler gets to see.
pub struct TriggerContext<'a> {
    /// Why the handler fired.
    pub kind: TriggerKind,
    /// The event that caused it. `None` for combat start and turn start.
    pub event: Option<&'a CombatEvent>,
    /// The minion whose ability fires.
    pub source: MinionRef,
    /// State of that minion (may already be dead for `OnDeath`).
    pub minion: &'a Minion,
    /// Read-only view of both boards.
    pub view: &'a Arena,
    /// Per-invocation randomness.
    pub entropy: u64,
}

impl TriggerContext<'_> {
    /// Side of the source minion.
    #[must_use]
    pub fn side(&self) -> Side {
        self.source.side
    }

    /// Side of the opponent.
    #[must_use]
    pub fn enemy(&self) -> Side {
        self.source.side.opponent()
    }

    /// Board position of the source. For deathrattles this is the position
    /// the minion died at.
    #[must_use]
    pub fn position(&self) -> usize {
        match self.event {
            Some(CombatEvent::Death { minion, position, .. }) if *minion == self.source => {
                usize::from(*position)
            }
            _ => self.view.position(self.source).unwrap_or(0),
        }
    }

    /// Random enemy minion, if any.
    #[must_use]
    pub fn random_enemy(&self) -> Option<MinionRef> {
        self.view.pick(self.enemy(), self.entropy, None)
    }
}

/// Registry of card behaviors.
///
/// ```
/// use bgsim::abilities::{AbilityRegistry, CombatEvent, TriggerKind};
/// use bgsim::cards::CardId;
///
/// let mut registry = AbilityRegistry::new();
/// registry.register(CardId::new(7), TriggerKind::OnAttack, |ctx| {
///     [CombatEvent::buff(ctx.source, 1, 0)].into_iter().collect()
/// });
/// assert!(registry.has(CardId::new(7), TriggerKind::OnAttack));
/// assert!(!registry.has(CardId::new(7), TriggerKind::OnDeath));
/// ```
#[derive(Clone, Default)]
pub struct AbilityRegistry {
    handlers: FxHashMap<(CardId, TriggerKind), Vec<Handler>>,
}

impl std::fmt::Debug for AbilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbilityRegistry")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl AbilityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The handlers for the built-in card set.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        super::standard::register_all(&mut registry);
        registry
    }

    /// Add a handler. Several handlers on the same key run in
    /// registration order.
    pub fn register<F>(&mut self, card: CardId, kind: TriggerKind, handler: F)
    where
        F: Fn(&TriggerContext<'_>) -> FollowUps + Send + Sync + 'static,
    {
        self.handlers.entry((card, kind)).or_default().push(Arc::new(handler));
    }

    /// Check whether a card has a handler for `kind`.
    #[must_use]
    pub fn has(&self, card: CardId, kind: TriggerKind) -> bool {
        self.handlers.get(&(card, kind)).is_some_and(|h| !h.is_empty())
    }

    /// Number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Declared abilities with no handler, sorted by card.
    #[must_use]
    pub fn missing(&self, catalog: &CardCatalog) -> Vec<(CardId, TriggerKind)> {
        catalog
            .sorted()
            .into_iter()
            .flat_map(|def| def.abilities.iter().map(move |&kind| (def.id, kind)))
            .filter(|&(card, kind)| !self.has(card, kind))
            .collect()
    }

    /// Strict check: every declared ability must have a handler.
    pub fn validate(&self, catalog: &CardCatalog) -> Result<(), ConfigurationError> {
        match self.missing(catalog).first() {
            Some(&(card, kind)) => Err(ConfigurationError::MissingHandler {
                card,
                name: catalog.name_of(card).to_string(),
                kind,
            }),
            None => Ok(()),
        }
    }

    /// Run the `kind` handlers of one minion.
    pub fn fire(
        &self,
        kind: TriggerKind,
        source: MinionRef,
        event: Option<&CombatEvent>,
        view: &Arena,
        entropy: u64,
        out: &mut Vec<CombatEvent>,
    ) -> Result<(), SimulationError> {
        let Some(minion) = view.get(source) else {
            return Ok(());
        };
        let Some(handlers) = self.handlers.get(&(minion.card, kind)) else {
            return Ok(());
        };

        for (i, handler) in handlers.iter().enumerate() {
            let ctx = TriggerContext {
                kind,
                event,
                source,
                minion,
                view,
                entropy: mix64(entropy ^ i as u64),
            };
            for follow_up in handler(&ctx) {
                if !follow_up.is_follow_up() {
                    return Err(SimulationError::MalformedInteraction {
                        card: minion.card,
                        kind,
                        event: follow_up,
                    });
                }
                out.push(follow_up);
            }
        }
        Ok(())
    }

    /// Collect the follow-ups of every handler an applied event triggers.
    pub fn dispatch(
        &self,
        event: &CombatEvent,
        view: &Arena,
        entropy: u64,
    ) -> Result<Vec<CombatEvent>, SimulationError> {
        let mut out = Vec::new();
        match event {
            CombatEvent::Attack { attacker, .. } => {
                self.fire(TriggerKind::OnAttack, *attacker, Some(event), view, entropy, &mut out)?;
            }
            CombatEvent::Damage { target, amount, absorbed, .. } => {
                if *amount > 0 && !absorbed {
                    self.fire(TriggerKind::OnDamaged, *target, Some(event), view, entropy, &mut out)?;
                }
            }
            CombatEvent::Death { minion, .. } => {
                self.fire(TriggerKind::OnDeath, *minion, Some(event), view, entropy, &mut out)?;
            }
            CombatEvent::Summon { side, slot: Some(slot), .. } => {
                let summoned = MinionRef::new(*side, *slot);
                for (i, r) in view.living_refs(*side).into_iter().enumerate() {
                    if r != summoned {
                        let salt = mix64(entropy.wrapping_add(i as u64));
                        self.fire(TriggerKind::OnSummon, r, Some(event), view, salt, &mut out)?;
                    }
                }
            }
            CombatEvent::Summon { slot: None, .. } | CombatEvent::BuffApplied { .. } => {}
        }
        Ok(out)
    }

    /// Fire `kind` for every minion on `sides`, in order, left to right.
    /// Used for combat start and turn start, which have no causing event.
    pub fn fire_all(
        &self,
        kind: TriggerKind,
        sides: &[Side],
        view: &Arena,
        entropy: u64,
    ) -> Result<Vec<CombatEvent>, SimulationError> {
        let mut out = Vec::new();
        let refs = sides.iter().flat_map(|&side| view.living_refs(side));
        for (n, r) in refs.enumerate() {
            self.fire(kind, r, None, view, mix64(entropy.wrapping_add(n as u64)), &mut out)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::cards::MinionDef;

    fn arena() -> Arena {
        let a = Board::from_minions(vec![
            Minion::vanilla(CardId::new(1), 1, 1),
            Minion::vanilla(CardId::new(2), 2, 2),
        ]);
        let b = Board::from_minions(vec![Minion::vanilla(CardId::new(3), 3, 3)]);
        Arena::new(&a, &b)
    }

    #[test]
    fn test_unregistered_card_is_noop() {
        let registry = AbilityRegistry::new();
        let arena = arena();
        let a0 = arena.at(Side::A, 0).unwrap();
        let b0 = arena.at(Side::B, 0).unwrap();
        let out = registry
            .dispatch(&CombatEvent::Attack { attacker: a0, defender: b0 }, &arena, 1)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_attack_routes_to_attacker() {
        let mut registry = AbilityRegistry::new();
        registry.register(CardId::new(1), TriggerKind::OnAttack, |ctx| {
            [CombatEvent::buff(ctx.source, 5, 0)].into_iter().collect()
        });
        let arena = arena();
        let a0 = arena.at(Side::A, 0).unwrap();
        let b0 = arena.at(Side::B, 0).unwrap();
        let out = registry
            .dispatch(&CombatEvent::Attack { attacker: a0, defender: b0 }, &arena, 1)
            .unwrap();
        assert_eq!(out, vec![CombatEvent::buff(a0, 5, 0)]);
    }

    #[test]
    fn test_absorbed_damage_does_not_trigger() {
        let mut registry = AbilityRegistry::new();
        registry.register(CardId::new(3), TriggerKind::OnDamaged, |ctx| {
            [CombatEvent::buff(ctx.source, 1, 0)].into_iter().collect()
        });
        let arena = arena();
        let b0 = arena.at(Side::B, 0).unwrap();

        let absorbed = CombatEvent::Damage { source: None, target: b0, amount: 0, absorbed: true };
        assert!(registry.dispatch(&absorbed, &arena, 0).unwrap().is_empty());

        let lost = CombatEvent::Damage { source: None, target: b0, amount: 2, absorbed: false };
        assert_eq!(registry.dispatch(&lost, &arena, 0).unwrap().len(), 1);
    }

    #[test]
    fn test_summon_notifies_other_friendlies_in_order() {
        let mut registry = AbilityRegistry::new();
        for id in [1, 2] {
            registry.register(CardId::new(id), TriggerKind::OnSummon, |ctx| {
                [CombatEvent::buff(ctx.source, 1, 0)].into_iter().collect()
            });
        }
        let mut arena = arena();
        let token = arena.summon(Side::A, 2, Minion::vanilla(CardId::new(1), 1, 1)).unwrap();
        let event = CombatEvent::Summon {
            side: Side::A,
            position: 2,
            card: CardId::new(1),
            reborn: false,
            slot: Some(token.slot),
        };
        let out = registry.dispatch(&event, &arena, 0).unwrap();
        let targets: Vec<_> = out
            .iter()
            .map(|e| match e {
                CombatEvent::BuffApplied { target, .. } => *target,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(targets, vec![arena.at(Side::A, 0).unwrap(), arena.at(Side::A, 1).unwrap()]);
    }

    #[test]
    fn test_forbidden_follow_up_is_malformed() {
        let mut registry = AbilityRegistry::new();
        registry.register(CardId::new(1), TriggerKind::OnAttack, |ctx| {
            [CombatEvent::Death { minion: ctx.source, card: ctx.minion.card, position: 0 }]
                .into_iter()
                .collect()
        });
        let arena = arena();
        let a0 = arena.at(Side::A, 0).unwrap();
        let b0 = arena.at(Side::B, 0).unwrap();
        let err = registry
            .dispatch(&CombatEvent::Attack { attacker: a0, defender: b0 }, &arena, 1)
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::MalformedInteraction { kind: TriggerKind::OnAttack, .. }
        ));
    }

    #[test]
    fn test_validate_reports_missing_handler() {
        let mut catalog = CardCatalog::new();
        catalog.register(
            MinionDef::new(CardId::new(40), "Haunted", 1, 1, 1).with_ability(TriggerKind::OnDeath),
        );
        let mut registry = AbilityRegistry::new();
        assert_eq!(
            registry.validate(&catalog),
            Err(ConfigurationError::MissingHandler {
                card: CardId::new(40),
                name: "Haunted".to_string(),
                kind: TriggerKind::OnDeath,
            })
        );

        registry.register(CardId::new(40), TriggerKind::OnDeath, |_| FollowUps::new());
        assert!(registry.validate(&catalog).is_ok());
    }

    #[test]
    fn test_standard_registry_covers_standard_catalog() {
        let registry = AbilityRegistry::standard();
        assert!(registry.validate(&CardCatalog::standard()).is_ok());
    }
}
