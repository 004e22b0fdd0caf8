//! Handlers for the built-in card set.

use super::event::{CombatEvent, TriggerKind};
use super::registry::{AbilityRegistry, FollowUps, TriggerContext};
use crate::cards::{ids, CardId, Keyword, Keywords, Tribe};
use crate::core::MinionRef;

pub(super) fn register_all(registry: &mut AbilityRegistry) {
    use TriggerKind::*;

    registry.register(ids::SCALLYWAG, OnDeath, |ctx| summon_here(ctx, ids::SKY_PIRATE, 1));
    registry.register(ids::MANASABER, OnDeath, |ctx| summon_here(ctx, ids::CUBLING, 2));
    registry.register(ids::IMPRISONER, OnDeath, |ctx| summon_here(ctx, ids::IMP, 1));
    registry.register(ids::KABOOM_BOT, OnDeath, kaboom_bot);
    registry.register(ids::TUNNEL_BLASTER, OnDeath, tunnel_blaster);
    registry.register(ids::GOLDRINN, OnDeath, goldrinn);
    registry.register(ids::RED_WHELP, OnCombatStart, red_whelp);
    registry.register(ids::MICRO_MACHINE, OnTurnStart, |ctx| {
        [CombatEvent::buff(ctx.source, 1, 0)].into_iter().collect()
    });
    registry.register(ids::GLYPH_GUARDIAN, OnAttack, |ctx| {
        [CombatEvent::buff(ctx.source, ctx.minion.attack, 0)].into_iter().collect()
    });
    registry.register(ids::DEFLECT_O_BOT, OnSummon, deflect_o_bot);
    registry.register(ids::SECURITY_ROVER, OnDamaged, |ctx| {
        let position = ctx.position() + 1;
        [CombatEvent::summon(ctx.side(), position as u8, ids::GUARD_BOT)].into_iter().collect()
    });
}

/// Summon `count` tokens where the source stands, left to right.
fn summon_here(ctx: &TriggerContext<'_>, card: CardId, count: usize) -> FollowUps {
    let position = ctx.position();
    (0..count)
        .map(|i| CombatEvent::summon(ctx.side(), (position + i) as u8, card))
        .collect()
}

fn kaboom_bot(ctx: &TriggerContext<'_>) -> FollowUps {
    ctx.random_enemy()
        .map(|target| CombatEvent::damage(Some(ctx.source), target, 4))
        .into_iter()
        .collect()
}

fn tunnel_blaster(ctx: &TriggerContext<'_>) -> FollowUps {
    [ctx.side(), ctx.enemy()]
        .into_iter()
        .flat_map(|side| ctx.view.living_refs(side))
        .filter(|&r| r != ctx.source)
        .map(|target| CombatEvent::damage(Some(ctx.source), target, 3))
        .collect()
}

fn goldrinn(ctx: &TriggerContext<'_>) -> FollowUps {
    ctx.view
        .living(ctx.side())
        .filter(|(r, m)| *r != ctx.source && m.is_tribe(Tribe::Beast))
        .map(|(r, _)| CombatEvent::buff(r, 5, 5))
        .collect()
}

fn red_whelp(ctx: &TriggerContext<'_>) -> FollowUps {
    let dragons = ctx.view.tribe_count(ctx.side(), Tribe::Dragon) as i32;
    ctx.random_enemy()
        .map(|target| CombatEvent::damage(Some(ctx.source), target, dragons))
        .into_iter()
        .collect()
}

fn deflect_o_bot(ctx: &TriggerContext<'_>) -> FollowUps {
    let Some(&CombatEvent::Summon { side, slot: Some(slot), .. }) = ctx.event else {
        return FollowUps::new();
    };
    let summoned = ctx.view.get(MinionRef::new(side, slot));
    if side != ctx.side() || !summoned.is_some_and(|m| m.is_tribe(Tribe::Mech)) {
        return FollowUps::new();
    }
    [
        CombatEvent::buff(ctx.source, 2, 0),
        CombatEvent::grant(ctx.source, Keywords::NONE.with(Keyword::DivineShield)),
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::cards::{CardCatalog, Minion};
    use crate::combat::Arena;
    use crate::core::Side;

    fn minion(catalog: &CardCatalog, id: CardId) -> Minion {
        Minion::from_def(catalog.get(id).unwrap())
    }

    #[test]
    fn test_manasaber_summons_two_cublings_in_place() {
        let catalog = CardCatalog::standard();
        let registry = AbilityRegistry::standard();
        let a = Board::from_minions(vec![
            minion(&catalog, ids::WRATH_WEAVER),
            minion(&catalog, ids::MANASABER),
        ]);
        let arena = Arena::new(&a, &Board::default());
        let saber = arena.at(Side::A, 1).unwrap();
        let death = CombatEvent::Death { minion: saber, card: ids::MANASABER, position: 1 };

        let out = registry.dispatch(&death, &arena, 0).unwrap();
        assert_eq!(
            out,
            vec![
                CombatEvent::summon(Side::A, 1, ids::CUBLING),
                CombatEvent::summon(Side::A, 2, ids::CUBLING),
            ]
        );
    }

    #[test]
    fn test_red_whelp_counts_friendly_dragons() {
        let catalog = CardCatalog::standard();
        let registry = AbilityRegistry::standard();
        let a = Board::from_minions(vec![
            minion(&catalog, ids::RED_WHELP),
            minion(&catalog, ids::GLYPH_GUARDIAN),
        ]);
        let b = Board::from_minions(vec![minion(&catalog, ids::WRATH_WEAVER)]);
        let arena = Arena::new(&a, &b);

        let out = registry.fire_all(TriggerKind::OnCombatStart, &[Side::A, Side::B], &arena, 9).unwrap();
        assert_eq!(
            out,
            vec![CombatEvent::damage(arena.at(Side::A, 0), arena.at(Side::B, 0).unwrap(), 2)]
        );
    }

    #[test]
    fn test_deflect_o_bot_reacts_to_friendly_mechs_only() {
        let catalog = CardCatalog::standard();
        let registry = AbilityRegistry::standard();
        let a = Board::from_minions(vec![minion(&catalog, ids::DEFLECT_O_BOT)]);
        let mut arena = Arena::new(&a, &Board::default());
        let bot = arena.at(Side::A, 0).unwrap();

        let imp = arena.summon(Side::A, 1, minion(&catalog, ids::IMP)).unwrap();
        let event = CombatEvent::Summon {
            side: Side::A,
            position: 1,
            card: ids::IMP,
            reborn: false,
            slot: Some(imp.slot),
        };
        assert!(registry.dispatch(&event, &arena, 0).unwrap().is_empty());

        let guard = arena.summon(Side::A, 2, minion(&catalog, ids::GUARD_BOT)).unwrap();
        let event = CombatEvent::Summon {
            side: Side::A,
            position: 2,
            card: ids::GUARD_BOT,
            reborn: false,
            slot: Some(guard.slot),
        };
        let out = registry.dispatch(&event, &arena, 0).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], CombatEvent::buff(bot, 2, 0));
    }

    #[test]
    fn test_tunnel_blaster_hits_everything_else() {
        let catalog = CardCatalog::standard();
        let registry = AbilityRegistry::standard();
        let a = Board::from_minions(vec![
            minion(&catalog, ids::TUNNEL_BLASTER),
            minion(&catalog, ids::WRATH_WEAVER),
        ]);
        let b = Board::from_minions(vec![minion(&catalog, ids::SELLEMENTAL)]);
        let arena = Arena::new(&a, &b);
        let blaster = arena.at(Side::A, 0).unwrap();
        let death = CombatEvent::Death { minion: blaster, card: ids::TUNNEL_BLASTER, position: 0 };

        let out = registry.dispatch(&death, &arena, 0).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|e| matches!(e, CombatEvent::Damage { amount: 3, .. })));
    }
}
