//! Whole-match behavior: rounds, damage, eliminations, the shared pool.

use std::sync::Arc;

use bgsim::env::{play_match, IdlePolicy, Policy, RandomPolicy};
use bgsim::{
    AbilityRegistry, Action, ActionError, CardCatalog, CardId, CombatEvent, Match, MatchConfig, MinionDef, Phase,
    PlayerId, TriggerKind,
};

fn random_policies(n: usize, seed: u64) -> Vec<Box<dyn Policy>> {
    (0..n)
        .map(|i| Box::new(RandomPolicy::new(seed ^ i as u64).with_pass_probability(0.1)) as Box<dyn Policy>)
        .collect()
}

fn cards_in_play(game: &Match) -> u32 {
    game.pool().total_remaining()
        + game
            .players()
            .map(|p| (p.shop.len() + p.board.len()) as u32)
            .sum::<u32>()
}

/// Drive one shop phase with random policies.
fn shop_phase(game: &mut Match, policies: &mut [Box<dyn Policy>]) {
    for _ in 0..game.config().shop_action_budget {
        for id in game.active_players() {
            let legal = game.legal_actions(id);
            if legal.is_empty() {
                continue;
            }
            let obs = game.observe(id).unwrap();
            if let Some(action) = policies[id.index()].act(&obs, &legal) {
                game.act(id, action).unwrap();
            }
        }
    }
}

#[test]
fn test_idle_players_time_out_and_round_runs() {
    let mut game = Match::standard(MatchConfig::default().with_player_count(4), 1, 1).unwrap();
    let mut policies: Vec<Box<dyn Policy>> = (0..4).map(|_| Box::new(IdlePolicy) as Box<dyn Policy>).collect();

    shop_phase(&mut game, &mut policies);
    assert!(!game.all_passed());
    assert_eq!(game.advance().unwrap(), None);

    game.expire_shop_phase();
    let record = game.advance().unwrap().unwrap();
    assert_eq!(record.round, 1);
    assert_eq!(game.round(), 2);
    assert_eq!(game.phase(), Phase::ShopPhase);
}

#[test]
fn test_damage_accounting_matches_records() {
    let config = MatchConfig::default().with_player_count(6).with_max_rounds(20);
    let mut game = Match::standard(config, 3, 17).unwrap();
    let mut policies = random_policies(6, 17);

    while !game.is_over() {
        let before: Vec<u32> = game.players().map(|p| p.effective_health()).collect();
        shop_phase(&mut game, &mut policies);
        let Some(record) = game.play_round().unwrap() else { break };

        for delta in &record.health_deltas {
            let pairing = record
                .pairings
                .iter()
                .find(|r| r.loser() == Some(delta.player))
                .expect("delta without a lost pairing");
            assert_eq!(pairing.damage, delta.damage);
            assert_eq!(game.player(delta.player).unwrap().health, delta.health_after);
        }
        for (i, p) in game.players().enumerate() {
            let taken: u32 = record
                .health_deltas
                .iter()
                .filter(|d| d.player.index() == i)
                .map(|d| d.damage)
                .sum();
            assert_eq!(p.effective_health(), before[i].saturating_sub(taken));
        }
    }
}

#[test]
fn test_eliminations_are_final() {
    let config = MatchConfig::default().with_player_count(8).with_starting_health(10).with_max_rounds(30);
    let mut game = Match::standard(config, 5, 23).unwrap();
    let mut policies = random_policies(8, 23);
    let mut eliminated: Vec<PlayerId> = Vec::new();

    while !game.is_over() {
        shop_phase(&mut game, &mut policies);
        let Some(record) = game.play_round().unwrap() else { break };

        for id in &eliminated {
            let p = game.player(*id).unwrap();
            assert_eq!(p.health, 0);
            assert!(p.board.is_empty());
            assert!(game.legal_actions(*id).is_empty());
            assert!(!record.pairings.iter().any(|r| r.a == *id || r.b == *id));
            assert_ne!(record.bye, Some(*id));
        }
        eliminated.extend(record.eliminations.iter().copied());
    }

    let standings = game.standings();
    assert_eq!(standings.len(), 8);
    assert!(standings.iter().all(|s| s.placement >= 1 && s.placement <= 8));
}

#[test]
fn test_pool_is_conserved() {
    let config = MatchConfig::default().with_player_count(8).with_starting_health(15).with_max_rounds(25);
    let mut game = Match::standard(config, 2, 5).unwrap();
    let mut policies = random_policies(8, 5);
    let total = cards_in_play(&game);

    while !game.is_over() {
        shop_phase(&mut game, &mut policies);
        assert_eq!(cards_in_play(&game), total);
        if game.play_round().unwrap().is_none() {
            break;
        }
        assert_eq!(cards_in_play(&game), total);
    }
}

#[test]
fn test_turn_start_deaths_return_to_pool() {
    let fuse = CardId::new(900);
    let mut catalog = CardCatalog::new();
    catalog.register(MinionDef::new(fuse, "Fuse", 1, 1, 1).with_ability(TriggerKind::OnTurnStart));
    let mut registry = AbilityRegistry::new();
    registry.register(fuse, TriggerKind::OnTurnStart, |ctx| {
        [CombatEvent::damage(None, ctx.source, 5)].into_iter().collect()
    });
    let config = MatchConfig::default().with_player_count(2);
    let mut game = Match::new(config, Arc::new(catalog), Arc::new(registry), 1, 1).unwrap();
    let total = cards_in_play(&game);

    game.act(PlayerId::new(0), Action::Buy { shop_slot: 0 }).unwrap();
    game.play_round().unwrap().unwrap();

    assert_eq!(game.round(), 2);
    assert!(game.player(PlayerId::new(0)).unwrap().board.is_empty());
    assert_eq!(cards_in_play(&game), total);
}

#[test]
fn test_rejected_actions_change_nothing() {
    let mut game = Match::standard(MatchConfig::default().with_player_count(2), 1, 9).unwrap();
    let id = PlayerId::new(0);
    let before = game.player(id).unwrap().clone();
    let pool = game.pool().clone();

    assert_eq!(
        game.act(id, Action::Sell { board_slot: 0 }),
        Err(ActionError::InvalidBoardSlot { slot: 0, len: 0 })
    );
    assert_eq!(
        game.act(id, Action::Buy { shop_slot: 9 }),
        Err(ActionError::InvalidShopSlot { slot: 9, len: 3 })
    );
    assert_eq!(
        game.act(id, Action::Upgrade),
        Err(ActionError::InsufficientGold { needed: 5, available: 3 })
    );
    assert_eq!(game.player(id).unwrap(), &before);
    assert_eq!(game.pool(), &pool);
}

#[test]
fn test_buy_then_sell_round_trips_the_pool() {
    let mut game = Match::standard(MatchConfig::default().with_player_count(2), 1, 9).unwrap();
    let id = PlayerId::new(1);
    let offered = game.player(id).unwrap().shop[0];
    let remaining = game.pool().remaining(offered);

    game.act(id, Action::Buy { shop_slot: 0 }).unwrap();
    assert_eq!(game.player(id).unwrap().gold, 0);
    assert_eq!(game.player(id).unwrap().board.len(), 1);

    game.act(id, Action::Sell { board_slot: 0 }).unwrap();
    assert_eq!(game.player(id).unwrap().gold, 1);
    assert_eq!(game.pool().remaining(offered), remaining + 1);
}

#[test]
fn test_freeze_keeps_the_shop() {
    let mut game = Match::standard(MatchConfig::default().with_player_count(2), 1, 4).unwrap();
    let id = PlayerId::new(0);
    let shop = game.player(id).unwrap().shop.clone();

    game.act(id, Action::Freeze).unwrap();
    game.play_round().unwrap();

    let player = game.player(id).unwrap();
    assert_eq!(player.shop, shop);
    assert!(!player.frozen);
}

#[test]
fn test_play_match_is_reproducible() {
    let config = MatchConfig::default().with_player_count(4).with_max_rounds(15);
    let run = || {
        let mut game = Match::standard(config.clone(), 8, 31).unwrap();
        let mut policies = random_policies(4, 31);
        play_match(&mut game, &mut policies).unwrap()
    };
    assert_eq!(run(), run());
}
