//! The turn state machine.
//!
//! A [`Match`] owns every player, the shared pool and the round log. It
//! accepts shop actions until every active player has passed (or the phase
//! is expired), then pairs players, resolves the combats, applies damage and
//! starts the next round.
//!
//! ## Round cycle
//!
//! 1. `ShopPhase`: gold granted, shops refreshed unless frozen, turn-start
//!    triggers applied. Players act until they pass, run out of action
//!    budget, or [`Match::expire_shop_phase`] auto-passes them.
//! 2. `CombatPairing`: [`Matchmaker`] picks opponents and the bye.
//! 3. `CombatResolving`: each pairing is resolved with a seed derived from
//!    (match id, round, pairing index), optionally on the rayon pool.
//! 4. `PostCombatCleanup`: damage hits armor then health, eliminated
//!    players return their cards to the pool, a [`RoundRecord`] is logged.
//! 5. `GameOver` once at most one player is left or the round cap is hit.

use std::sync::Arc;

use rayon::prelude::*;

use crate::abilities::AbilityRegistry;
use crate::cards::{CardCatalog, Minion, Pool};
use crate::combat::{CombatOutcome, CombatResolver};
use crate::core::{GameRng, MatchConfig, PlayerId, PlayerMap, Side};
use crate::env::{Action, BoardSummary, Observation, OpponentSummary};
use crate::error::{ActionError, ConfigurationError, MatchError, SimulationError};

use super::matchmaking::Matchmaker;
use super::phase::Phase;
use super::player::Player;
use super::record::{HealthDelta, MatchLog, PairingResult, RoundRecord, Standing};
use super::shop::Tavern;

const TURN_START_STREAM: u64 = 0x7475_726E;

/// One match of N players.
#[derive(Clone, Debug)]
pub struct Match {
    config: MatchConfig,
    catalog: Arc<CardCatalog>,
    resolver: CombatResolver,
    match_id: u64,
    seed: u64,
    round: u32,
    phase: Phase,
    players: PlayerMap<Player>,
    last_boards: PlayerMap<Option<BoardSummary>>,
    pool: Pool,
    rng: GameRng,
    matchmaker: Matchmaker,
    log: MatchLog,
    aborted: bool,
}

impl Match {
    /// Set up a match and open the first shop phase.
    ///
    /// Fails when the configuration is invalid, when strict ability
    /// checking finds a declared ability without a handler, or when no card
    /// can appear in shops.
    pub fn new(
        config: MatchConfig,
        catalog: Arc<CardCatalog>,
        registry: Arc<AbilityRegistry>,
        match_id: u64,
        seed: u64,
    ) -> Result<Self, MatchError> {
        config.validate()?;
        if config.strict_abilities {
            registry.validate(&catalog)?;
        } else {
            for (card, kind) in registry.missing(&catalog) {
                log::warn!("{} declares {:?} without a handler; it will do nothing", catalog.name_of(card), kind);
            }
        }

        let pool = Pool::new(&catalog, config.active_tribes.as_deref());
        if pool.is_empty() {
            return Err(ConfigurationError::EmptyPool.into());
        }

        let players = PlayerMap::new(config.player_count, |id| Player::new(id, &config));
        let resolver = CombatResolver::new(registry, Arc::clone(&catalog)).with_config(config.combat.clone());
        let log = MatchLog::new(match_id, seed, config.player_count, config.starting_health);

        let mut game = Self {
            last_boards: PlayerMap::with_value(config.player_count, None),
            rng: GameRng::new(GameRng::derive_seed(seed, &[match_id])).for_context("shop"),
            config,
            catalog,
            resolver,
            match_id,
            seed,
            round: 1,
            phase: Phase::ShopPhase,
            players,
            pool,
            matchmaker: Matchmaker::new(),
            log,
            aborted: false,
        };
        game.begin_shop_phase()
            .map_err(|source| MatchError::Simulation { round: 1, source })?;
        log::info!("match {} started with {} players", match_id, game.config.player_count);
        Ok(game)
    }

    /// A match over the built-in card set.
    pub fn standard(config: MatchConfig, match_id: u64, seed: u64) -> Result<Self, MatchError> {
        Self::new(
            config,
            Arc::new(CardCatalog::standard()),
            Arc::new(AbilityRegistry::standard()),
            match_id,
            seed,
        )
    }

    #[must_use]
    pub fn match_id(&self) -> u64 {
        self.match_id
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current round (1-based).
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Whether the match was stopped instead of played out. An aborted
    /// match has an empty log.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Players still in the match, by id.
    #[must_use]
    pub fn active_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|(_, p)| p.is_alive())
            .map(|(id, _)| id)
            .collect()
    }

    #[must_use]
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    #[must_use]
    pub fn log(&self) -> &MatchLog {
        &self.log
    }

    /// Placements so far.
    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        self.log.standings()
    }

    /// Whether every active player has locked in.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.players.values().filter(|p| p.is_alive()).all(|p| p.passed)
    }

    fn check_actor(&self, id: PlayerId) -> Result<&Player, ActionError> {
        match self.phase {
            Phase::GameOver => return Err(ActionError::MatchOver),
            Phase::ShopPhase => {}
            other => return Err(ActionError::WrongPhase(other)),
        }
        let player = self.players.get(id).ok_or(ActionError::UnknownPlayer(id))?;
        if !player.is_alive() {
            return Err(ActionError::Eliminated(id));
        }
        if player.passed {
            return Err(ActionError::AlreadyPassed(id));
        }
        Ok(player)
    }

    /// Apply one shop action. A rejected action changes nothing.
    pub fn act(&mut self, id: PlayerId, action: Action) -> Result<(), ActionError> {
        self.check_actor(id)?;
        let tavern = Tavern::new(&self.config, &self.catalog);
        let player = self.players.get_mut(id).ok_or(ActionError::UnknownPlayer(id))?;

        tavern.apply(player, action, &mut self.pool, &mut self.rng)?;
        player.actions_taken += 1;
        log::trace!("{} round {}: {}", id, self.round, action);

        if !player.passed && player.actions_taken >= self.config.shop_action_budget {
            log::warn!("{} used its action budget in round {}; auto-passing", id, self.round);
            player.passed = true;
        }
        Ok(())
    }

    /// Actions `id` may take now; empty when it may not act.
    #[must_use]
    pub fn legal_actions(&self, id: PlayerId) -> Vec<Action> {
        match self.check_actor(id) {
            Ok(player) => Tavern::new(&self.config, &self.catalog).legal_actions(player),
            Err(_) => Vec::new(),
        }
    }

    /// What `id` can see.
    pub fn observe(&self, id: PlayerId) -> Result<Observation, ActionError> {
        let me = self.players.get(id).ok_or(ActionError::UnknownPlayer(id))?;
        let shop = me
            .shop
            .iter()
            .filter_map(|&card| self.catalog.get(card))
            .map(Minion::from_def)
            .collect();
        let opponents = self
            .players
            .iter()
            .filter(|(other, _)| *other != id)
            .map(|(other, p)| OpponentSummary {
                player: other,
                alive: p.is_alive(),
                health: p.health,
                armor: p.armor,
                tier: p.tier,
                last_board: self.last_boards.get(other).copied().flatten(),
            })
            .collect();

        Ok(Observation {
            player: id,
            round: self.round,
            phase: self.phase,
            player_count: self.config.player_count,
            health: me.health,
            armor: me.armor,
            gold: me.gold,
            tier: me.tier,
            upgrade_cost: me.upgrade_cost,
            frozen: me.frozen,
            passed: me.passed,
            board: me.board.minions().to_vec(),
            shop,
            opponents,
        })
    }

    /// Time out the shop phase: auto-pass everyone still acting.
    pub fn expire_shop_phase(&mut self) {
        if !self.phase.accepts_actions() {
            return;
        }
        let round = self.round;
        for (id, player) in self.players.iter_mut() {
            if player.is_alive() && !player.passed {
                log::warn!("{} timed out in round {}; auto-passing", id, round);
                player.passed = true;
            }
        }
    }

    /// Run combat once every active player has passed.
    ///
    /// Returns `Ok(None)` if someone is still acting or the match is over.
    pub fn advance(&mut self) -> Result<Option<RoundRecord>, MatchError> {
        if self.phase != Phase::ShopPhase || !self.all_passed() {
            return Ok(None);
        }

        let record = self.resolve_round().map_err(|source| self.fail(source))?;

        let active = self.active_players();
        if active.len() <= 1 || self.round >= self.config.max_rounds {
            self.phase = Phase::GameOver;
            log::info!(
                "match {} over after round {}; {} player(s) left",
                self.match_id,
                self.round,
                active.len()
            );
        } else {
            self.round += 1;
            self.begin_shop_phase().map_err(|source| self.fail(source))?;
        }
        Ok(Some(record))
    }

    /// Expire the shop phase and run the round.
    pub fn play_round(&mut self) -> Result<Option<RoundRecord>, MatchError> {
        self.expire_shop_phase();
        self.advance()
    }

    /// Stop the match between rounds. The log is discarded.
    pub fn abort(&mut self) -> MatchError {
        let round = self.round;
        self.discard();
        log::info!("match {} aborted at round {}", self.match_id, round);
        MatchError::Aborted { round }
    }

    /// Abort after a combat or trigger failure.
    fn fail(&mut self, source: SimulationError) -> MatchError {
        let round = self.round;
        log::error!("match {} aborted in round {}: {}", self.match_id, round, source);
        self.discard();
        MatchError::Simulation { round, source }
    }

    fn discard(&mut self) {
        self.phase = Phase::GameOver;
        self.aborted = true;
        self.log = MatchLog::new(self.match_id, self.seed, self.config.player_count, self.config.starting_health);
    }

    /// Open the shop phase. Turn-start boards are all computed before any
    /// player changes, so a failure leaves the match untouched.
    fn begin_shop_phase(&mut self) -> Result<(), SimulationError> {
        let round = self.round;
        let mut boards = Vec::new();
        for (id, player) in self.players.iter() {
            if player.is_alive() && !player.board.is_empty() {
                let seed = GameRng::derive_seed(
                    self.seed,
                    &[self.match_id, u64::from(round), id.index() as u64, TURN_START_STREAM],
                );
                boards.push((id, self.resolver.turn_start(&player.board, seed)?));
            }
        }

        self.phase = Phase::ShopPhase;
        let tavern = Tavern::new(&self.config, &self.catalog);
        for (_, player) in self.players.iter_mut() {
            if player.is_alive() {
                tavern.start_turn(player, round, &mut self.pool, &mut self.rng);
            }
        }
        for (id, board) in boards {
            tavern.replace_board(&mut self.players[id], board, &mut self.pool);
        }
        log::info!("match {} round {} shop phase", self.match_id, round);
        Ok(())
    }

    fn resolve_round(&mut self) -> Result<RoundRecord, SimulationError> {
        let round = self.round;

        self.phase = Phase::CombatPairing;
        let active = self.active_players();
        let schedule = self.matchmaker.pair(&active, round);

        self.phase = Phase::CombatResolving;
        let resolve = |(i, &(a, b)): (usize, &(PlayerId, PlayerId))| {
            let seed = GameRng::pairing_seed(self.match_id, round, i);
            let board_a = &self.players[a].board;
            let board_b = &self.players[b].board;
            self.resolver.resolve(board_a, board_b, seed).map(|o| (seed, o))
        };
        let outcomes: Vec<(u64, CombatOutcome)> = if self.config.parallel_combat {
            schedule.pairings.par_iter().enumerate().map(resolve).collect::<Result<_, _>>()?
        } else {
            schedule.pairings.iter().enumerate().map(resolve).collect::<Result<_, _>>()?
        };

        self.phase = Phase::PostCombatCleanup;
        let mut pairings = Vec::with_capacity(outcomes.len());
        let mut health_deltas = Vec::new();

        for (&(a, b), (seed, outcome)) in schedule.pairings.iter().zip(outcomes) {
            self.last_boards[a] = Some(BoardSummary::of(&self.players[a].board));
            self.last_boards[b] = Some(BoardSummary::of(&self.players[b].board));

            let winner = outcome.winner.map(|side| if side == Side::A { a } else { b });
            let result = PairingResult {
                a,
                b,
                winner,
                damage: outcome.damage_dealt_to_loser,
                seed,
                events: outcome.event_log.len(),
            };

            if let Some(loser) = result.loser() {
                let player = &mut self.players[loser];
                let health_lost = player.take_damage(result.damage);
                health_deltas.push(HealthDelta {
                    player: loser,
                    damage: result.damage,
                    health_lost,
                    health_after: player.health,
                });
            }
            pairings.push(result);
        }

        let tavern = Tavern::new(&self.config, &self.catalog);
        let mut eliminations = Vec::new();
        for (id, player) in self.players.iter_mut() {
            if !player.is_alive() && player.eliminated_in.is_none() {
                player.eliminated_in = Some(round);
                tavern.release(player, &mut self.pool);
                log::info!("{} eliminated in round {}", id, round);
                eliminations.push(id);
            }
        }

        let record = RoundRecord {
            round,
            pairings,
            bye: schedule.bye,
            health_deltas,
            eliminations,
        };
        self.log.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{CombatEvent, TriggerKind};
    use crate::cards::{CardId, MinionDef};
    use crate::core::CombatConfig;

    fn small() -> Match {
        Match::standard(MatchConfig::default().with_player_count(4), 7, 99).unwrap()
    }

    #[test]
    fn test_new_match_opens_shop() {
        let game = small();
        assert_eq!(game.phase(), Phase::ShopPhase);
        assert_eq!(game.round(), 1);
        assert!(game.players().all(|p| p.gold == 3 && p.shop.len() == 3));
    }

    #[test]
    fn test_advance_waits_for_everyone() {
        let mut game = small();
        game.act(PlayerId::new(0), Action::Pass).unwrap();
        assert_eq!(game.advance().unwrap(), None);
        assert_eq!(
            game.act(PlayerId::new(0), Action::Reroll),
            Err(ActionError::AlreadyPassed(PlayerId::new(0)))
        );
    }

    #[test]
    fn test_play_round_records_and_advances() {
        let mut game = small();
        game.act(PlayerId::new(1), Action::Buy { shop_slot: 0 }).unwrap();
        let record = game.play_round().unwrap().unwrap();
        assert_eq!(record.round, 1);
        assert_eq!(record.pairings.len(), 2);
        assert_eq!(game.round(), 2);
        assert_eq!(game.log().len(), 1);
        assert!(game.players().all(|p| !p.passed));
    }

    #[test]
    fn test_unknown_player_and_wrong_phase() {
        let mut game = small();
        assert_eq!(
            game.act(PlayerId::new(9), Action::Pass),
            Err(ActionError::UnknownPlayer(PlayerId::new(9)))
        );
        let _ = game.abort();
        assert_eq!(game.act(PlayerId::new(0), Action::Pass), Err(ActionError::MatchOver));
        assert!(game.log().is_empty());
    }

    #[test]
    fn test_action_budget_auto_passes() {
        let config = MatchConfig::default().with_player_count(2).with_shop_action_budget(2);
        let mut game = Match::standard(config, 1, 1).unwrap();
        game.act(PlayerId::new(0), Action::Freeze).unwrap();
        game.act(PlayerId::new(0), Action::Freeze).unwrap();
        assert!(game.player(PlayerId::new(0)).unwrap().passed);
    }

    const LOOPER: CardId = CardId::new(900);

    /// A tier-1 card whose turn-start and damage triggers feed each other
    /// forever. The match has only this card, so every shop offers it.
    fn looping_match(config: MatchConfig) -> Match {
        let mut catalog = CardCatalog::new();
        catalog.register(
            MinionDef::new(LOOPER, "Looper", 1, 0, 100_000)
                .with_ability(TriggerKind::OnTurnStart)
                .with_ability(TriggerKind::OnDamaged),
        );
        let mut registry = AbilityRegistry::new();
        for kind in [TriggerKind::OnTurnStart, TriggerKind::OnDamaged] {
            registry.register(LOOPER, kind, |ctx| {
                [CombatEvent::damage(Some(ctx.source), ctx.source, 1)].into_iter().collect()
            });
        }
        let config = config.with_combat(CombatConfig::default().with_iteration_cap(50));
        Match::new(config, Arc::new(catalog), Arc::new(registry), 5, 5).unwrap()
    }

    #[test]
    fn test_turn_start_failure_aborts_match() {
        let mut game = looping_match(MatchConfig::default().with_player_count(3));
        game.act(PlayerId::new(0), Action::Buy { shop_slot: 0 }).unwrap();

        let result = game.play_round();
        assert!(matches!(result, Err(MatchError::Simulation { round: 2, .. })));
        assert!(game.is_over());
        assert!(game.is_aborted());
        assert!(game.log().is_empty());
        assert_eq!(game.act(PlayerId::new(1), Action::Pass), Err(ActionError::MatchOver));
        assert_eq!(game.play_round().unwrap(), None);

        // No seat got its turn start: round 1 gold and passed flags remain.
        assert!(game.players().all(|p| p.passed));
        let gold: Vec<u32> = game.players().map(|p| p.gold).collect();
        assert_eq!(gold, vec![0, 3, 3]);
    }

    #[test]
    fn test_finished_match_is_not_aborted() {
        let mut game = Match::standard(MatchConfig::default().with_player_count(2).with_max_rounds(1), 1, 1).unwrap();
        game.play_round().unwrap();
        assert!(game.is_over());
        assert!(!game.is_aborted());
        assert_eq!(game.log().len(), 1);
    }

    #[test]
    fn test_explicit_abort_is_marked() {
        let mut game = small();
        game.play_round().unwrap();
        assert!(matches!(game.abort(), MatchError::Aborted { round: 2 }));
        assert!(game.is_aborted());
        assert!(game.log().is_empty());
    }

    #[test]
    fn test_strict_mode_rejects_missing_handler() {
        let result = Match::new(
            MatchConfig::default().with_strict_abilities(true),
            Arc::new(CardCatalog::standard()),
            Arc::new(AbilityRegistry::new()),
            1,
            1,
        );
        assert!(matches!(
            result,
            Err(MatchError::Configuration(ConfigurationError::MissingHandler { .. }))
        ));
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let result = Match::new(
            MatchConfig::default(),
            Arc::new(CardCatalog::new()),
            Arc::new(AbilityRegistry::new()),
            1,
            1,
        );
        assert!(matches!(result, Err(MatchError::Configuration(ConfigurationError::EmptyPool))));
    }
}
