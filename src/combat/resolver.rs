//! Combat resolution.
//!
//! ## Sequence
//!
//! 1. Copy both boards into an [`Arena`]. The side with more minions moves
//!    first; a tie is settled by a coin flip from the combat RNG.
//! 2. Fire `OnCombatStart` (first mover's side first) and settle.
//! 3. Sides alternate. The side to move picks its next attacker (cursor
//!    walks left to right and wraps, skipping 0-attack minions). The
//!    attacker strikes a random taunt minion if any, else any minion.
//! 4. A strike is an `Attack` event (settled), then simultaneous damage.
//!    Ranged attackers take no retaliation.
//! 5. After every strike the queue is drained and deaths are swept
//!    (attacker's side first, left to right) until nothing changes.
//!
//! The queue is FIFO. Every processed attack and event counts against the
//! iteration cap; overrunning it is a [`SimulationError`].

use std::collections::VecDeque;
use std::sync::Arc;

use crate::abilities::{AbilityRegistry, CombatEvent, TriggerKind};
use crate::board::Board;
use crate::cards::{CardCatalog, CardId, DamageTaken, Keyword, Minion};
use crate::core::{CombatConfig, GameRng, MinionRef, Side};
use crate::error::SimulationError;

use super::arena::Arena;
use super::outcome::CombatOutcome;

/// Resolves combats between two boards.
///
/// Cheap to clone; the registry and catalog are shared.
///
/// ```
/// use bgsim::board::Board;
/// use bgsim::cards::{CardId, Minion};
/// use bgsim::combat::CombatResolver;
///
/// let resolver = CombatResolver::standard();
/// let a = Board::from_minions(vec![Minion::vanilla(CardId::new(1), 3, 3)]);
/// let b = Board::from_minions(vec![
///     Minion::vanilla(CardId::new(2), 2, 2),
///     Minion::vanilla(CardId::new(3), 2, 2),
/// ]);
///
/// let outcome = resolver.resolve(&a, &b, 42).unwrap();
/// assert!(outcome.is_draw());
/// assert_eq!(outcome.damage_dealt_to_loser, 0);
/// ```
#[derive(Clone, Debug)]
pub struct CombatResolver {
    registry: Arc<AbilityRegistry>,
    catalog: Arc<CardCatalog>,
    config: CombatConfig,
}

impl CombatResolver {
    /// Create a resolver with the default combat configuration.
    #[must_use]
    pub fn new(registry: Arc<AbilityRegistry>, catalog: Arc<CardCatalog>) -> Self {
        Self {
            registry,
            catalog,
            config: CombatConfig::default(),
        }
    }

    /// Resolver over the built-in card set.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(
            Arc::new(AbilityRegistry::standard()),
            Arc::new(CardCatalog::standard()),
        )
    }

    /// Set the combat configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: CombatConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Card catalog used for summons.
    #[must_use]
    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    /// Resolve a combat. The boards are not modified.
    pub fn resolve(&self, a: &Board, b: &Board, seed: u64) -> Result<CombatOutcome, SimulationError> {
        let mut combat = EventLoop::new(self, Arena::new(a, b), GameRng::new(seed));
        let first = combat.first_mover();

        let entropy = combat.rng.next_u64();
        let start = self.registry.fire_all(
            TriggerKind::OnCombatStart,
            &[first, first.opponent()],
            &combat.arena,
            entropy,
        )?;
        combat.queue.extend(start);
        combat.settle(first)?;

        let mut side = first;
        while combat.arena.count(Side::A) > 0 && combat.arena.count(Side::B) > 0 {
            match combat.next_attacker(side) {
                Some(attacker) => combat.take_turn(attacker)?,
                None if combat.next_attacker(side.opponent()).is_none() => break,
                None => {}
            }
            side = side.opponent();
        }

        let outcome = combat.finish();
        log::debug!(
            "combat resolved: winner {:?}, damage {}, {} events",
            outcome.winner,
            outcome.damage_dealt_to_loser,
            outcome.event_log.len()
        );
        Ok(outcome)
    }

    /// Apply `OnTurnStart` triggers to a shop board through the same event
    /// loop combat uses. Returns the updated board.
    pub fn turn_start(&self, board: &Board, seed: u64) -> Result<Board, SimulationError> {
        let mut shop = EventLoop::new(self, Arena::single(board), GameRng::new(seed));
        let entropy = shop.rng.next_u64();
        let follow_ups =
            self.registry
                .fire_all(TriggerKind::OnTurnStart, &[Side::A], &shop.arena, entropy)?;
        if follow_ups.is_empty() {
            return Ok(board.clone());
        }
        shop.queue.extend(follow_ups);
        shop.settle(Side::A)?;
        Ok(shop.arena.to_board(Side::A))
    }
}

/// Mutable state of one resolution.
struct EventLoop<'r> {
    resolver: &'r CombatResolver,
    arena: Arena,
    rng: GameRng,
    queue: VecDeque<CombatEvent>,
    log: Vec<CombatEvent>,
    steps: u32,
    cursor: [usize; 2],
}

impl<'r> EventLoop<'r> {
    fn new(resolver: &'r CombatResolver, arena: Arena, rng: GameRng) -> Self {
        Self {
            resolver,
            arena,
            rng,
            queue: VecDeque::new(),
            log: Vec::new(),
            steps: 0,
            cursor: [0; 2],
        }
    }

    fn first_mover(&mut self) -> Side {
        let (a, b) = (self.arena.count(Side::A), self.arena.count(Side::B));
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Side::A,
            std::cmp::Ordering::Less => Side::B,
            std::cmp::Ordering::Equal => {
                if self.rng.gen_bool(0.5) {
                    Side::A
                } else {
                    Side::B
                }
            }
        }
    }

    fn step(&mut self) -> Result<(), SimulationError> {
        self.steps += 1;
        if self.steps > self.resolver.config.iteration_cap {
            let keep = self.resolver.config.error_tail;
            let tail = self.log[self.log.len().saturating_sub(keep)..].to_vec();
            log::error!(
                "combat exceeded {} steps; last events: {:?}",
                self.resolver.config.iteration_cap,
                tail
            );
            return Err(SimulationError::IterationCapExceeded {
                cap: self.resolver.config.iteration_cap,
                tail,
            });
        }
        Ok(())
    }

    /// Next minion of `side` able to attack, starting at the cursor.
    fn next_attacker(&self, side: Side) -> Option<MinionRef> {
        let living = self.arena.living_refs(side);
        if living.is_empty() {
            return None;
        }
        let start = self.cursor[side.index()] % living.len();
        (0..living.len())
            .map(|i| living[(start + i) % living.len()])
            .find(|&r| self.arena.get(r).is_some_and(|m| m.attack > 0))
    }

    /// One attacker's turn: one strike, two with windfury.
    fn take_turn(&mut self, attacker: MinionRef) -> Result<(), SimulationError> {
        let side = attacker.side;
        let strikes = if self.arena.get(attacker).is_some_and(|m| m.has(Keyword::Windfury)) {
            2
        } else {
            1
        };

        let position = self.arena.position(attacker).unwrap_or(0);
        let left: Vec<MinionRef> = self.arena.living_refs(side)[..position].to_vec();

        for _ in 0..strikes {
            if !self.arena.is_on_board(attacker) || self.arena.count(side.opponent()) == 0 {
                break;
            }
            self.strike(attacker)?;
        }

        // Alive: the minion to its right goes next. Dead: whoever slid into
        // its place goes next.
        self.cursor[side.index()] = match self.arena.position(attacker) {
            Some(position) => position + 1,
            None => left.iter().filter(|&&r| self.arena.is_on_board(r)).count(),
        };
        Ok(())
    }

    fn pick_target(&mut self, side: Side) -> Option<MinionRef> {
        let living = self.arena.living_refs(side);
        let taunts: Vec<MinionRef> = living
            .iter()
            .copied()
            .filter(|&r| self.arena.get(r).is_some_and(|m| m.has(Keyword::Taunt)))
            .collect();
        let pool = if taunts.is_empty() { living } else { taunts };
        self.rng.choose(&pool).copied()
    }

    fn strike(&mut self, attacker: MinionRef) -> Result<(), SimulationError> {
        let side = attacker.side;
        let Some(defender) = self.pick_target(side.opponent()) else {
            return Ok(());
        };

        self.step()?;
        self.record(CombatEvent::Attack { attacker, defender })?;
        self.drain()?;

        let (Some(a), Some(d)) = (self.arena.get(attacker), self.arena.get(defender)) else {
            return Ok(());
        };
        if a.is_alive() && d.is_alive() && self.arena.is_on_board(defender) {
            let (dealt, taken) = (a.attack, d.attack);
            let ranged = a.has(Keyword::Ranged);
            self.apply(CombatEvent::damage(Some(attacker), defender, dealt))?;
            if !ranged {
                self.apply(CombatEvent::damage(Some(defender), attacker, taken))?;
            }
        }

        self.settle(side)
    }

    /// Drain the queue and sweep deaths until nothing changes.
    fn settle(&mut self, first: Side) -> Result<(), SimulationError> {
        loop {
            self.drain()?;
            if !self.sweep(first)? {
                break;
            }
        }
        Ok(())
    }

    fn drain(&mut self) -> Result<(), SimulationError> {
        while let Some(event) = self.queue.pop_front() {
            self.step()?;
            self.apply(event)?;
        }
        Ok(())
    }

    /// Remove dead minions, `first` side first. Returns whether any died.
    fn sweep(&mut self, first: Side) -> Result<bool, SimulationError> {
        let mut any = false;
        for side in [first, first.opponent()] {
            for dead in self.arena.dead_on_board(side) {
                let Some(position) = self.arena.remove(dead) else { continue };
                let Some(minion) = self.arena.get(dead) else { continue };
                let (card, reborn) = (minion.card, minion.has(Keyword::Reborn));
                any = true;

                self.record(CombatEvent::Death { minion: dead, card, position: position as u8 })?;
                if reborn {
                    self.queue.push_back(CombatEvent::Summon {
                        side,
                        position: position as u8,
                        card,
                        reborn: true,
                        slot: None,
                    });
                }
            }
        }
        Ok(any)
    }

    /// Apply a requested event and record what actually happened.
    fn apply(&mut self, event: CombatEvent) -> Result<(), SimulationError> {
        let applied = match event {
            CombatEvent::Damage { source, target, amount, .. } => self.apply_damage(source, target, amount),
            CombatEvent::Summon { side, position, card, reborn, .. } => {
                self.apply_summon(side, position, card, reborn)
            }
            CombatEvent::BuffApplied { target, attack, health, grant } => {
                match self.arena.get_mut(target) {
                    Some(m) if m.is_alive() => {
                        m.buff(attack, health);
                        for keyword in grant.iter() {
                            m.keywords.insert(keyword);
                        }
                        Some(CombatEvent::BuffApplied { target, attack, health, grant })
                    }
                    _ => None,
                }
            }
            // Attacks and deaths are produced by the loop itself.
            other => Some(other),
        };

        match applied {
            Some(event) => self.record(event),
            None => Ok(()),
        }
    }

    fn apply_damage(&mut self, source: Option<MinionRef>, target: MinionRef, amount: i32) -> Option<CombatEvent> {
        if !self.arena.is_on_board(target) {
            return None;
        }
        let poisonous = source
            .and_then(|s| self.arena.get(s))
            .is_some_and(|m| m.has(Keyword::Poisonous));
        let minion = self.arena.get_mut(target)?;

        match minion.take_damage(amount) {
            DamageTaken::None => None,
            DamageTaken::Absorbed => Some(CombatEvent::Damage { source, target, amount: 0, absorbed: true }),
            DamageTaken::Lost(lost) => {
                if poisonous && minion.health > 0 {
                    minion.health = 0;
                }
                Some(CombatEvent::Damage { source, target, amount: lost, absorbed: false })
            }
        }
    }

    fn apply_summon(&mut self, side: Side, position: u8, card: CardId, reborn: bool) -> Option<CombatEvent> {
        let Some(def) = self.resolver.catalog.get(card) else {
            log::debug!("summon of unknown {} skipped", card);
            return None;
        };
        let mut minion = Minion::from_def(def);
        if reborn {
            minion.keywords.remove(Keyword::Reborn);
            minion.health = 1;
            minion.max_health = 1;
        }

        match self.arena.summon(side, usize::from(position), minion) {
            Some(r) => Some(CombatEvent::Summon {
                side,
                position: self.arena.position(r).unwrap_or(0) as u8,
                card,
                reborn,
                slot: Some(r.slot),
            }),
            None => {
                log::debug!("board {} full, summon of {} skipped", side, card);
                None
            }
        }
    }

    /// Log an applied event and queue the follow-ups it triggers.
    fn record(&mut self, event: CombatEvent) -> Result<(), SimulationError> {
        let entropy = self.rng.next_u64();
        let follow_ups = self.resolver.registry.dispatch(&event, &self.arena, entropy)?;
        log::trace!("{}: {:?} -> {} follow-ups", event.tag(), event, follow_ups.len());
        self.log.push(event);
        self.queue.extend(follow_ups);
        Ok(())
    }

    fn finish(self) -> CombatOutcome {
        let (a, b) = (self.arena.count(Side::A), self.arena.count(Side::B));
        let winner = match (a > 0, b > 0) {
            (true, false) => Some(Side::A),
            (false, true) => Some(Side::B),
            // Both empty, or a stalemate with nobody able to attack.
            _ => None,
        };

        let (surviving_board, damage) = match winner {
            Some(side) => {
                let board = self.arena.to_board(side);
                let config = &self.resolver.config;
                let mut damage = board.total_attack().max(0) as u32;
                if config.tier_damage_bonus {
                    damage += u32::from(self.arena.tavern_tier(side));
                }
                if let Some(cap) = config.damage_cap {
                    damage = damage.min(cap);
                }
                (board, damage)
            }
            None => (Board::default(), 0),
        };

        CombatOutcome {
            winner,
            surviving_board,
            damage_dealt_to_loser: damage,
            event_log: self.log,
        }
    }
}
