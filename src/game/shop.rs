//! Shop economy.
//!
//! [`Tavern`] applies shop-phase actions to a player against the shared
//! pool. Every operation validates first and mutates only once it is known
//! to succeed, so a rejected action leaves the player and the pool as they
//! were.
//!
//! ## Prices (defaults)
//!
//! | Action  | Gold                                    |
//! |---------|-----------------------------------------|
//! | Buy     | 3                                       |
//! | Sell    | +1                                      |
//! | Reroll  | 1                                       |
//! | Upgrade | 5, 7, 8, 9, 10; each drops 1 per round  |

use crate::board::Board;
use crate::cards::{CardCatalog, CardId, Minion, Pool};
use crate::core::{GameRng, MatchConfig};
use crate::env::Action;
use crate::error::ActionError;

use super::player::Player;

/// Shop rules bound to a configuration and catalog.
#[derive(Clone, Copy, Debug)]
pub struct Tavern<'a> {
    config: &'a MatchConfig,
    catalog: &'a CardCatalog,
}

impl<'a> Tavern<'a> {
    #[must_use]
    pub fn new(config: &'a MatchConfig, catalog: &'a CardCatalog) -> Self {
        Self { config, catalog }
    }

    /// Start a shop phase: grant gold, discount the upgrade and refresh the
    /// shop unless it was frozen (the freeze is consumed).
    pub fn start_turn(&self, player: &mut Player, round: u32, pool: &mut Pool, rng: &mut GameRng) {
        player.gold = self.config.gold_for_round(round);
        player.max_gold = player.gold;
        if round > 1 {
            player.upgrade_cost = player.upgrade_cost.map(|c| c.saturating_sub(1));
        }
        player.passed = false;
        player.actions_taken = 0;

        if player.frozen {
            player.frozen = false;
        } else {
            self.refresh(player, pool, rng);
        }
    }

    /// Return the current offers and roll a fresh shop.
    pub fn refresh(&self, player: &mut Player, pool: &mut Pool, rng: &mut GameRng) {
        for card in player.shop.drain(..) {
            pool.return_card(card);
        }
        player.shop = pool.roll(player.tier, self.config.shop_size(player.tier), rng);
    }

    /// Give an eliminated player's minions and offers back to the pool.
    pub fn release(&self, player: &mut Player, pool: &mut Pool) {
        for card in player.shop.drain(..) {
            pool.return_card(card);
        }
        for minion in player.board.drain() {
            pool.return_card(minion.card);
        }
    }

    /// Install a board rebuilt by turn-start triggers. Cards that had a
    /// copy on the old board but none on the new one go back to the pool.
    pub fn replace_board(&self, player: &mut Player, board: Board, pool: &mut Pool) {
        let mut kept: Vec<CardId> = board.minions().iter().map(|m| m.card).collect();
        for minion in player.board.minions() {
            match kept.iter().position(|&card| card == minion.card) {
                Some(i) => {
                    kept.swap_remove(i);
                }
                None => {
                    pool.return_card(minion.card);
                }
            }
        }
        player.board = board;
    }

    /// Apply one action. `Pass` only marks the player; the state machine
    /// decides what passing means for the phase.
    pub fn apply(
        &self,
        player: &mut Player,
        action: Action,
        pool: &mut Pool,
        rng: &mut GameRng,
    ) -> Result<(), ActionError> {
        match action {
            Action::Buy { shop_slot } => self.buy(player, shop_slot),
            Action::Sell { board_slot } => self.sell(player, board_slot, pool),
            Action::Reroll => self.reroll(player, pool, rng),
            Action::Upgrade => self.upgrade(player),
            Action::Reposition { from, to } => player.board.reposition(from, to),
            Action::Freeze => {
                player.frozen = !player.frozen;
                Ok(())
            }
            Action::Pass => {
                player.passed = true;
                Ok(())
            }
        }
    }

    fn spend(player: &Player, cost: u32) -> Result<(), ActionError> {
        if player.gold < cost {
            return Err(ActionError::InsufficientGold { needed: cost, available: player.gold });
        }
        Ok(())
    }

    fn buy(&self, player: &mut Player, slot: usize) -> Result<(), ActionError> {
        let len = player.shop.len();
        let def = player
            .shop
            .get(slot)
            .and_then(|&card| self.catalog.get(card))
            .ok_or(ActionError::InvalidShopSlot { slot, len })?;
        Self::spend(player, self.config.buy_cost)?;
        if player.board.is_full() {
            return Err(ActionError::BoardFull);
        }

        let minion = Minion::from_def(def);
        player.board.push(minion)?;
        player.shop.remove(slot);
        player.gold -= self.config.buy_cost;
        Ok(())
    }

    fn sell(&self, player: &mut Player, slot: usize, pool: &mut Pool) -> Result<(), ActionError> {
        let minion = player.board.remove(slot)?;
        pool.return_card(minion.card);
        player.gold += self.config.sell_value;
        Ok(())
    }

    fn reroll(&self, player: &mut Player, pool: &mut Pool, rng: &mut GameRng) -> Result<(), ActionError> {
        Self::spend(player, self.config.reroll_cost)?;
        player.gold -= self.config.reroll_cost;
        player.frozen = false;
        self.refresh(player, pool, rng);
        Ok(())
    }

    fn upgrade(&self, player: &mut Player) -> Result<(), ActionError> {
        let cost = player.upgrade_cost.ok_or(ActionError::MaxTavernTier)?;
        Self::spend(player, cost)?;
        player.gold -= cost;
        player.tier += 1;
        player.upgrade_cost = self.config.upgrade_cost(player.tier);
        player.board.set_tavern_tier(player.tier);
        Ok(())
    }

    /// Every action `player` could take right now, in a stable order.
    #[must_use]
    pub fn legal_actions(&self, player: &Player) -> Vec<Action> {
        let mut actions = Vec::new();

        if player.gold >= self.config.buy_cost && !player.board.is_full() {
            actions.extend((0..player.shop.len()).map(|shop_slot| Action::Buy { shop_slot }));
        }
        actions.extend((0..player.board.len()).map(|board_slot| Action::Sell { board_slot }));
        if player.gold >= self.config.reroll_cost {
            actions.push(Action::Reroll);
        }
        if player.upgrade_cost.is_some_and(|cost| player.gold >= cost) {
            actions.push(Action::Upgrade);
        }
        let len = player.board.len();
        for from in 0..len {
            for to in (0..len).filter(|&to| to != from) {
                actions.push(Action::Reposition { from, to });
            }
        }
        actions.push(Action::Freeze);
        actions.push(Action::Pass);
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::ids;
    use crate::core::PlayerId;

    struct Fixture {
        config: MatchConfig,
        catalog: CardCatalog,
        pool: Pool,
        rng: GameRng,
    }

    fn fixture() -> Fixture {
        let catalog = CardCatalog::standard();
        let pool = Pool::new(&catalog, None);
        Fixture { config: MatchConfig::default(), catalog, pool, rng: GameRng::new(3) }
    }

    fn player(f: &mut Fixture) -> Player {
        let mut p = Player::new(PlayerId::new(0), &f.config);
        Tavern::new(&f.config, &f.catalog).start_turn(&mut p, 1, &mut f.pool, &mut f.rng);
        p
    }

    #[test]
    fn test_start_turn_rolls_shop() {
        let mut f = fixture();
        let p = player(&mut f);
        assert_eq!(p.gold, 3);
        assert_eq!(p.shop.len(), 3);
    }

    #[test]
    fn test_buy_then_sell() {
        let mut f = fixture();
        let mut p = player(&mut f);
        let tavern = Tavern::new(&f.config, &f.catalog);
        let card = p.shop[0];

        tavern.apply(&mut p, Action::Buy { shop_slot: 0 }, &mut f.pool, &mut f.rng).unwrap();
        assert_eq!(p.gold, 0);
        assert_eq!(p.board.get(0).unwrap().card, card);
        assert_eq!(p.shop.len(), 2);

        let before = f.pool.remaining(card);
        tavern.apply(&mut p, Action::Sell { board_slot: 0 }, &mut f.pool, &mut f.rng).unwrap();
        assert_eq!(p.gold, 1);
        assert_eq!(f.pool.remaining(card), before + 1);
    }

    #[test]
    fn test_rejected_buy_does_not_mutate() {
        let mut f = fixture();
        let mut p = player(&mut f);
        p.gold = 2;
        let tavern = Tavern::new(&f.config, &f.catalog);
        let snapshot = p.clone();
        let pool = f.pool.clone();

        assert_eq!(
            tavern.apply(&mut p, Action::Buy { shop_slot: 0 }, &mut f.pool, &mut f.rng),
            Err(ActionError::InsufficientGold { needed: 3, available: 2 })
        );
        assert_eq!(
            tavern.apply(&mut p, Action::Buy { shop_slot: 9 }, &mut f.pool, &mut f.rng),
            Err(ActionError::InvalidShopSlot { slot: 9, len: 3 })
        );
        assert_eq!(p, snapshot);
        assert_eq!(f.pool, pool);
    }

    #[test]
    fn test_upgrade_cost_discount_and_max_tier() {
        let mut f = fixture();
        let mut p = player(&mut f);
        let tavern = Tavern::new(&f.config, &f.catalog);

        tavern.start_turn(&mut p, 2, &mut f.pool, &mut f.rng);
        assert_eq!(p.upgrade_cost, Some(4));
        assert_eq!(p.gold, 4);
        tavern.apply(&mut p, Action::Upgrade, &mut f.pool, &mut f.rng).unwrap();
        assert_eq!(p.tier, 2);
        assert_eq!(p.upgrade_cost, Some(7));
        assert_eq!(p.board.tavern_tier(), 2);

        p.tier = 6;
        p.upgrade_cost = None;
        assert_eq!(
            tavern.apply(&mut p, Action::Upgrade, &mut f.pool, &mut f.rng),
            Err(ActionError::MaxTavernTier)
        );
    }

    #[test]
    fn test_freeze_keeps_shop_once() {
        let mut f = fixture();
        let mut p = player(&mut f);
        let tavern = Tavern::new(&f.config, &f.catalog);
        let offers = p.shop.clone();

        tavern.apply(&mut p, Action::Freeze, &mut f.pool, &mut f.rng).unwrap();
        tavern.start_turn(&mut p, 2, &mut f.pool, &mut f.rng);
        assert_eq!(p.shop, offers);
        assert!(!p.frozen);
    }

    #[test]
    fn test_reroll_conserves_pool() {
        let mut f = fixture();
        let mut p = player(&mut f);
        let tavern = Tavern::new(&f.config, &f.catalog);
        let total = f.pool.total_remaining() + p.shop.len() as u32;

        tavern.apply(&mut p, Action::Reroll, &mut f.pool, &mut f.rng).unwrap();
        assert_eq!(p.gold, 2);
        assert_eq!(f.pool.total_remaining() + p.shop.len() as u32, total);
    }

    #[test]
    fn test_release_returns_everything() {
        let mut f = fixture();
        let full = f.pool.total_remaining();
        let mut p = player(&mut f);
        let tavern = Tavern::new(&f.config, &f.catalog);
        tavern.apply(&mut p, Action::Buy { shop_slot: 0 }, &mut f.pool, &mut f.rng).unwrap();
        p.board.push(Minion::from_def(f.catalog.get(ids::CUBLING).unwrap())).unwrap();

        tavern.release(&mut p, &mut f.pool);
        assert_eq!(f.pool.total_remaining(), full);
        assert!(p.board.is_empty() && p.shop.is_empty());
    }

    #[test]
    fn test_replace_board_returns_lost_cards() {
        let mut f = fixture();
        let mut p = player(&mut f);
        let tavern = Tavern::new(&f.config, &f.catalog);
        let card = p.shop[0];
        tavern.apply(&mut p, Action::Buy { shop_slot: 0 }, &mut f.pool, &mut f.rng).unwrap();
        let before = f.pool.remaining(card);

        let same = p.board.clone();
        tavern.replace_board(&mut p, same, &mut f.pool);
        assert_eq!(f.pool.remaining(card), before);
        assert_eq!(p.board.len(), 1);

        tavern.replace_board(&mut p, Board::default(), &mut f.pool);
        assert_eq!(f.pool.remaining(card), before + 1);
        assert!(p.board.is_empty());
    }

    #[test]
    fn test_legal_actions_respect_gold() {
        let mut f = fixture();
        let mut p = player(&mut f);
        let tavern = Tavern::new(&f.config, &f.catalog);
        let actions = tavern.legal_actions(&p);
        assert!(actions.contains(&Action::Buy { shop_slot: 2 }));
        assert!(!actions.contains(&Action::Upgrade));

        p.gold = 0;
        let actions = tavern.legal_actions(&p);
        assert_eq!(actions, vec![Action::Freeze, Action::Pass]);
    }
}
