//! Per-seat player state.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::cards::CardId;
use crate::core::{MatchConfig, PlayerId};

/// One seat in a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hero: String,

    /// Hero health; 0 means eliminated.
    pub health: u32,
    /// Absorbs combat damage before health.
    pub armor: u32,

    pub board: Board,

    pub gold: u32,
    /// Gold granted this round.
    pub max_gold: u32,

    pub tier: u8,
    /// Current price of the next tavern upgrade; `None` at the top tier.
    pub upgrade_cost: Option<u32>,

    /// Current shop offers.
    pub shop: Vec<CardId>,
    /// Keep the shop through the next refresh.
    pub frozen: bool,

    /// Locked in for this shop phase.
    pub passed: bool,
    /// Actions taken this shop phase.
    pub actions_taken: u32,

    /// Round the player was eliminated in.
    pub eliminated_in: Option<u32>,
}

impl Player {
    /// Create a player with the configured starting resources.
    #[must_use]
    pub fn new(id: PlayerId, config: &MatchConfig) -> Self {
        Self {
            id,
            name: format!("Player {}", id.0 + 1),
            hero: "Default Hero".to_string(),
            health: config.starting_health,
            armor: config.starting_armor,
            board: Board::new(config.board_capacity).with_owner(id),
            gold: 0,
            max_gold: 0,
            tier: 1,
            upgrade_cost: config.upgrade_cost(1),
            shop: Vec::new(),
            frozen: false,
            passed: false,
            actions_taken: 0,
            eliminated_in: None,
        }
    }

    /// Set the hero (builder pattern).
    #[must_use]
    pub fn with_hero(mut self, hero: impl Into<String>) -> Self {
        self.hero = hero.into();
        self
    }

    /// Still in the match.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Health plus armor.
    #[must_use]
    pub fn effective_health(&self) -> u32 {
        self.health + self.armor
    }

    /// Apply combat damage: armor first, then health. Returns the health lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let absorbed = amount.min(self.armor);
        self.armor -= absorbed;
        let lost = (amount - absorbed).min(self.health);
        self.health -= lost;
        lost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_armor_absorbs_first() {
        let mut player = Player::new(PlayerId::new(0), &MatchConfig::default());
        player.armor = 5;
        assert_eq!(player.take_damage(3), 0);
        assert_eq!(player.armor, 2);
        assert_eq!(player.take_damage(4), 2);
        assert_eq!((player.armor, player.health), (0, 28));
    }

    #[test]
    fn test_health_floors_at_zero() {
        let mut player = Player::new(PlayerId::new(1), &MatchConfig::default());
        assert_eq!(player.take_damage(100), 30);
        assert_eq!(player.health, 0);
        assert!(!player.is_alive());
    }

    #[test]
    fn test_new_player_defaults() {
        let player = Player::new(PlayerId::new(2), &MatchConfig::default()).with_hero("Yogg");
        assert_eq!(player.name, "Player 3");
        assert_eq!(player.hero, "Yogg");
        assert_eq!(player.upgrade_cost, Some(5));
        assert_eq!(player.board.owner(), Some(PlayerId::new(2)));
    }
}
