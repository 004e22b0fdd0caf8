//! Match and combat configuration.
//!
//! Every rule constant the engine uses lives here so experiments can change
//! the economy or combat limits without touching the engine. Configurations
//! are plain serde structs: build them with `Default` plus `with_*` setters,
//! or load them from JSON.
//!
//! ```
//! use bgsim::core::MatchConfig;
//!
//! let config = MatchConfig::default()
//!     .with_player_count(4)
//!     .with_max_rounds(20);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.gold_for_round(1), 3);
//! assert_eq!(config.gold_for_round(30), 10);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::MAX_BOARD_SIZE;
use crate::cards::{Tribe, MAX_TIER};
use crate::error::ConfigurationError;

/// Limits and scoring rules for a single combat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Maximum processed steps (attacks plus events) before the combat is
    /// declared broken.
    pub iteration_cap: u32,

    /// Add the winner's tavern tier to the damage dealt to the loser.
    pub tier_damage_bonus: bool,

    /// Optional ceiling on damage dealt to the loser.
    pub damage_cap: Option<u32>,

    /// Number of trailing events attached to a `SimulationError`.
    pub error_tail: usize,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            iteration_cap: 10_000,
            tier_damage_bonus: true,
            damage_cap: None,
            error_tail: 32,
        }
    }
}

impl CombatConfig {
    /// Set the iteration cap.
    #[must_use]
    pub fn with_iteration_cap(mut self, cap: u32) -> Self {
        self.iteration_cap = cap;
        self
    }

    /// Enable or disable the tavern tier damage bonus.
    #[must_use]
    pub fn with_tier_damage_bonus(mut self, enabled: bool) -> Self {
        self.tier_damage_bonus = enabled;
        self
    }

    /// Cap the damage a single combat can deal.
    #[must_use]
    pub fn with_damage_cap(mut self, cap: Option<u32>) -> Self {
        self.damage_cap = cap;
        self
    }
}

/// Configuration of a whole match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Number of seats.
    pub player_count: usize,

    /// Hero health at the start of the match.
    pub starting_health: u32,

    /// Hero armor at the start of the match.
    pub starting_armor: u32,

    /// Round cap; the match ends in `GameOver` after this round.
    pub max_rounds: u32,

    /// Gold available in round 1.
    pub starting_gold: u32,

    /// Gold ceiling.
    pub max_gold: u32,

    /// Price of a minion.
    pub buy_cost: u32,

    /// Gold returned for selling a minion.
    pub sell_value: u32,

    /// Price of a shop refresh.
    pub reroll_cost: u32,

    /// Base cost to upgrade from tier `i + 1` to `i + 2`.
    pub upgrade_costs: Vec<u32>,

    /// Shop offer count at tier `i + 1`.
    pub shop_sizes: Vec<usize>,

    /// Board capacity.
    pub board_capacity: usize,

    /// Actions a player may take in one shop phase before being auto-passed.
    pub shop_action_budget: u32,

    /// Tribes present in the pool. `None` means every tribe.
    pub active_tribes: Option<Vec<Tribe>>,

    /// Fail at setup when a card declares an ability without a handler.
    pub strict_abilities: bool,

    /// Resolve the pairings of a round on the rayon pool.
    pub parallel_combat: bool,

    /// Combat limits and scoring.
    pub combat: CombatConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            player_count: 8,
            starting_health: 30,
            starting_armor: 0,
            max_rounds: 40,
            starting_gold: 3,
            max_gold: 10,
            buy_cost: 3,
            sell_value: 1,
            reroll_cost: 1,
            upgrade_costs: vec![5, 7, 8, 9, 10],
            shop_sizes: vec![3, 4, 4, 5, 5, 6],
            board_capacity: MAX_BOARD_SIZE,
            shop_action_budget: 32,
            active_tribes: None,
            strict_abilities: false,
            parallel_combat: false,
            combat: CombatConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Set the number of seats.
    #[must_use]
    pub fn with_player_count(mut self, count: usize) -> Self {
        self.player_count = count;
        self
    }

    /// Set the starting health.
    #[must_use]
    pub fn with_starting_health(mut self, health: u32) -> Self {
        self.starting_health = health;
        self
    }

    /// Set the round cap.
    #[must_use]
    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Set the per-phase action budget.
    #[must_use]
    pub fn with_shop_action_budget(mut self, budget: u32) -> Self {
        self.shop_action_budget = budget;
        self
    }

    /// Restrict the pool to the given tribes (Neutral is always included).
    #[must_use]
    pub fn with_active_tribes(mut self, tribes: Vec<Tribe>) -> Self {
        self.active_tribes = Some(tribes);
        self
    }

    /// Enable strict ability checking.
    #[must_use]
    pub fn with_strict_abilities(mut self, strict: bool) -> Self {
        self.strict_abilities = strict;
        self
    }

    /// Resolve pairings in parallel.
    #[must_use]
    pub fn with_parallel_combat(mut self, parallel: bool) -> Self {
        self.parallel_combat = parallel;
        self
    }

    /// Replace the combat configuration.
    #[must_use]
    pub fn with_combat(mut self, combat: CombatConfig) -> Self {
        self.combat = combat;
        self
    }

    /// Gold granted at the start of `round` (1-based).
    #[must_use]
    pub fn gold_for_round(&self, round: u32) -> u32 {
        self.starting_gold
            .saturating_add(round.saturating_sub(1))
            .min(self.max_gold)
    }

    /// Base cost to upgrade from `tier`; `None` at the top tier.
    #[must_use]
    pub fn upgrade_cost(&self, tier: u8) -> Option<u32> {
        if tier == 0 || tier >= MAX_TIER {
            return None;
        }
        self.upgrade_costs.get(usize::from(tier) - 1).copied()
    }

    /// Number of shop offers at `tier`.
    #[must_use]
    pub fn shop_size(&self, tier: u8) -> usize {
        let idx = usize::from(tier.clamp(1, MAX_TIER)) - 1;
        self.shop_sizes.get(idx).copied().unwrap_or(0)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |field: &'static str, reason: &str| ConfigurationError::InvalidValue {
            field,
            reason: reason.to_string(),
        };

        if !(2..=255).contains(&self.player_count) {
            return Err(invalid("player_count", "must be between 2 and 255"));
        }
        if self.starting_health == 0 {
            return Err(invalid("starting_health", "must be positive"));
        }
        if self.max_rounds == 0 {
            return Err(invalid("max_rounds", "must be positive"));
        }
        if self.upgrade_costs.len() != usize::from(MAX_TIER) - 1 {
            return Err(invalid("upgrade_costs", "needs one entry per upgrade"));
        }
        if self.shop_sizes.len() != usize::from(MAX_TIER) {
            return Err(invalid("shop_sizes", "needs one entry per tier"));
        }
        if self.board_capacity == 0 || self.board_capacity > MAX_BOARD_SIZE {
            return Err(invalid("board_capacity", "must be between 1 and 7"));
        }
        if self.shop_action_budget == 0 {
            return Err(invalid("shop_action_budget", "must be positive"));
        }
        if self.combat.iteration_cap == 0 {
            return Err(invalid("combat.iteration_cap", "must be positive"));
        }
        Ok(())
    }

    /// Parse a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigurationError::Load(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Load(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}
