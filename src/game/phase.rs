//! Turn state machine phases.

use serde::{Deserialize, Serialize};

/// Where a match is in its round cycle.
///
/// ```text
/// ShopPhase -> CombatPairing -> CombatResolving -> PostCombatCleanup
///     ^                                                   |
///     +---------------------------------------------------+
///                                                          \-> GameOver
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Players buy, sell, reroll and arrange their boards.
    ShopPhase,
    /// Opponents are being chosen.
    CombatPairing,
    /// Pairings are being resolved.
    CombatResolving,
    /// Damage, eliminations and the round record.
    PostCombatCleanup,
    /// Terminal.
    GameOver,
}

impl Phase {
    /// Whether shop actions are accepted.
    #[must_use]
    pub fn accepts_actions(self) -> bool {
        self == Phase::ShopPhase
    }

    /// Whether the match is over.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Phase::GameOver
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::ShopPhase => "shop",
            Phase::CombatPairing => "pairing",
            Phase::CombatResolving => "combat",
            Phase::PostCombatCleanup => "cleanup",
            Phase::GameOver => "game over",
        };
        f.write_str(name)
    }
}
