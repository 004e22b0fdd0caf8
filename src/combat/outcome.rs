//! Result of a resolved combat.

use serde::{Deserialize, Serialize};

use crate::abilities::CombatEvent;
use crate::board::Board;
use crate::core::Side;

/// How a combat ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatOutcome {
    /// Winning side; `None` for a draw.
    pub winner: Option<Side>,

    /// The winner's minions left standing (empty on a draw).
    pub surviving_board: Board,

    /// Damage the losing player takes (0 on a draw).
    pub damage_dealt_to_loser: u32,

    /// Every applied event, in order.
    pub event_log: Vec<CombatEvent>,
}

impl CombatOutcome {
    /// Check for a draw.
    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }

    /// Losing side, if any.
    #[must_use]
    pub fn loser(&self) -> Option<Side> {
        self.winner.map(Side::opponent)
    }

    /// Number of attacks made.
    #[must_use]
    pub fn attack_count(&self) -> usize {
        self.event_log
            .iter()
            .filter(|e| matches!(e, CombatEvent::Attack { .. }))
            .count()
    }
}
