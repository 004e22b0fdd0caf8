//! Error taxonomy.
//!
//! - [`ActionError`]: an invalid player action. Recoverable; the state is
//!   left untouched and the caller may retry.
//! - [`SimulationError`]: a combat that could not be resolved. Fatal to the
//!   affected match, never to sibling matches in a batch.
//! - [`ConfigurationError`]: a bad setup detected before a match starts.
//! - [`MatchError`]: what a match run can fail with as a whole.

use std::fmt;

use crate::abilities::{CombatEvent, TriggerKind};
use crate::cards::CardId;
use crate::core::PlayerId;
use crate::game::Phase;

/// A rejected shop-phase action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionError {
    /// No player sits at this seat.
    UnknownPlayer(PlayerId),
    /// The player has been eliminated.
    Eliminated(PlayerId),
    /// Actions are only accepted during the shop phase.
    WrongPhase(Phase),
    /// The player already locked in for this round.
    AlreadyPassed(PlayerId),
    /// Not enough gold.
    InsufficientGold { needed: u32, available: u32 },
    /// Shop slot does not exist.
    InvalidShopSlot { slot: usize, len: usize },
    /// Board slot does not exist.
    InvalidBoardSlot { slot: usize, len: usize },
    /// The board already holds the maximum number of minions.
    BoardFull,
    /// The tavern is already at the highest tier.
    MaxTavernTier,
    /// The match is over.
    MatchOver,
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::UnknownPlayer(p) => write!(f, "unknown player {}", p),
            ActionError::Eliminated(p) => write!(f, "{} has been eliminated", p),
            ActionError::WrongPhase(phase) => write!(f, "actions not accepted during {:?}", phase),
            ActionError::AlreadyPassed(p) => write!(f, "{} already passed this round", p),
            ActionError::InsufficientGold { needed, available } => {
                write!(f, "needs {} gold, has {}", needed, available)
            }
            ActionError::InvalidShopSlot { slot, len } => {
                write!(f, "shop slot {} out of range (shop has {})", slot, len)
            }
            ActionError::InvalidBoardSlot { slot, len } => {
                write!(f, "board slot {} out of range (board has {})", slot, len)
            }
            ActionError::BoardFull => write!(f, "board is full"),
            ActionError::MaxTavernTier => write!(f, "tavern is already at max tier"),
            ActionError::MatchOver => write!(f, "match is over"),
        }
    }
}

impl std::error::Error for ActionError {}

/// A combat that could not be resolved.
#[derive(Clone, Debug, PartialEq)]
pub enum SimulationError {
    /// Combat processed more steps than allowed; `tail` holds the last
    /// events for reproduction.
    IterationCapExceeded { cap: u32, tail: Vec<CombatEvent> },
    /// A handler emitted an event it is not allowed to produce.
    MalformedInteraction {
        card: CardId,
        kind: TriggerKind,
        event: CombatEvent,
    },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::IterationCapExceeded { cap, tail } => write!(
                f,
                "combat exceeded {} iterations (last {} events kept)",
                cap,
                tail.len()
            ),
            SimulationError::MalformedInteraction { card, kind, event } => write!(
                f,
                "{:?} handler of {} emitted forbidden event {:?}",
                kind, card, event
            ),
        }
    }
}

impl std::error::Error for SimulationError {}

/// Invalid setup, detected before any round is played.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Strict mode: a card declares a trigger with no handler.
    MissingHandler {
        card: CardId,
        name: String,
        kind: TriggerKind,
    },
    /// A configuration value is out of range.
    InvalidValue { field: &'static str, reason: String },
    /// The catalog has no card that can appear in shops.
    EmptyPool,
    /// A configuration file could not be read or parsed.
    Load(String),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::MissingHandler { card, name, kind } => {
                write!(f, "{} ({}) declares {:?} but no handler is registered", name, card, kind)
            }
            ConfigurationError::InvalidValue { field, reason } => {
                write!(f, "invalid `{}`: {}", field, reason)
            }
            ConfigurationError::EmptyPool => write!(f, "no card is eligible for the tavern pool"),
            ConfigurationError::Load(msg) => write!(f, "failed to load configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Failure of a whole match run.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchError {
    /// Combat failed; the match was aborted in `round`.
    Simulation { round: u32, source: SimulationError },
    /// The match could not be set up.
    Configuration(ConfigurationError),
    /// The match was aborted between rounds.
    Aborted { round: u32 },
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::Simulation { round, source } => {
                write!(f, "match aborted in round {}: {}", round, source)
            }
            MatchError::Configuration(e) => write!(f, "{}", e),
            MatchError::Aborted { round } => write!(f, "match aborted after round {}", round),
        }
    }
}

impl std::error::Error for MatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MatchError::Simulation { source, .. } => Some(source),
            MatchError::Configuration(e) => Some(e),
            MatchError::Aborted { .. } => None,
        }
    }
}

impl From<ConfigurationError> for MatchError {
    fn from(e: ConfigurationError) -> Self {
        MatchError::Configuration(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_display() {
        let e = ActionError::InsufficientGold { needed: 3, available: 1 };
        assert_eq!(e.to_string(), "needs 3 gold, has 1");
    }

    #[test]
    fn test_match_error_source() {
        use std::error::Error;

        let e = MatchError::Simulation {
            round: 4,
            source: SimulationError::IterationCapExceeded { cap: 10, tail: Vec::new() },
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("round 4"));
    }
}
