//! # bgsim
//!
//! A Battlegrounds-style combat and economy simulator built for
//! reinforcement-learning workloads.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: every random choice flows from a seed. A combat
//!    depends only on its two boards and the seed derived from
//!    (match id, round, pairing index), so any pairing can be replayed in
//!    isolation.
//!
//! 2. **Data-driven cards**: minions are plain definitions in a
//!    [`CardCatalog`]; their abilities are closures registered by
//!    `(card, trigger)` in an [`AbilityRegistry`]. New cards need no
//!    changes to the combat loop.
//!
//! 3. **Throughput**: combats are independent and run on rayon, match
//!    logs clone in O(1) via `im`, and whole matches run in parallel
//!    batches.
//!
//! ## Modules
//!
//! - `core`: seats, combat addressing, RNG, configuration
//! - `cards`: definitions, minion instances, keywords, the shared pool
//! - `board`: ordered minion lineups
//! - `abilities`: combat events, trigger kinds, the ability registry
//! - `combat`: the event-driven combat resolver
//! - `game`: shops, pairing, the round state machine, match logs
//! - `env`: actions, observations, policies and match runners
//! - `error`: the error taxonomy

pub mod abilities;
pub mod board;
pub mod cards;
pub mod combat;
pub mod core;
pub mod env;
pub mod error;
pub mod game;

#[cfg(feature = "python")]
mod python;

// Re-export commonly used types
pub use crate::core::{CombatConfig, GameRng, MatchConfig, MinionRef, PlayerId, PlayerMap, Side};

pub use crate::cards::{CardCatalog, CardId, Keyword, Keywords, Minion, MinionDef, Pool, Tribe};

pub use crate::board::{Board, MAX_BOARD_SIZE};

pub use crate::abilities::{AbilityRegistry, CombatEvent, TriggerContext, TriggerKind};

pub use crate::combat::{CombatOutcome, CombatResolver};

pub use crate::game::{Match, MatchLog, Phase, RoundRecord, Standing};

pub use crate::env::{Action, BatchRunner, Observation, Policy, ACTION_SPACE};

pub use crate::error::{ActionError, ConfigurationError, MatchError, SimulationError};
