//! Core engine types: seats, combat addressing, RNG, configuration.
//!
//! Everything here is independent of card content. Higher layers
//! (`cards`, `combat`, `game`) build on these types.

pub mod config;
pub mod entity;
pub mod player;
pub mod rng;

pub use config::{CombatConfig, MatchConfig};
pub use entity::{MinionRef, Side};
pub use player::{PlayerId, PlayerMap};
pub use rng::GameRng;
