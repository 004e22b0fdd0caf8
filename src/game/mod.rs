//! Match orchestration: players, shops, pairing, the round state machine
//! and the match log.

pub mod machine;
pub mod matchmaking;
pub mod phase;
pub mod player;
pub mod record;
pub mod shop;

pub use machine::Match;
pub use matchmaking::{Matchmaker, Schedule};
pub use phase::Phase;
pub use player::Player;
pub use record::{HealthDelta, MatchLog, PairingResult, RoundRecord, Standing};
pub use shop::Tavern;
