//! Agent-facing environment.
//!
//! This is the surface learning code talks to: a flat [`Action`] space with
//! legality masks, fixed-shape [`Observation`] tensors, the [`Policy`]
//! trait, and runners that drive whole matches (one at a time or in
//! parallel batches).
//!
//! ## Usage
//!
//! ```rust
//! use bgsim::core::MatchConfig;
//! use bgsim::env::BatchRunner;
//!
//! let runner = BatchRunner::standard(MatchConfig::default().with_player_count(4).with_max_rounds(5));
//! let reports = runner.run(2, 42);
//! assert!(reports.iter().all(|r| r.is_ok()));
//! ```

pub mod action;
pub mod observation;
pub mod policy;
pub mod runner;

pub use action::{Action, ACTION_SPACE};
pub use observation::{
    BoardSummary, Observation, OpponentSummary, MINION_FEATURES, OPPONENT_FEATURES, SELF_FEATURES,
};
pub use policy::{IdlePolicy, PassPolicy, Policy, RandomPolicy};
pub use runner::{play_match, BatchRunner, MatchReport, MatchSummary, PolicyFactory};
