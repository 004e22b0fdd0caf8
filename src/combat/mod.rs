//! Combat resolution between two boards.
//!
//! The resolver copies both boards into an [`Arena`], runs the attack loop
//! and the trigger event queue, and reports a [`CombatOutcome`]. Combat
//! never touches the boards it was given.

pub mod arena;
pub mod outcome;
pub mod resolver;

pub use arena::Arena;
pub use outcome::CombatOutcome;
pub use resolver::CombatResolver;
