//! Card abilities as data-driven handlers.
//!
//! Minions do not carry behavior. A card declares which [`TriggerKind`]s it
//! reacts to; the [`AbilityRegistry`] maps `(card, kind)` to handler
//! closures that read the combat arena and answer with follow-up
//! [`CombatEvent`]s. New cards are added by registering handlers, without
//! touching the combat resolver.

pub mod event;
pub mod registry;
mod standard;

pub use event::{CombatEvent, TriggerKind};
pub use registry::{AbilityRegistry, FollowUps, Handler, TriggerContext};
