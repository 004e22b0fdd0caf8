//! Entity model: card definitions, minion instances, keywords and the
//! shared tavern pool.
//!
//! - `MinionDef`: static data (stats, tier, tribes, keywords, declared abilities)
//! - `Minion`: a runtime copy with current stats
//! - `CardCatalog`: lookup of definitions, plus the built-in card set
//! - `Pool`: copies available to all shops

pub mod catalog;
pub mod definition;
pub mod keywords;
pub mod minion;
pub mod pool;

pub use catalog::{ids, CardCatalog};
pub use definition::{CardId, MinionDef, MAX_TIER};
pub use keywords::{Keyword, Keywords, Tribe};
pub use minion::{DamageTaken, Minion};
pub use pool::{copies_for_tier, Pool, COPIES_PER_TIER};
