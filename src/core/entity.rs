//! Combat-scoped minion addressing.
//!
//! During combat each side owns an arena of minions. A minion is addressed
//! by its side and its arena slot. Slots are stable for the whole combat:
//! a minion keeps its slot when others die or are summoned, and dead
//! minions are never reused. Board position (left-to-right order) is tracked
//! separately by the combat board.
//!
//! ```
//! use bgsim::core::{MinionRef, Side};
//!
//! let target = MinionRef::new(Side::B, 2);
//! assert_eq!(target.side.opponent(), Side::A);
//! assert_eq!(target.to_string(), "B#2");
//! ```

use serde::{Deserialize, Serialize};

/// One of the two sides of a combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// The first board passed to the resolver.
    A,
    /// The second board passed to the resolver.
    B,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Array index for per-side storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    /// Both sides, A first.
    pub const BOTH: [Side; 2] = [Side::A, Side::B];
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Stable reference to a minion inside one combat (or one shop board).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinionRef {
    /// Side owning the minion.
    pub side: Side,
    /// Arena slot on that side.
    pub slot: u16,
}

impl MinionRef {
    /// Create a new reference.
    #[must_use]
    pub const fn new(side: Side, slot: u16) -> Self {
        Self { side, slot }
    }
}

impl std::fmt::Display for MinionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.side, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::A.opponent(), Side::B);
        assert_eq!(Side::B.opponent().opponent(), Side::B);
        assert_eq!(Side::BOTH.map(Side::index), [0, 1]);
    }

    #[test]
    fn test_minion_ref_serialization() {
        let r = MinionRef::new(Side::A, 5);
        let json = serde_json::to_string(&r).unwrap();
        let back: MinionRef = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
