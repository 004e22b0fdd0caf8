//! Shop-phase actions.
//!
//! Actions are small values an agent sends to the match. For learning
//! agents each action also has a fixed index in a flat action space:
//!
//! | Range   | Action                    |
//! |---------|---------------------------|
//! | 0..7    | `Buy { shop_slot }`       |
//! | 7..14   | `Sell { board_slot }`     |
//! | 14      | `Reroll`                  |
//! | 15      | `Upgrade`                 |
//! | 16..65  | `Reposition { from, to }` |
//! | 65      | `Freeze`                  |
//! | 66      | `Pass`                    |

use serde::{Deserialize, Serialize};

use crate::board::MAX_BOARD_SIZE;

const SLOTS: usize = MAX_BOARD_SIZE;
const SELL: usize = SLOTS;
const REROLL: usize = 2 * SLOTS;
const UPGRADE: usize = REROLL + 1;
const REPOSITION: usize = UPGRADE + 1;
const FREEZE: usize = REPOSITION + SLOTS * SLOTS;
const PASS: usize = FREEZE + 1;

/// Size of the flat action space.
pub const ACTION_SPACE: usize = PASS + 1;

/// A shop-phase action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Buy the offer in `shop_slot` and put it on the right end of the board.
    Buy { shop_slot: usize },
    /// Sell the minion at `board_slot`.
    Sell { board_slot: usize },
    /// Pay to refresh the shop.
    Reroll,
    /// Pay to raise the tavern tier.
    Upgrade,
    /// Move a minion from one board position to another.
    Reposition { from: usize, to: usize },
    /// Toggle keeping the current offers into the next round.
    Freeze,
    /// Lock in for this round.
    Pass,
}

impl Action {
    /// Index in the flat action space.
    ///
    /// ```
    /// use bgsim::env::{Action, ACTION_SPACE};
    ///
    /// let a = Action::Reposition { from: 2, to: 5 };
    /// assert_eq!(Action::from_index(a.index()), Some(a));
    /// assert_eq!(Action::Pass.index(), ACTION_SPACE - 1);
    /// ```
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Action::Buy { shop_slot } => shop_slot.min(SLOTS - 1),
            Action::Sell { board_slot } => SELL + board_slot.min(SLOTS - 1),
            Action::Reroll => REROLL,
            Action::Upgrade => UPGRADE,
            Action::Reposition { from, to } => {
                REPOSITION + from.min(SLOTS - 1) * SLOTS + to.min(SLOTS - 1)
            }
            Action::Freeze => FREEZE,
            Action::Pass => PASS,
        }
    }

    /// Decode a flat index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        let action = match index {
            i if i < SELL => Action::Buy { shop_slot: i },
            i if i < REROLL => Action::Sell { board_slot: i - SELL },
            REROLL => Action::Reroll,
            UPGRADE => Action::Upgrade,
            i if i < FREEZE => {
                let i = i - REPOSITION;
                Action::Reposition { from: i / SLOTS, to: i % SLOTS }
            }
            FREEZE => Action::Freeze,
            PASS => Action::Pass,
            _ => return None,
        };
        Some(action)
    }

    /// Mask over the flat action space with 1.0 for each legal action.
    #[must_use]
    pub fn mask(legal: &[Action]) -> Vec<f32> {
        let mut mask = vec![0.0; ACTION_SPACE];
        for action in legal {
            mask[action.index()] = 1.0;
        }
        mask
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy { shop_slot } => write!(f, "buy {}", shop_slot),
            Action::Sell { board_slot } => write!(f, "sell {}", board_slot),
            Action::Reroll => write!(f, "reroll"),
            Action::Upgrade => write!(f, "upgrade"),
            Action::Reposition { from, to } => write!(f, "move {} -> {}", from, to),
            Action::Freeze => write!(f, "freeze"),
            Action::Pass => write!(f, "pass"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense_and_unique() {
        let decoded: Vec<_> = (0..ACTION_SPACE).map(Action::from_index).collect();
        assert!(decoded.iter().all(Option::is_some));
        for (i, action) in decoded.into_iter().flatten().enumerate() {
            assert_eq!(action.index(), i);
        }
        assert_eq!(Action::from_index(ACTION_SPACE), None);
    }

    #[test]
    fn test_mask() {
        let mask = Action::mask(&[Action::Pass, Action::Buy { shop_slot: 1 }]);
        assert_eq!(mask.len(), ACTION_SPACE);
        assert_eq!(mask.iter().sum::<f32>(), 2.0);
        assert_eq!(mask[1], 1.0);
    }
}
