//! A player's minion lineup.
//!
//! Boards are ordered left to right; order decides attack sequence and the
//! order in which deaths are processed. A board also remembers the tavern
//! tier it is fielded at, which feeds the combat damage bonus.

use serde::{Deserialize, Serialize};

use crate::cards::Minion;
use crate::core::PlayerId;
use crate::error::ActionError;

/// Maximum minions on a board.
pub const MAX_BOARD_SIZE: usize = 7;

/// An ordered lineup of up to `capacity` minions.
///
/// ```
/// use bgsim::board::Board;
/// use bgsim::cards::{CardId, Minion};
///
/// let board = Board::from_minions(vec![
///     Minion::vanilla(CardId::new(1), 2, 3),
///     Minion::vanilla(CardId::new(2), 4, 1),
/// ]);
/// assert_eq!(board.total_attack(), 6);
/// assert_eq!(board.get(1).unwrap().position, 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    minions: Vec<Minion>,
    capacity: usize,
    tavern_tier: u8,
    owner: Option<PlayerId>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(MAX_BOARD_SIZE)
    }
}

impl Board {
    /// Create an empty board.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            minions: Vec::with_capacity(capacity.min(MAX_BOARD_SIZE)),
            capacity: capacity.clamp(1, MAX_BOARD_SIZE),
            tavern_tier: 1,
            owner: None,
        }
    }

    /// Create a board from a lineup. Extra minions beyond 7 are dropped.
    #[must_use]
    pub fn from_minions(minions: Vec<Minion>) -> Self {
        let mut board = Self::default();
        for m in minions.into_iter().take(MAX_BOARD_SIZE) {
            board.minions.push(m);
        }
        board.renumber();
        board
    }

    /// Set the tavern tier (builder pattern).
    #[must_use]
    pub fn with_tavern_tier(mut self, tier: u8) -> Self {
        self.tavern_tier = tier;
        self
    }

    /// Set the owner (builder pattern).
    #[must_use]
    pub fn with_owner(mut self, owner: PlayerId) -> Self {
        self.set_owner(owner);
        self
    }

    /// Tavern tier this board is fielded at.
    #[must_use]
    pub fn tavern_tier(&self) -> u8 {
        self.tavern_tier
    }

    /// Update the tavern tier.
    pub fn set_tavern_tier(&mut self, tier: u8) {
        self.tavern_tier = tier;
    }

    /// Owning player.
    #[must_use]
    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    /// Set the owner of the board and all its minions.
    pub fn set_owner(&mut self, owner: PlayerId) {
        self.owner = Some(owner);
        for m in &mut self.minions {
            m.owner = Some(owner);
        }
    }

    /// Capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of minions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.minions.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.minions.is_empty()
    }

    /// Check if full.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.minions.len() >= self.capacity
    }

    /// Minion at a position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Minion> {
        self.minions.get(position)
    }

    /// Mutable minion at a position.
    pub fn get_mut(&mut self, position: usize) -> Option<&mut Minion> {
        self.minions.get_mut(position)
    }

    /// Iterate left to right.
    pub fn iter(&self) -> impl Iterator<Item = &Minion> {
        self.minions.iter()
    }

    /// Iterate mutably left to right.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Minion> {
        self.minions.iter_mut()
    }

    /// Minions as a slice.
    #[must_use]
    pub fn minions(&self) -> &[Minion] {
        &self.minions
    }

    /// Add a minion at the right end.
    pub fn push(&mut self, minion: Minion) -> Result<(), ActionError> {
        let len = self.minions.len();
        self.insert(len, minion)
    }

    /// Insert a minion at `position` (clamped to the board length).
    pub fn insert(&mut self, position: usize, mut minion: Minion) -> Result<(), ActionError> {
        if self.is_full() {
            return Err(ActionError::BoardFull);
        }
        if let Some(owner) = self.owner {
            minion.owner = Some(owner);
        }
        let position = position.min(self.minions.len());
        self.minions.insert(position, minion);
        self.renumber();
        Ok(())
    }

    /// Remove the minion at `position`.
    pub fn remove(&mut self, position: usize) -> Result<Minion, ActionError> {
        if position >= self.minions.len() {
            return Err(ActionError::InvalidBoardSlot {
                slot: position,
                len: self.minions.len(),
            });
        }
        let minion = self.minions.remove(position);
        self.renumber();
        Ok(minion)
    }

    /// Move the minion at `from` so it ends up at `to`.
    pub fn reposition(&mut self, from: usize, to: usize) -> Result<(), ActionError> {
        let len = self.minions.len();
        for slot in [from, to] {
            if slot >= len {
                return Err(ActionError::InvalidBoardSlot { slot, len });
            }
        }
        let minion = self.minions.remove(from);
        self.minions.insert(to, minion);
        self.renumber();
        Ok(())
    }

    /// Remove every minion, returning them left to right.
    pub fn drain(&mut self) -> Vec<Minion> {
        std::mem::take(&mut self.minions)
    }

    /// Sum of attack values.
    #[must_use]
    pub fn total_attack(&self) -> i32 {
        self.minions.iter().map(|m| m.attack).sum()
    }

    /// Sum of health values.
    #[must_use]
    pub fn total_health(&self) -> i32 {
        self.minions.iter().map(|m| m.health).sum()
    }

    fn renumber(&mut self) {
        for (i, m) in self.minions.iter_mut().enumerate() {
            m.position = i as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardId;

    fn minion(id: u32) -> Minion {
        Minion::vanilla(CardId::new(id), 1, 1)
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut board = Board::new(2);
        board.push(minion(1)).unwrap();
        board.push(minion(2)).unwrap();
        assert_eq!(board.push(minion(3)), Err(ActionError::BoardFull));
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_insert_and_positions() {
        let mut board = Board::default();
        board.push(minion(1)).unwrap();
        board.push(minion(2)).unwrap();
        board.insert(0, minion(3)).unwrap();

        let cards: Vec<_> = board.iter().map(|m| m.card.raw()).collect();
        assert_eq!(cards, vec![3, 1, 2]);
        let positions: Vec<_> = board.iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_reposition() {
        let mut board = Board::from_minions(vec![minion(1), minion(2), minion(3)]);
        board.reposition(0, 2).unwrap();
        let cards: Vec<_> = board.iter().map(|m| m.card.raw()).collect();
        assert_eq!(cards, vec![2, 3, 1]);

        assert_eq!(
            board.reposition(0, 3),
            Err(ActionError::InvalidBoardSlot { slot: 3, len: 3 })
        );
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut board = Board::from_minions(vec![minion(1)]);
        assert!(board.remove(1).is_err());
        assert_eq!(board.remove(0).unwrap().card, CardId::new(1));
        assert!(board.is_empty());
    }

    #[test]
    fn test_owner_propagates() {
        let mut board = Board::from_minions(vec![minion(1)]).with_owner(PlayerId::new(2));
        board.push(minion(2)).unwrap();
        assert!(board.iter().all(|m| m.owner == Some(PlayerId::new(2))));
    }

    #[test]
    fn test_from_minions_truncates() {
        let board = Board::from_minions((0..9).map(minion).collect());
        assert_eq!(board.len(), MAX_BOARD_SIZE);
        assert!(board.is_full());
    }
}
