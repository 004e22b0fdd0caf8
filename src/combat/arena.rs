//! Arena storage for the two sides of a combat.
//!
//! Each side keeps every minion that ever existed during the combat in an
//! append-only slot vector, plus the left-to-right order of the minions
//! still on the board. A `MinionRef` is (side, slot): it stays valid after
//! deaths and summons, and dead minions remain readable for deathrattles.

use crate::board::{Board, MAX_BOARD_SIZE};
use crate::cards::{Minion, Tribe};
use crate::core::{MinionRef, PlayerId, Side};

#[derive(Clone, Debug)]
struct SideArena {
    slots: Vec<Minion>,
    order: Vec<u16>,
    capacity: usize,
    tavern_tier: u8,
    owner: Option<PlayerId>,
}

impl SideArena {
    fn from_board(board: &Board) -> Self {
        let slots: Vec<Minion> = board.iter().cloned().collect();
        let order = (0..slots.len() as u16).collect();
        Self {
            slots,
            order,
            capacity: board.capacity(),
            tavern_tier: board.tavern_tier(),
            owner: board.owner(),
        }
    }
}

/// Both sides of a combat (or a single shop board on side A).
#[derive(Clone, Debug)]
pub struct Arena {
    sides: [SideArena; 2],
}

impl Arena {
    /// Copy two boards into a fresh arena. The boards are not touched.
    #[must_use]
    pub fn new(a: &Board, b: &Board) -> Self {
        Self {
            sides: [SideArena::from_board(a), SideArena::from_board(b)],
        }
    }

    /// Arena over a single board on side A; side B is empty.
    #[must_use]
    pub fn single(board: &Board) -> Self {
        Self::new(board, &Board::new(MAX_BOARD_SIZE))
    }

    /// Minion behind a reference, alive or dead.
    #[must_use]
    pub fn get(&self, r: MinionRef) -> Option<&Minion> {
        self.sides[r.side.index()].slots.get(usize::from(r.slot))
    }

    pub(crate) fn get_mut(&mut self, r: MinionRef) -> Option<&mut Minion> {
        self.sides[r.side.index()].slots.get_mut(usize::from(r.slot))
    }

    /// Current board position of a minion still on the board.
    #[must_use]
    pub fn position(&self, r: MinionRef) -> Option<usize> {
        self.sides[r.side.index()].order.iter().position(|&s| s == r.slot)
    }

    /// Whether the minion is still on its board.
    #[must_use]
    pub fn is_on_board(&self, r: MinionRef) -> bool {
        self.position(r).is_some()
    }

    /// Minion on the board at `position`.
    #[must_use]
    pub fn at(&self, side: Side, position: usize) -> Option<MinionRef> {
        self.sides[side.index()]
            .order
            .get(position)
            .map(|&slot| MinionRef::new(side, slot))
    }

    /// Minions on the board of `side`, left to right.
    pub fn living(&self, side: Side) -> impl Iterator<Item = (MinionRef, &Minion)> + '_ {
        let arena = &self.sides[side.index()];
        arena
            .order
            .iter()
            .map(move |&slot| (MinionRef::new(side, slot), &arena.slots[usize::from(slot)]))
    }

    /// References of minions on the board of `side`, left to right.
    #[must_use]
    pub fn living_refs(&self, side: Side) -> Vec<MinionRef> {
        self.living(side).map(|(r, _)| r).collect()
    }

    /// Number of minions on the board of `side`.
    #[must_use]
    pub fn count(&self, side: Side) -> usize {
        self.sides[side.index()].order.len()
    }

    /// Whether `side` has room for another minion.
    #[must_use]
    pub fn has_room(&self, side: Side) -> bool {
        let arena = &self.sides[side.index()];
        arena.order.len() < arena.capacity
    }

    /// Number of minions of a tribe on the board of `side`.
    #[must_use]
    pub fn tribe_count(&self, side: Side, tribe: Tribe) -> usize {
        self.living(side).filter(|(_, m)| m.is_tribe(tribe)).count()
    }

    /// Tavern tier the side was fielded at.
    #[must_use]
    pub fn tavern_tier(&self, side: Side) -> u8 {
        self.sides[side.index()].tavern_tier
    }

    /// Pick a minion of `side` deterministically from `entropy`.
    ///
    /// `exclude` is skipped (e.g. the source itself).
    #[must_use]
    pub fn pick(&self, side: Side, entropy: u64, exclude: Option<MinionRef>) -> Option<MinionRef> {
        let candidates: Vec<_> = self
            .living(side)
            .map(|(r, _)| r)
            .filter(|r| Some(*r) != exclude)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[(entropy % candidates.len() as u64) as usize])
    }

    /// Put a minion on the board of `side` at `position` (clamped).
    ///
    /// Returns `None` when the board is full.
    pub(crate) fn summon(&mut self, side: Side, position: usize, mut minion: Minion) -> Option<MinionRef> {
        let arena = &mut self.sides[side.index()];
        if arena.order.len() >= arena.capacity {
            return None;
        }
        let slot = arena.slots.len() as u16;
        let position = position.min(arena.order.len());
        minion.owner = arena.owner;
        arena.slots.push(minion);
        arena.order.insert(position, slot);
        Some(MinionRef::new(side, slot))
    }

    /// Take a minion off its board, returning the position it had.
    pub(crate) fn remove(&mut self, r: MinionRef) -> Option<usize> {
        let arena = &mut self.sides[r.side.index()];
        let position = arena.order.iter().position(|&s| s == r.slot)?;
        arena.order.remove(position);
        Some(position)
    }

    /// Minions on the board with health <= 0, left to right.
    #[must_use]
    pub fn dead_on_board(&self, side: Side) -> Vec<MinionRef> {
        self.living(side)
            .filter(|(_, m)| !m.is_alive())
            .map(|(r, _)| r)
            .collect()
    }

    /// Rebuild a board from the minions left on `side`.
    #[must_use]
    pub fn to_board(&self, side: Side) -> Board {
        let arena = &self.sides[side.index()];
        let mut board = Board::new(arena.capacity).with_tavern_tier(arena.tavern_tier);
        if let Some(owner) = arena.owner {
            board.set_owner(owner);
        }
        for (_, m) in self.living(side) {
            // Capacity is enforced by `summon`, so this cannot overflow.
            let _ = board.push(m.clone());
        }
        board
    }
}
