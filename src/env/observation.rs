//! Observations and their tensor encoding.
//!
//! An [`Observation`] is what one player can see during the shop phase:
//! its own state, its shop, and a summary of every opponent (the last
//! board they fielded in combat, never their current one).
//!
//! ## Encoding
//!
//! [`Observation::encode`] flattens an observation into a fixed-length
//! `Vec<f32>` for external networks. Values are normalized to roughly
//! `[0, 1]`. Layout:
//!
//! - `SELF_FEATURES` player scalars
//! - `MAX_BOARD_SIZE` board slots x `MINION_FEATURES`
//! - `MAX_BOARD_SIZE` shop slots x `MINION_FEATURES`
//! - `player_count - 1` opponents x `OPPONENT_FEATURES`, by seat
//!
//! Empty slots are all zeros.

use serde::{Deserialize, Serialize};

use crate::board::{Board, MAX_BOARD_SIZE};
use crate::cards::{Keyword, Minion, Tribe, MAX_TIER};
use crate::core::PlayerId;
use crate::game::Phase;

/// Player scalars at the start of the tensor.
pub const SELF_FEATURES: usize = 9;
/// Features per minion slot: present, attack, health, tier, keywords, tribes.
pub const MINION_FEATURES: usize = 4 + Keyword::ALL.len() + Tribe::ALL.len();
/// Features per opponent.
pub const OPPONENT_FEATURES: usize = 7;

const HEALTH_SCALE: f32 = 40.0;
const STAT_SCALE: f32 = 20.0;
const BOARD_STAT_SCALE: f32 = 100.0;
const GOLD_SCALE: f32 = 10.0;
const ROUND_SCALE: f32 = 40.0;

/// Size and strength of a board, as last seen in combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSummary {
    pub minion_count: usize,
    pub total_attack: i32,
    pub total_health: i32,
}

impl BoardSummary {
    #[must_use]
    pub fn of(board: &Board) -> Self {
        Self {
            minion_count: board.len(),
            total_attack: board.total_attack(),
            total_health: board.total_health(),
        }
    }
}

/// Public information about another player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentSummary {
    pub player: PlayerId,
    pub alive: bool,
    pub health: u32,
    pub armor: u32,
    pub tier: u8,
    /// `None` until the opponent has fought once.
    pub last_board: Option<BoardSummary>,
}

/// One player's view of the match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub player: PlayerId,
    pub round: u32,
    pub phase: Phase,
    pub player_count: usize,
    pub health: u32,
    pub armor: u32,
    pub gold: u32,
    pub tier: u8,
    pub upgrade_cost: Option<u32>,
    pub frozen: bool,
    pub passed: bool,
    pub board: Vec<Minion>,
    /// Offers as fresh minions.
    pub shop: Vec<Minion>,
    /// Every other seat, by id.
    pub opponents: Vec<OpponentSummary>,
}

impl Observation {
    /// Tensor shape for a match of `player_count` players.
    ///
    /// ```
    /// use bgsim::env::{Observation, MINION_FEATURES, OPPONENT_FEATURES, SELF_FEATURES};
    ///
    /// let [len] = Observation::shape(8);
    /// assert_eq!(len, SELF_FEATURES + 14 * MINION_FEATURES + 7 * OPPONENT_FEATURES);
    /// ```
    #[must_use]
    pub fn shape(player_count: usize) -> [usize; 1] {
        [SELF_FEATURES
            + 2 * MAX_BOARD_SIZE * MINION_FEATURES
            + player_count.saturating_sub(1) * OPPONENT_FEATURES]
    }

    /// Flatten into a tensor of length `shape(player_count)[0]`.
    #[must_use]
    pub fn encode(&self) -> Vec<f32> {
        let [len] = Self::shape(self.player_count);
        let mut tensor = Vec::with_capacity(len);

        let alive = self.opponents.iter().filter(|o| o.alive).count();
        tensor.extend_from_slice(&[
            self.health as f32 / HEALTH_SCALE,
            self.armor as f32 / HEALTH_SCALE,
            self.gold as f32 / GOLD_SCALE,
            f32::from(self.tier) / f32::from(MAX_TIER),
            self.upgrade_cost.map_or(0.0, |c| c as f32 / GOLD_SCALE),
            f32::from(u8::from(self.frozen)),
            f32::from(u8::from(self.passed)),
            self.round as f32 / ROUND_SCALE,
            alive as f32 / self.player_count.max(1) as f32,
        ]);

        for minions in [&self.board, &self.shop] {
            for slot in 0..MAX_BOARD_SIZE {
                encode_minion(minions.get(slot), &mut tensor);
            }
        }

        for i in 0..self.player_count.saturating_sub(1) {
            encode_opponent(self.opponents.get(i), &mut tensor);
        }

        debug_assert_eq!(tensor.len(), len);
        tensor
    }
}

fn encode_minion(minion: Option<&Minion>, out: &mut Vec<f32>) {
    let Some(m) = minion else {
        out.extend(std::iter::repeat(0.0).take(MINION_FEATURES));
        return;
    };
    out.push(1.0);
    out.push(m.attack as f32 / STAT_SCALE);
    out.push(m.health as f32 / STAT_SCALE);
    out.push(f32::from(m.tier) / f32::from(MAX_TIER));
    out.extend(Keyword::ALL.iter().map(|&k| f32::from(u8::from(m.has(k)))));
    out.extend(Tribe::ALL.iter().map(|&t| f32::from(u8::from(m.tribes.contains(&t)))));
}

fn encode_opponent(opponent: Option<&OpponentSummary>, out: &mut Vec<f32>) {
    let Some(o) = opponent else {
        out.extend(std::iter::repeat(0.0).take(OPPONENT_FEATURES));
        return;
    };
    let board = o.last_board.unwrap_or(BoardSummary { minion_count: 0, total_attack: 0, total_health: 0 });
    out.extend_from_slice(&[
        f32::from(u8::from(o.alive)),
        o.health as f32 / HEALTH_SCALE,
        o.armor as f32 / HEALTH_SCALE,
        f32::from(o.tier) / f32::from(MAX_TIER),
        board.minion_count as f32 / MAX_BOARD_SIZE as f32,
        board.total_attack as f32 / BOARD_STAT_SCALE,
        board.total_health as f32 / BOARD_STAT_SCALE,
    ]);
}
