//! Opponent pairing.
//!
//! Pairing is greedy and deterministic. Players are taken in id order; each
//! gets the remaining opponent it has fought the fewest times, breaking ties
//! by the least recent fight and then by lowest id. With an odd number of
//! players, the bye goes to the player whose last bye is oldest (players who
//! never had one come first, lowest id first).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// Pairings for one round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Opponent pairs; the first player of each pair is side A in combat.
    pub pairings: Vec<(PlayerId, PlayerId)>,
    /// Player sitting out this round.
    pub bye: Option<PlayerId>,
}

/// Remembers who fought whom.
#[derive(Clone, Debug, Default)]
pub struct Matchmaker {
    fights: FxHashMap<(PlayerId, PlayerId), u32>,
    last_fought: FxHashMap<(PlayerId, PlayerId), u32>,
    last_bye: FxHashMap<PlayerId, u32>,
}

fn key(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Matchmaker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Times `a` and `b` have been paired.
    #[must_use]
    pub fn times_paired(&self, a: PlayerId, b: PlayerId) -> u32 {
        self.fights.get(&key(a, b)).copied().unwrap_or(0)
    }

    /// Pair the `active` players for `round` and remember the result.
    pub fn pair(&mut self, active: &[PlayerId], round: u32) -> Schedule {
        let mut remaining: Vec<PlayerId> = active.to_vec();
        remaining.sort();
        remaining.dedup();

        let bye = if remaining.len() % 2 == 1 {
            let pick = remaining
                .iter()
                .copied()
                .min_by_key(|p| (self.last_bye.get(p).copied(), *p));
            if let Some(p) = pick {
                remaining.retain(|&q| q != p);
                self.last_bye.insert(p, round);
            }
            pick
        } else {
            None
        };

        let mut pairings = Vec::with_capacity(remaining.len() / 2);
        while !remaining.is_empty() {
            let p = remaining.remove(0);
            let Some(idx) = (0..remaining.len()).min_by_key(|&i| {
                let q = remaining[i];
                (
                    self.times_paired(p, q),
                    self.last_fought.get(&key(p, q)).copied(),
                    q,
                )
            }) else {
                break;
            };
            let q = remaining.remove(idx);
            *self.fights.entry(key(p, q)).or_insert(0) += 1;
            self.last_fought.insert(key(p, q), round);
            pairings.push((p, q));
        }

        log::debug!("round {} pairings {:?}, bye {:?}", round, pairings, bye);
        Schedule { pairings, bye }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: u8) -> Vec<PlayerId> {
        (0..n).map(PlayerId::new).collect()
    }

    #[test]
    fn test_no_repeats_while_avoidable() {
        let mut mm = Matchmaker::new();
        let players = ids(4);
        let mut seen = std::collections::HashSet::new();
        for round in 1..=3 {
            for (a, b) in mm.pair(&players, round).pairings {
                assert!(seen.insert(key(a, b)), "repeat {a} vs {b} in round {round}");
            }
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_byes_rotate() {
        let mut mm = Matchmaker::new();
        let players = ids(3);
        let byes: Vec<_> = (1..=3).map(|r| mm.pair(&players, r).bye.unwrap()).collect();
        assert_eq!(byes, ids(3));
    }

    #[test]
    fn test_deterministic() {
        let players = ids(8);
        let mut a = Matchmaker::new();
        let mut b = Matchmaker::new();
        for round in 1..=5 {
            assert_eq!(a.pair(&players, round), b.pair(&players, round));
        }
    }

    #[test]
    fn test_single_player_gets_bye() {
        let mut mm = Matchmaker::new();
        let schedule = mm.pair(&[PlayerId::new(5)], 1);
        assert!(schedule.pairings.is_empty());
        assert_eq!(schedule.bye, Some(PlayerId::new(5)));
    }
}
