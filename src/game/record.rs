//! Round records and match replays.
//!
//! A [`RoundRecord`] is written once per round and never changed. The
//! [`MatchLog`] keeps them in an `im::Vector`, so snapshots of a running
//! match clone in O(1). Logs serialize to JSON (readable) and bincode
//! (compact), and final placements can be rebuilt from a log alone.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// Result of one pairing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingResult {
    /// Side A player.
    pub a: PlayerId,
    /// Side B player.
    pub b: PlayerId,
    /// Winner; `None` for a draw.
    pub winner: Option<PlayerId>,
    /// Damage dealt to the loser.
    pub damage: u32,
    /// Seed the combat was resolved with.
    pub seed: u64,
    /// Number of combat events.
    pub events: usize,
}

impl PairingResult {
    /// The player who took damage, if any.
    #[must_use]
    pub fn loser(&self) -> Option<PlayerId> {
        match self.winner {
            Some(w) if w == self.a => Some(self.b),
            Some(_) => Some(self.a),
            None => None,
        }
    }
}

/// Damage a player took in one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDelta {
    pub player: PlayerId,
    /// Combat damage before armor.
    pub damage: u32,
    /// Health actually lost after armor.
    pub health_lost: u32,
    /// Health after the round.
    pub health_after: u32,
}

/// Everything that happened in one round's combat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub pairings: Vec<PairingResult>,
    pub bye: Option<PlayerId>,
    pub health_deltas: Vec<HealthDelta>,
    /// Players eliminated this round, by id.
    pub eliminations: Vec<PlayerId>,
}

/// Final position of a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub player: PlayerId,
    /// 1 = first. Players eliminated in the same round share a placement.
    pub placement: usize,
    pub health: u32,
    pub eliminated_in: Option<u32>,
}

/// Append-only log of a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchLog {
    pub match_id: u64,
    pub seed: u64,
    pub player_count: usize,
    pub starting_health: u32,
    rounds: Vector<RoundRecord>,
}

impl MatchLog {
    #[must_use]
    pub fn new(match_id: u64, seed: u64, player_count: usize, starting_health: u32) -> Self {
        Self {
            match_id,
            seed,
            player_count,
            starting_health,
            rounds: Vector::new(),
        }
    }

    /// Append a finished round.
    pub fn push(&mut self, record: RoundRecord) {
        self.rounds.push_back(record);
    }

    /// Recorded rounds, oldest first.
    pub fn rounds(&self) -> impl Iterator<Item = &RoundRecord> {
        self.rounds.iter()
    }

    /// Number of recorded rounds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// Check if no round was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Latest round.
    #[must_use]
    pub fn last(&self) -> Option<&RoundRecord> {
        self.rounds.back()
    }

    /// Placements rebuilt from the records.
    ///
    /// Survivors rank above eliminated players, by remaining health. Later
    /// eliminations rank above earlier ones.
    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        let mut health = vec![self.starting_health; self.player_count];
        let mut eliminated_in = vec![None; self.player_count];

        for record in &self.rounds {
            for delta in &record.health_deltas {
                if let Some(h) = health.get_mut(delta.player.index()) {
                    *h = delta.health_after;
                }
            }
            for p in &record.eliminations {
                if let Some(e) = eliminated_in.get_mut(p.index()) {
                    *e = Some(record.round);
                }
            }
        }

        // Higher is better: survivors beat everyone, then later eliminations.
        let score = |i: usize| -> (u32, u32) {
            match eliminated_in[i] {
                None => (u32::MAX, health[i]),
                Some(round) => (round, 0),
            }
        };

        let mut standings: Vec<Standing> = (0..self.player_count)
            .map(|i| Standing {
                player: PlayerId::new(i as u8),
                placement: 1 + (0..self.player_count).filter(|&j| score(j) > score(i)).count(),
                health: health[i],
                eliminated_in: eliminated_in[i],
            })
            .collect();
        standings.sort_by_key(|s| (s.placement, s.player));
        standings
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to a compact binary blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Parse a binary blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(i: u8) -> PlayerId {
        PlayerId::new(i)
    }

    fn sample() -> MatchLog {
        let mut log = MatchLog::new(1, 2, 3, 10);
        log.push(RoundRecord {
            round: 1,
            pairings: vec![PairingResult { a: p(0), b: p(1), winner: Some(p(0)), damage: 10, seed: 5, events: 4 }],
            bye: Some(p(2)),
            health_deltas: vec![HealthDelta { player: p(1), damage: 10, health_lost: 10, health_after: 0 }],
            eliminations: vec![p(1)],
        });
        log.push(RoundRecord {
            round: 2,
            pairings: vec![PairingResult { a: p(0), b: p(2), winner: Some(p(2)), damage: 4, seed: 6, events: 7 }],
            bye: None,
            health_deltas: vec![HealthDelta { player: p(0), damage: 4, health_lost: 4, health_after: 6 }],
            eliminations: vec![],
        });
        log
    }

    #[test]
    fn test_standings_from_records() {
        let standings = sample().standings();
        let order: Vec<_> = standings.iter().map(|s| (s.player, s.placement)).collect();
        assert_eq!(order, vec![(p(2), 1), (p(0), 2), (p(1), 3)]);
        assert_eq!(standings[2].eliminated_in, Some(1));
    }

    #[test]
    fn test_simultaneous_eliminations_share_placement() {
        let mut log = MatchLog::new(1, 2, 3, 10);
        log.push(RoundRecord {
            round: 1,
            pairings: vec![],
            bye: None,
            health_deltas: vec![],
            eliminations: vec![p(0), p(1)],
        });
        let placements: Vec<_> = log.standings().iter().map(|s| s.placement).collect();
        assert_eq!(placements, vec![1, 2, 2]);
    }

    #[test]
    fn test_json_and_binary_round_trip() {
        let log = sample();
        assert_eq!(MatchLog::from_json(&log.to_json().unwrap()).unwrap(), log);
        assert_eq!(MatchLog::from_bytes(&log.to_bytes().unwrap()).unwrap(), log);
    }

    #[test]
    fn test_pairing_loser() {
        let r = PairingResult { a: p(0), b: p(1), winner: Some(p(1)), damage: 3, seed: 0, events: 0 };
        assert_eq!(r.loser(), Some(p(0)));
    }
}
