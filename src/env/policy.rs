//! Agent interface.
//!
//! The engine treats an agent as a black box: it receives an observation
//! and the legal actions, and answers with one of them (or nothing, in
//! which case the shop phase eventually times out for it).

use crate::core::GameRng;

use super::action::Action;
use super::observation::Observation;

/// Something that plays shop phases.
pub trait Policy: Send {
    /// Pick the next action. `None` means "do nothing for now".
    fn act(&mut self, observation: &Observation, legal: &[Action]) -> Option<Action>;

    /// Name for logs.
    fn name(&self) -> &str {
        "policy"
    }
}

/// Picks uniformly among legal actions, passing with a fixed probability.
#[derive(Clone, Debug)]
pub struct RandomPolicy {
    rng: GameRng,
    pass_probability: f64,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
            pass_probability: 0.2,
        }
    }

    /// Set the chance of passing on any given decision.
    #[must_use]
    pub fn with_pass_probability(mut self, p: f64) -> Self {
        self.pass_probability = p.clamp(0.0, 1.0);
        self
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &Observation, legal: &[Action]) -> Option<Action> {
        if legal.contains(&Action::Pass) && self.rng.gen_bool(self.pass_probability) {
            return Some(Action::Pass);
        }
        self.rng.choose(legal).copied()
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Always passes immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassPolicy;

impl Policy for PassPolicy {
    fn act(&mut self, _observation: &Observation, _legal: &[Action]) -> Option<Action> {
        Some(Action::Pass)
    }

    fn name(&self) -> &str {
        "pass"
    }
}

/// Never acts; the shop phase has to time out for it.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdlePolicy;

impl Policy for IdlePolicy {
    fn act(&mut self, _observation: &Observation, _legal: &[Action]) -> Option<Action> {
        None
    }

    fn name(&self) -> &str {
        "idle"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MatchConfig;
    use crate::game::Match;

    #[test]
    fn test_random_policy_picks_legal_actions() {
        let game = Match::standard(MatchConfig::default().with_player_count(2), 1, 1).unwrap();
        let id = crate::core::PlayerId::new(0);
        let obs = game.observe(id).unwrap();
        let legal = game.legal_actions(id);

        let mut policy = RandomPolicy::new(5);
        for _ in 0..50 {
            let action = policy.act(&obs, &legal).unwrap();
            assert!(legal.contains(&action));
        }
    }

    #[test]
    fn test_random_policy_is_seeded() {
        let game = Match::standard(MatchConfig::default().with_player_count(2), 1, 1).unwrap();
        let id = crate::core::PlayerId::new(1);
        let obs = game.observe(id).unwrap();
        let legal = game.legal_actions(id);

        let mut a = RandomPolicy::new(9);
        let mut b = RandomPolicy::new(9);
        for _ in 0..20 {
            assert_eq!(a.act(&obs, &legal), b.act(&obs, &legal));
        }
    }

    #[test]
    fn test_idle_policy_never_acts() {
        let game = Match::standard(MatchConfig::default().with_player_count(2), 1, 1).unwrap();
        let obs = game.observe(crate::core::PlayerId::new(0)).unwrap();
        assert_eq!(IdlePolicy.act(&obs, &[Action::Pass]), None);
        assert_eq!(PassPolicy.act(&obs, &[]), Some(Action::Pass));
    }
}
