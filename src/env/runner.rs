//! Driving matches with policies.
//!
//! [`play_match`] runs one match to the end, asking each seat's policy for
//! actions in round-robin ticks until everyone has passed or the action
//! budget is spent, then expiring the shop phase and resolving combat.
//!
//! [`BatchRunner`] runs many matches on the rayon pool. Matches share only
//! the immutable catalog and registry; a failure in one shows up in its own
//! [`MatchReport`] and never stops the others.

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::abilities::AbilityRegistry;
use crate::cards::CardCatalog;
use crate::core::{GameRng, MatchConfig, PlayerId};
use crate::error::MatchError;
use crate::game::{Match, MatchLog, Standing};

use super::policy::{Policy, RandomPolicy};

/// Builds the policy for a seat, given the seat and the match seed.
pub type PolicyFactory = Arc<dyn Fn(PlayerId, u64) -> Box<dyn Policy> + Send + Sync>;

/// Play `game` to completion.
///
/// `policies[i]` plays seat `i`; seats without a policy never act and are
/// auto-passed when the phase expires. Rejected actions are logged and
/// the policy is asked again next tick.
pub fn play_match(game: &mut Match, policies: &mut [Box<dyn Policy>]) -> Result<MatchLog, MatchError> {
    let budget = game.config().shop_action_budget;

    while !game.is_over() {
        for _ in 0..budget {
            let mut acted = false;
            for id in game.active_players() {
                let legal = game.legal_actions(id);
                if legal.is_empty() {
                    continue;
                }
                let Some(policy) = policies.get_mut(id.index()) else {
                    continue;
                };
                let observation = game.observe(id).map_err(|e| {
                    log::error!("cannot observe {}: {}", id, e);
                    game.abort()
                })?;
                let Some(action) = policy.act(&observation, &legal) else {
                    continue;
                };
                match game.act(id, action) {
                    Ok(()) => acted = true,
                    Err(e) => log::debug!("{} ({}) tried {}: {}", id, policy.name(), action, e),
                }
            }
            if !acted || game.all_passed() {
                break;
            }
        }

        game.expire_shop_phase();
        if game.advance()?.is_none() && !game.is_over() {
            // Nobody could pass; should not happen after expiry.
            return Err(game.abort());
        }
    }

    Ok(game.log().clone())
}

/// Final result of a finished match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub rounds: usize,
    pub standings: Vec<Standing>,
    pub log: MatchLog,
}

impl MatchSummary {
    /// First place, if it is unshared.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        let mut first = self.standings.iter().filter(|s| s.placement == 1);
        match (first.next(), first.next()) {
            (Some(s), None) => Some(s.player),
            _ => None,
        }
    }
}

/// Outcome of one match in a batch.
#[derive(Clone, Debug)]
pub struct MatchReport {
    pub match_id: u64,
    pub seed: u64,
    pub result: Result<MatchSummary, MatchError>,
}

impl MatchReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs independent matches in parallel.
#[derive(Clone)]
pub struct BatchRunner {
    config: MatchConfig,
    catalog: Arc<CardCatalog>,
    registry: Arc<AbilityRegistry>,
    policies: PolicyFactory,
}

impl std::fmt::Debug for BatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRunner")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl BatchRunner {
    /// A runner over the given card set, with random policies.
    #[must_use]
    pub fn new(config: MatchConfig, catalog: Arc<CardCatalog>, registry: Arc<AbilityRegistry>) -> Self {
        Self {
            config,
            catalog,
            registry,
            policies: Arc::new(|id, seed| {
                Box::new(RandomPolicy::new(GameRng::derive_seed(seed, &[id.index() as u64]))) as Box<dyn Policy>
            }),
        }
    }

    /// A runner over the built-in card set.
    #[must_use]
    pub fn standard(config: MatchConfig) -> Self {
        Self::new(config, Arc::new(CardCatalog::standard()), Arc::new(AbilityRegistry::standard()))
    }

    /// Use `factory` to seat policies.
    #[must_use]
    pub fn with_policies(mut self, factory: PolicyFactory) -> Self {
        self.policies = factory;
        self
    }

    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Run one match.
    pub fn run_one(&self, match_id: u64, seed: u64) -> MatchReport {
        let result = Match::new(
            self.config.clone(),
            Arc::clone(&self.catalog),
            Arc::clone(&self.registry),
            match_id,
            seed,
        )
        .and_then(|mut game| {
            let mut policies: Vec<Box<dyn Policy>> = (0..self.config.player_count)
                .map(|i| (self.policies)(PlayerId::new(i as u8), seed))
                .collect();
            play_match(&mut game, &mut policies)?;
            Ok(MatchSummary {
                rounds: game.log().len(),
                standings: game.standings(),
                log: game.log().clone(),
            })
        });

        if let Err(e) = &result {
            log::warn!("match {} (seed {}) failed: {}", match_id, seed, e);
        }
        MatchReport { match_id, seed, result }
    }

    /// Run `count` matches with ids `0..count` and seeds derived from
    /// `base_seed`. Reports come back in id order.
    pub fn run(&self, count: u64, base_seed: u64) -> Vec<MatchReport> {
        log::info!("running {} matches from seed {}", count, base_seed);
        (0..count)
            .into_par_iter()
            .map(|id| self.run_one(id, GameRng::derive_seed(base_seed, &[id])))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{IdlePolicy, PassPolicy};

    fn config() -> MatchConfig {
        MatchConfig::default().with_player_count(4).with_max_rounds(12)
    }

    #[test]
    fn test_play_match_runs_to_game_over() {
        let mut game = Match::standard(config(), 1, 3).unwrap();
        let mut policies: Vec<Box<dyn Policy>> = (0..4).map(|i| Box::new(RandomPolicy::new(i)) as Box<dyn Policy>).collect();
        let log = play_match(&mut game, &mut policies).unwrap();
        assert!(game.is_over());
        assert!(!log.is_empty());
        assert!(log.len() <= 12);
    }

    #[test]
    fn test_idle_seats_time_out() {
        let mut game = Match::standard(config().with_max_rounds(2), 1, 3).unwrap();
        let mut policies: Vec<Box<dyn Policy>> = vec![Box::new(IdlePolicy), Box::new(PassPolicy)];
        let log = play_match(&mut game, &mut policies).unwrap();
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_batch_is_deterministic() {
        let runner = BatchRunner::standard(config());
        let a: Vec<_> = runner.run(4, 11).into_iter().map(|r| r.result.unwrap()).collect();
        let b: Vec<_> = runner.run(4, 11).into_iter().map(|r| r.result.unwrap()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_batch_reports_failures_per_match() {
        let runner = BatchRunner::standard(config().with_max_rounds(0));
        let reports = runner.run(2, 1);
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| !r.is_ok()));
    }
}
