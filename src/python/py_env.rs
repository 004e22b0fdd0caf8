//! Environment bindings for Python.

use std::fmt::Display;

use numpy::PyArray1;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::core::PlayerId;
use crate::env::{Action, BatchRunner, Observation, ACTION_SPACE};
use crate::game::Match;

use super::py_core::{PyAction, PyMatchConfig};

fn value_error(e: impl Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn runtime_error(e: impl Display) -> PyErr {
    PyRuntimeError::new_err(e.to_string())
}

fn seat(player: usize) -> PyResult<PlayerId> {
    u8::try_from(player)
        .map(PlayerId::new)
        .map_err(|_| PyValueError::new_err(format!("no seat {}", player)))
}

/// One match, driven step by step from Python.
///
/// Typical loop:
///
/// ```python
/// env = bgsim.Environment(bgsim.MatchConfig(player_count=4), seed=7)
/// while not env.is_over:
///     for p in env.active_players():
///         obs, mask = env.observe(p), env.action_mask(p)
///         env.step(p, pick(obs, mask))
///     env.end_shop_phase()
/// ```
#[pyclass(name = "Environment")]
pub struct PyEnvironment {
    inner: Match,
    match_id: u64,
}

#[pymethods]
impl PyEnvironment {
    #[new]
    #[pyo3(signature = (config, seed = 0, match_id = 0))]
    fn new(config: &PyMatchConfig, seed: u64, match_id: u64) -> PyResult<Self> {
        let inner = Match::standard(config.0.clone(), match_id, seed).map_err(value_error)?;
        Ok(Self { inner, match_id })
    }

    /// Start over with a new seed and the same configuration.
    fn reset(&mut self, seed: u64) -> PyResult<()> {
        self.inner = Match::standard(self.inner.config().clone(), self.match_id, seed).map_err(value_error)?;
        Ok(())
    }

    #[getter]
    fn round(&self) -> u32 {
        self.inner.round()
    }

    #[getter]
    fn phase(&self) -> String {
        self.inner.phase().to_string()
    }

    #[getter]
    fn is_over(&self) -> bool {
        self.inner.is_over()
    }

    #[getter]
    fn is_aborted(&self) -> bool {
        self.inner.is_aborted()
    }

    /// Seats still in the match.
    fn active_players(&self) -> Vec<usize> {
        self.inner.active_players().into_iter().map(PlayerId::index).collect()
    }

    /// Length of the observation vector.
    #[getter]
    fn observation_size(&self) -> usize {
        Observation::shape(self.inner.config().player_count)[0]
    }

    /// Number of discrete actions.
    #[staticmethod]
    fn action_space() -> usize {
        ACTION_SPACE
    }

    /// Observation tensor for `player`.
    fn observe<'py>(&self, py: Python<'py>, player: usize) -> PyResult<Bound<'py, PyArray1<f32>>> {
        let obs = self.inner.observe(seat(player)?).map_err(value_error)?;
        Ok(PyArray1::from_vec_bound(py, obs.encode()))
    }

    /// 1.0 for every legal action index, 0.0 elsewhere.
    fn action_mask<'py>(&self, py: Python<'py>, player: usize) -> PyResult<Bound<'py, PyArray1<f32>>> {
        let legal = self.inner.legal_actions(seat(player)?);
        Ok(PyArray1::from_vec_bound(py, Action::mask(&legal)))
    }

    fn legal_actions(&self, player: usize) -> PyResult<Vec<PyAction>> {
        Ok(self.inner.legal_actions(seat(player)?).into_iter().map(PyAction).collect())
    }

    /// Apply an action given by flat index. Raises ValueError if rejected.
    fn step(&mut self, player: usize, action: usize) -> PyResult<()> {
        let action = Action::from_index(action)
            .ok_or_else(|| PyValueError::new_err(format!("action index {} out of range", action)))?;
        self.inner.act(seat(player)?, action).map_err(value_error)
    }

    /// Auto-pass everyone still shopping and run combat.
    ///
    /// Returns the damage each seat took this round.
    fn end_shop_phase(&mut self) -> PyResult<Vec<u32>> {
        let record = self.inner.play_round().map_err(runtime_error)?;
        let mut damage = vec![0; self.inner.config().player_count];
        for delta in record.iter().flat_map(|r| &r.health_deltas) {
            if let Some(d) = damage.get_mut(delta.player.index()) {
                *d = delta.damage;
            }
        }
        Ok(damage)
    }

    /// Current health per seat.
    fn health(&self) -> Vec<u32> {
        self.inner.players().map(|p| p.health).collect()
    }

    /// `(seat, placement)` pairs, best first.
    fn standings(&self) -> Vec<(usize, usize)> {
        self.inner
            .standings()
            .into_iter()
            .map(|s| (s.player.index(), s.placement))
            .collect()
    }

    /// The match log as JSON.
    fn log_json(&self) -> PyResult<String> {
        self.inner.log().to_json().map_err(runtime_error)
    }

    fn __repr__(&self) -> String {
        format!(
            "Environment(round={}, phase={}, players_left={})",
            self.inner.round(),
            self.inner.phase(),
            self.inner.active_players().len()
        )
    }
}

/// Runs whole matches with random policies, in parallel.
#[pyclass(name = "BatchRunner")]
pub struct PyBatchRunner(pub BatchRunner);

#[pymethods]
impl PyBatchRunner {
    #[new]
    fn new(config: &PyMatchConfig) -> Self {
        Self(BatchRunner::standard(config.0.clone()))
    }

    /// Run `count` matches and return one JSON log per match (`None` for a
    /// failed match). The GIL is released while matches run.
    fn run(&self, py: Python<'_>, count: u64, seed: u64) -> PyResult<Vec<Option<String>>> {
        let reports = py.allow_threads(|| self.0.run(count, seed));
        reports
            .into_iter()
            .map(|report| match report.result {
                Ok(summary) => summary.log.to_json().map(Some).map_err(runtime_error),
                Err(_) => Ok(None),
            })
            .collect()
    }
}
