//! Core type bindings for Python.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::core::{MatchConfig, PlayerId};
use crate::env::{Action, ACTION_SPACE};

/// Python wrapper for PlayerId.
#[pyclass(name = "PlayerId")]
#[derive(Clone, Debug)]
pub struct PyPlayerId(pub PlayerId);

#[pymethods]
impl PyPlayerId {
    #[new]
    fn new(id: u8) -> Self {
        Self(PlayerId::new(id))
    }

    /// Seat index (0-based).
    fn index(&self) -> usize {
        self.0.index()
    }

    fn __repr__(&self) -> String {
        format!("PlayerId({})", self.0 .0)
    }

    fn __eq__(&self, other: &Self) -> bool {
        self.0 == other.0
    }

    fn __hash__(&self) -> u64 {
        u64::from(self.0 .0)
    }
}

/// Python wrapper for a shop action.
///
/// Actions are usually built from their flat index, which is also the
/// position in the legality mask.
#[pyclass(name = "Action")]
#[derive(Clone, Debug)]
pub struct PyAction(pub Action);

#[pymethods]
impl PyAction {
    /// Build an action from its flat index.
    #[new]
    fn new(index: usize) -> PyResult<Self> {
        Action::from_index(index)
            .map(Self)
            .ok_or_else(|| PyValueError::new_err(format!("action index {} out of range 0..{}", index, ACTION_SPACE)))
    }

    #[staticmethod]
    fn buy(shop_slot: usize) -> Self {
        Self(Action::Buy { shop_slot })
    }

    #[staticmethod]
    fn sell(board_slot: usize) -> Self {
        Self(Action::Sell { board_slot })
    }

    #[staticmethod]
    fn reposition(from: usize, to: usize) -> Self {
        Self(Action::Reposition { from, to })
    }

    #[staticmethod]
    fn reroll() -> Self {
        Self(Action::Reroll)
    }

    #[staticmethod]
    fn upgrade() -> Self {
        Self(Action::Upgrade)
    }

    #[staticmethod]
    fn freeze() -> Self {
        Self(Action::Freeze)
    }

    #[staticmethod]
    #[pyo3(name = "pass_")]
    fn pass() -> Self {
        Self(Action::Pass)
    }

    /// Flat index.
    #[getter]
    fn index(&self) -> usize {
        self.0.index()
    }

    fn __repr__(&self) -> String {
        format!("Action({})", self.0)
    }

    fn __eq__(&self, other: &Self) -> bool {
        self.0 == other.0
    }

    fn __hash__(&self) -> u64 {
        self.0.index() as u64
    }
}

/// Python wrapper for MatchConfig.
#[pyclass(name = "MatchConfig")]
#[derive(Clone, Debug)]
pub struct PyMatchConfig(pub MatchConfig);

#[pymethods]
impl PyMatchConfig {
    /// Create a configuration. Unlisted values take their defaults.
    #[new]
    #[pyo3(signature = (
        player_count = 8,
        starting_health = 30,
        max_rounds = 40,
        shop_action_budget = 32,
        strict_abilities = false,
        parallel_combat = false
    ))]
    fn new(
        player_count: usize,
        starting_health: u32,
        max_rounds: u32,
        shop_action_budget: u32,
        strict_abilities: bool,
        parallel_combat: bool,
    ) -> PyResult<Self> {
        let config = MatchConfig::default()
            .with_player_count(player_count)
            .with_starting_health(starting_health)
            .with_max_rounds(max_rounds)
            .with_shop_action_budget(shop_action_budget)
            .with_strict_abilities(strict_abilities)
            .with_parallel_combat(parallel_combat);
        config.validate().map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self(config))
    }

    /// Parse a JSON configuration.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        MatchConfig::from_json(json)
            .map(Self)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    #[getter]
    fn player_count(&self) -> usize {
        self.0.player_count
    }

    #[getter]
    fn starting_health(&self) -> u32 {
        self.0.starting_health
    }

    #[getter]
    fn max_rounds(&self) -> u32 {
        self.0.max_rounds
    }

    fn __repr__(&self) -> String {
        format!(
            "MatchConfig(players={}, health={}, max_rounds={})",
            self.0.player_count, self.0.starting_health, self.0.max_rounds
        )
    }
}
