//! Python bindings for the bgsim engine.
//!
//! # Quick Start
//!
//! ```python
//! import bgsim
//!
//! config = bgsim.MatchConfig(player_count=8)
//! env = bgsim.Environment(config, seed=42)
//!
//! obs = env.observe(0)          # numpy float32 vector
//! mask = env.action_mask(0)     # numpy float32 vector of length Environment.action_space()
//! env.step(0, bgsim.Action.reroll().index)
//! damage = env.end_shop_phase()
//! ```

use pyo3::prelude::*;

mod py_core;
mod py_env;

pub use py_core::*;
pub use py_env::*;

/// bgsim: Battlegrounds simulator for reinforcement learning.
#[pymodule]
fn bgsim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPlayerId>()?;
    m.add_class::<PyAction>()?;
    m.add_class::<PyMatchConfig>()?;
    m.add_class::<PyEnvironment>()?;
    m.add_class::<PyBatchRunner>()?;
    m.add("ACTION_SPACE", crate::env::ACTION_SPACE)?;
    Ok(())
}
