use crate::{ensure_config, error::Result, state::State, util::argmax};

use super::{ActionSelector, ActionTable, BanditSelector, Choice, Estimates};

/// Configuration for the [`Ucb`] selector
#[derive(Debug, Clone)]
pub struct UcbConfig {
    /// Exploration coefficient, scaling the uncertainty bonus
    ///
    /// A higher `drift` equates to more exploration. If unsure where to start, 1 is a good default value.
    ///
    /// **Default**: `1.0`
    pub drift: f64,
}

impl Default for UcbConfig {
    fn default() -> Self {
        Self { drift: 1.0 }
    }
}

/// Uncertainty bonus `drift * sqrt(ln(t) / n)` for an action picked `n` times by time `t`
pub fn bonus(drift: f64, timestep: u64, count: u64) -> f64 {
    drift * ((timestep as f64).ln() / count as f64).sqrt()
}

/// Upper confidence bound action selection
///
/// Once every action has been tried, picks the action maximizing
/// `value[i] + drift * sqrt(ln(t) / n[i])`, where `t` counts every decision made so far,
/// cold-start decisions included.
#[derive(Debug, Clone)]
pub struct Ucb {
    table: ActionTable,
    values: Vec<f64>,
    drift: f64,
    timestep: u64,
}

impl Ucb {
    /// Initialize the selector over the given action ids
    ///
    /// **Errors** if `drift` is not positive or the action ids are invalid
    pub fn new(action_ids: Vec<String>, config: UcbConfig) -> Result<Self> {
        let UcbConfig { drift } = config;
        ensure_config!(drift > 0.0, "`drift` must be positive, got {drift}");
        let table = ActionTable::new(action_ids)?;
        let values = vec![0.0; table.len()];
        Ok(Self {
            table,
            values,
            drift,
            timestep: 0,
        })
    }

    /// Number of decisions made so far
    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    /// Upper confidence bound of every action at the current timestep
    ///
    /// Meaningful only once every action has been picked.
    pub fn scores(&self) -> Vec<f64> {
        self.values
            .iter()
            .zip(self.table.counts())
            .map(|(&v, &n)| v + bonus(self.drift, self.timestep, n))
            .collect()
    }
}

impl ActionSelector for Ucb {
    fn choose(&mut self, _state: &State) -> Choice {
        self.timestep += 1;
        if let Some(action) = self.table.pick_unchosen() {
            log::trace!("cold start: trying action {action}");
            return Choice::blind(action);
        }
        Choice::blind(argmax(&self.scores()).unwrap_or(0))
    }

    fn table(&self) -> &ActionTable {
        &self.table
    }

    fn table_mut(&mut self) -> &mut ActionTable {
        &mut self.table
    }

    fn estimates(&self) -> Estimates {
        Estimates::Values(self.values.clone())
    }
}

impl BanditSelector for Ucb {
    fn values(&self) -> &[f64] {
        &self.values
    }

    fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }
}
