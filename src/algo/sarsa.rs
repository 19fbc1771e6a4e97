use crate::{
    ensure_config, ensure_interval,
    error::Result,
    exploration::{ActionSelector, ActionTable, Choice, Estimates},
    state::State,
    util::{argmax, dot},
};

use super::{CycleRecord, UpdateRule};

/// Configuration for the [`LinearSarsa`] selector
#[derive(Debug, Clone)]
pub struct LinearSarsaConfig {
    /// Coefficient of the optimistic exploration bonus `ln(step) / n`
    ///
    /// **Default**: `0.1`
    pub drift: f64,
}

impl Default for LinearSarsaConfig {
    fn default() -> Self {
        Self { drift: 0.1 }
    }
}

/// Action selection over a linear action-value function
///
/// Keeps one weight row per action, so that q(s, a) = w<sub>a</sub> · s. Once every action has
/// been tried, picks the action maximizing `q(s, a) + drift * ln(step) / n[a]` and reports that
/// score as the estimate of the chosen action.
#[derive(Debug, Clone)]
pub struct LinearSarsa {
    table: ActionTable,
    weights: Vec<Vec<f64>>,
    drift: f64,
    step: u64,
}

impl LinearSarsa {
    /// Initialize the selector for feature vectors of length `features`
    ///
    /// **Errors** if `drift` is not positive, `features` is zero, or the action ids are invalid
    pub fn new(action_ids: Vec<String>, features: usize, config: LinearSarsaConfig) -> Result<Self> {
        let LinearSarsaConfig { drift } = config;
        ensure_config!(drift > 0.0, "`drift` must be positive, got {drift}");
        ensure_config!(features > 0, "feature vector must not be empty");
        let table = ActionTable::new(action_ids)?;
        let weights = vec![vec![0.0; features]; table.len()];
        Ok(Self {
            table,
            weights,
            drift,
            step: 0,
        })
    }

    /// Estimated value of taking `action` in `state`
    pub fn value(&self, state: &State, action: usize) -> f64 {
        self.weights
            .get(action)
            .map_or(0.0, |w| dot(w, state.as_slice()))
    }

    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    /// Number of decisions made so far
    pub fn step(&self) -> u64 {
        self.step
    }

    fn score(&self, state: &State, action: usize) -> f64 {
        let n = self.table.count(action) as f64;
        self.value(state, action) + self.drift * (self.step as f64).ln() / n
    }
}

impl ActionSelector for LinearSarsa {
    fn choose(&mut self, state: &State) -> Choice {
        self.step += 1;
        if let Some(action) = self.table.pick_unchosen() {
            log::trace!("cold start: trying action {action}");
            return Choice::blind(action);
        }

        let scores = (0..self.table.len())
            .map(|a| self.score(state, a))
            .collect::<Vec<_>>();
        let action = argmax(&scores).unwrap_or(0);
        Choice::new(action, scores.get(action).copied())
    }

    fn table(&self) -> &ActionTable {
        &self.table
    }

    fn table_mut(&mut self) -> &mut ActionTable {
        &mut self.table
    }

    fn estimates(&self) -> Estimates {
        Estimates::Weights(self.weights.clone())
    }
}

/// One-step semi-gradient SARSA update for a [`LinearSarsa`] selector
///
/// w<sub>a</sub> ← w<sub>a</sub> + α (R + γ q(s′, a′) - q(s, a)) s
///
/// The gradient of q(s, a) with respect to w<sub>a</sub> is the feature vector `s`, and is zero
/// for every other row, so only the weights of the action taken change. q(s′, a′) is the
/// estimate reported with the next choice, or the plain value function when none was reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemiGradientSarsa {
    stepsize: f64,
    gamma: f64,
}

impl Default for SemiGradientSarsa {
    fn default() -> Self {
        Self {
            stepsize: 0.1,
            gamma: 0.5,
        }
    }
}

impl SemiGradientSarsa {
    /// ### Parameters
    /// - `stepsize` - The learning rate α - must be in `(0,1]`
    /// - `gamma` - The discount factor γ - must be in `[0,1)`
    pub fn new(stepsize: f64, gamma: f64) -> Result<Self> {
        ensure_interval!(stepsize, 0.0, 1.0);
        ensure_config!(stepsize > 0.0, "`stepsize` must be positive");
        ensure_config!(
            (0.0..1.0).contains(&gamma),
            "invalid value for `gamma` ({gamma}): must be in the interval [0, 1)"
        );
        Ok(Self { stepsize, gamma })
    }

    pub fn stepsize(&self) -> f64 {
        self.stepsize
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl UpdateRule<LinearSarsa> for SemiGradientSarsa {
    fn update(&self, selector: &mut LinearSarsa, record: &CycleRecord<'_>) {
        let CycleRecord {
            state,
            action,
            reward,
            next_state,
            next,
            ..
        } = *record;

        let expected = selector.value(state, action);
        let expected_future = next
            .value
            .unwrap_or_else(|| selector.value(next_state, next.action));
        let delta = self.stepsize * (reward + self.gamma * expected_future - expected);

        if let Some(row) = selector.weights.get_mut(action) {
            for (w, x) in row.iter_mut().zip(state.as_slice()) {
                *w += delta * x;
            }
        }
    }
}
