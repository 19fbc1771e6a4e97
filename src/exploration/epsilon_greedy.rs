use rand::{thread_rng, Rng};

use crate::{ensure_interval, error::Result, state::State, util::argmax};

use super::{ActionSelector, ActionTable, BanditSelector, Choice, Estimates};

/// Configuration for the [`EpsilonGreedy`] selector
#[derive(Debug, Clone)]
pub struct EpsilonGreedyConfig {
    /// Probability of picking a uniformly random action instead of the best known one
    ///
    /// **Default**: `0.1`
    pub epsilon: f64,
}

impl Default for EpsilonGreedyConfig {
    fn default() -> Self {
        Self { epsilon: 0.1 }
    }
}

/// Epsilon greedy action selection over state-independent value estimates
///
/// Once every action has been tried, draws `u` uniformly from `[0,1)` and picks a uniformly
/// random action if `u < epsilon`, otherwise the action with the highest estimate (ties go to
/// the lowest index).
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    table: ActionTable,
    values: Vec<f64>,
    epsilon: f64,
}

impl EpsilonGreedy {
    /// Initialize the selector over the given action ids
    ///
    /// **Errors** if `epsilon` is not in the interval `[0,1]` or the action ids are invalid
    pub fn new(action_ids: Vec<String>, config: EpsilonGreedyConfig) -> Result<Self> {
        let EpsilonGreedyConfig { epsilon } = config;
        ensure_interval!(epsilon, 0.0, 1.0);
        let table = ActionTable::new(action_ids)?;
        let values = vec![0.0; table.len()];
        Ok(Self {
            table,
            values,
            epsilon,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl ActionSelector for EpsilonGreedy {
    fn choose(&mut self, _state: &State) -> Choice {
        if let Some(action) = self.table.pick_unchosen() {
            log::trace!("cold start: trying action {action}");
            return Choice::blind(action);
        }

        let mut rng = thread_rng();
        if rng.gen::<f64>() < self.epsilon {
            Choice::blind(rng.gen_range(0..self.table.len()))
        } else {
            Choice::blind(argmax(&self.values).unwrap_or(0))
        }
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

impl BanditSelector for EpsilonGreedy {
    fn values(&self) -> &[f64] {
        &self.values
    }

    fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }
}

#[cfg(test)]
mod tests {
    use statrs::distribution::{ChiSquared, ContinuousCDF};

    use super::*;
    use crate::{
        env::tests::MockEnv,
        exploration::tests::{ids, run_cold_start},
    };

    fn selector(epsilon: f64) -> EpsilonGreedy {
        EpsilonGreedy::new(ids(&["a", "b", "c"]), EpsilonGreedyConfig { epsilon }).unwrap()
    }

    #[test]
    fn epsilon_validated() {
        assert!(EpsilonGreedy::new(ids(&["a"]), EpsilonGreedyConfig { epsilon: -0.1 }).is_err());
        assert!(EpsilonGreedy::new(ids(&["a"]), EpsilonGreedyConfig { epsilon: 1.5 }).is_err());
        assert!(EpsilonGreedy::new(ids(&["a"]), EpsilonGreedyConfig::default()).is_ok());
    }

    #[test]
    fn cold_start_in_ascending_order() {
        let mut eg = selector(1.0);
        let state = State::from_values(vec![1.0], 0.0);
        let choices = run_cold_start(&mut eg, &state, 4);
        assert_eq!(
            choices,
            (0..4).map(Choice::blind).collect::<Vec<_>>(),
            "Every action tried once, lowest index first"
        );
    }

    #[test]
    fn greedy_after_cold_start() {
        let mut eg = selector(0.0);
        let state = State::from_values(vec![1.0], 0.0);
        run_cold_start(&mut eg, &state, 4);
        eg.values_mut().copy_from_slice(&[0.0, 2.0, 5.0, 5.0]);

        let mut env = MockEnv::new(&[]);
        for _ in 0..100 {
            let choice = eg.choose(&state);
            assert_eq!(choice, Choice::blind(2), "Ties resolved by lowest index");
            eg.take_action(&mut env, choice.action).unwrap();
        }
    }

    #[test]
    fn fully_random_is_uniform() {
        const TRIALS: usize = 40_000;
        let mut eg = selector(1.0);
        let state = State::from_values(vec![1.0], 0.0);
        run_cold_start(&mut eg, &state, 4);
        eg.values_mut().copy_from_slice(&[0.0, 0.0, 10.0, 0.0]);

        let mut observed = [0usize; 4];
        for _ in 0..TRIALS {
            observed[eg.choose(&state).action] += 1;
        }

        let expected = TRIALS as f64 / 4.0;
        let chi2: f64 = observed
            .iter()
            .map(|&o| (o as f64 - expected).powi(2) / expected)
            .sum();
        let critical = ChiSquared::new(3.0).unwrap().inverse_cdf(0.9999);
        assert!(
            chi2 < critical,
            "Counts {observed:?} deviate from uniform (chi2 = {chi2}, critical = {critical})"
        );
    }
}
