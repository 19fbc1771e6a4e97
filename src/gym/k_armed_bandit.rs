use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::{
    ensure_config,
    env::Environment,
    error::{Error, Result},
};

/// K-armed bandit environment
///
/// A simple environment with K arms, each of which has a normal distribution of rewards.
/// Pulling an arm adds its sampled reward to the return, so the reward of a cycle is exactly
/// the sample drawn. Features are `total`, the return itself, and `pulls`, the number of arms
/// pulled so far.
///
/// Arms are addressed by the ids `arm0`, `arm1`, ... as listed by [`action_ids`](Self::action_ids).
#[derive(Debug, Clone)]
pub struct KArmedBandit {
    arms: Vec<Normal<f64>>,
    total: f64,
    pulls: u64,
    rng: StdRng,
}

impl KArmedBandit {
    /// Initialize a new K-armed bandit with arm means drawn from a standard normal distribution
    pub fn new(k: usize, seed: u64) -> Result<Self> {
        ensure_config!(k > 0, "a bandit needs at least one arm");
        let mut rng = StdRng::seed_from_u64(seed);
        let dist = Normal::new(0.0, 1.0).map_err(|e| Error::config(e.to_string()))?;
        let means = (0..k).map(|_| dist.sample(&mut rng)).collect::<Vec<_>>();
        Self::with_means(&means, 1.0, seed)
    }

    /// Initialize a bandit with fixed arm means and a shared standard deviation
    pub fn with_means(means: &[f64], std_dev: f64, seed: u64) -> Result<Self> {
        ensure_config!(!means.is_empty(), "a bandit needs at least one arm");
        let arms = means
            .iter()
            .map(|&mean| Normal::new(mean, std_dev).map_err(|e| Error::config(e.to_string())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            arms,
            total: 0.0,
            pulls: 0,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn action_ids(&self) -> Vec<String> {
        (0..self.arms.len()).map(|i| format!("arm{i}")).collect()
    }

    pub fn means(&self) -> Vec<f64> {
        self.arms.iter().map(Normal::mean).collect()
    }

    fn arm(&self, action_id: &str) -> Option<usize> {
        action_id
            .strip_prefix("arm")
            .and_then(|i| i.parse::<usize>().ok())
            .filter(|&i| i < self.arms.len())
    }
}

impl Environment for KArmedBandit {
    fn read_feature(&mut self, name: &str) -> Result<f64> {
        match name {
            "total" => Ok(self.total),
            "pulls" => Ok(self.pulls as f64),
            _ => Err(Error::unavailable(name, "no such readout")),
        }
    }

    fn read_return(&mut self) -> Result<f64> {
        Ok(self.total)
    }

    fn apply_action(&mut self, action_id: &str) -> Result<()> {
        let Some(arm) = self.arm(action_id) else {
            return Err(Error::action_failed(action_id, "no such arm"));
        };
        self.total += self.arms[arm].sample(&mut self.rng);
        self.pulls += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn k_armed_bandit_functional() {
        let mut env = KArmedBandit::new(3, 7).unwrap();
        assert_eq!(env.action_ids(), ["arm0", "arm1", "arm2"], "Actions are correct");
        assert_eq!(env.means().len(), 3);

        env.apply_action("arm1").unwrap();
        let total = env.read_return().unwrap();
        assert!(total.is_finite(), "Reward is finite");
        assert_eq!(env.read_feature("pulls"), Ok(1.0));

        assert!(env.apply_action("arm3").is_err());
        assert!(env.read_feature("clips").is_err());
        assert!(KArmedBandit::new(0, 7).is_err());
    }

    #[test]
    fn deterministic_arms() {
        let mut env = KArmedBandit::with_means(&[0.0, 5.0], 0.0, 1).unwrap();
        env.apply_action("arm1").unwrap();
        env.apply_action("arm1").unwrap();
        assert_eq!(env.read_return(), Ok(10.0));
    }

    #[test]
    fn ucb_learner_finds_best_arm() {
        use std::time::Duration;

        use crate::{
            algo::SampleAverage,
            exploration::{Estimates, Ucb, UcbConfig},
            state::StateConfig,
            BanditLearner, RunConfig,
        };

        let env = KArmedBandit::with_means(&[0.0, 1.0, 3.0], 0.0, 1).unwrap();
        let selector = Ucb::new(env.action_ids(), UcbConfig::default()).unwrap();
        let state = StateConfig {
            features: vec!["pulls".into()],
            return_feature: "total".into(),
            ..Default::default()
        };
        let mut learner = BanditLearner::new(env, state, selector, SampleAverage).unwrap();
        learner
            .start(RunConfig {
                iterations: Some(50),
                interval: Duration::from_millis(1),
            })
            .unwrap();
        learner.wait().unwrap();

        let snap = learner.snapshot();
        assert_eq!(snap.action_ids, ["none", "arm0", "arm1", "arm2"]);
        assert_eq!(snap.estimates, Estimates::Values(vec![0.0, 0.0, 1.0, 3.0]));
        let most = snap.counts.iter().max().copied();
        assert_eq!(Some(snap.counts[3]), most);
    }
}
