use std::collections::HashSet;

use crate::{
    ensure_config,
    env::Environment,
    error::{Error, Result},
    state::State,
};

mod epsilon_greedy;
mod ucb;

pub use epsilon_greedy::{EpsilonGreedy, EpsilonGreedyConfig};
pub use ucb::{Ucb, UcbConfig};

/// Id reported for the implicit do-nothing action at index 0
pub const NO_OP: &str = "none";

/// The outcome of an action selector's decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Choice {
    /// Index of the chosen action, `0` being the no-op
    pub action: usize,
    /// Estimated value of the chosen action, when the strategy produces one
    pub value: Option<f64>,
}

impl Choice {
    pub fn new(action: usize, value: Option<f64>) -> Self {
        Self { action, value }
    }

    /// A choice made without comparing estimates
    pub fn blind(action: usize) -> Self {
        Self::new(action, None)
    }
}

/// Learned estimates owned by a selector, cloned out for inspection
#[derive(Debug, Clone, PartialEq)]
pub enum Estimates {
    /// One scalar value per action
    Values(Vec<f64>),
    /// One weight row per action, each as long as the feature vector
    Weights(Vec<Vec<f64>>),
}

/// Named actions and how often each has been picked
///
/// Shared bookkeeping for every selector: it owns the pick counts and implements the
/// cold-start rule, under which any action that has never been picked is chosen before
/// estimates are compared.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionTable {
    ids: Vec<String>,
    counts: Vec<u64>,
}

impl ActionTable {
    /// Build a table from the ids of the available actions
    ///
    /// The no-op is inserted at index 0, so the table holds `action_ids.len() + 1` actions.
    pub fn new(action_ids: Vec<String>) -> Result<Self> {
        ensure_config!(!action_ids.is_empty(), "at least one action id is required");
        let mut seen = HashSet::new();
        for id in &action_ids {
            ensure_config!(!id.is_empty(), "action ids must not be empty");
            ensure_config!(id != NO_OP, "`{NO_OP}` is reserved for the no-op action");
            ensure_config!(seen.insert(id.as_str()), "duplicate action id `{id}`");
        }

        let mut ids = Vec::with_capacity(action_ids.len() + 1);
        ids.push(String::from(NO_OP));
        ids.extend(action_ids);
        let counts = vec![0; ids.len()];
        Ok(Self { ids, counts })
    }

    /// Number of actions, no-op included
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn id(&self, action: usize) -> Option<&str> {
        self.ids.get(action).map(String::as_str)
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn count(&self, action: usize) -> u64 {
        self.counts.get(action).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Each action's share of all picks so far, or all zeros before the first pick
    pub fn distribution(&self) -> Vec<f64> {
        let total = self.total();
        if total == 0 {
            return vec![0.0; self.len()];
        }
        self.counts
            .iter()
            .map(|&n| n as f64 / total as f64)
            .collect()
    }

    /// The lowest-indexed action that has never been picked
    pub fn pick_unchosen(&self) -> Option<usize> {
        self.counts.iter().position(|&n| n == 0)
    }

    /// Record a pick of `action`, then perform it through the environment
    ///
    /// The pick is recorded even when the environment fails to perform the action. The
    /// no-op never touches the environment.
    ///
    /// **Errors** with [`Error::Configuration`] if `action` is out of range, in which case
    /// nothing is recorded.
    pub fn take<E: Environment + ?Sized>(&mut self, env: &mut E, action: usize) -> Result<()> {
        let Some(count) = self.counts.get_mut(action) else {
            return Err(Error::config(format!(
                "action index {action} is out of range for {} actions",
                self.ids.len()
            )));
        };
        *count += 1;
        match action {
            0 => Ok(()),
            i => env.apply_action(&self.ids[i]),
        }
    }

    /// Undo one recorded pick of `action`
    pub(crate) fn retract(&mut self, action: usize) {
        if let Some(count) = self.counts.get_mut(action) {
            *count = count.saturating_sub(1);
        }
    }
}

/// A strategy that maps the current state to one of a fixed set of discrete actions
///
/// Deciding and acting are separate steps: [`choose`](Self::choose) only decides, and
/// [`take_action`](Self::take_action) performs the action and counts the pick.
pub trait ActionSelector: Send {
    /// Decide on an action for the current state
    ///
    /// Must never return an index outside `0..self.table().len()`.
    fn choose(&mut self, state: &State) -> Choice;

    /// Actions and pick counts
    fn table(&self) -> &ActionTable;

    fn table_mut(&mut self) -> &mut ActionTable;

    /// Copy of the selector's learned estimates
    fn estimates(&self) -> Estimates;

    /// Count a pick of `action` and perform it through the environment
    fn take_action<E: Environment + ?Sized>(&mut self, env: &mut E, action: usize) -> Result<()>
    where
        Self: Sized,
    {
        self.table_mut().take(env, action)
    }
}

/// A selector that keeps one scalar value estimate per action, independent of state
pub trait BanditSelector: ActionSelector {
    fn values(&self) -> &[f64];

    fn values_mut(&mut self) -> &mut [f64];
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::env::tests::MockEnv;

    pub fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    /// Drive a selector through `n` choose/take steps without an environment reacting
    pub fn run_cold_start<S: ActionSelector>(selector: &mut S, state: &State, n: usize) -> Vec<Choice> {
        let mut env = MockEnv::new(&[]);
        (0..n)
            .map(|_| {
                let choice = selector.choose(state);
                selector.take_action(&mut env, choice.action).unwrap();
                choice
            })
            .collect()
    }

    #[test]
    fn table_inserts_no_op() {
        let table = ActionTable::new(ids(&["make", "buy"])).unwrap();
        assert_eq!(table.ids(), ["none", "make", "buy"]);
        assert_eq!(table.counts(), [0, 0, 0]);
        assert_eq!(table.pick_unchosen(), Some(0));
        assert_eq!(table.distribution(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn table_rejects_bad_ids() {
        assert!(ActionTable::new(vec![]).is_err());
        assert!(ActionTable::new(ids(&["make", "make"])).is_err());
        assert!(ActionTable::new(ids(&["none"])).is_err());
        assert!(ActionTable::new(ids(&[""])).is_err());
    }

    #[test]
    fn take_counts_and_applies() {
        let mut env = MockEnv::new(&[("make", 1.0)]);
        let mut table = ActionTable::new(ids(&["make"])).unwrap();

        table.take(&mut env, 0).unwrap();
        table.take(&mut env, 1).unwrap();
        table.take(&mut env, 1).unwrap();
        assert_eq!(table.counts(), [1, 2]);
        assert_eq!(env.returns, 2.0, "No-op does not reach the environment");
        assert_eq!(table.pick_unchosen(), None);

        let dist = table.distribution();
        assert!((dist[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((dist[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn failed_apply_still_counts() {
        let mut env = MockEnv::new(&[]);
        env.broken_actions.push("make".into());
        let mut table = ActionTable::new(ids(&["make"])).unwrap();

        let res = table.take(&mut env, 1);
        assert!(matches!(res, Err(Error::ActionApplicationFailed { .. })));
        assert_eq!(table.count(1), 1);
    }

    #[test]
    fn out_of_range_take_is_rejected() {
        let mut env = MockEnv::new(&[]);
        let mut table = ActionTable::new(ids(&["make"])).unwrap();
        assert!(matches!(table.take(&mut env, 2), Err(Error::Configuration { .. })));
        assert_eq!(table.total(), 0);
    }

    #[test]
    fn retract_undoes_a_pick() {
        let mut env = MockEnv::new(&[]);
        let mut table = ActionTable::new(ids(&["make"])).unwrap();
        table.take(&mut env, 1).unwrap();
        table.retract(1);
        table.retract(1);
        assert_eq!(table.counts(), [0, 0]);
    }
}
