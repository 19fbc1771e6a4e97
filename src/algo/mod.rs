use crate::{
    exploration::{ActionSelector, Choice},
    state::State,
};

mod bandit;
mod sarsa;

pub use bandit::SampleAverage;
pub use sarsa::{LinearSarsa, LinearSarsaConfig, SemiGradientSarsa};

/// Everything observed during one decide/act/observe cycle
#[derive(Debug, Clone, Copy)]
pub struct CycleRecord<'a> {
    /// The state in which the action was chosen
    pub state: &'a State,
    /// The action taken
    pub action: usize,
    /// The estimate reported when the action was chosen, if any
    ///
    /// Carried for diagnostics; the update rules recompute the estimates they need.
    pub value: Option<f64>,
    /// Return after the action minus return before it
    pub reward: f64,
    /// The state observed after the action
    pub next_state: &'a State,
    /// The action chosen for the next cycle, with its estimate if any
    pub next: Choice,
}

/// Rule adjusting a selector's estimates after a completed cycle
///
/// Only the statistics of `record.action` may change; the upcoming action is never touched.
pub trait UpdateRule<S: ActionSelector>: Send {
    fn update(&self, selector: &mut S, record: &CycleRecord<'_>);
}
