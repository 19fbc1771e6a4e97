use crate::exploration::BanditSelector;

use super::{CycleRecord, UpdateRule};

/// Sample-average estimate update for bandit selectors
///
/// Q<sub>n+1</sub> = Q<sub>n</sub> + (R<sub>n</sub> - Q<sub>n</sub>) / n
///
/// where n is the number of times the action has been picked. The estimate is the running mean
/// of the rewards observed for the action, which assumes the reward distribution does not
/// depend on state.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleAverage;

impl<S: BanditSelector> UpdateRule<S> for SampleAverage {
    fn update(&self, selector: &mut S, record: &CycleRecord<'_>) {
        let CycleRecord { action, reward, .. } = *record;
        let n = selector.table().count(action);
        let Some(value) = selector.values_mut().get_mut(action) else {
            return;
        };
        if n <= 1 {
            *value = reward;
        } else {
            *value += (reward - *value) / n as f64;
        }
    }
}
