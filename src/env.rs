use crate::error::Result;

/// An external, slowly-changing environment the agent observes and acts upon
///
/// Implementors are adapters over something the agent cannot see directly, such as a
/// browser page exposing numeric readouts and clickable elements. Any call may be slow,
/// and reads may fail transiently.
///
/// Reads fail with [`Error::EnvironmentUnavailable`](crate::error::Error::EnvironmentUnavailable)
/// when the underlying source cannot currently be read. Applying an action fails with
/// [`Error::ActionApplicationFailed`](crate::error::Error::ActionApplicationFailed). The learning
/// loop recovers from any error raised while applying an action.
pub trait Environment: Send {
    /// Read the current raw value of a named feature
    fn read_feature(&mut self, name: &str) -> Result<f64>;

    /// Read the accumulated return, the quantity whose differences are used as reward
    fn read_return(&mut self) -> Result<f64>;

    /// Perform the action with the given id
    fn apply_action(&mut self, action_id: &str) -> Result<()>;

    /// Read several named features in order
    ///
    /// Stops at the first failed read.
    fn read_features(&mut self, names: &[String]) -> Result<Vec<f64>> {
        names.iter().map(|name| self.read_feature(name)).collect()
    }
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn read_feature(&mut self, name: &str) -> Result<f64> {
        (**self).read_feature(name)
    }

    fn read_return(&mut self) -> Result<f64> {
        (**self).read_return()
    }

    fn apply_action(&mut self, action_id: &str) -> Result<()> {
        (**self).apply_action(action_id)
    }
}
