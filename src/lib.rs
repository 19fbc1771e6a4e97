/// Value-update rules and the linear SARSA selector
pub mod algo;

/// Environment
pub mod env;

/// Error types
pub mod error;

/// Action selection strategies
pub mod exploration;

/// Background learning loop
pub mod learner;

/// Feature vectors observed from the environment
pub mod state;

/// Simulated environments
#[cfg(feature = "gym")]
pub mod gym;

mod util;

pub use error::{Error, Result};
pub use learner::{BanditLearner, Learner, RunConfig, RunReport, SarsaLearner, Snapshot};
