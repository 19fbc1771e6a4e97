use thiserror::Error;

/// Errors produced while configuring or running a learner
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// An invalid parameter was supplied at construction time
    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    /// A feature or the return could not be read from the environment
    #[error("environment unavailable while reading `{what}`: {message}")]
    EnvironmentUnavailable { what: String, message: String },

    /// An action could not be performed in the environment
    #[error("failed to apply action `{action}`: {message}")]
    ActionApplicationFailed { action: String, message: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn unavailable(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EnvironmentUnavailable {
            what: what.into(),
            message: message.into(),
        }
    }

    pub fn action_failed(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ActionApplicationFailed {
            action: action.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let e = Error::unavailable("clips", "element not found");
        assert_eq!(
            e.to_string(),
            "environment unavailable while reading `clips`: element not found"
        );
    }
}
