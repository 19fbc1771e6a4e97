use std::collections::HashSet;

use crate::{
    ensure_config,
    env::Environment,
    error::{Error, Result},
};

/// Name reported for the bias slot
pub const BIAS: &str = "bias";

/// How raw readings are mapped before being stored in the feature vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transform {
    /// Store the raw reading
    Identity,
    /// Store `log10(x)`, or `0` for a non-positive reading
    #[default]
    Log10,
}

impl Transform {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Identity => x,
            Self::Log10 if x > 0.0 => x.log10(),
            Self::Log10 => 0.0,
        }
    }
}

/// Configuration for a [`FeatureVector`]
#[derive(Debug, Clone)]
pub struct StateConfig {
    /// Names of the features to track, in order
    ///
    /// **Default**: empty
    pub features: Vec<String>,
    /// Name of the feature whose differences are used as reward
    ///
    /// **Default**: `"clips"`
    pub return_feature: String,
    /// Transform applied to every feature reading (not to the raw return)
    ///
    /// **Default**: [`Transform::Log10`]
    pub transform: Transform,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            features: Vec::new(),
            return_feature: String::from("clips"),
            transform: Transform::Log10,
        }
    }
}

/// A fixed-size numeric snapshot of the environment
///
/// Slot 0 is a bias term that always holds `1.0`. The remaining slots hold the
/// configured features followed by the return feature (unless it was already named).
/// The length never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Vec<String>,
    vector: Vec<f64>,
    returns: f64,
    transform: Transform,
}

/// The agent's view of the environment is its feature vector
pub type State = FeatureVector;

impl FeatureVector {
    /// Build a feature vector from a configuration without reading the environment
    ///
    /// All slots except the bias start at `0`.
    pub fn new(config: StateConfig) -> Result<Self> {
        let StateConfig {
            mut features,
            return_feature,
            transform,
        } = config;

        ensure_config!(!return_feature.is_empty(), "return feature name is empty");
        let mut seen = HashSet::new();
        for name in &features {
            ensure_config!(!name.is_empty(), "feature names must not be empty");
            ensure_config!(name != BIAS, "`{BIAS}` is reserved for the bias slot");
            ensure_config!(seen.insert(name.as_str()), "duplicate feature `{name}`");
        }
        if !features.contains(&return_feature) {
            features.push(return_feature);
        }

        let mut names = Vec::with_capacity(features.len() + 1);
        names.push(String::from(BIAS));
        names.extend(features);

        let mut vector = vec![0.0; names.len()];
        vector[0] = 1.0;

        Ok(Self {
            names,
            vector,
            returns: 0.0,
            transform,
        })
    }

    /// Build a feature vector and fill it from the environment
    pub fn observe<E: Environment + ?Sized>(config: StateConfig, env: &mut E) -> Result<Self> {
        let mut state = Self::new(config)?;
        state.refresh(env)?;
        Ok(state)
    }

    /// Re-read the return and every feature in place
    ///
    /// On failure the previous contents are left untouched.
    pub fn refresh<E: Environment + ?Sized>(&mut self, env: &mut E) -> Result<()> {
        let returns = env.read_return()?;
        let raw = env.read_features(&self.names[1..])?;
        if raw.len() != self.vector.len() - 1 {
            return Err(Error::unavailable(
                "features",
                format!("expected {} readings, got {}", self.vector.len() - 1, raw.len()),
            ));
        }

        self.returns = returns;
        for (slot, x) in self.vector[1..].iter_mut().zip(raw) {
            *slot = self.transform.apply(x);
        }
        Ok(())
    }

    /// Feature names, starting with the bias
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Transformed feature values, starting with the bias
    pub fn as_slice(&self) -> &[f64] {
        &self.vector
    }

    /// Last observed raw return
    pub fn returns(&self) -> f64 {
        self.returns
    }

    pub fn len(&self) -> usize {
        self.vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    /// Build a state directly from transformed values, bias included
    #[cfg(test)]
    pub(crate) fn from_values(vector: Vec<f64>, returns: f64) -> Self {
        Self {
            names: (0..vector.len()).map(|i| format!("f{i}")).collect(),
            vector,
            returns,
            transform: Transform::Identity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::tests::MockEnv;

    fn config(features: &[&str]) -> StateConfig {
        StateConfig {
            features: features.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn log10_transform() {
        assert_eq!(Transform::Log10.apply(1000.0), 3.0);
        assert_eq!(Transform::Log10.apply(0.0), 0.0);
        assert_eq!(Transform::Log10.apply(-5.0), 0.0);
        assert_eq!(Transform::Identity.apply(-5.0), -5.0);
    }

    #[test]
    fn layout_has_bias_and_return_slots() {
        let state = FeatureVector::new(config(&["funds", "wire"])).unwrap();
        assert_eq!(state.names(), ["bias", "funds", "wire", "clips"]);
        assert_eq!(state.as_slice(), [1.0, 0.0, 0.0, 0.0]);

        let state = FeatureVector::new(config(&["clips", "funds"])).unwrap();
        assert_eq!(state.len(), 3, "Return feature is not duplicated");
    }

    #[test]
    fn invalid_configs_rejected() {
        assert!(FeatureVector::new(config(&["funds", "funds"])).is_err());
        assert!(FeatureVector::new(config(&["bias"])).is_err());
        assert!(FeatureVector::new(config(&[""])).is_err());
        let empty_return = StateConfig {
            return_feature: String::new(),
            ..Default::default()
        };
        assert!(FeatureVector::new(empty_return).is_err());
    }

    #[test]
    fn refresh_reads_and_transforms() {
        let mut env = MockEnv::new(&[])
            .with_feature("funds", 100.0)
            .with_feature("wire", 0.0)
            .with_feature("clips", 10.0);
        env.returns = 10.0;

        let state = FeatureVector::observe(config(&["funds", "wire"]), &mut env).unwrap();
        assert_eq!(state.as_slice(), [1.0, 2.0, 0.0, 1.0]);
        assert_eq!(state.returns(), 10.0);
    }

    #[test]
    fn failed_refresh_keeps_previous_values() {
        let mut env = MockEnv::new(&[])
            .with_feature("funds", 10.0)
            .with_feature("clips", 1.0);
        let mut state = FeatureVector::observe(config(&["funds"]), &mut env).unwrap();
        let before = state.clone();

        env.features.remove("funds");
        env.returns = 50.0;
        assert!(state.refresh(&mut env).is_err());
        assert_eq!(state, before);
    }
}
