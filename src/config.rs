use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{PredictorError, Result};
use crate::model::neural_net::{ActivationFunction, InitMethod};
use crate::model::optimizer::OptimizerKind;

/// Training hyperparameters.
///
/// Every field has a default, so a TOML file only needs to list the values it
/// changes:
///
/// ```toml
/// network_structure = [8, 12, 8, 1]
/// num_epochs = 150
/// optimizer = "adam"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    /// Layer sizes, input first. Derived from the dataset width when absent
    pub network_structure: Option<Vec<usize>>,
    /// Epoch count when early stopping is off
    pub num_epochs: usize,
    /// Train until the epoch loss settles instead of for `num_epochs`
    pub early_stopping: bool,
    /// Upper bound on epochs under early stopping
    pub max_epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub activation_function: ActivationFunction,
    pub initialization: InitMethod,
    pub optimizer: OptimizerKind,
    /// Early stopping tolerance on the change of the epoch loss
    pub epsilon: f64,
    pub seed: u64,
    pub standardize: bool,
    /// Probability above which a row is labelled 1
    pub threshold: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            network_structure: None,
            num_epochs: 150,
            early_stopping: false,
            max_epochs: 5000,
            batch_size: 10,
            learning_rate: 0.001,
            activation_function: ActivationFunction::ReLU,
            initialization: InitMethod::Xavier,
            optimizer: OptimizerKind::Adam,
            epsilon: 0.0001,
            seed: 42,
            standardize: true,
            threshold: 0.5,
        }
    }
}

impl TrainConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(&path)?;
        let config = Self::from_toml(&contents)?;

        tracing::debug!("Loaded training config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: TrainConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PredictorError::config("batch_size must be at least 1"));
        }
        if !(self.learning_rate > 0f64 && self.learning_rate.is_finite()) {
            return Err(PredictorError::config("learning_rate must be a positive number"));
        }
        if !(0f64..=1f64).contains(&self.threshold) {
            return Err(PredictorError::config("threshold must be between 0 and 1"));
        }
        if self.early_stopping && self.max_epochs == 0 {
            return Err(PredictorError::config(
                "max_epochs must be at least 1 when early stopping is used",
            ));
        }
        if let Some(structure) = &self.network_structure {
            validate_structure(structure)?;
        }

        Ok(())
    }
}

/// A binary classifier needs an input layer, at least one weight layer and a
/// single output unit
pub fn validate_structure(structure: &[usize]) -> Result<()> {
    if structure.len() < 2 {
        return Err(PredictorError::config(
            "network structure needs at least an input and an output layer",
        ));
    }
    if structure.contains(&0) {
        return Err(PredictorError::config("layer sizes must be non-zero"));
    }
    if structure.last() != Some(&1) {
        return Err(PredictorError::config(
            "the output layer of a binary classifier must have exactly 1 unit",
        ));
    }

    Ok(())
}
