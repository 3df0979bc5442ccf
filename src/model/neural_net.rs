use crate::config::{validate_structure, TrainConfig};
use crate::error::{PredictorError, Result};
use crate::features::FeatureVector;
use crate::parsing::Dataset;
use ndarray::{Array, Array1, Array2, ArrayView2, Axis};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use clap::ValueEnum;
use serde::Deserialize;

use super::optimizer::{LayerGrad, Optimizer};
use super::scaling::Standardizer;
use super::{Classifier, Model};

// Keeps log() finite in the loss
const PROBABILITY_CLIP: f64 = 1e-7;

/// Represents a feed-forward binary classifier
pub struct NeuralNet {
    pub layers: Vec<LayerGrad>, // Each layer holds a weight matrix and a bias vector
    pub activation_function: ActivationFunction,
    pub scaler: Option<Standardizer>, // Fitted on the training data, applied before every forward pass
    pub config: TrainConfig, // Training hyperparams
    rng: StdRng,
}

#[derive(clap::ValueEnum, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivationFunction {
    #[value(name = "relu")]
    #[serde(rename = "relu")]
    ReLU,
    Sigmoid,
    Tanh,
    Linear,
    #[value(name = "leaky-relu")]
    #[serde(rename = "leaky-relu")]
    LeakyReLU,
}

#[derive(clap::ValueEnum, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InitMethod {
    Default,
    Xavier,
}

impl ActivationFunction {
    /// The name used on the command line, in TOML configs and in model files
    pub fn name(&self) -> String {
        self.to_possible_value()
            .map(|value| value.get_name().to_string())
            .unwrap_or_default()
    }

    pub fn from_name(name: &str) -> Option<ActivationFunction> {
        <ActivationFunction as ValueEnum>::from_str(name, false).ok()
    }
}

impl NeuralNet {
    /// Construct a new neural net according to the specified hyperparams
    pub fn new(layer_structure: &[usize], config: TrainConfig) -> Result<NeuralNet> {
        validate_structure(layer_structure)?;
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let layers = match config.initialization {
            InitMethod::Default => init_layers_default(layer_structure, &mut rng),
            InitMethod::Xavier => init_layers_xavier(layer_structure, &mut rng),
        };

        Ok(NeuralNet {
            layers,
            activation_function: config.activation_function,
            scaler: None,
            config,
            rng,
        })
    }

    /// Rebuild a trained net from its parameters, e.g. after loading from disk
    pub fn from_parts(
        layers: Vec<LayerGrad>,
        activation_function: ActivationFunction,
        scaler: Option<Standardizer>,
        threshold: f64,
    ) -> Result<NeuralNet> {
        let structure = structure_of(&layers);
        validate_structure(&structure)?;

        for (idx, (weights, bias)) in layers.iter().enumerate() {
            if bias.len() != weights.ncols() {
                return Err(PredictorError::model_format(format!(
                    "layer {} has {} outputs but {} biases",
                    idx,
                    weights.ncols(),
                    bias.len()
                )));
            }
        }
        for (idx, pair) in layers.windows(2).enumerate() {
            if pair[0].0.ncols() != pair[1].0.nrows() {
                return Err(PredictorError::model_format(format!(
                    "layer {} has {} outputs but layer {} takes {} inputs",
                    idx,
                    pair[0].0.ncols(),
                    idx + 1,
                    pair[1].0.nrows()
                )));
            }
        }
        if let Some(scaler) = &scaler {
            if scaler.mean.len() != structure[0] || scaler.std.len() != structure[0] {
                return Err(PredictorError::model_format(
                    "scaler width does not match the input layer",
                ));
            }
        }

        let config = TrainConfig {
            activation_function,
            threshold,
            ..TrainConfig::default()
        };
        config.validate()?;

        Ok(NeuralNet {
            layers,
            activation_function,
            scaler,
            rng: StdRng::seed_from_u64(config.seed),
            config,
        })
    }

    /// Layer sizes, input first
    pub fn structure(&self) -> Vec<usize> {
        structure_of(&self.layers)
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |(weights, _)| weights.nrows())
    }

    fn scale(&self, inputs: &ArrayView2<f64>) -> Array2<f64> {
        match &self.scaler {
            Some(scaler) => scaler.transform(inputs),
            None => inputs.to_owned(),
        }
    }

    // Perform a forward pass of the network on some (already scaled) input.
    // Returns the outputs of every layer, and the non-activated outputs of the layers (used for backprop)
    fn forward(&self, inputs: &ArrayView2<f64>) -> (Vec<Array2<f64>>, Vec<Array2<f64>>) {
        // The first layer is a passthrough layer, so it outputs whatever its input is
        let mut hidden = vec![inputs.to_owned()];
        let mut hidden_linear = Vec::with_capacity(self.layers.len());
        let last = self.layers.len() - 1;

        for (idx, (weights, bias)) in self.layers.iter().enumerate() {
            // The output of the layer without applying the activation function
            let lin_output = hidden[idx].dot(weights) + bias;
            // Hidden layers apply the activation function. The output layer stays linear,
            // its logits go through the sigmoid in the loss and in predict
            let real_output = if idx < last {
                lin_output.mapv(|x| activation(self.activation_function, x))
            } else {
                lin_output.clone()
            };

            hidden.push(real_output);
            hidden_linear.push(lin_output);
        }

        (hidden, hidden_linear)
    }

    /// Calculate the gradients of every layer using backprop.
    /// `grad` is the gradient of the loss WRT the output logits
    fn backward(
        &self,
        hidden: &[Array2<f64>],
        hidden_linear: &[Array2<f64>],
        grad: Array2<f64>,
    ) -> Vec<LayerGrad> {
        let mut grads = Vec::with_capacity(self.layers.len());
        // The gradient WRT the linear output of the current layer
        let mut grad_help = grad;

        for idx in (0..self.layers.len()).rev() {
            // If we aren't at the last layer, we need to go through the activation function
            if idx != self.layers.len() - 1 {
                let step_mat =
                    hidden_linear[idx].mapv(|x| delta_activation(self.activation_function, x));
                grad_help = grad_help * step_mat;
            }

            let weight_grad = hidden[idx].t().dot(&grad_help);
            let bias_grad = grad_help.sum_axis(Axis(0));
            let upstream = grad_help.dot(&self.layers[idx].0.t());

            grads.push((weight_grad, bias_grad));
            grad_help = upstream;
        }

        grads.reverse();
        grads
    }

    /// Mean loss and gradients for one batch of scaled inputs
    fn loss_and_gradients(
        &self,
        inputs: &ArrayView2<f64>,
        target: &ArrayView2<f64>,
    ) -> (f64, Vec<LayerGrad>) {
        let (hidden, hidden_linear) = self.forward(inputs);
        let logits = &hidden[hidden.len() - 1];
        let probabilities = logits.mapv(sigmoid);
        let loss = binary_cross_entropy(&probabilities, target);

        // Gradient of the mean BCE WRT the logits
        let grad = (probabilities - target) / inputs.nrows() as f64;

        (loss, self.backward(&hidden, &hidden_linear, grad))
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if width != self.input_size() {
            return Err(PredictorError::ValidationError {
                field: "dataset".to_string(),
                value: width.to_string(),
                reason: format!("the network expects {} features", self.input_size()),
            });
        }

        Ok(())
    }

    fn run_epoch(&mut self, data: &Array2<f64>, target: &Array2<f64>, optimizer: &mut Optimizer) {
        let mut order: Vec<usize> = (0..data.nrows()).collect();
        order.shuffle(&mut self.rng);

        let data = data.select(Axis(0), &order);
        let target = target.select(Axis(0), &order);

        for (input_batch, target_batch) in data
            .axis_chunks_iter(Axis(0), self.config.batch_size)
            .zip(target.axis_chunks_iter(Axis(0), self.config.batch_size))
        {
            let (_, grads) = self.loss_and_gradients(&input_batch, &target_batch);
            optimizer.step(&mut self.layers, &grads);
        }
    }
}

impl Model for NeuralNet {
    /// Fit the model to the dataset
    /// Return the training loss after each epoch (used for plotting)
    fn fit(&mut self, dataset: &Dataset) -> Result<Vec<(usize, f64)>> {
        self.check_width(dataset.num_features())?;
        if dataset.is_empty() {
            return Err(PredictorError::config("cannot train on an empty dataset"));
        }

        self.scaler = if self.config.standardize {
            Some(Standardizer::fit(&dataset.data.view())?)
        } else {
            None
        };
        let data = self.scale(&dataset.data.view());

        let mut optimizer = Optimizer::new(self.config.optimizer, self.config.learning_rate, &self.layers);
        let epochs = if self.config.early_stopping {
            self.config.max_epochs
        } else {
            self.config.num_epochs
        };

        tracing::info!(
            "Training {:?} on {} rows for up to {} epochs",
            self.structure(),
            dataset.len(),
            epochs
        );

        // Used for writing the debug output
        let mut losses: Vec<(usize, f64)> = vec![];

        for num_epoch in 0..epochs {
            self.run_epoch(&data, &dataset.target, &mut optimizer);

            let (loss, _) = self.loss_and_gradients(&data.view(), &dataset.target.view());
            tracing::debug!("epoch {} loss {:.6}", num_epoch, loss);

            let settled = self.config.early_stopping
                && losses
                    .last()
                    .is_some_and(|&(_, previous)| (previous - loss).abs() < self.config.epsilon);
            losses.push((num_epoch, loss));

            if settled {
                tracing::info!("Early stopping after epoch {}", num_epoch);
                break;
            }
        }

        Ok(losses)
    }

    /// Predict the survival probability for a set of instances - each instance is a row in "inputs"
    /// Returns an n x 1 matrix
    fn predict(&self, inputs: &ArrayView2<f64>) -> Result<Array2<f64>> {
        self.check_width(inputs.ncols())?;

        let scaled = self.scale(inputs);
        let (hidden, _) = self.forward(&scaled.view());

        Ok(hidden[hidden.len() - 1].mapv(sigmoid))
    }
}

impl Classifier for NeuralNet {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64> {
        let probabilities = Model::predict(self, &features.to_row().view())?;
        Ok(probabilities[[0, 0]])
    }

    fn predict(&self, features: &FeatureVector) -> Result<u8> {
        let probability = self.predict_proba(features)?;
        Ok(u8::from(probability > self.config.threshold))
    }
}

fn structure_of(layers: &[LayerGrad]) -> Vec<usize> {
    let mut structure: Vec<usize> = layers.first().map(|(w, _)| w.nrows()).into_iter().collect();
    structure.extend(layers.iter().map(|(w, _)| w.ncols()));
    structure
}

fn sigmoid(z: f64) -> f64 {
    (1f64 + (-z).exp()).recip()
}

fn activation(name: ActivationFunction, z: f64) -> f64 {
    match name {
        ActivationFunction::ReLU => z.max(0f64),
        ActivationFunction::Sigmoid => sigmoid(z),
        ActivationFunction::Tanh => z.tanh(),
        ActivationFunction::Linear => z,
        ActivationFunction::LeakyReLU => z.max(0.01 * z),
    }
}

fn delta_activation(name: ActivationFunction, z: f64) -> f64 {
    match name {
        ActivationFunction::ReLU => if z > 0f64 { 1f64 } else { 0f64 },
        ActivationFunction::Sigmoid => sigmoid(z) * (1f64 - sigmoid(z)),
        ActivationFunction::Tanh => 1f64 - z.tanh() * z.tanh(),
        ActivationFunction::Linear => 1f64,
        ActivationFunction::LeakyReLU => if z > 0f64 { 1f64 } else { 0.01f64 },
    }
}

fn init_layers_default(layer_structure: &[usize], rng: &mut StdRng) -> Vec<LayerGrad> {
    let mut layers = vec![];
    // Weights are initialized from a uniform distribiution
    let distribution = Uniform::new(-0.3, 0.3);

    for i in 0..layer_structure.len() - 1 {
        // Random matrix of the weights between this layer and the next layer
        let weights = Array::zeros((layer_structure[i], layer_structure[i + 1]))
            .map(|_: &f64| distribution.sample(rng));
        // Bias vector between this layer and the next layer. Init'd to ones
        let bias = Array::ones(layer_structure[i + 1]);

        layers.push((weights, bias));
    }

    layers
}

/// Glorot uniform: U(-sqrt(6 / (fan_in + fan_out)), +sqrt(...)), zero biases
fn init_layers_xavier(layer_structure: &[usize], rng: &mut StdRng) -> Vec<LayerGrad> {
    let mut layers = vec![];

    for i in 0..layer_structure.len() - 1 {
        let boundary = (6f64 / (layer_structure[i] + layer_structure[i + 1]) as f64).sqrt();
        let dist = Uniform::new(-boundary, boundary);

        let weights = Array::zeros((layer_structure[i], layer_structure[i + 1]))
            .map(|_: &f64| dist.sample(rng));
        let bias = Array::zeros(layer_structure[i + 1]);

        layers.push((weights, bias));
    }

    layers
}

/// Mean binary cross-entropy of a batch
fn binary_cross_entropy(probabilities: &Array2<f64>, target: &ArrayView2<f64>) -> f64 {
    let total: f64 = probabilities
        .iter()
        .zip(target.iter())
        .map(|(&p, &y)| {
            let p = p.clamp(PROBABILITY_CLIP, 1f64 - PROBABILITY_CLIP);
            y * p.ln() + (1f64 - y) * (1f64 - p).ln()
        })
        .sum();

    -total / probabilities.nrows() as f64
}

/// Turn an n x 1 matrix of probabilities into 0/1 labels
pub fn threshold_labels(probabilities: &Array2<f64>, threshold: f64) -> Array1<f64> {
    probabilities
        .column(0)
        .mapv(|p| if p > threshold { 1f64 } else { 0f64 })
}
