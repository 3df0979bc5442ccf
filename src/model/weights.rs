use json::{object, JsonValue};
use ndarray::{Array1, Array2};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::neural_net::{ActivationFunction, NeuralNet};
use super::scaling::Standardizer;
use crate::config::TrainConfig;
use crate::error::{PredictorError, Result};

/// Write the model in JSON format.
/// Keys are `structure`, `activation`, `threshold`, then e.g. W0, b0, W1, b1 holding the
/// weights as flat row-major arrays, and `mean`/`std` when the inputs are standardized
pub fn write_weights<P: AsRef<Path>>(path: P, model: &NeuralNet) -> Result<()> {
    let mut file = File::create(&path)?;
    file.write_all(to_json(model).pretty(2).as_bytes())?;

    tracing::info!("Model weights written to {}", path.as_ref().display());
    Ok(())
}

pub fn read_weights<P: AsRef<Path>>(path: P) -> Result<NeuralNet> {
    let contents = std::fs::read_to_string(&path)?;
    let model = from_json(&json::parse(&contents)?)?;

    tracing::info!(
        "Loaded model {:?} from {}",
        model.structure(),
        path.as_ref().display()
    );
    Ok(model)
}

pub fn to_json(model: &NeuralNet) -> JsonValue {
    let mut data = object! {};
    data["structure"] = model.structure().into();
    data["activation"] = model.activation_function.name().into();
    data["threshold"] = model.config.threshold.into();

    for (i, (weights, bias)) in model.layers.iter().enumerate() {
        let w: Vec<f64> = weights.iter().copied().collect();
        let b: Vec<f64> = bias.to_vec();

        data[format!("W{}", i)] = w.into();
        data[format!("b{}", i)] = b.into();
    }

    if let Some(scaler) = &model.scaler {
        data["mean"] = scaler.mean.to_vec().into();
        data["std"] = scaler.std.to_vec().into();
    }

    data
}

pub fn from_json(data: &JsonValue) -> Result<NeuralNet> {
    let structure = data["structure"]
        .members()
        .map(|size| {
            size.as_usize()
                .ok_or_else(|| PredictorError::model_format("layer sizes must be integers"))
        })
        .collect::<Result<Vec<usize>>>()?;
    if structure.len() < 2 {
        return Err(PredictorError::model_format("missing or short 'structure'"));
    }

    let activation_name = data["activation"]
        .as_str()
        .ok_or_else(|| PredictorError::model_format("missing 'activation'"))?;
    let activation_function = ActivationFunction::from_name(activation_name).ok_or_else(|| {
        PredictorError::model_format(format!("unknown activation '{}'", activation_name))
    })?;

    // Files without a threshold label at the default
    let threshold = if data.has_key("threshold") {
        data["threshold"]
            .as_f64()
            .ok_or_else(|| PredictorError::model_format("'threshold' must be a number"))?
    } else {
        TrainConfig::default().threshold
    };

    let mut layers = vec![];
    for (i, sizes) in structure.windows(2).enumerate() {
        let w = numbers(data, &format!("W{}", i))?;
        let b = numbers(data, &format!("b{}", i))?;

        let weights = Array2::from_shape_vec((sizes[0], sizes[1]), w)?;
        let bias = Array1::from_vec(b);
        layers.push((weights, bias));
    }

    let scaler = if data.has_key("mean") {
        Some(Standardizer {
            mean: Array1::from_vec(numbers(data, "mean")?),
            std: Array1::from_vec(numbers(data, "std")?),
        })
    } else {
        None
    };

    NeuralNet::from_parts(layers, activation_function, scaler, threshold)
}

fn numbers(data: &JsonValue, key: &str) -> Result<Vec<f64>> {
    if !data[key].is_array() {
        return Err(PredictorError::model_format(format!("missing array '{}'", key)));
    }

    data[key]
        .members()
        .map(|value| {
            value
                .as_f64()
                .ok_or_else(|| PredictorError::model_format(format!("non-numeric value in '{}'", key)))
        })
        .collect()
}
