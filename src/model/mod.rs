use ndarray::{Array2, ArrayView2, Axis};

use crate::error::Result;
use crate::features::FeatureVector;
use crate::parsing::Dataset;

pub mod neural_net;
pub mod optimizer;
pub mod scaling;
pub mod weights;

pub trait Model {
    fn fit(&mut self, dataset: &Dataset) -> Result<Vec<(usize, f64)>>;
    fn predict(&self, inputs: &ArrayView2<f64>) -> Result<Array2<f64>>;
}

/// A trained binary classifier scoring one passenger at a time
pub trait Classifier {
    /// Probability of class 1 (survival)
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64>;

    /// Predicted label, 0 or 1
    fn predict(&self, features: &FeatureVector) -> Result<u8> {
        Ok(u8::from(self.predict_proba(features)? > 0.5))
    }
}

/// Fraction of rows whose thresholded prediction equals the label
pub fn accuracy<M: Model>(model: &M, dataset: &Dataset, threshold: f64) -> Result<f64> {
    if dataset.is_empty() {
        return Ok(0f64);
    }

    let predictions = neural_net::threshold_labels(&model.predict(&dataset.data.view())?, threshold);
    let correct = predictions
        .iter()
        .zip(dataset.target.index_axis(Axis(1), 0).iter())
        .filter(|(predicted, actual)| predicted == actual)
        .count();

    Ok(correct as f64 / dataset.len() as f64)
}
