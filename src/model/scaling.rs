use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::{PredictorError, Result};

/// Per-column standardisation, `(x - mean) / std`
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl Standardizer {
    /// Fit on the rows of `data`. Constant columns get a std of 1 so they map to 0
    pub fn fit(data: &ArrayView2<f64>) -> Result<Standardizer> {
        let mean = data
            .mean_axis(Axis(0))
            .ok_or_else(|| PredictorError::config("cannot standardize an empty dataset"))?;
        let std = data
            .std_axis(Axis(0), 0f64)
            .mapv(|s| if s > f64::EPSILON { s } else { 1f64 });

        Ok(Standardizer { mean, std })
    }

    pub fn transform(&self, data: &ArrayView2<f64>) -> Array2<f64> {
        (data - &self.mean) / &self.std
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_and_transform() {
        let data = array![[1.0, 10.0, 5.0], [3.0, 30.0, 5.0]];
        let scaler = Standardizer::fit(&data.view()).unwrap();

        assert_eq!(scaler.mean, array![2.0, 20.0, 5.0]);
        assert_eq!(scaler.std, array![1.0, 10.0, 1.0]);
        assert_eq!(
            scaler.transform(&data.view()),
            array![[-1.0, -1.0, 0.0], [1.0, 1.0, 0.0]]
        );
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let data = Array2::<f64>::zeros((0, 3));
        assert!(Standardizer::fit(&data.view()).is_err());
    }
}
