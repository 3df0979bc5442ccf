use ndarray::{Array, Array1, Array2, Dimension, Zip};
use serde::Deserialize;

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const ADAM_EPSILON: f64 = 1e-7;

#[derive(clap::ValueEnum, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Sgd,
    Adam,
}

/// Gradients of one layer: weights and biases
pub type LayerGrad = (Array2<f64>, Array1<f64>);

/// Per-layer update rule. Holds the moment estimates Adam needs between steps
pub enum Optimizer {
    Sgd {
        learning_rate: f64,
    },
    Adam {
        learning_rate: f64,
        step: i32,
        first_moment: Vec<LayerGrad>,
        second_moment: Vec<LayerGrad>,
    },
}

impl Optimizer {
    pub fn new(kind: OptimizerKind, learning_rate: f64, layers: &[LayerGrad]) -> Optimizer {
        match kind {
            OptimizerKind::Sgd => Optimizer::Sgd { learning_rate },
            OptimizerKind::Adam => {
                let zeros: Vec<LayerGrad> = layers
                    .iter()
                    .map(|(w, b)| (Array2::zeros(w.raw_dim()), Array1::zeros(b.raw_dim())))
                    .collect();

                Optimizer::Adam {
                    learning_rate,
                    step: 0,
                    first_moment: zeros.clone(),
                    second_moment: zeros,
                }
            }
        }
    }

    /// Apply one update to every layer. `grads[i]` matches `layers[i]`
    pub fn step(&mut self, layers: &mut [LayerGrad], grads: &[LayerGrad]) {
        match self {
            Optimizer::Sgd { learning_rate } => {
                for ((w, b), (w_grad, b_grad)) in layers.iter_mut().zip(grads) {
                    w.scaled_add(-*learning_rate, w_grad);
                    b.scaled_add(-*learning_rate, b_grad);
                }
            }
            Optimizer::Adam {
                learning_rate,
                step,
                first_moment,
                second_moment,
            } => {
                *step += 1;
                // Bias-corrected step size
                let alpha = *learning_rate * (1f64 - BETA2.powi(*step)).sqrt()
                    / (1f64 - BETA1.powi(*step));

                for (idx, ((w, b), (w_grad, b_grad))) in layers.iter_mut().zip(grads).enumerate() {
                    let (m_w, m_b) = &mut first_moment[idx];
                    let (v_w, v_b) = &mut second_moment[idx];

                    adam_update(w, w_grad, m_w, v_w, alpha);
                    adam_update(b, b_grad, m_b, v_b, alpha);
                }
            }
        }
    }
}

fn adam_update<D: Dimension>(
    param: &mut Array<f64, D>,
    grad: &Array<f64, D>,
    m: &mut Array<f64, D>,
    v: &mut Array<f64, D>,
    alpha: f64,
) {
    Zip::from(param)
        .and(grad)
        .and(m)
        .and(v)
        .for_each(|p, &g, m, v| {
            *m = BETA1 * *m + (1f64 - BETA1) * g;
            *v = BETA2 * *v + (1f64 - BETA2) * g * g;
            *p -= alpha * *m / (v.sqrt() + ADAM_EPSILON);
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn single_layer() -> Vec<LayerGrad> {
        vec![(array![[1.0, -1.0]], array![0.5])]
    }

    #[test]
    fn test_sgd_moves_against_gradient() {
        let mut layers = single_layer();
        let grads = vec![(array![[2.0, -4.0]], array![1.0])];
        let mut optimizer = Optimizer::new(OptimizerKind::Sgd, 0.1, &layers);

        optimizer.step(&mut layers, &grads);

        assert!((layers[0].0[[0, 0]] - 0.8).abs() < 1e-12);
        assert!((layers[0].0[[0, 1]] + 0.6).abs() < 1e-12);
        assert!((layers[0].1[0] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_adam_first_step_is_learning_rate_sized() {
        let mut layers = single_layer();
        let grads = vec![(array![[2.0, -4.0]], array![1e-3])];
        let mut optimizer = Optimizer::new(OptimizerKind::Adam, 0.01, &layers);

        optimizer.step(&mut layers, &grads);

        // After bias correction the first Adam step is ~lr * sign(grad)
        assert!((layers[0].0[[0, 0]] - 0.99).abs() < 1e-6);
        assert!((layers[0].0[[0, 1]] + 0.99).abs() < 1e-6);
        assert!((layers[0].1[0] - 0.49).abs() < 1e-4);
    }

    #[test]
    fn test_adam_keeps_state_between_steps() {
        let mut layers = single_layer();
        let grads = vec![(array![[1.0, 1.0]], array![1.0])];
        let mut optimizer = Optimizer::new(OptimizerKind::Adam, 0.01, &layers);

        optimizer.step(&mut layers, &grads);
        optimizer.step(&mut layers, &grads);

        match &optimizer {
            Optimizer::Adam { step, first_moment, .. } => {
                assert_eq!(*step, 2);
                assert!((first_moment[0].0[[0, 0]] - 0.19).abs() < 1e-12);
            }
            Optimizer::Sgd { .. } => panic!("expected adam"),
        }
        assert!((layers[0].0[[0, 0]] - 0.98).abs() < 1e-6);
    }
}
