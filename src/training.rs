use ndarray::Axis;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::config::TrainConfig;
use crate::error::Result;
use crate::model::neural_net::{threshold_labels, NeuralNet};
use crate::model::{accuracy, Model};
use crate::parsing::Dataset;
use crate::report::{SampleRow, TrainingReport};

/// Hidden layers used when no structure is configured
pub const DEFAULT_HIDDEN_LAYERS: [usize; 2] = [12, 8];

/// The configured structure, or `[features, 12, 8, 1]`
pub fn network_structure(config: &TrainConfig, num_features: usize) -> Vec<usize> {
    config.network_structure.clone().unwrap_or_else(|| {
        let mut structure = vec![num_features];
        structure.extend_from_slice(&DEFAULT_HIDDEN_LAYERS);
        structure.push(1);
        structure
    })
}

/// Build a net for the dataset and fit it. Returns the net and its loss curve
pub fn train(dataset: &Dataset, config: TrainConfig) -> Result<(NeuralNet, Vec<(usize, f64)>)> {
    let structure = network_structure(&config, dataset.num_features());
    let mut net = NeuralNet::new(&structure, config)?;
    let losses = net.fit(dataset)?;

    Ok((net, losses))
}

/// Accuracy over the whole dataset plus the first `num_samples` rows
pub fn evaluate<M: Model>(
    model: &M,
    dataset: &Dataset,
    threshold: f64,
    num_samples: usize,
) -> Result<TrainingReport> {
    let accuracy = accuracy(model, dataset, threshold)?;

    let head = dataset
        .data
        .slice_axis(Axis(0), (0..num_samples.min(dataset.len())).into());
    let predicted = threshold_labels(&model.predict(&head)?, threshold);

    let samples = head
        .axis_iter(Axis(0))
        .zip(predicted.iter())
        .zip(dataset.target.axis_iter(Axis(0)))
        .map(|((features, &predicted), target)| SampleRow {
            features: features.to_vec(),
            predicted: predicted as u8,
            expected: target[0] as u8,
        })
        .collect();

    tracing::info!("Accuracy {:.4} on {} rows", accuracy, dataset.len());
    Ok(TrainingReport { accuracy, samples })
}

/// Write the losses to a debug file, one "epoch    loss" pair per line
pub fn write_losses<P: AsRef<Path>>(debug_path: P, losses: &[(usize, f64)]) -> Result<()> {
    let mut file = File::create(debug_path)?;

    for (x, y) in losses {
        file.write_all(format!("{}    {}\n", x, y).as_bytes())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_default_structure_follows_dataset_width() {
        let config = TrainConfig::default();
        assert_eq!(network_structure(&config, 8), vec![8, 12, 8, 1]);

        let config = TrainConfig {
            network_structure: Some(vec![7, 16, 1]),
            ..TrainConfig::default()
        };
        assert_eq!(network_structure(&config, 7), vec![7, 16, 1]);
    }

    #[test]
    fn test_evaluate_reports_first_rows() {
        // Two blobs, label = first column > 0
        let data = Array2::from_shape_fn((30, 2), |(i, j)| {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            sign * (1.0 + (i + j) as f64 / 30.0)
        });
        let target = Array2::from_shape_fn((30, 1), |(i, _)| if i % 2 == 0 { 1.0 } else { 0.0 });
        let dataset = Dataset { data, target };

        let config = TrainConfig {
            learning_rate: 0.05,
            num_epochs: 100,
            ..TrainConfig::default()
        };
        let (net, losses) = train(&dataset, config).unwrap();
        assert_eq!(losses.len(), 100);

        let report = evaluate(&net, &dataset, 0.5, 5).unwrap();
        assert_eq!(report.samples.len(), 5);
        assert_eq!(report.samples[0].expected, 1);
        assert_eq!(report.samples[1].expected, 0);
        assert_eq!(report.samples[0].features, dataset.data.row(0).to_vec());
        assert!(report.accuracy >= 0.9, "accuracy was {}", report.accuracy);
    }

    #[test]
    fn test_write_losses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("losses.txt");

        write_losses(&path, &[(0, 0.5), (1, 0.25)]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0    0.5\n1    0.25\n");
    }
}
