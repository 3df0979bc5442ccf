use std::path::Path;

use crate::error::{PredictorError, Result};
use crate::features::{PassengerQuery, FEATURE_COUNT};
use crate::form::PassengerForm;
use crate::model::neural_net::NeuralNet;
use crate::model::weights::read_weights;
use crate::model::Classifier;
use crate::report::Prediction;

/// Scores passengers with the classifier it was built with
pub struct SurvivalPredictor<C: Classifier> {
    classifier: C,
}

impl<C: Classifier> SurvivalPredictor<C> {
    pub fn new(classifier: C) -> Self {
        SurvivalPredictor { classifier }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn predict(&self, query: &PassengerQuery) -> Result<Prediction> {
        let features = query.encode();
        let label = self.classifier.predict(&features)?;
        let probability = self.classifier.predict_proba(&features)?;

        tracing::debug!(
            "Scored {}: label {} probability {:.4}",
            features,
            label,
            probability
        );

        Ok(Prediction {
            label,
            probability,
            passenger_class: query.passenger_class,
        })
    }

    /// Validate the form, then score it. Incomplete forms are never scored
    pub fn predict_form(&self, form: &PassengerForm) -> Result<Prediction> {
        let query = form.submit()?;
        self.predict(&query)
    }
}

impl SurvivalPredictor<NeuralNet> {
    /// Load a trained network from disk. It must take the 7 passenger features
    pub fn from_model_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let model = read_weights(path)?;

        if model.input_size() != FEATURE_COUNT {
            return Err(PredictorError::model_format(format!(
                "the model takes {} inputs, passengers are encoded with {}",
                model.input_size(),
                FEATURE_COUNT
            )));
        }

        Ok(SurvivalPredictor::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainConfig;
    use crate::features::FeatureVector;
    use crate::model::weights::write_weights;
    use std::cell::RefCell;

    /// Returns fixed answers and records what it was asked about
    struct StubClassifier {
        label: u8,
        probability: f64,
        seen: RefCell<Vec<FeatureVector>>,
    }

    impl StubClassifier {
        fn new(label: u8, probability: f64) -> Self {
            StubClassifier {
                label,
                probability,
                seen: RefCell::new(vec![]),
            }
        }
    }

    impl Classifier for StubClassifier {
        fn predict_proba(&self, features: &FeatureVector) -> Result<f64> {
            self.seen.borrow_mut().push(*features);
            Ok(self.probability)
        }

        fn predict(&self, _features: &FeatureVector) -> Result<u8> {
            Ok(self.label)
        }
    }

    fn first_class_woman() -> PassengerForm {
        PassengerForm {
            passenger_class: Some(1),
            sex: Some("female".to_string()),
            age: 29.0,
            fare: 100.0,
            embarked: Some("S".to_string()),
        }
    }

    #[test]
    fn test_stub_reports_survival() {
        let predictor = SurvivalPredictor::new(StubClassifier::new(1, 0.78));
        let prediction = predictor.predict_form(&first_class_woman()).unwrap();

        assert!(prediction.survives());
        assert_eq!(prediction.verdict(), "Survives");
        assert_eq!(prediction.probability_text(), "78.00%");
        assert_eq!(
            predictor.classifier().seen.borrow()[0].0,
            [1.0, 0.0, 29.0, 100.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_incomplete_form_never_reaches_classifier() {
        let predictor = SurvivalPredictor::new(StubClassifier::new(1, 0.78));
        let form = PassengerForm {
            passenger_class: None,
            ..first_class_woman()
        };

        assert!(matches!(
            predictor.predict_form(&form),
            Err(PredictorError::IncompleteForm { .. })
        ));
        assert!(predictor.classifier().seen.borrow().is_empty());
    }

    #[test]
    fn test_model_file_must_match_feature_width() {
        let dir = tempfile::tempdir().unwrap();

        let wrong = NeuralNet::new(&[8, 4, 1], TrainConfig::default()).unwrap();
        let wrong_path = dir.path().join("pima.json");
        write_weights(&wrong_path, &wrong).unwrap();
        assert!(SurvivalPredictor::from_model_file(&wrong_path).is_err());

        let right = NeuralNet::new(&[FEATURE_COUNT, 4, 1], TrainConfig::default()).unwrap();
        let right_path = dir.path().join("titanic.json");
        write_weights(&right_path, &right).unwrap();

        let predictor = SurvivalPredictor::from_model_file(&right_path).unwrap();
        let prediction = predictor.predict_form(&first_class_woman()).unwrap();
        assert!((0.0..=1.0).contains(&prediction.probability));
    }
}
