use std::io::Write;
use tempfile::TempDir;
use titanic_survival::model::weights::write_weights;
use titanic_survival::parsing::titanic;
use titanic_survival::{
    training, Classifier, FeatureVector, PassengerForm, PredictorError, Result, SurvivalPredictor,
    TrainConfig,
};

struct FixedClassifier;

impl Classifier for FixedClassifier {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64> {
        assert_eq!(features.0, [1.0, 0.0, 29.0, 100.0, 0.0, 0.0, 1.0]);
        Ok(0.78)
    }

    fn predict(&self, _features: &FeatureVector) -> Result<u8> {
        Ok(1)
    }
}

/// A small passenger list where every woman survives and every man does not
fn write_passenger_list(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("train.csv");
    let mut file = std::fs::File::create(&path).unwrap();

    writeln!(file, "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked").unwrap();
    for i in 0..60 {
        let female = i % 2 == 0;
        let class = 1 + i % 3;
        let age = if i % 7 == 0 { String::new() } else { (18 + i % 40).to_string() };
        let port = ["C", "Q", "S"][i % 3];
        writeln!(
            file,
            "{},{},{},\"Passenger, No. {}\",{},{},0,0,T{},{:.2},,{}",
            i + 1,
            u8::from(female),
            class,
            i,
            if female { "female" } else { "male" },
            age,
            i,
            10.0 + (i * 3) as f64,
            port
        )
        .unwrap();
    }

    path
}

#[test]
fn test_form_to_report_with_injected_classifier() {
    let predictor = SurvivalPredictor::new(FixedClassifier);
    let form = PassengerForm {
        passenger_class: Some(1),
        sex: Some("female".to_string()),
        age: 29.0,
        fare: 100.0,
        embarked: Some("S".to_string()),
    };

    let prediction = predictor.predict_form(&form).unwrap();
    assert_eq!(prediction.verdict(), "Survives");
    assert_eq!(prediction.probability_text(), "78.00%");
    assert_eq!(
        prediction.to_string(),
        "Survival probability: 78.00%\nSurvives\nFirst-class passengers were more likely to survive."
    );
}

#[test]
fn test_incomplete_form_reports_missing_fields() {
    let predictor = SurvivalPredictor::new(FixedClassifier);

    match predictor.predict_form(&PassengerForm::default()) {
        Err(PredictorError::IncompleteForm { missing }) => {
            assert_eq!(missing, vec!["Class", "Sex", "Port"]);
        }
        other => panic!("expected an incomplete form, got {:?}", other),
    }
}

#[test]
fn test_train_save_load_predict() {
    let dir = TempDir::new().unwrap();
    let dataset = titanic::parse_dataset(write_passenger_list(&dir)).unwrap();
    assert_eq!(dataset.len(), 60);

    let config = TrainConfig {
        network_structure: Some(vec![7, 8, 1]),
        learning_rate: 0.01,
        num_epochs: 100,
        ..TrainConfig::default()
    };
    let (net, losses) = training::train(&dataset, config).unwrap();
    assert!(losses.last().unwrap().1 < losses[0].1);

    let report = training::evaluate(&net, &dataset, 0.5, 5).unwrap();
    assert!(report.accuracy >= 0.9, "accuracy was {}", report.accuracy);

    let model_path = dir.path().join("model.json");
    write_weights(&model_path, &net).unwrap();
    let predictor = SurvivalPredictor::from_model_file(&model_path).unwrap();

    let woman = PassengerForm {
        passenger_class: Some(2),
        sex: Some("female".to_string()),
        embarked: Some("Q".to_string()),
        ..PassengerForm::default()
    };
    let man = PassengerForm {
        sex: Some("male".to_string()),
        ..woman.clone()
    };

    let woman = predictor.predict_form(&woman).unwrap();
    let man = predictor.predict_form(&man).unwrap();
    assert!(woman.survives());
    assert!(!man.survives());
    assert!(woman.probability > man.probability);
}
