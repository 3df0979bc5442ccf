pub mod config;
pub mod error;
pub mod features;
pub mod form;
pub mod history;
pub mod logger;
pub mod model;
pub mod parsing;
pub mod report;
pub mod service;
pub mod training;

pub use config::TrainConfig;
pub use error::{PredictorError, Result};
pub use features::{encode, FeatureVector, PassengerClass, PassengerQuery, Port, Sex};
pub use form::PassengerForm;
pub use model::{Classifier, Model};
pub use report::{Prediction, TrainingReport};
pub use service::SurvivalPredictor;
