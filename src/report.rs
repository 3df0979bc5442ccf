use std::fmt;

use crate::features::PassengerClass;

/// Outcome of scoring one passenger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: u8,
    pub probability: f64,
    pub passenger_class: PassengerClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassNote {
    MoreLikely,
    LessLikely,
}

impl ClassNote {
    pub fn message(&self) -> &'static str {
        match self {
            ClassNote::MoreLikely => "First-class passengers were more likely to survive.",
            ClassNote::LessLikely => "Third-class passengers were less likely to survive.",
        }
    }
}

impl Prediction {
    pub fn survives(&self) -> bool {
        self.label == 1
    }

    pub fn verdict(&self) -> &'static str {
        if self.survives() {
            "Survives"
        } else {
            "Does not survive."
        }
    }

    /// Probability of survival as a percentage with two decimals, e.g. "78.00%"
    pub fn probability_text(&self) -> String {
        format!("{:.2}%", self.probability * 100f64)
    }

    pub fn class_note(&self) -> Option<ClassNote> {
        match self.passenger_class {
            PassengerClass::First => Some(ClassNote::MoreLikely),
            PassengerClass::Second => None,
            PassengerClass::Third => Some(ClassNote::LessLikely),
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Survival probability: {}", self.probability_text())?;
        write!(f, "{}", self.verdict())?;

        if let Some(note) = self.class_note() {
            write!(f, "\n{}", note.message())?;
        }

        Ok(())
    }
}

/// One evaluated training row
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub features: Vec<f64>,
    pub predicted: u8,
    pub expected: u8,
}

/// Summary printed after training
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Fraction in [0, 1]
    pub accuracy: f64,
    pub samples: Vec<SampleRow>,
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accuracy: {:.2}", self.accuracy * 100f64)?;

        for sample in &self.samples {
            write!(
                f,
                "\n{:?} => {} (expected {})",
                sample.features, sample.predicted, sample.expected
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_text() {
        let prediction = Prediction {
            label: 1,
            probability: 0.78,
            passenger_class: PassengerClass::Second,
        };
        assert_eq!(prediction.probability_text(), "78.00%");
        assert_eq!(prediction.verdict(), "Survives");
        assert_eq!(prediction.class_note(), None);
        assert_eq!(prediction.to_string(), "Survival probability: 78.00%\nSurvives");
    }

    #[test]
    fn test_class_notes() {
        let first = Prediction {
            label: 0,
            probability: 0.123456,
            passenger_class: PassengerClass::First,
        };
        assert_eq!(first.class_note(), Some(ClassNote::MoreLikely));
        assert_eq!(
            first.to_string(),
            "Survival probability: 12.35%\nDoes not survive.\nFirst-class passengers were more likely to survive."
        );

        let third = Prediction {
            passenger_class: PassengerClass::Third,
            ..first
        };
        assert_eq!(third.class_note(), Some(ClassNote::LessLikely));
    }

    #[test]
    fn test_training_report() {
        let report = TrainingReport {
            accuracy: 0.7656,
            samples: vec![SampleRow {
                features: vec![6.0, 148.0, 0.627],
                predicted: 1,
                expected: 1,
            }],
        };

        assert_eq!(
            report.to_string(),
            "Accuracy: 76.56\n[6.0, 148.0, 0.627] => 1 (expected 1)"
        );
    }
}
