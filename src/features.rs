use ndarray::Array2;
use std::fmt;
use std::str::FromStr;

use crate::error::PredictorError;

/// Number of columns produced by the encoder
pub const FEATURE_COUNT: usize = 7;

/// Column names, in the order the classifier expects them
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = ["Pclass", "Sex", "Age", "Fare", "C", "Q", "S"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerClass {
    First,
    Second,
    Third,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

/// Port of embarkation: Cherbourg, Queenstown or Southampton
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    C,
    Q,
    S,
}

impl PassengerClass {
    pub fn number(self) -> u8 {
        match self {
            PassengerClass::First => 1,
            PassengerClass::Second => 2,
            PassengerClass::Third => 3,
        }
    }
}

impl TryFrom<u8> for PassengerClass {
    type Error = PredictorError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PassengerClass::First),
            2 => Ok(PassengerClass::Second),
            3 => Ok(PassengerClass::Third),
            other => Err(PredictorError::ValidationError {
                field: "passenger_class".to_string(),
                value: other.to_string(),
                reason: "expected one of 1, 2, 3".to_string(),
            }),
        }
    }
}

impl Sex {
    fn bit(self) -> f64 {
        match self {
            Sex::Male => 1f64,
            Sex::Female => 0f64,
        }
    }
}

impl FromStr for Sex {
    type Err = PredictorError;

    // Case-sensitive, like the training data
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(PredictorError::ValidationError {
                field: "sex".to_string(),
                value: other.to_string(),
                reason: "expected 'male' or 'female'".to_string(),
            }),
        }
    }
}

impl Port {
    fn one_hot(self) -> [f64; 3] {
        match self {
            Port::C => [1f64, 0f64, 0f64],
            Port::Q => [0f64, 1f64, 0f64],
            Port::S => [0f64, 0f64, 1f64],
        }
    }
}

impl FromStr for Port {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Port::C),
            "Q" => Ok(Port::Q),
            "S" => Ok(Port::S),
            other => Err(PredictorError::ValidationError {
                field: "embarked".to_string(),
                value: other.to_string(),
                reason: "expected one of 'C', 'Q', 'S'".to_string(),
            }),
        }
    }
}

/// A fully specified passenger, ready to be encoded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassengerQuery {
    pub passenger_class: PassengerClass,
    pub sex: Sex,
    pub age: f64,
    pub fare: f64,
    pub embarked: Port,
}

impl PassengerQuery {
    pub fn encode(&self) -> FeatureVector {
        let [c, q, s] = self.embarked.one_hot();

        FeatureVector([
            self.passenger_class.number() as f64,
            self.sex.bit(),
            self.age,
            self.fare,
            c,
            q,
            s,
        ])
    }
}

/// Encoded passenger: `[Pclass, Sex, Age, Fare, C, Q, S]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// A 1 x 7 matrix, the shape the network predicts on
    pub fn to_row(&self) -> Array2<f64> {
        Array2::from_shape_fn((1, FEATURE_COUNT), |(_, j)| self.0[j])
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = FEATURE_COLUMNS
            .iter()
            .zip(self.0.iter())
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();

        write!(f, "[{}]", cells.join(", "))
    }
}

/// Lenient encoder over raw form values.
///
/// Never fails: a `sex` other than exactly `"male"` encodes as female, and a
/// port other than exactly `"C"`, `"Q"` or `"S"` leaves all three one-hot
/// columns at zero. Age and fare are passed through untouched. Use
/// [`PassengerQuery::encode`] when unrecognized values must be rejected.
pub fn encode(passenger_class: u8, sex: &str, age: f64, fare: f64, embarked: &str) -> FeatureVector {
    let sex_bit = sex.parse::<Sex>().map(Sex::bit).unwrap_or(0f64);
    let [c, q, s] = embarked
        .parse::<Port>()
        .map(Port::one_hot)
        .unwrap_or([0f64; 3]);

    FeatureVector([passenger_class as f64, sex_bit, age, fare, c, q, s])
}
