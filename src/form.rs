use crate::error::{PredictorError, Result};
use crate::features::{PassengerClass, PassengerQuery, Port, Sex};

pub const AGE_RANGE: (f64, f64) = (0.0, 80.0);
pub const FARE_RANGE: (f64, f64) = (0.0, 512.3);
pub const DEFAULT_AGE: f64 = 30.0;
pub const DEFAULT_FARE: f64 = 32.2;

/// Raw passenger form as a user fills it in.
///
/// Class, sex and port start out empty and must be chosen; age and fare
/// always carry a value.
#[derive(Debug, Clone, PartialEq)]
pub struct PassengerForm {
    pub passenger_class: Option<u8>,
    pub sex: Option<String>,
    pub age: f64,
    pub fare: f64,
    pub embarked: Option<String>,
}

impl Default for PassengerForm {
    fn default() -> Self {
        PassengerForm {
            passenger_class: None,
            sex: None,
            age: DEFAULT_AGE,
            fare: DEFAULT_FARE,
            embarked: None,
        }
    }
}

impl PassengerForm {
    /// Names of the mandatory fields left empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = vec![];

        if self.passenger_class.is_none() {
            missing.push("Class");
        }
        if self.sex.is_none() {
            missing.push("Sex");
        }
        if self.embarked.is_none() {
            missing.push("Port");
        }

        missing
    }

    /// Validate the form and turn it into a query.
    /// Age and fare are clamped to the ranges the form allows.
    pub fn submit(&self) -> Result<PassengerQuery> {
        let (Some(class), Some(sex), Some(embarked)) =
            (self.passenger_class, self.sex.as_deref(), self.embarked.as_deref())
        else {
            return Err(PredictorError::IncompleteForm {
                missing: self.missing_fields(),
            });
        };

        Ok(PassengerQuery {
            passenger_class: PassengerClass::try_from(class)?,
            sex: sex.parse::<Sex>()?,
            age: clamp_finite("age", self.age, AGE_RANGE)?,
            fare: clamp_finite("fare", self.fare, FARE_RANGE)?,
            embarked: embarked.parse::<Port>()?,
        })
    }
}

fn clamp_finite(field: &str, value: f64, (min, max): (f64, f64)) -> Result<f64> {
    if !value.is_finite() {
        return Err(PredictorError::ValidationError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "value must be a finite number".to_string(),
        });
    }

    Ok(value.clamp(min, max))
}
