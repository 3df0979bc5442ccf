use super::Dataset;
use crate::error::{PredictorError, Result};
use crate::features::{PassengerClass, PassengerQuery, Port, Sex, FEATURE_COUNT};
use ndarray::Array2;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// The columns we need from the passenger list. Others (Name, Ticket, ...) are ignored.
/// Class and label are read as text so a bad value skips the row instead of failing the file
#[derive(Debug, Deserialize)]
struct PassengerRecord {
    #[serde(rename = "Survived")]
    survived: Option<String>,
    #[serde(rename = "Pclass")]
    pclass: Option<String>,
    #[serde(rename = "Sex")]
    sex: String,
    #[serde(rename = "Age")]
    age: Option<f64>,
    #[serde(rename = "Fare")]
    fare: Option<f64>,
    #[serde(rename = "Embarked")]
    embarked: Option<String>,
}

const REQUIRED_COLUMNS: [&str; 6] = ["Survived", "Pclass", "Sex", "Age", "Fare", "Embarked"];

/// A passenger whose age may still need imputing
struct PartialRow {
    passenger_class: PassengerClass,
    sex: Sex,
    age: Option<f64>,
    fare: f64,
    embarked: Port,
    survived: f64,
}

/// Parse the Titanic passenger list into encoded feature rows.
pub fn parse_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let file = std::fs::File::open(&path)?;
    let dataset = parse_reader(file)?;

    tracing::info!(
        "Loaded {} passengers from {}",
        dataset.len(),
        path.as_ref().display()
    );
    Ok(dataset)
}

/// Rows with an unknown class, sex, port or label, or without a fare, are skipped.
/// Missing ages are filled with the median of the known ones
pub fn parse_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?;
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Err(PredictorError::DatasetError {
            line: 1,
            message: format!("missing column '{}'", missing),
        });
    }

    let mut rows = vec![];
    let mut skipped = 0usize;

    for record in csv_reader.deserialize::<PassengerRecord>() {
        let record = record?;

        match to_partial_row(&record) {
            Some(row) => rows.push(row),
            None => {
                tracing::debug!("Skipping incomplete passenger record: {:?}", record);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} passenger records with missing or unknown values", skipped);
    }

    let median_age = median(rows.iter().filter_map(|row| row.age).collect());
    let mut data = Vec::with_capacity(rows.len() * FEATURE_COUNT);
    let mut target = Vec::with_capacity(rows.len());

    for row in &rows {
        let query = PassengerQuery {
            passenger_class: row.passenger_class,
            sex: row.sex,
            age: row.age.unwrap_or(median_age),
            fare: row.fare,
            embarked: row.embarked,
        };

        data.extend_from_slice(query.encode().values());
        target.push(row.survived);
    }

    Ok(Dataset {
        data: Array2::from_shape_vec((rows.len(), FEATURE_COUNT), data)?,
        target: Array2::from_shape_vec((rows.len(), 1), target)?,
    })
}

fn to_partial_row(record: &PassengerRecord) -> Option<PartialRow> {
    let class_number: u8 = record.pclass.as_deref()?.parse().ok()?;

    Some(PartialRow {
        passenger_class: PassengerClass::try_from(class_number).ok()?,
        sex: record.sex.parse().ok()?,
        age: record.age,
        fare: record.fare?,
        embarked: record.embarked.as_deref()?.parse().ok()?,
        survived: match record.survived.as_deref()? {
            "0" => 0f64,
            "1" => 1f64,
            _ => return None,
        },
    })
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0f64;
    }

    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;

    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2f64
    } else {
        values[mid]
    }
}
