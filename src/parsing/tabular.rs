use super::Dataset;
use crate::error::{PredictorError, Result};
use ndarray::Array2;
use std::io::Read;
use std::path::Path;

/// Parse a headerless numeric CSV file.
/// Every column but the last is a feature, the last one is the 0/1 label
pub fn parse_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let file = std::fs::File::open(&path)?;
    let dataset = parse_reader(file)?;

    tracing::info!(
        "Loaded {} rows with {} features from {}",
        dataset.len(),
        dataset.num_features(),
        path.as_ref().display()
    );
    Ok(dataset)
}

pub fn parse_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut features = vec![];
    let mut labels = vec![];
    let mut width: Option<usize> = None;

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line() as usize);

        // Skip blank trailing lines
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let values = record
            .iter()
            .map(|field| {
                field.parse::<f64>().map_err(|_| PredictorError::DatasetError {
                    line,
                    message: format!("'{}' is not a number", field),
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if values.len() < 2 {
            return Err(PredictorError::DatasetError {
                line,
                message: "expected at least one feature and a label".to_string(),
            });
        }
        match width {
            Some(expected) if expected != values.len() => {
                return Err(PredictorError::DatasetError {
                    line,
                    message: format!("expected {} columns, found {}", expected, values.len()),
                });
            }
            _ => width = Some(values.len()),
        }

        let (label, row) = values.split_last().ok_or_else(|| PredictorError::DatasetError {
            line,
            message: "empty record".to_string(),
        })?;
        features.extend_from_slice(row);
        labels.push(*label);
    }

    let num_features = width.map_or(0, |w| w - 1);
    let data = Array2::from_shape_vec((labels.len(), num_features), features)?;
    let target = Array2::from_shape_vec((labels.len(), 1), labels)?;

    Ok(Dataset { data, target })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_reader() {
        let csv = "6,148,72,35,0,33.6,0.627,50,1\n1,85,66,29,0,26.6,0.351,31,0\n";
        let dataset = parse_reader(csv.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.num_features(), 8);
        assert_eq!(dataset.data[[0, 5]], 33.6);
        assert_eq!(dataset.target[[0, 0]], 1.0);
        assert_eq!(dataset.target[[1, 0]], 0.0);
    }

    #[test]
    fn test_bad_field_reports_line() {
        let csv = "1,2,0\n3,abc,1\n";
        match parse_reader(csv.as_bytes()) {
            Err(PredictorError::DatasetError { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("abc"));
            }
            other => panic!("expected a dataset error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        // csv itself refuses ragged records unless flexible
        assert!(parse_reader("1,2,0\n3,1\n".as_bytes()).is_err());
    }

    #[test]
    fn test_parse_dataset_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0.5,1.5,1").unwrap();
        writeln!(file, "2.5,3.5,0").unwrap();

        let dataset = parse_dataset(file.path()).unwrap();
        assert_eq!(dataset.data.shape(), &[2, 2]);
        assert_eq!(dataset.target.shape(), &[2, 1]);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            parse_dataset("/definitely/not/here.csv"),
            Err(PredictorError::IoError(_))
        ));
    }
}
