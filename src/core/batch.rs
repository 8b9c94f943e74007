use crate::core::predict::PricePredictor;
use crate::domain::model::{VehicleDescriptor, CATEGORICAL_FIELDS, NUMERIC_FIELDS};
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::Validate;
use std::io::{Read, Write};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub scored: usize,
    pub failed: usize,
}

fn input_columns() -> impl Iterator<Item = &'static str> {
    CATEGORICAL_FIELDS.into_iter().chain(NUMERIC_FIELDS)
}

/// Score every vehicle row of `input` and write the input columns followed by
/// `predicted_price` and `error`. A row that fails keeps its input columns and
/// carries the message in `error`; only unreadable CSV aborts the batch.
pub fn score_csv<R: Read, W: Write>(
    predictor: &PricePredictor,
    input: R,
    output: W,
) -> Result<BatchSummary> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let headers = reader.headers()?.clone();
    let positions: Vec<Option<usize>> = input_columns()
        .map(|name| headers.iter().position(|h| h == name))
        .collect();

    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(input_columns().chain(["predicted_price", "error"]))?;

    let mut summary = BatchSummary::default();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let mut record: Vec<String> = positions
            .iter()
            .map(|pos| pos.and_then(|i| row.get(i)).unwrap_or_default().to_string())
            .collect();

        let outcome = row
            .deserialize::<VehicleDescriptor>(Some(&headers))
            .map_err(|e| ServiceError::ValidationError {
                message: e.to_string(),
            })
            .and_then(|vehicle| {
                vehicle.validate()?;
                predictor.predict(&vehicle)
            });

        match outcome {
            Ok(prediction) => {
                record.push(prediction.predicted_price.to_string());
                record.push(String::new());
                summary.scored += 1;
            }
            Err(e) => {
                tracing::warn!("Row {} skipped: {}", index + 1, e);
                record.push(String::new());
                record.push(e.to_string());
                summary.failed += 1;
            }
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(summary)
}
