//! CSV ingestion implementation.

use std::path::Path;

use crate::error::{EncodingError, EncodingResult};
use crate::types::{DataSet, DataType, Schema, Value};

/// Ingest a CSV file into an in-memory [`DataSet`] whose target column is `target`.
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain all schema fields (order can differ).
/// - Numeric cells must parse as finite `f64`.
/// - Nominal cells must be one of the field's vocabulary labels; they are stored as the label's
///   category index.
/// - Empty cells and `?` map to [`Value::Null`].
pub fn ingest_csv_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    target: &str,
) -> EncodingResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_from_reader(&mut rdr, schema, target)
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
    target: &str,
) -> EncodingResult<DataSet> {
    let target_index = schema
        .index_of(target)
        .ok_or_else(|| EncodingError::SchemaMismatch {
            message: format!("target column '{target}' is not in the schema"),
        })?;
    let headers = rdr.headers()?.clone();

    // Map schema fields -> CSV column indexes (allows re-ordered CSV columns).
    let mut col_idxs = Vec::with_capacity(schema.len());
    for field in &schema.fields {
        match headers.iter().position(|h| h == field.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(EncodingError::SchemaMismatch {
                    message: format!(
                        "missing required column '{field}'. headers={:?}",
                        headers.iter().collect::<Vec<_>>(),
                        field = field.name
                    ),
                });
            }
        }
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.len());
        for (field, &csv_idx) in schema.fields.iter().zip(col_idxs.iter()) {
            let raw = record.get(csv_idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, &field.data_type, raw)?);
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows, target_index))
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: &DataType,
    raw: &str,
) -> EncodingResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "?" {
        return Ok(Value::Null);
    }

    let parse_error = |message: String| EncodingError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Numeric => match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Value::Float64(v)),
            Ok(_) => Err(parse_error("expected a finite number".to_string())),
            Err(e) => Err(parse_error(e.to_string())),
        },
        DataType::Nominal(labels) => labels
            .iter()
            .position(|l| l == trimmed)
            .map(Value::Nominal)
            .ok_or_else(|| parse_error(format!("expected one of {labels:?}"))),
    }
}
