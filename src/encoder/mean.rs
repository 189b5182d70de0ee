//! Target-mean encoding.

use crate::code_table::CodeTable;
use crate::error::{EncodingError, EncodingResult};
use crate::selection::AttributeSelection;
use crate::types::{DataSet, DataType, Value};

use super::{Encoder, EncoderKind, category_count};

/// Replaces each category with the mean target value of the rows carrying it.
///
/// For a numeric target the mean is taken over the target values. For a binary nominal target,
/// category index 1 is the positive class: each row contributes its target category index (0 or
/// 1), so codes are the share of positive rows and lie in `[0, 1]`.
///
/// Categories with no usable row get the global target mean. Rows with a missing category or a
/// missing target are ignored for that column.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanEncoder;

impl MeanEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder for MeanEncoder {
    fn kind(&self) -> EncoderKind {
        EncoderKind::Mean
    }

    fn fit(&self, dataset: &DataSet, selection: &AttributeSelection) -> EncodingResult<CodeTable> {
        let targets = target_values(dataset)?;
        let global_mean = global_mean(&targets);
        let mut table = CodeTable::with_global_mean(global_mean);

        for col in selection.encodable() {
            let categories = category_count(dataset, col)?;
            let mut sums = vec![0.0f64; categories];
            let mut counts = vec![0usize; categories];

            for (row, target) in dataset.rows.iter().zip(&targets) {
                if let (Some(Value::Nominal(c)), Some(t)) = (row.get(col), target) {
                    if *c < categories {
                        sums[*c] += t;
                        counts[*c] += 1;
                    }
                }
            }

            let codes = sums
                .into_iter()
                .zip(counts)
                .map(|(sum, n)| if n > 0 { sum / n as f64 } else { global_mean })
                .collect();
            table.insert(col, codes);
        }

        Ok(table)
    }

    fn output_name(&self, original: &str) -> String {
        format!("{original}_mean_encoded")
    }
}

/// Numeric view of the target column; `None` marks rows that do not contribute.
fn target_values(dataset: &DataSet) -> EncodingResult<Vec<Option<f64>>> {
    let idx = dataset.target_index();
    let data_type = dataset
        .target()
        .map(|f| &f.data_type)
        .ok_or_else(|| EncodingError::UnsupportedTarget {
            message: format!("target index {idx} out of bounds"),
        })?;

    let values = dataset
        .rows
        .iter()
        .map(|row| match (data_type, row.get(idx)) {
            (DataType::Numeric, Some(Value::Float64(v))) if v.is_finite() => Some(*v),
            (DataType::Nominal(_), Some(Value::Nominal(c))) if *c <= 1 => Some(*c as f64),
            _ => None,
        })
        .collect();
    Ok(values)
}

/// Mean of the usable targets, or `0.0` when there are none.
///
/// For a binary target this is `count(class 1) / (count(class 0) + count(class 1))`.
fn global_mean(targets: &[Option<f64>]) -> f64 {
    let (sum, n) = targets
        .iter()
        .flatten()
        .fold((0.0f64, 0usize), |(sum, n), t| (sum + t, n + 1));
    if n > 0 { sum / n as f64 } else { 0.0 }
}
