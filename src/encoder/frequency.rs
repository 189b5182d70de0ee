//! Frequency encoding.

use crate::code_table::CodeTable;
use crate::error::EncodingResult;
use crate::selection::AttributeSelection;
use crate::types::{DataSet, Value};

use super::{Encoder, EncoderKind, category_count};

/// Replaces each category with the share of rows carrying it.
///
/// The denominator is the total row count, so rows with a missing value still count. Categories
/// that never occur get `0.0`. The target column is not consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyEncoder {
    use_test_distribution: bool,
}

impl FrequencyEncoder {
    /// Create a frequency encoder.
    ///
    /// With `use_test_distribution`, every transformed batch is encoded with its own frequencies
    /// instead of those of the first batch.
    pub fn new(use_test_distribution: bool) -> Self {
        Self {
            use_test_distribution,
        }
    }

    pub fn use_test_distribution(&self) -> bool {
        self.use_test_distribution
    }
}

impl Encoder for FrequencyEncoder {
    fn kind(&self) -> EncoderKind {
        EncoderKind::Frequency
    }

    fn fit(&self, dataset: &DataSet, selection: &AttributeSelection) -> EncodingResult<CodeTable> {
        let total = dataset.row_count();
        let mut table = CodeTable::new(0.0);

        for col in selection.encodable() {
            let mut counts = vec![0usize; category_count(dataset, col)?];
            for row in &dataset.rows {
                if let Some(Value::Nominal(c)) = row.get(col) {
                    if let Some(slot) = counts.get_mut(*c) {
                        *slot += 1;
                    }
                }
            }

            let codes = counts
                .into_iter()
                .map(|n| if total > 0 { n as f64 / total as f64 } else { 0.0 })
                .collect();
            table.insert(col, codes);
        }

        Ok(table)
    }

    fn output_name(&self, original: &str) -> String {
        format!("{original}_frequency_encoded")
    }

    fn refits_every_call(&self) -> bool {
        self.use_test_distribution
    }
}
