//! Encoding strategies.
//!
//! An [`Encoder`] computes a [`CodeTable`] from a fitting dataset. The pipeline owns the fitted
//! table and applies it to every dataset it transforms.
//!
//! Implemented strategies:
//!
//! - [`MeanEncoder`]: per-category mean of the target, falling back to the global target mean
//! - [`FrequencyEncoder`]: per-category share of rows

pub mod frequency;
pub mod mean;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::code_table::CodeTable;
use crate::error::{EncodingError, EncodingResult};
use crate::options::EncodingOptions;
use crate::selection::AttributeSelection;
use crate::types::{DataSet, DataType};

pub use frequency::FrequencyEncoder;
pub use mean::MeanEncoder;

/// Which encoder a pipeline uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    /// Target-mean encoding.
    #[default]
    Mean,
    /// Frequency encoding.
    Frequency,
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mean => f.write_str("mean"),
            Self::Frequency => f.write_str("frequency"),
        }
    }
}

impl FromStr for EncoderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "frequency" => Ok(Self::Frequency),
            other => Err(format!("unknown encoder '{other}' (expected mean or frequency)")),
        }
    }
}

/// A strategy for turning nominal columns into numeric codes.
pub trait Encoder: fmt::Debug + Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> EncoderKind;

    /// Compute codes for every encodable column of `selection` from `dataset`.
    ///
    /// The returned table is total over each encodable column's vocabulary.
    fn fit(&self, dataset: &DataSet, selection: &AttributeSelection) -> EncodingResult<CodeTable>;

    /// Name of the numeric column replacing the nominal column `original`.
    fn output_name(&self, original: &str) -> String;

    /// If `true`, the pipeline refits on every call instead of reusing the first table.
    fn refits_every_call(&self) -> bool {
        false
    }
}

/// Build the encoder selected by `options`.
pub fn build_encoder(options: &EncodingOptions) -> Box<dyn Encoder> {
    match options.encoder {
        EncoderKind::Mean => Box::new(MeanEncoder::new()),
        EncoderKind::Frequency => Box::new(FrequencyEncoder::new(options.use_test_distribution)),
    }
}

/// Check that the target column is numeric or binary nominal.
///
/// Both encoders accept exactly these two target kinds. For a binary target, category index 1 is
/// the positive class.
pub fn check_target(dataset: &DataSet) -> EncodingResult<()> {
    let target = dataset.target().ok_or_else(|| EncodingError::UnsupportedTarget {
        message: format!(
            "target index {} out of bounds for {} columns",
            dataset.target_index(),
            dataset.column_count()
        ),
    })?;

    match &target.data_type {
        DataType::Numeric => Ok(()),
        DataType::Nominal(labels) if labels.len() == 2 => Ok(()),
        DataType::Nominal(labels) => Err(EncodingError::UnsupportedTarget {
            message: format!(
                "target '{}' is nominal with {} categories; only numeric or binary targets are supported",
                target.name,
                labels.len()
            ),
        }),
    }
}

/// Vocabulary size of encodable column `idx`.
pub(crate) fn category_count(dataset: &DataSet, idx: usize) -> EncodingResult<usize> {
    dataset
        .column(idx)
        .and_then(|f| f.data_type.category_count())
        .ok_or_else(|| EncodingError::SchemaMismatch {
            message: format!("column {idx} is not a nominal column of this dataset"),
        })
}
