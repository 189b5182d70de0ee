//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::encoder::EncoderKind;
use crate::error::EncodingResult;
use crate::selection::DEFAULT_RANGE;

/// Options controlling an [`crate::pipeline::EncodingPipeline`].
///
/// Use [`Default`] for common cases. Missing keys in deserialized configuration take their
/// default values:
///
/// ```rust
/// use nominal_encoding::encoder::EncoderKind;
/// use nominal_encoding::options::EncodingOptions;
///
/// let opts = EncodingOptions::from_json_str(r#"{ "encoder": "frequency" }"#).unwrap();
/// assert_eq!(opts.encoder, EncoderKind::Frequency);
/// assert_eq!(opts.attribute_indices, "first-last");
/// assert!(!opts.use_test_distribution);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingOptions {
    /// 1-based range expression choosing the columns to consider (e.g. `"1-3,5,8-last"`).
    ///
    /// Numeric columns and the target column in the range are passed through unchanged.
    pub attribute_indices: String,
    /// Frequency encoder only: refit on every batch instead of reusing the first batch's codes.
    pub use_test_distribution: bool,
    /// Encoding strategy.
    pub encoder: EncoderKind,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self {
            attribute_indices: DEFAULT_RANGE.to_string(),
            use_test_distribution: false,
            encoder: EncoderKind::Mean,
        }
    }
}

impl EncodingOptions {
    /// Options for target-mean encoding over `attribute_indices`.
    pub fn mean(attribute_indices: impl Into<String>) -> Self {
        Self {
            attribute_indices: attribute_indices.into(),
            ..Default::default()
        }
    }

    /// Options for frequency encoding over `attribute_indices`.
    pub fn frequency(attribute_indices: impl Into<String>, use_test_distribution: bool) -> Self {
        Self {
            attribute_indices: attribute_indices.into(),
            use_test_distribution,
            encoder: EncoderKind::Frequency,
        }
    }

    /// Parse options from JSON.
    pub fn from_json_str(json: &str) -> EncodingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
