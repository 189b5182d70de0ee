//! `nominal-encoding` replaces nominal (categorical) columns of an in-memory [`types::DataSet`]
//! with numeric codes computed from column statistics, so the data can feed numeric models.
//!
//! The primary entrypoint is [`pipeline::EncodingPipeline`]: the first call to
//! [`pipeline::EncodingPipeline::transform`] fits a [`code_table::CodeTable`] on the dataset it is
//! given, and every later call reuses that table (fit on train, apply on test).
//!
//! ## Encoders
//!
//! - [`encoder::MeanEncoder`]: code = mean target value of the rows carrying the category. The
//!   target must be numeric or binary nominal; for a binary target, category index 1 is the
//!   positive class. Categories absent from the fitting data get the global target mean.
//! - [`encoder::FrequencyEncoder`]: code = share of rows carrying the category. With
//!   `use_test_distribution`, every batch is encoded with its own frequencies.
//!
//! Only nominal, non-target columns picked by the range expression
//! ([`options::EncodingOptions::attribute_indices`], default `"first-last"`) are encoded. Every
//! other column is passed through unchanged.
//!
//! ## Example: fit on train, apply on test
//!
//! ```rust
//! use nominal_encoding::options::EncodingOptions;
//! use nominal_encoding::pipeline::EncodingPipeline;
//! use nominal_encoding::types::{DataSet, Field, Schema, Value};
//!
//! # fn main() -> Result<(), nominal_encoding::EncodingError> {
//! let schema = Schema::new(vec![
//!     Field::nominal("color", ["red", "blue"]),
//!     Field::numeric("price"),
//! ]);
//! let train = DataSet::try_new(
//!     schema.clone(),
//!     vec![
//!         vec![Value::Nominal(0), Value::Float64(10.0)],
//!         vec![Value::Nominal(0), Value::Float64(20.0)],
//!         vec![Value::Nominal(1), Value::Float64(40.0)],
//!     ],
//!     1,
//! )?;
//!
//! let mut pipeline = EncodingPipeline::new(&EncodingOptions::mean("first-last"))?;
//! let encoded = pipeline.transform(&train)?;
//! assert_eq!(encoded.rows[0][0], Value::Float64(15.0));
//!
//! let test = DataSet::try_new(schema, vec![vec![Value::Nominal(1), Value::Null]], 1)?;
//! let encoded = pipeline.transform(&test)?;
//! assert_eq!(encoded.rows[0][0], Value::Float64(40.0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: schema + in-memory dataset types
//! - [`selection`]: range expressions and attribute selection
//! - [`encoder`]: the encoder trait and its implementations
//! - [`code_table`]: fitted codes and their JSON form
//! - [`pipeline`]: the fit/transform state machine
//! - [`options`]: configuration
//! - [`observability`]: observer hooks for logging
//! - [`ingestion`]: loading datasets from CSV
//! - [`error`]: error types

pub mod code_table;
pub mod encoder;
pub mod error;
pub mod ingestion;
pub mod observability;
pub mod options;
pub mod pipeline;
pub mod selection;
pub mod types;

pub use error::{EncodingError, EncodingResult};
