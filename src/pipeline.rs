//! Fit-once, apply-many encoding pipeline.
//!
//! An [`EncodingPipeline`] starts [`PipelineState::Unfitted`]. The first
//! [`EncodingPipeline::transform`] fits a [`CodeTable`] on the dataset it receives and moves to
//! [`PipelineState::Fitted`]; later calls reuse that table, so a pipeline fitted on training data
//! encodes test data with the training statistics. An encoder that refits every call (frequency
//! encoding with `use_test_distribution`) instead produces a fresh table for each batch.
//!
//! ```rust
//! use nominal_encoding::options::EncodingOptions;
//! use nominal_encoding::pipeline::EncodingPipeline;
//! use nominal_encoding::types::{DataSet, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::nominal("color", ["red", "blue", "green"]),
//!     Field::nominal("class", ["no", "yes"]),
//! ]);
//! let train = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::Nominal(0), Value::Nominal(0)],
//!         vec![Value::Nominal(0), Value::Nominal(1)],
//!         vec![Value::Nominal(1), Value::Nominal(1)],
//!         vec![Value::Nominal(1), Value::Nominal(0)],
//!     ],
//!     1,
//! );
//!
//! let mut pipeline = EncodingPipeline::new(&EncodingOptions::default()).unwrap();
//! let out = pipeline.transform(&train).unwrap();
//! assert_eq!(out.schema.fields[0].name, "color_mean_encoded");
//! assert_eq!(out.rows[0][0], Value::Float64(0.5));
//!
//! // "green" never occurred in training; it gets the global target mean.
//! let test = DataSet::new(train.schema.clone(), vec![vec![Value::Nominal(2), Value::Null]], 1);
//! let out = pipeline.transform(&test).unwrap();
//! assert_eq!(out.rows[0], vec![Value::Float64(0.5), Value::Null]);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::code_table::CodeTable;
use crate::encoder::{Encoder, build_encoder, check_target};
use crate::error::{EncodingError, EncodingResult};
use crate::observability::{EncodingEvent, EncodingObserver};
use crate::options::EncodingOptions;
use crate::selection::{AttributeSelection, AttributeSelector};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Lifecycle of a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    /// No code table yet; the next transform fits one.
    Unfitted,
    /// A code table was fitted on a dataset with `schema` and `target_index`.
    Fitted {
        table: CodeTable,
        schema: Schema,
        target_index: usize,
    },
}

/// Encodes selected nominal columns of datasets with a single encoder.
///
/// Each pipeline exclusively owns its code table; share pipelines across threads only by moving
/// them.
pub struct EncodingPipeline {
    selector: AttributeSelector,
    encoder: Box<dyn Encoder>,
    state: PipelineState,
    observer: Option<Arc<dyn EncodingObserver>>,
}

impl fmt::Debug for EncodingPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodingPipeline")
            .field("selector", &self.selector)
            .field("encoder", &self.encoder)
            .field("state", &self.state)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl EncodingPipeline {
    /// Create an unfitted pipeline from options.
    ///
    /// Fails with [`EncodingError::InvalidRange`] if `attribute_indices` is malformed.
    pub fn new(options: &EncodingOptions) -> EncodingResult<Self> {
        let selector = AttributeSelector::parse(&options.attribute_indices)?;
        Ok(Self::with_encoder(selector, build_encoder(options)))
    }

    /// Create an unfitted pipeline from an explicit selector and encoder.
    pub fn with_encoder(selector: AttributeSelector, encoder: Box<dyn Encoder>) -> Self {
        Self {
            selector,
            encoder,
            state: PipelineState::Unfitted,
            observer: None,
        }
    }

    /// Create a fitted pipeline from a previously stored code table.
    ///
    /// `schema` and `target_index` describe the dataset the table was fitted on. Every column the
    /// options select as encodable must have one code per category.
    pub fn restore(
        options: &EncodingOptions,
        table: CodeTable,
        schema: Schema,
        target_index: usize,
    ) -> EncodingResult<Self> {
        let mut pipeline = Self::new(options)?;
        let selection = pipeline.selector.resolve(&schema, target_index)?;
        for col in selection.encodable() {
            let expected = schema.fields[col].data_type.category_count().unwrap_or(0);
            match table.codes(col) {
                Some(codes) if codes.len() == expected => {}
                Some(codes) => {
                    return Err(EncodingError::SchemaMismatch {
                        message: format!(
                            "column {col} has {} codes for {expected} categories",
                            codes.len()
                        ),
                    });
                }
                None => {
                    return Err(EncodingError::SchemaMismatch {
                        message: format!("code table has no codes for column {col}"),
                    });
                }
            }
        }
        pipeline.state = PipelineState::Fitted {
            table,
            schema,
            target_index,
        };
        Ok(pipeline)
    }

    /// Attach an observer for pipeline events.
    pub fn with_observer(mut self, observer: Arc<dyn EncodingObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Returns `true` once a code table has been fitted.
    pub fn is_fitted(&self) -> bool {
        matches!(self.state, PipelineState::Fitted { .. })
    }

    /// The fitted code table, if any.
    pub fn code_table(&self) -> Option<&CodeTable> {
        match &self.state {
            PipelineState::Fitted { table, .. } => Some(table),
            PipelineState::Unfitted => None,
        }
    }

    /// Schema of the dataset the current table was fitted on, if any.
    pub fn fitted_schema(&self) -> Option<&Schema> {
        match &self.state {
            PipelineState::Fitted { schema, .. } => Some(schema),
            PipelineState::Unfitted => None,
        }
    }

    /// The active encoder.
    pub fn encoder(&self) -> &dyn Encoder {
        self.encoder.as_ref()
    }

    /// The active attribute selector.
    pub fn selector(&self) -> &AttributeSelector {
        &self.selector
    }

    /// Drop the fitted table; the next transform fits again.
    pub fn reset(&mut self) {
        self.state = PipelineState::Unfitted;
    }

    /// Resolve the selection for `dataset` and the schema transform would produce for it.
    ///
    /// Encodable columns become numeric and are renamed by the encoder; every other column keeps
    /// its descriptor.
    pub fn output_schema(&self, dataset: &DataSet) -> EncodingResult<(Schema, AttributeSelection)> {
        let selection = self.selector.resolve(&dataset.schema, dataset.target_index())?;
        let fields = dataset
            .schema
            .fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                if selection.is_encodable(idx) {
                    Field::new(self.encoder.output_name(&field.name), DataType::Numeric)
                } else {
                    field.clone()
                }
            })
            .collect();
        Ok((Schema::new(fields), selection))
    }

    /// Fit a code table on `dataset` without transforming it.
    ///
    /// Always refits, replacing any existing table.
    pub fn fit(&mut self, dataset: &DataSet) -> EncodingResult<&CodeTable> {
        if let Err(err) = self.fit_impl(dataset) {
            self.emit_failure(&err);
            return Err(err);
        }
        let PipelineState::Fitted { table, .. } = &self.state else {
            unreachable!("fit_impl leaves the pipeline fitted");
        };
        Ok(table)
    }

    fn fit_impl(&mut self, dataset: &DataSet) -> EncodingResult<()> {
        dataset.validate()?;
        check_target(dataset)?;
        let selection = self.selector.resolve(&dataset.schema, dataset.target_index())?;
        self.emit_selection(&selection);
        let table = self.fit_table(dataset, &selection)?;
        self.state = PipelineState::Fitted {
            table,
            schema: dataset.schema.clone(),
            target_index: dataset.target_index(),
        };
        Ok(())
    }

    /// Encode `dataset`, fitting first if the pipeline is unfitted or the encoder refits every call.
    ///
    /// Returns a new dataset with the same rows in the same order; `dataset` is not modified. All
    /// checks run before any row is rewritten:
    ///
    /// - [`EncodingError::InvalidDataSet`] if rows do not match the schema
    /// - [`EncodingError::UnsupportedTarget`] if the target is neither numeric nor binary nominal
    /// - [`EncodingError::SchemaMismatch`] if the pipeline is fitted on an incompatible schema
    /// - [`EncodingError::InvalidRange`] if the range references columns that do not exist
    pub fn transform(&mut self, dataset: &DataSet) -> EncodingResult<DataSet> {
        let result = self.transform_impl(dataset);
        if let Err(err) = &result {
            self.emit_failure(err);
        }
        result
    }

    fn transform_impl(&mut self, dataset: &DataSet) -> EncodingResult<DataSet> {
        let start = Instant::now();
        dataset.validate()?;
        check_target(dataset)?;

        let refit = !self.is_fitted() || self.encoder.refits_every_call();
        if !refit {
            self.check_compatible(dataset)?;
        }

        let (schema, selection) = self.output_schema(dataset)?;
        self.emit_selection(&selection);

        if refit {
            let table = self.fit_table(dataset, &selection)?;
            self.state = PipelineState::Fitted {
                table,
                schema: dataset.schema.clone(),
                target_index: dataset.target_index(),
            };
        }

        let PipelineState::Fitted { table, .. } = &self.state else {
            unreachable!("pipeline is fitted after the refit check");
        };
        if let Some(col) = selection.encodable().find(|&col| !table.contains(col)) {
            return Err(EncodingError::SchemaMismatch {
                message: format!("code table has no codes for column {col}"),
            });
        }

        let out = dataset.map_rows_into(schema, |row| {
            let mut out = row.to_vec();
            for col in selection.encodable() {
                out[col] = match &row[col] {
                    Value::Nominal(c) => table.lookup(col, *c).map_or(Value::Null, Value::Float64),
                    _ => Value::Null,
                };
            }
            out
        });

        self.emit(EncodingEvent::TransformFinished {
            rows: out.row_count(),
            refit,
            elapsed: start.elapsed(),
        });
        Ok(out)
    }

    fn fit_table(&self, dataset: &DataSet, selection: &AttributeSelection) -> EncodingResult<CodeTable> {
        let start = Instant::now();
        self.emit(EncodingEvent::FitStarted {
            encoder: self.encoder.kind(),
            rows: dataset.row_count(),
        });

        let table = self.encoder.fit(dataset, selection)?;

        if self.observer.is_some() {
            for col in selection.encodable() {
                let unseen: Vec<usize> = dataset
                    .nominal_counts(col)
                    .unwrap_or_default()
                    .iter()
                    .enumerate()
                    .filter(|(_, n)| **n == 0)
                    .map(|(c, _)| c)
                    .collect();
                if !unseen.is_empty() {
                    self.emit(EncodingEvent::FallbackApplied {
                        column: col,
                        categories: unseen,
                        fallback: table.fallback(),
                    });
                }
            }
        }

        self.emit(EncodingEvent::FitFinished {
            columns: table.columns().count(),
            fallback: table.fallback(),
            elapsed: start.elapsed(),
        });
        Ok(table)
    }

    /// Column count, target index and column kinds must match the fitted schema.
    fn check_compatible(&self, dataset: &DataSet) -> EncodingResult<()> {
        let PipelineState::Fitted {
            schema,
            target_index,
            ..
        } = &self.state
        else {
            return Ok(());
        };

        if dataset.column_count() != schema.len() {
            return Err(EncodingError::SchemaMismatch {
                message: format!(
                    "fitted on {} columns, got {}",
                    schema.len(),
                    dataset.column_count()
                ),
            });
        }
        if dataset.target_index() != *target_index {
            return Err(EncodingError::SchemaMismatch {
                message: format!(
                    "fitted with target column {}, got {}",
                    target_index,
                    dataset.target_index()
                ),
            });
        }
        for (idx, (fitted, got)) in schema.fields.iter().zip(&dataset.schema.fields).enumerate() {
            let same_kind = match (&fitted.data_type, &got.data_type) {
                (DataType::Numeric, DataType::Numeric) => true,
                (DataType::Nominal(a), DataType::Nominal(b)) => a.len() == b.len(),
                _ => false,
            };
            if !same_kind {
                return Err(EncodingError::SchemaMismatch {
                    message: format!(
                        "column {idx} ('{}') was {:?} when fitted, got {:?}",
                        got.name, fitted.data_type, got.data_type
                    ),
                });
            }
        }
        Ok(())
    }

    fn emit_selection(&self, selection: &AttributeSelection) {
        self.emit(EncodingEvent::SelectionResolved {
            selected: selection.len(),
            encodable: selection.encodable().count(),
        });
    }

    fn emit_failure(&self, err: &EncodingError) {
        self.emit(EncodingEvent::Failed {
            message: err.to_string(),
        });
    }

    fn emit(&self, event: EncodingEvent) {
        if let Some(o) = &self.observer {
            o.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EncodingPipeline, PipelineState};
    use crate::error::EncodingError;
    use crate::options::EncodingOptions;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn train() -> DataSet {
        let schema = Schema::new(vec![
            Field::nominal("color", ["red", "blue", "green"]),
            Field::numeric("size"),
            Field::nominal("class", ["no", "yes"]),
        ]);
        DataSet::new(
            schema,
            vec![
                vec![Value::Nominal(0), Value::Float64(1.0), Value::Nominal(0)],
                vec![Value::Nominal(0), Value::Float64(2.0), Value::Nominal(1)],
                vec![Value::Nominal(1), Value::Float64(3.0), Value::Nominal(1)],
                vec![Value::Nominal(1), Value::Float64(4.0), Value::Nominal(0)],
            ],
            2,
        )
    }

    #[test]
    fn first_transform_fits_and_later_calls_reuse() {
        let mut p = EncodingPipeline::new(&EncodingOptions::default()).unwrap();
        assert_eq!(p.state(), &PipelineState::Unfitted);

        let _ = p.transform(&train()).unwrap();
        let fitted = p.code_table().cloned().unwrap();

        let mut other = train();
        other.rows[0][2] = Value::Nominal(1);
        let _ = p.transform(&other).unwrap();
        assert_eq!(p.code_table(), Some(&fitted));

        p.reset();
        assert!(!p.is_fitted());
    }

    #[test]
    fn output_schema_renames_encodable_columns_only() {
        let p = EncodingPipeline::new(&EncodingOptions::default()).unwrap();
        let (schema, selection) = p.output_schema(&train()).unwrap();
        assert_eq!(
            schema.field_names().collect::<Vec<_>>(),
            vec!["color_mean_encoded", "size", "class"]
        );
        assert_eq!(schema.fields[0].data_type, DataType::Numeric);
        assert_eq!(schema.fields[2], train().schema.fields[2]);
        assert_eq!(selection.encodable().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn missing_category_stays_missing() {
        let mut p = EncodingPipeline::new(&EncodingOptions::default()).unwrap();
        let mut ds = train();
        ds.rows.push(vec![Value::Null, Value::Float64(5.0), Value::Nominal(1)]);
        let out = p.transform(&ds).unwrap();
        assert_eq!(out.rows[4][0], Value::Null);
    }

    #[test]
    fn mismatched_schema_is_rejected_after_fit() {
        let mut p = EncodingPipeline::new(&EncodingOptions::default()).unwrap();
        let _ = p.transform(&train()).unwrap();

        let mut retyped = train();
        retyped.schema.fields[1] = Field::nominal("size", ["s", "m"]);
        for row in &mut retyped.rows {
            row[1] = Value::Nominal(0);
        }
        let err = p.transform(&retyped).unwrap_err();
        assert!(matches!(err, EncodingError::SchemaMismatch { .. }));

        let mut narrower = train();
        narrower.schema.fields.remove(1);
        for row in &mut narrower.rows {
            row.remove(1);
        }
        narrower.target_index = 1;
        let err = p.transform(&narrower).unwrap_err();
        assert!(err.to_string().contains("fitted on 3 columns, got 2"));
    }

    #[test]
    fn fit_replaces_existing_table() {
        let mut p = EncodingPipeline::new(&EncodingOptions::default()).unwrap();
        let _ = p.transform(&train()).unwrap();

        let mut skewed = train();
        for row in &mut skewed.rows {
            row[2] = Value::Nominal(1);
        }
        let table = p.fit(&skewed).unwrap();
        assert_eq!(table.lookup(0, 0), Some(1.0));
        assert!(p.fitted_schema().is_some());
    }
}
