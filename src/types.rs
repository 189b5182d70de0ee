//! Core data model types.
//!
//! Encoders consume and produce an in-memory [`DataSet`]: a [`Schema`] of typed [`Field`]s, row-major
//! [`Value`] storage, optional per-row weights, and exactly one designated target column.

use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, EncodingResult};

/// Logical data type for a schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// Real-valued column.
    Numeric,
    /// Categorical column with an ordered vocabulary.
    ///
    /// The position of a label in the vocabulary is its category index and is fixed for the
    /// lifetime of the dataset.
    Nominal(Vec<String>),
}

impl DataType {
    /// Returns `true` for [`DataType::Nominal`].
    pub fn is_nominal(&self) -> bool {
        matches!(self, Self::Nominal(_))
    }

    /// Number of categories for nominal columns, `None` for numeric ones.
    pub fn category_count(&self) -> Option<usize> {
        match self {
            Self::Nominal(labels) => Some(labels.len()),
            Self::Numeric => None,
        }
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// Create a numeric field.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Numeric)
    }

    /// Create a nominal field whose vocabulary is `labels`, in order.
    pub fn nominal<I, S>(name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            DataType::Nominal(labels.into_iter().map(Into::into).collect()),
        )
    }

    /// Category index of `label`, if this is a nominal field containing it.
    pub fn category_index(&self, label: &str) -> Option<usize> {
        match &self.data_type {
            DataType::Nominal(labels) => labels.iter().position(|l| l == label),
            DataType::Numeric => None,
        }
    }
}

/// A list of fields describing the shape of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single typed value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Missing value.
    Null,
    /// Finite real number.
    Float64(f64),
    /// Category index into the owning column's vocabulary.
    Nominal(usize),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// In-memory tabular dataset with a designated target column.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
    /// Per-row weights. Empty means every row has weight `1.0`.
    pub weights: Vec<f64>,
    /// Index of the target (class) column.
    pub target_index: usize,
}

impl DataSet {
    /// Create a dataset from schema, rows and target column index.
    ///
    /// No validation is performed; see [`DataSet::try_new`].
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>, target_index: usize) -> Self {
        Self {
            schema,
            rows,
            weights: Vec::new(),
            target_index,
        }
    }

    /// Create a dataset, checking that the target index exists and every row matches the schema.
    pub fn try_new(schema: Schema, rows: Vec<Vec<Value>>, target_index: usize) -> EncodingResult<Self> {
        let ds = Self::new(schema, rows, target_index);
        ds.validate()?;
        Ok(ds)
    }

    /// Attach per-row weights.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = weights;
        self
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    /// Index of the target column.
    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// Field descriptor for column `idx`.
    pub fn column(&self, idx: usize) -> Option<&Field> {
        self.schema.fields.get(idx)
    }

    /// Field descriptor of the target column.
    pub fn target(&self) -> Option<&Field> {
        self.column(self.target_index)
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Values of row `idx`.
    pub fn row(&self, idx: usize) -> Option<&[Value]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    /// Weight of row `idx`; `1.0` when no weights are attached.
    pub fn row_weight(&self, idx: usize) -> f64 {
        self.weights.get(idx).copied().unwrap_or(1.0)
    }

    /// Occurrence count per category of nominal column `idx`.
    ///
    /// Missing cells are not counted. Returns `None` if the column is not nominal.
    pub fn nominal_counts(&self, idx: usize) -> Option<Vec<usize>> {
        let categories = self.column(idx)?.data_type.category_count()?;
        let mut counts = vec![0usize; categories];
        for row in &self.rows {
            if let Some(Value::Nominal(c)) = row.get(idx) {
                if let Some(slot) = counts.get_mut(*c) {
                    *slot += 1;
                }
            }
        }
        Some(counts)
    }

    /// Check structural consistency: target index, row arity, weight count and value kinds.
    pub fn validate(&self) -> EncodingResult<()> {
        if self.target_index >= self.column_count() {
            return Err(EncodingError::InvalidDataSet {
                message: format!(
                    "target index {} out of bounds for {} columns",
                    self.target_index,
                    self.column_count()
                ),
            });
        }
        if !self.weights.is_empty() && self.weights.len() != self.row_count() {
            return Err(EncodingError::InvalidDataSet {
                message: format!(
                    "{} weights for {} rows",
                    self.weights.len(),
                    self.row_count()
                ),
            });
        }

        for (row_idx, row) in self.rows.iter().enumerate() {
            if row.len() != self.column_count() {
                return Err(EncodingError::InvalidDataSet {
                    message: format!(
                        "row {row_idx} has {} values, schema has {} fields",
                        row.len(),
                        self.column_count()
                    ),
                });
            }
            for (field, value) in self.schema.fields.iter().zip(row) {
                let ok = match (&field.data_type, value) {
                    (_, Value::Null) => true,
                    (DataType::Numeric, Value::Float64(_)) => true,
                    (DataType::Nominal(labels), Value::Nominal(c)) => *c < labels.len(),
                    _ => false,
                };
                if !ok {
                    return Err(EncodingError::InvalidDataSet {
                        message: format!(
                            "row {row_idx} column '{}': value {value:?} does not fit {:?}",
                            field.name, field.data_type
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Create a new dataset with `schema` by applying `mapper` to every row.
    ///
    /// Weights and target index are carried over unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `mapper` returns a row with a different length than `schema`.
    pub fn map_rows_into<F>(&self, schema: Schema, mut mapper: F) -> Self
    where
        F: FnMut(&[Value]) -> Vec<Value>,
    {
        let expected_len = schema.len();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let out = mapper(row.as_slice());
                assert!(
                    out.len() == expected_len,
                    "mapped row length {} does not match schema length {}",
                    out.len(),
                    expected_len
                );
                out
            })
            .collect();

        Self {
            schema,
            rows,
            weights: self.weights.clone(),
            target_index: self.target_index,
        }
    }
}
