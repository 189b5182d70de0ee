//! Fitted category-to-code mapping.
//!
//! A [`CodeTable`] maps `(column, category)` to a finite real code. It is produced by an
//! [`crate::encoder::Encoder`] and is total over every fitted column's vocabulary: categories that
//! never occurred in the fitting data carry the encoder's fallback code.
//!
//! For storage, a table converts to a [`CodeTableRecord`]: an ordered list of
//! `(column, category, code)` triples plus the global fallback, serialized as JSON.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, EncodingResult};

/// Per-column code vectors indexed by category.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeTable {
    columns: BTreeMap<usize, Vec<f64>>,
    fallback: f64,
    global_mean: Option<f64>,
}

impl CodeTable {
    /// Create an empty table whose out-of-vocabulary code is `fallback`.
    pub fn new(fallback: f64) -> Self {
        Self {
            columns: BTreeMap::new(),
            fallback,
            global_mean: None,
        }
    }

    /// Create an empty table whose fallback is the global target mean.
    pub fn with_global_mean(global_mean: f64) -> Self {
        Self {
            columns: BTreeMap::new(),
            fallback: global_mean,
            global_mean: Some(global_mean),
        }
    }

    /// Set the codes for `column`, replacing any previous entry.
    pub fn insert(&mut self, column: usize, codes: Vec<f64>) {
        self.columns.insert(column, codes);
    }

    /// Code for `category` of `column`.
    ///
    /// Returns `None` if the column was not fitted. Categories beyond the fitted vocabulary
    /// resolve to [`CodeTable::fallback`].
    pub fn lookup(&self, column: usize, category: usize) -> Option<f64> {
        self.columns
            .get(&column)
            .map(|codes| codes.get(category).copied().unwrap_or(self.fallback))
    }

    /// Codes for `column` in category order.
    pub fn codes(&self, column: usize) -> Option<&[f64]> {
        self.columns.get(&column).map(Vec::as_slice)
    }

    /// Fitted column indices in ascending order.
    pub fn columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns.keys().copied()
    }

    /// Returns `true` if `column` has codes.
    pub fn contains(&self, column: usize) -> bool {
        self.columns.contains_key(&column)
    }

    /// Code used for categories that have no fitted entry.
    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    /// Global target mean recorded by mean encoding.
    pub fn global_mean(&self) -> Option<f64> {
        self.global_mean
    }

    /// Ordered `(column, category, code)` form of this table.
    pub fn to_record(&self) -> CodeTableRecord {
        let entries = self
            .columns
            .iter()
            .flat_map(|(&column, codes)| {
                codes.iter().enumerate().map(move |(category, &code)| CodeEntry {
                    column,
                    category,
                    code,
                })
            })
            .collect();
        CodeTableRecord {
            entries,
            global_mean: self.global_mean,
        }
    }

    /// Rebuild a table from its record form.
    ///
    /// Every fitted column must list a contiguous run of categories starting at 0, and every code
    /// must be finite.
    pub fn from_record(record: &CodeTableRecord) -> EncodingResult<Self> {
        let mut table = match record.global_mean {
            Some(mean) => Self::with_global_mean(mean),
            None => Self::new(0.0),
        };
        if !table.fallback.is_finite() {
            return Err(EncodingError::InvalidCodeTable {
                message: format!("non-finite global mean {}", table.fallback),
            });
        }

        for entry in &record.entries {
            if !entry.code.is_finite() {
                return Err(EncodingError::InvalidCodeTable {
                    message: format!(
                        "non-finite code {} for column {} category {}",
                        entry.code, entry.column, entry.category
                    ),
                });
            }
            let codes = table.columns.entry(entry.column).or_default();
            if entry.category != codes.len() {
                return Err(EncodingError::InvalidCodeTable {
                    message: format!(
                        "column {} expected category {}, found {}",
                        entry.column,
                        codes.len(),
                        entry.category
                    ),
                });
            }
            codes.push(entry.code);
        }
        Ok(table)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> EncodingResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_record())?)
    }

    /// Parse from a JSON string produced by [`CodeTable::to_json`].
    pub fn from_json(json: &str) -> EncodingResult<Self> {
        let record: CodeTableRecord = serde_json::from_str(json)?;
        Self::from_record(&record)
    }

    /// Write the JSON form to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> EncodingResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a table written by [`CodeTable::save`].
    pub fn load(path: impl AsRef<Path>) -> EncodingResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// One `(column, category, code)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub column: usize,
    pub category: usize,
    pub code: f64,
}

/// Storage form of a [`CodeTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeTableRecord {
    /// Entries ordered by column, then category.
    pub entries: Vec<CodeEntry>,
    /// Global target mean (mean encoding only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_mean: Option<f64>,
}
