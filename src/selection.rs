//! Attribute selection by range expression.
//!
//! A range expression is a comma-separated list of 1-based column references. Each item is
//! `first`, `last`, a column number, or a span `a-b` whose bounds are any of those, e.g.
//! `"1-3,5,8-last"`.

use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, EncodingResult};
use crate::types::Schema;

/// Expression used when no attribute indices are configured.
pub const DEFAULT_RANGE: &str = "first-last";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    First,
    Last,
    Index(usize),
}

impl Bound {
    fn resolve(self, column_count: usize) -> usize {
        match self {
            Self::First => 1,
            Self::Last => column_count,
            Self::Index(i) => i,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: Bound,
    end: Bound,
}

/// One column picked by a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedColumn {
    /// 0-based column index.
    pub index: usize,
    /// `true` if the column is nominal and not the target.
    pub encodable: bool,
}

/// Ordered, duplicate-free set of selected columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSelection {
    columns: Vec<SelectedColumn>,
}

impl AttributeSelection {
    /// Selected columns in resolution order.
    pub fn columns(&self) -> &[SelectedColumn] {
        &self.columns
    }

    /// Selected column indices in resolution order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns.iter().map(|c| c.index)
    }

    /// Indices of the encodable columns in resolution order.
    pub fn encodable(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns.iter().filter(|c| c.encodable).map(|c| c.index)
    }

    /// Returns `true` if column `index` is selected and encodable.
    pub fn is_encodable(&self, index: usize) -> bool {
        self.columns.iter().any(|c| c.index == index && c.encodable)
    }

    /// Number of selected columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Parsed range expression, resolved against a schema on demand.
///
/// Syntax errors surface from [`AttributeSelector::parse`]; bound errors surface from
/// [`AttributeSelector::resolve`], which depends on the column count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    expression: String,
    spans: Vec<Span>,
}

impl Default for AttributeSelector {
    fn default() -> Self {
        Self {
            expression: DEFAULT_RANGE.to_string(),
            spans: vec![Span {
                start: Bound::First,
                end: Bound::Last,
            }],
        }
    }
}

impl AttributeSelector {
    /// Parse a range expression.
    pub fn parse(expression: &str) -> EncodingResult<Self> {
        let mut spans = Vec::new();
        for item in expression.split(',') {
            let item = item.trim();
            if item.is_empty() {
                return Err(invalid(expression, "empty range item"));
            }
            let span = match item.split_once('-') {
                Some((a, b)) => Span {
                    start: parse_bound(expression, a)?,
                    end: parse_bound(expression, b)?,
                },
                None => {
                    let bound = parse_bound(expression, item)?;
                    Span {
                        start: bound,
                        end: bound,
                    }
                }
            };
            spans.push(span);
        }
        Ok(Self {
            expression: expression.to_string(),
            spans,
        })
    }

    /// The expression this selector was parsed from.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Resolve to 0-based column indices for a dataset with `column_count` columns.
    ///
    /// Order follows the expression; repeated columns keep their first position.
    pub fn resolve_indices(&self, column_count: usize) -> EncodingResult<Vec<usize>> {
        let mut seen = vec![false; column_count];
        let mut out = Vec::new();
        for span in &self.spans {
            let start = span.start.resolve(column_count);
            let end = span.end.resolve(column_count);
            for bound in [start, end] {
                if bound < 1 || bound > column_count {
                    return Err(invalid(
                        &self.expression,
                        &format!("column {bound} outside [1, {column_count}]"),
                    ));
                }
            }
            if start > end {
                return Err(invalid(
                    &self.expression,
                    &format!("span {start}-{end} is reversed"),
                ));
            }
            for idx in (start - 1)..end {
                if !seen[idx] {
                    seen[idx] = true;
                    out.push(idx);
                }
            }
        }
        Ok(out)
    }

    /// Resolve against `schema` and flag each column as encodable (nominal and not the target).
    pub fn resolve(&self, schema: &Schema, target_index: usize) -> EncodingResult<AttributeSelection> {
        let columns = self
            .resolve_indices(schema.len())?
            .into_iter()
            .map(|index| SelectedColumn {
                index,
                encodable: index != target_index && schema.fields[index].data_type.is_nominal(),
            })
            .collect();
        Ok(AttributeSelection { columns })
    }
}

fn parse_bound(expression: &str, token: &str) -> EncodingResult<Bound> {
    let token = token.trim();
    if token.eq_ignore_ascii_case("first") {
        return Ok(Bound::First);
    }
    if token.eq_ignore_ascii_case("last") {
        return Ok(Bound::Last);
    }
    match token.parse::<usize>() {
        Ok(0) => Err(invalid(expression, "column numbers are 1-based")),
        Ok(i) => Ok(Bound::Index(i)),
        Err(_) => Err(invalid(expression, &format!("unrecognized token '{token}'"))),
    }
}

fn invalid(expression: &str, message: &str) -> EncodingError {
    EncodingError::InvalidRange {
        expression: expression.to_string(),
        message: message.to_string(),
    }
}
