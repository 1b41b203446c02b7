//! Full outer join of two datasets with per-row provenance.
//!
//! The output holds every left column, then every right column, then a
//! `source` column saying whether the row came from the left input only, the
//! right input only, or both.
//!
//! # Matching
//!
//! Rows match when every key position is equal. Key cells are compared by
//! their display value, so an integer `7` on one side matches the text `"7"`
//! on the other, and a float `7.0` matches both. Null keys match each other.
//! Duplicate keys produce one output row per matching pair.
//!
//! # Row order
//!
//! Left rows in input order, each followed by its matches in right input
//! order; then the right rows that matched nothing, in input order.

use crate::error::{DocmatchError, JoinSide, Result};
use crate::table::{Dataset, StringColumn};
use arrow::array::{Array, ArrayRef, AsArray, StringArray, UInt64Array};
use arrow::compute::take;
use arrow::datatypes::{DataType, Float64Type};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

pub const SOURCE_COLUMN: &str = "source";
pub const LEFT_SUFFIX: &str = "_df1";
pub const RIGHT_SUFFIX: &str = "_df2";

/// Provenance of a merged row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeSource {
    OnlyLeft,
    OnlyRight,
    Both,
}

impl MergeSource {
    pub fn label(self) -> &'static str {
        match self {
            MergeSource::OnlyLeft => "Only in df1",
            MergeSource::OnlyRight => "Only in df2",
            MergeSource::Both => "In both",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Only in df1" => Some(MergeSource::OnlyLeft),
            "Only in df2" => Some(MergeSource::OnlyRight),
            "In both" => Some(MergeSource::Both),
            _ => None,
        }
    }
}

impl fmt::Display for MergeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Parallel key column lists, one per input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinKeys {
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl JoinKeys {
    pub fn new<L, R>(left: L, right: R) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            left: left.into_iter().map(Into::into).collect(),
            right: right.into_iter().map(Into::into).collect(),
        }
    }

    /// Check the key lists against both inputs. Fails on the first problem,
    /// in this order: list lengths, left columns, right columns.
    pub fn validate(&self, left: &Dataset, right: &Dataset) -> Result<()> {
        if self.left.is_empty() || self.right.is_empty() || self.left.len() != self.right.len() {
            return Err(DocmatchError::KeyMismatch {
                left: self.left.clone(),
                right: self.right.clone(),
            });
        }
        check_columns(JoinSide::Left, left, &self.left)?;
        check_columns(JoinSide::Right, right, &self.right)?;
        Ok(())
    }
}

fn check_columns(side: JoinSide, dataset: &Dataset, keys: &[String]) -> Result<()> {
    let missing: Vec<String> = keys
        .iter()
        .filter(|k| !dataset.has_column(k))
        .cloned()
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(DocmatchError::MissingColumns {
        side,
        missing,
        available: dataset.column_names(),
    })
}

/// Row counts per [`MergeSource`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub only_left: usize,
    pub only_right: usize,
    pub both: usize,
}

impl MergeSummary {
    pub fn total(&self) -> usize {
        self.only_left + self.only_right + self.both
    }

    pub fn count(&self, source: MergeSource) -> usize {
        match source {
            MergeSource::OnlyLeft => self.only_left,
            MergeSource::OnlyRight => self.only_right,
            MergeSource::Both => self.both,
        }
    }

    fn record(&mut self, source: MergeSource) {
        match source {
            MergeSource::OnlyLeft => self.only_left += 1,
            MergeSource::OnlyRight => self.only_right += 1,
            MergeSource::Both => self.both += 1,
        }
    }
}

impl fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<12} {}", MergeSource::Both, self.both)?;
        writeln!(f, "{:<12} {}", MergeSource::OnlyLeft, self.only_left)?;
        write!(f, "{:<12} {}", MergeSource::OnlyRight, self.only_right)
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub dataset: Dataset,
    pub summary: MergeSummary,
}

/// Full outer join of `left` and `right` on `left_on[i] == right_on[i]` for
/// every `i`.
pub fn merge(
    left: &Dataset,
    left_on: &[String],
    right: &Dataset,
    right_on: &[String],
) -> Result<MergeOutput> {
    merge_with(left, right, &JoinKeys::new(left_on.iter().cloned(), right_on.iter().cloned()))
}

pub fn merge_with(left: &Dataset, right: &Dataset, keys: &JoinKeys) -> Result<MergeOutput> {
    keys.validate(left, right)?;
    let output_names = output_column_names(left, right)?;

    info!(left_on = ?keys.left, right_on = ?keys.right, "Merging datasets");

    let left_keys = key_tuples(left, &keys.left)?;
    let right_keys = key_tuples(right, &keys.right)?;

    let mut right_index: HashMap<&[Option<String>], Vec<usize>> = HashMap::new();
    for (row, key) in right_keys.iter().enumerate() {
        right_index.entry(key.as_slice()).or_default().push(row);
    }

    let mut left_rows: Vec<Option<u64>> = Vec::with_capacity(left.num_rows());
    let mut right_rows: Vec<Option<u64>> = Vec::with_capacity(left.num_rows());
    let mut sources: Vec<MergeSource> = Vec::with_capacity(left.num_rows());
    let mut right_matched = vec![false; right.num_rows()];

    for (l, key) in left_keys.iter().enumerate() {
        match right_index.get(key.as_slice()) {
            Some(matches) => {
                for &r in matches {
                    right_matched[r] = true;
                    left_rows.push(Some(l as u64));
                    right_rows.push(Some(r as u64));
                    sources.push(MergeSource::Both);
                }
            }
            None => {
                left_rows.push(Some(l as u64));
                right_rows.push(None);
                sources.push(MergeSource::OnlyLeft);
            }
        }
    }
    for (r, matched) in right_matched.iter().enumerate() {
        if !matched {
            left_rows.push(None);
            right_rows.push(Some(r as u64));
            sources.push(MergeSource::OnlyRight);
        }
    }

    let left_take = UInt64Array::from(left_rows);
    let right_take = UInt64Array::from(right_rows);

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(output_names.len());
    for array in left.record_batch().columns() {
        columns.push(take(array.as_ref(), &left_take, None)?);
    }
    for array in right.record_batch().columns() {
        columns.push(take(array.as_ref(), &right_take, None)?);
    }

    let mut summary = MergeSummary::default();
    for source in &sources {
        summary.record(*source);
    }
    let labels: ArrayRef = Arc::new(StringArray::from_iter_values(
        sources.iter().map(|s| s.label()),
    ));
    columns.push(labels);

    let dataset = Dataset::new(output_names.into_iter().zip(columns).collect())?;

    info!(
        rows = dataset.num_rows(),
        columns = dataset.num_columns(),
        in_both = summary.both,
        only_left = summary.only_left,
        only_right = summary.only_right,
        "Merge complete"
    );

    Ok(MergeOutput { dataset, summary })
}

/// Left names, right names, then `source`. Names found on both sides get the
/// origin suffix. Any remaining duplicate is a configuration error.
fn output_column_names(left: &Dataset, right: &Dataset) -> Result<Vec<String>> {
    let left_names = left.column_names();
    let right_names = right.column_names();
    let left_set: HashSet<&str> = left_names.iter().map(String::as_str).collect();
    let right_set: HashSet<&str> = right_names.iter().map(String::as_str).collect();

    let mut names = Vec::with_capacity(left_names.len() + right_names.len() + 1);
    for name in &left_names {
        if right_set.contains(name.as_str()) {
            names.push(format!("{name}{LEFT_SUFFIX}"));
        } else {
            names.push(name.clone());
        }
    }
    for name in &right_names {
        if left_set.contains(name.as_str()) {
            names.push(format!("{name}{RIGHT_SUFFIX}"));
        } else {
            names.push(name.clone());
        }
    }
    names.push(SOURCE_COLUMN.to_string());

    let mut seen = HashSet::with_capacity(names.len());
    for name in &names {
        if !seen.insert(name.as_str()) {
            return Err(DocmatchError::Config(format!(
                "merged output would contain column '{name}' twice; rename it in one of the inputs"
            )));
        }
    }
    debug!(columns = ?names, "Merged column layout");
    Ok(names)
}

/// One key tuple per row, in row order.
fn key_tuples(dataset: &Dataset, keys: &[String]) -> Result<Vec<Vec<Option<String>>>> {
    let columns = keys
        .iter()
        .map(|k| {
            dataset
                .column(k)
                .ok_or_else(|| DocmatchError::InvalidState(format!("key column '{k}' vanished")))
        })
        .collect::<Result<Vec<_>>>()?;
    let renderers = columns
        .iter()
        .map(|array| KeyColumn::new(array))
        .collect::<Result<Vec<_>>>()?;

    Ok((0..dataset.num_rows())
        .map(|row| renderers.iter().map(|r| r.get(row)).collect())
        .collect())
}

/// Display values for key comparison. Whole floats render without the
/// fraction so they compare equal to integers.
enum KeyColumn<'a> {
    Float(&'a ArrayRef),
    Display(StringColumn<'a>),
}

impl<'a> KeyColumn<'a> {
    fn new(array: &'a ArrayRef) -> Result<Self> {
        Ok(match array.data_type() {
            DataType::Float64 => KeyColumn::Float(array),
            _ => KeyColumn::Display(StringColumn::new(array)?),
        })
    }

    fn get(&self, row: usize) -> Option<String> {
        match self {
            KeyColumn::Float(array) => {
                if array.is_null(row) {
                    return None;
                }
                let value = array.as_primitive::<Float64Type>().value(row);
                if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                    Some((value as i64).to_string())
                } else {
                    Some(value.to_string())
                }
            }
            KeyColumn::Display(column) => column.get(row),
        }
    }
}
