//! Group-and-sum aggregation of usage rows.
//!
//! A single reducer, [`group_and_sum`], folds rows into buckets keyed by an
//! arbitrary extraction function. Each report dimension runs it once over the
//! same rows, so every row lands in exactly one bucket per table.

use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::models::{Bucket, Dimension, UsageRow};

/// Buckets of one grouping, in first-occurrence order of their keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupTable {
    label: &'static str,
    buckets: Vec<Bucket>,
    index: HashMap<String, usize>,
}

impl GroupTable {
    /// Create an empty table whose group column is titled `label`.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            buckets: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Title of the group column.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Bucket for a key, created empty on first use.
    pub fn bucket_mut(&mut self, key: &str) -> &mut Bucket {
        let position = match self.index.get(key) {
            Some(&position) => position,
            None => {
                self.buckets.push(Bucket::new(key));
                self.index.insert(key.to_string(), self.buckets.len() - 1);
                self.buckets.len() - 1
            }
        };
        &mut self.buckets[position]
    }

    /// Look up a bucket by key.
    pub fn get(&self, key: &str) -> Option<&Bucket> {
        self.index.get(key).map(|&position| &self.buckets[position])
    }

    /// Buckets in key insertion order.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Consume the table, yielding its buckets in key insertion order.
    pub fn into_buckets(self) -> Vec<Bucket> {
        self.buckets
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no row was folded.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Fold rows into buckets keyed by `key`.
///
/// Every row adds its amount to the minutes, `amount * unit_price_dollar` to
/// the cost, and its repository to the repository list of its bucket.
/// Fails as soon as a bucket total would overflow.
pub fn group_and_sum<F>(rows: &[UsageRow], key: F, label: &'static str) -> Result<GroupTable>
where
    F: Fn(&UsageRow) -> &str,
{
    let mut table = GroupTable::new(label);
    for row in rows {
        table.bucket_mut(key(row)).add(row)?;
    }
    Ok(table)
}

/// Aggregate rows along one dimension.
pub fn aggregate(rows: &[UsageRow], dimension: Dimension) -> Result<GroupTable> {
    let table = group_and_sum(rows, |row| dimension.key(row), dimension.label())?;
    debug!(table = dimension.table_name(), groups = table.len(), "Aggregated rows");
    Ok(table)
}

/// Aggregate rows along every dimension, in report order.
pub fn aggregate_all(rows: &[UsageRow]) -> Result<Vec<(Dimension, GroupTable)>> {
    Dimension::ALL
        .iter()
        .map(|&dimension| Ok((dimension, aggregate(rows, dimension)?)))
        .collect()
}
