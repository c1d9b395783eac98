//! Data models for usage analysis.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UsageError};

/// Column title of the summed quantity.
pub const MINUTES_COLUMN: &str = "Minutes";

/// Column title of the summed cost.
pub const COST_COLUMN: &str = "Cost ($)";

/// Column title of the joined repository list.
pub const REPOSITORIES_COLUMN: &str = "Repositories";

/// One metered line of a usage export, kept after product filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRow {
    /// Billing date as written in the export (e.g. "2024-01-01")
    pub date: String,

    /// Product line (always the configured product, e.g. "Actions")
    pub product: String,

    /// SKU of the runner (e.g. "Compute - UBUNTU")
    pub product_type: String,

    /// Number of billed units
    pub amount: i64,

    /// Billing unit (e.g. "minute")
    pub unit_type: String,

    /// Price of one unit in dollars
    pub unit_price_dollar: Decimal,

    /// Price multiplier of the runner
    pub unit_price_multiplier: Decimal,

    /// Organization or user owning the repository
    pub owner: String,

    /// Repository slug
    pub repository: String,

    /// User that triggered the run
    pub username: String,

    /// Workflow file path
    pub workflow: String,
}

impl UsageRow {
    /// Cost of this row in dollars (`amount * unit_price_dollar`).
    ///
    /// `None` when the product does not fit a [`Decimal`].
    pub fn cost(&self) -> Option<Decimal> {
        Decimal::from(self.amount).checked_mul(self.unit_price_dollar)
    }
}

/// A way of summarizing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    /// Group by billing date
    Day,
    /// Group by triggering user
    Username,
    /// Group by workflow
    Workflow,
    /// Group by repository
    Repository,
}

impl Dimension {
    /// All dimensions in report order.
    pub const ALL: [Dimension; 4] = [
        Dimension::Day,
        Dimension::Username,
        Dimension::Workflow,
        Dimension::Repository,
    ];

    /// Title of the group column.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Day => "Day",
            Dimension::Username => "Username",
            Dimension::Workflow => "Workflow",
            Dimension::Repository => "Repository",
        }
    }

    /// Name of the report table for this dimension.
    pub fn table_name(self) -> &'static str {
        match self {
            Dimension::Day => "Per Day",
            Dimension::Username => "Per User",
            Dimension::Workflow => "Per Workflow",
            Dimension::Repository => "Per Repository",
        }
    }

    /// Extract the grouping key from a row.
    pub fn key(self, row: &UsageRow) -> &str {
        match self {
            Dimension::Day => &row.date,
            Dimension::Username => &row.username,
            Dimension::Workflow => &row.workflow,
            Dimension::Repository => &row.repository,
        }
    }

    /// Whether summary rows carry the repository list.
    ///
    /// The repository table does not: its key already is the repository.
    pub fn lists_repositories(self) -> bool {
        self != Dimension::Repository
    }
}

/// Running totals for one distinct group key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// The key value itself (a date, a username, ...)
    pub group_label: String,

    /// Sum of `amount`
    pub minutes: i64,

    /// Sum of `amount * unit_price_dollar`
    pub cost_dollars: Decimal,

    /// Repository of every folded row, in order, duplicates included
    pub repositories: Vec<String>,
}

impl Bucket {
    /// Create an empty bucket for a key.
    pub fn new(group_label: impl Into<String>) -> Self {
        Self {
            group_label: group_label.into(),
            minutes: 0,
            cost_dollars: Decimal::ZERO,
            repositories: Vec::new(),
        }
    }

    /// Fold a row into the totals.
    ///
    /// The bucket is left untouched when either total would overflow.
    pub fn add(&mut self, row: &UsageRow) -> Result<()> {
        let out_of_range = || UsageError::TotalOutOfRange {
            group: self.group_label.clone(),
        };
        let minutes = self
            .minutes
            .checked_add(row.amount)
            .ok_or_else(out_of_range)?;
        let cost_dollars = row
            .cost()
            .and_then(|cost| self.cost_dollars.checked_add(cost))
            .ok_or_else(out_of_range)?;

        self.minutes = minutes;
        self.cost_dollars = cost_dollars;
        self.repositories.push(row.repository.clone());
        Ok(())
    }

    /// Repositories without duplicates, in first-seen order.
    pub fn distinct_repositories(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.repositories
            .iter()
            .map(String::as_str)
            .filter(|repo| seen.insert(*repo))
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::row;
    use super::*;

    #[test]
    fn test_row_cost_is_exact() {
        let r = row("2024-01-01", "alice", "r1", "ci", 10, "0.008");
        assert_eq!(r.cost().unwrap().to_string(), "0.080");
    }

    #[test]
    fn test_row_cost_out_of_range() {
        let r = row("2024-01-01", "alice", "r1", "ci", i64::MAX, "100000000000");
        assert!(r.cost().is_none());

        let negative = row("2024-01-01", "alice", "r1", "ci", i64::MIN, "100000000000");
        assert!(negative.cost().is_none());
    }

    #[test]
    fn test_dimension_keys() {
        let r = row("2024-01-01", "alice", "r1", "ci.yml", 1, "0.008");
        assert_eq!(Dimension::Day.key(&r), "2024-01-01");
        assert_eq!(Dimension::Username.key(&r), "alice");
        assert_eq!(Dimension::Workflow.key(&r), "ci.yml");
        assert_eq!(Dimension::Repository.key(&r), "r1");
    }

    #[test]
    fn test_dimension_names() {
        let names: Vec<_> = Dimension::ALL.iter().map(|d| d.table_name()).collect();
        assert_eq!(
            names,
            ["Per Day", "Per User", "Per Workflow", "Per Repository"]
        );
        assert!(Dimension::Workflow.lists_repositories());
        assert!(!Dimension::Repository.lists_repositories());
    }

    #[test]
    fn test_bucket_accumulates() {
        let mut bucket = Bucket::new("2024-01-01");
        bucket.add(&row("2024-01-01", "alice", "r1", "ci", 10, "0.008")).unwrap();
        bucket.add(&row("2024-01-01", "bob", "r2", "ci", 5, "0.008")).unwrap();
        bucket.add(&row("2024-01-01", "bob", "r1", "ci", 1, "0.008")).unwrap();

        assert_eq!(bucket.minutes, 16);
        assert_eq!(bucket.cost_dollars.to_string(), "0.128");
        assert_eq!(bucket.repositories, ["r1", "r2", "r1"]);
        assert_eq!(bucket.distinct_repositories(), ["r1", "r2"]);
    }

    #[test]
    fn test_bucket_minutes_at_the_limit() {
        let mut bucket = Bucket::new("2024-01-01");
        bucket.add(&row("2024-01-01", "alice", "r1", "ci", i64::MAX, "0")).unwrap();
        assert_eq!(bucket.minutes, i64::MAX);

        let err = bucket
            .add(&row("2024-01-01", "bob", "r2", "ci", 1, "0"))
            .unwrap_err();
        assert!(matches!(err, UsageError::TotalOutOfRange { ref group } if group == "2024-01-01"));
        assert_eq!(bucket.minutes, i64::MAX);
        assert_eq!(bucket.repositories, ["r1"]);
    }

    #[test]
    fn test_bucket_cost_at_the_limit() {
        let mut bucket = Bucket::new("alice");
        bucket.add(&row("2024-01-01", "alice", "r1", "ci", 1, &Decimal::MAX.to_string())).unwrap();
        assert_eq!(bucket.cost_dollars, Decimal::MAX);

        let err = bucket
            .add(&row("2024-01-02", "alice", "r1", "ci", 1, "1"))
            .unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(bucket.cost_dollars, Decimal::MAX);
        assert_eq!(bucket.minutes, 1);
    }
}
