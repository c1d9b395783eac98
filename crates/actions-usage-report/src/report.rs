//! Final report structure and its assembly from aggregated tables.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::aggregator::GroupTable;
use crate::models::{Bucket, COST_COLUMN, Dimension, MINUTES_COLUMN, REPOSITORIES_COLUMN};
use crate::precision::PrecisionNormalizer;

/// A finalized bucket, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    /// Title of the group column ("Day", "Username", ...)
    pub label: &'static str,

    /// Group key
    pub group: String,

    /// Total minutes
    pub minutes: i64,

    /// Total cost padded to the report precision
    pub cost: String,

    /// Distinct repositories joined by the separator; absent per repository
    pub repositories: Option<String>,
}

impl SummaryRow {
    /// Column titles in display order.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec![self.label, MINUTES_COLUMN, COST_COLUMN];
        if self.repositories.is_some() {
            columns.push(REPOSITORIES_COLUMN);
        }
        columns
    }

    /// Cell values in display order.
    pub fn cells(&self) -> Vec<String> {
        let mut cells = vec![self.group.clone(), self.minutes.to_string(), self.cost.clone()];
        if let Some(repositories) = &self.repositories {
            cells.push(repositories.clone());
        }
        cells
    }
}

impl Serialize for SummaryRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.repositories.is_some() { 4 } else { 3 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(self.label, &self.group)?;
        map.serialize_entry(MINUTES_COLUMN, &self.minutes)?;
        map.serialize_entry(COST_COLUMN, &self.cost)?;
        if let Some(repositories) = &self.repositories {
            map.serialize_entry(REPOSITORIES_COLUMN, repositories)?;
        }
        map.end()
    }
}

/// One named summary table, keyed by group in first-occurrence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    dimension: Dimension,
    rows: Vec<SummaryRow>,
    index: HashMap<String, usize>,
}

impl ReportTable {
    fn new(dimension: Dimension, rows: Vec<SummaryRow>) -> Self {
        let index = rows
            .iter()
            .enumerate()
            .map(|(position, row)| (row.group.clone(), position))
            .collect();
        Self {
            dimension,
            rows,
            index,
        }
    }

    /// Dimension this table summarizes.
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Table name ("Per Day", ...).
    pub fn name(&self) -> &'static str {
        self.dimension.table_name()
    }

    /// Column titles in display order.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec![self.dimension.label(), MINUTES_COLUMN, COST_COLUMN];
        if self.dimension.lists_repositories() {
            columns.push(REPOSITORIES_COLUMN);
        }
        columns
    }

    /// Look up a row by group key.
    pub fn get(&self, key: &str) -> Option<&SummaryRow> {
        self.index.get(key).map(|&position| &self.rows[position])
    }

    /// Group keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.group.as_str())
    }

    /// Rows in order.
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no groups.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Serialize for ReportTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for row in &self.rows {
            map.serialize_entry(&row.group, row)?;
        }
        map.end()
    }
}

/// The four summary tables of one usage export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    tables: Vec<ReportTable>,
    decimal_places: u32,
}

impl Report {
    /// Tables in fixed order: Per Day, Per User, Per Workflow, Per Repository.
    pub fn tables(&self) -> &[ReportTable] {
        &self.tables
    }

    /// Table of a dimension.
    pub fn table(&self, dimension: Dimension) -> &ReportTable {
        // `assemble` stores exactly one table per dimension in `Dimension::ALL` order.
        &self.tables[dimension as usize]
    }

    /// Look up a table by its name.
    pub fn table_by_name(&self, name: &str) -> Option<&ReportTable> {
        self.tables.iter().find(|table| table.name() == name)
    }

    /// The "Per Day" table.
    pub fn per_day(&self) -> &ReportTable {
        self.table(Dimension::Day)
    }

    /// The "Per User" table.
    pub fn per_user(&self) -> &ReportTable {
        self.table(Dimension::Username)
    }

    /// The "Per Workflow" table.
    pub fn per_workflow(&self) -> &ReportTable {
        self.table(Dimension::Workflow)
    }

    /// The "Per Repository" table.
    pub fn per_repository(&self) -> &ReportTable {
        self.table(Dimension::Repository)
    }

    /// Number of decimals every cost is rendered with.
    pub fn decimal_places(&self) -> u32 {
        self.decimal_places
    }

    /// Whether no row contributed to the report.
    pub fn is_empty(&self) -> bool {
        self.per_day().is_empty()
    }

    /// First and last day of the report, in input order.
    ///
    /// `None` when there are no days or either end is not a `YYYY-MM-DD` date.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let days = self.per_day();
        let first = days.keys().next()?;
        let last = days.keys().last()?;
        let parse = |day: &str| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok();
        Some((parse(first)?, parse(last)?))
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for table in &self.tables {
            map.serialize_entry(table.name(), table)?;
        }
        map.end()
    }
}

/// Turns aggregated buckets into a [`Report`].
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    normalizer: PrecisionNormalizer,
    separator: String,
}

impl ReportAssembler {
    /// Create an assembler padding costs with `normalizer` and joining
    /// repositories with `separator`.
    pub fn new(normalizer: PrecisionNormalizer, separator: impl Into<String>) -> Self {
        Self {
            normalizer,
            separator: separator.into(),
        }
    }

    /// Finalize one bucket.
    pub fn finalize(&self, dimension: Dimension, bucket: Bucket) -> SummaryRow {
        let repositories = dimension
            .lists_repositories()
            .then(|| bucket.distinct_repositories().join(self.separator.as_str()));

        SummaryRow {
            label: dimension.label(),
            cost: self.normalizer.format(bucket.cost_dollars),
            minutes: bucket.minutes,
            repositories,
            group: bucket.group_label,
        }
    }

    /// Assemble the report from one table per dimension.
    ///
    /// Tables may arrive in any order; dimensions without a table yield an
    /// empty table.
    pub fn assemble(&self, tables: Vec<(Dimension, GroupTable)>) -> Report {
        let mut by_dimension: HashMap<Dimension, GroupTable> = tables.into_iter().collect();

        let tables = Dimension::ALL
            .iter()
            .map(|&dimension| {
                let rows = by_dimension
                    .remove(&dimension)
                    .map(GroupTable::into_buckets)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|bucket| self.finalize(dimension, bucket))
                    .collect();
                ReportTable::new(dimension, rows)
            })
            .collect();

        debug!(decimal_places = self.normalizer.places(), "Assembled report");

        Report {
            tables,
            decimal_places: self.normalizer.places(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate_all;
    use crate::models::test_support::row;
    use crate::models::UsageRow;

    fn build(rows: &[UsageRow]) -> Report {
        ReportAssembler::new(PrecisionNormalizer::from_rows(rows), ", ").assemble(aggregate_all(rows).unwrap())
    }

    fn example_rows() -> Vec<UsageRow> {
        vec![
            row("2024-01-01", "alice", "r1", "ci", 10, "0.008"),
            row("2024-01-01", "bob", "r2", "ci", 5, "0.008"),
        ]
    }

    #[test]
    fn test_example_report() {
        let report = build(&example_rows());

        let day = report.per_day().get("2024-01-01").unwrap();
        assert_eq!(day.minutes, 15);
        assert_eq!(day.cost, "0.120");
        assert_eq!(day.repositories.as_deref(), Some("r1, r2"));

        let workflow = report.per_workflow().get("ci").unwrap();
        assert_eq!(workflow.minutes, 15);
        assert_eq!(workflow.cost, "0.120");
        assert_eq!(workflow.repositories.as_deref(), Some("r1, r2"));

        let repos = report.per_repository();
        assert_eq!(repos.len(), 2);
        let r1 = repos.get("r1").unwrap();
        assert_eq!((r1.minutes, r1.cost.as_str(), r1.repositories.as_deref()), (10, "0.080", None));
        let r2 = repos.get("r2").unwrap();
        assert_eq!((r2.minutes, r2.cost.as_str(), r2.repositories.as_deref()), (5, "0.040", None));
    }

    #[test]
    fn test_table_order_and_names() {
        let report = build(&example_rows());
        let names: Vec<_> = report.tables().iter().map(ReportTable::name).collect();
        assert_eq!(names, ["Per Day", "Per User", "Per Workflow", "Per Repository"]);
        assert_eq!(report.table_by_name("Per User").unwrap().len(), 2);
        assert!(report.table_by_name("Per Owner").is_none());
    }

    #[test]
    fn test_repositories_are_deduplicated_in_order() {
        let rows = vec![
            row("2024-01-01", "alice", "r2", "ci", 1, "0.008"),
            row("2024-01-01", "alice", "r1", "ci", 1, "0.008"),
            row("2024-01-01", "alice", "r2", "ci", 1, "0.008"),
        ];
        let report = build(&rows);
        let user = report.per_user().get("alice").unwrap();
        assert_eq!(user.repositories.as_deref(), Some("r2, r1"));
    }

    #[test]
    fn test_costs_share_one_width() {
        let rows = vec![
            row("2024-01-01", "alice", "r1", "ci", 10, "0.16"),
            row("2024-01-02", "bob", "r2", "ci", 3, "0.008"),
        ];
        let report = build(&rows);
        assert_eq!(report.decimal_places(), 3);
        assert_eq!(report.per_day().get("2024-01-01").unwrap().cost, "1.600");
        assert_eq!(report.per_day().get("2024-01-02").unwrap().cost, "0.024");
        assert_eq!(report.per_workflow().get("ci").unwrap().cost, "1.624");
    }

    #[test]
    fn test_columns() {
        let report = build(&example_rows());
        assert_eq!(
            report.per_user().columns(),
            ["Username", "Minutes", "Cost ($)", "Repositories"]
        );
        assert_eq!(
            report.per_repository().columns(),
            ["Repository", "Minutes", "Cost ($)"]
        );
        let row = report.per_repository().get("r1").unwrap();
        assert_eq!(row.columns(), report.per_repository().columns());
        assert_eq!(row.cells(), ["r1", "10", "0.080"]);
    }

    #[test]
    fn test_serialized_shape() {
        let report = build(&example_rows());
        let value = serde_json::to_value(&report).unwrap();

        let day = &value["Per Day"]["2024-01-01"];
        assert_eq!(day["Day"], "2024-01-01");
        assert_eq!(day["Minutes"], 15);
        assert_eq!(day["Cost ($)"], "0.120");
        assert_eq!(day["Repositories"], "r1, r2");

        let repo = value["Per Repository"]["r2"].as_object().unwrap();
        assert_eq!(repo["Repository"], "r2");
        assert!(!repo.contains_key("Repositories"));

        let json = serde_json::to_string(&report).unwrap();
        let day_at = json.find("Per Day").unwrap();
        let repo_at = json.find("Per Repository").unwrap();
        assert!(day_at < repo_at);
    }

    #[test]
    fn test_date_range() {
        let rows = vec![
            row("2024-01-03", "alice", "r1", "ci", 1, "0.008"),
            row("2024-01-01", "alice", "r1", "ci", 1, "0.008"),
            row("2024-01-05", "alice", "r1", "ci", 1, "0.008"),
        ];
        let (from, to) = build(&rows).date_range().unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn test_date_range_needs_dates() {
        assert!(build(&[]).date_range().is_none());
        let rows = vec![row("yesterday", "alice", "r1", "ci", 1, "0.008")];
        assert!(build(&rows).date_range().is_none());
    }

    #[test]
    fn test_empty_report_has_four_empty_tables() {
        let report = build(&[]);
        assert!(report.is_empty());
        assert_eq!(report.tables().len(), 4);
        assert!(report.tables().iter().all(ReportTable::is_empty));
        assert_eq!(report.decimal_places(), 0);
    }

    #[test]
    fn test_assemble_fills_missing_dimensions() {
        let rows = example_rows();
        let only_days = vec![(Dimension::Day, crate::aggregator::aggregate(&rows, Dimension::Day).unwrap())];
        let report = ReportAssembler::new(PrecisionNormalizer::new(3), ", ").assemble(only_days);
        assert_eq!(report.per_day().len(), 1);
        assert!(report.per_repository().is_empty());
    }
}
