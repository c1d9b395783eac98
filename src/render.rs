//! Terminal rendering of analysis outcomes.

use actions_usage_report::{Report, ReportTable};
use actions_usage_report::models::{COST_COLUMN, MINUTES_COLUMN};
use chrono::{Datelike, NaiveDate};

/// Hint shown when no file was given.
pub const EMPTY_FORM: &str = "\
No usage report given.

Download a usage report from your organization's billing settings and run:

    actions-usage path/to/usage_report.csv
";

/// Format a day like "Monday 1st January 2024".
pub fn long_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {}{} {}", date.format("%A"), day, suffix, date.format("%B %Y"))
}

/// Render one table with aligned columns. Numbers are right-aligned.
pub fn render_table(table: &ReportTable) -> String {
    let columns = table.columns();
    let cells: Vec<Vec<String>> = table.rows().iter().map(|row| row.cells()).collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, title)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(title.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let numeric: Vec<bool> = columns
        .iter()
        .map(|title| *title == MINUTES_COLUMN || *title == COST_COLUMN)
        .collect();

    let format_line = |values: &[String]| {
        let padded: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let width = widths[i];
                if numeric[i] {
                    format!("{value:>width$}")
                } else {
                    format!("{value:<width$}")
                }
            })
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let titles: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    let header = format_line(titles.as_slice());
    let rule = "-".repeat(header.chars().count());

    let mut lines = vec![table.name().to_string(), header, rule];
    lines.extend(cells.iter().map(|row| format_line(row.as_slice())));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Render the full report as text.
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();
    if let Some((from, to)) = report.date_range() {
        out.push_str(&format!("{} to {}\n\n", long_date(from), long_date(to)));
    }

    let tables: Vec<String> = report.tables().iter().map(render_table).collect();
    out.push_str(&tables.join("\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use actions_usage_report::UsageAnalyzer;

    const EXPORT: &str = "\
Date,Product,SKU,Quantity,Unit Type,Price Per Unit ($),Multiplier,Owner,Repository Slug,Username,Actions Workflow
2024-01-01,Actions,Compute - UBUNTU,10,minute,0.008,1.0,acme,r1,alice,ci
2024-01-03,Actions,Compute - UBUNTU,125,minute,0.008,1.0,acme,r2,bob,ci
";

    #[test]
    fn test_long_date_suffixes() {
        let date = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        assert_eq!(long_date(date(1)), "Monday 1st January 2024");
        assert_eq!(long_date(date(2)), "Tuesday 2nd January 2024");
        assert_eq!(long_date(date(3)), "Wednesday 3rd January 2024");
        assert_eq!(long_date(date(11)), "Thursday 11th January 2024");
        assert_eq!(long_date(date(12)), "Friday 12th January 2024");
        assert_eq!(long_date(date(13)), "Saturday 13th January 2024");
        assert_eq!(long_date(date(21)), "Sunday 21st January 2024");
        assert_eq!(long_date(date(22)), "Monday 22nd January 2024");
    }

    #[test]
    fn test_render_table_aligns_numbers() {
        let report = UsageAnalyzer::default().analyze_str(EXPORT).unwrap();
        let text = render_table(report.per_repository());
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Per Repository");
        assert_eq!(lines[1], "Repository  Minutes  Cost ($)");
        assert_eq!(lines[3], "r1               10     0.080");
        assert_eq!(lines[4], "r2              125     1.000");
    }

    #[test]
    fn test_render_report_heading() {
        let report = UsageAnalyzer::default().analyze_str(EXPORT).unwrap();
        let text = render_report(&report);

        assert!(text.starts_with("Monday 1st January 2024 to Wednesday 3rd January 2024\n"));
        for name in ["Per Day", "Per User", "Per Workflow", "Per Repository"] {
            assert!(text.contains(name));
        }
        assert!(text.contains("r1, r2"));
    }
}
