//! CSV parser for GitHub usage-billing exports.
//!
//! Columns are located through the header row, so column order in the export
//! does not matter. Rows of other products are dropped; rows of the analyzed
//! product must be metered in the configured unit or the whole parse aborts.
//!
//! Cells are read leniently: short rows have empty trailing cells, and
//! numeric cells use their leading number (`"12abc"` is 12, `"lots"` is 0).

use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;

use actions_usage_config::AnalyzerConfig;
use csv::StringRecord;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, trace};

use crate::error::{Result, UsageError};
use crate::models::UsageRow;

/// A column of the export the analysis reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    Product,
    ProductType,
    Amount,
    UnitType,
    UnitPriceDollar,
    UnitPriceMultiplier,
    Owner,
    Repository,
    Username,
    Workflow,
}

/// Number of required columns.
pub const FIELD_COUNT: usize = 11;

/// Header label of every required column, indexed by [`Field`].
pub const FIELD_MAPPING: [(&str, Field); FIELD_COUNT] = [
    ("Date", Field::Date),
    ("Product", Field::Product),
    ("SKU", Field::ProductType),
    ("Quantity", Field::Amount),
    ("Unit Type", Field::UnitType),
    ("Price Per Unit ($)", Field::UnitPriceDollar),
    ("Multiplier", Field::UnitPriceMultiplier),
    ("Owner", Field::Owner),
    ("Repository Slug", Field::Repository),
    ("Username", Field::Username),
    ("Actions Workflow", Field::Workflow),
];

impl Field {
    /// Header label of the column in the export.
    pub fn header(self) -> &'static str {
        FIELD_MAPPING[self as usize].0
    }
}

/// Column positions of the required fields, resolved from a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLookup {
    columns: [usize; FIELD_COUNT],
}

impl HeaderLookup {
    /// Resolve every required label in a header row.
    ///
    /// A byte-order mark before the first label is ignored. If a label occurs
    /// more than once the last column wins.
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (index, label) in headers.iter().enumerate() {
            let label = if index == 0 {
                label.trim_start_matches('\u{feff}')
            } else {
                label
            };
            positions.insert(label, index);
        }

        let missing: Vec<String> = FIELD_MAPPING
            .iter()
            .filter(|(label, _)| !positions.contains_key(label))
            .map(|(label, _)| label.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(UsageError::MissingHeaders { missing });
        }

        let mut columns = [0; FIELD_COUNT];
        for (label, field) in FIELD_MAPPING {
            columns[field as usize] = positions[label];
        }
        Ok(Self { columns })
    }

    /// Column index of a field.
    pub fn column(&self, field: Field) -> usize {
        self.columns[field as usize]
    }

    /// Cell of a field in a record, empty when the record is too short.
    pub fn get<'r>(&self, record: &'r StringRecord, field: Field) -> &'r str {
        record.get(self.column(field)).unwrap_or_default()
    }
}

/// Parser turning a usage export into [`UsageRow`]s.
#[derive(Debug, Clone)]
pub struct UsageParser {
    product: String,
    unit_type: String,
}

impl Default for UsageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageParser {
    /// Create a parser for GitHub Actions minutes.
    pub fn new() -> Self {
        Self::from_config(&AnalyzerConfig::default())
    }

    /// Create a parser using the product and unit type of a config.
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            product: config.product.clone(),
            unit_type: config.unit_type.clone(),
        }
    }

    /// Parse an export held in memory.
    pub fn parse_str(&self, data: &str) -> Result<Vec<UsageRow>> {
        self.parse_reader(data.as_bytes())
    }

    /// Parse an export from any reader, preserving row order.
    ///
    /// Fails before reading any row when required headers are missing.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Vec<UsageRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let lookup = HeaderLookup::from_headers(&headers)?;

        let mut rows = Vec::new();
        let mut skipped = 0usize;

        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            if lookup.get(&record, Field::Product) != self.product {
                trace!(line, product = lookup.get(&record, Field::Product), "Skipping row");
                skipped += 1;
                continue;
            }

            rows.push(self.parse_record(&lookup, &record, line)?);
        }

        debug!(rows = rows.len(), skipped, product = %self.product, "Parsed usage export");
        Ok(rows)
    }

    /// Map one record of the analyzed product to a [`UsageRow`].
    fn parse_record(
        &self,
        lookup: &HeaderLookup,
        record: &StringRecord,
        line: u64,
    ) -> Result<UsageRow> {
        let text = |field| lookup.get(record, field).to_string();

        let row = UsageRow {
            date: text(Field::Date),
            product: text(Field::Product),
            product_type: text(Field::ProductType),
            amount: parse_quantity(lookup.get(record, Field::Amount)),
            unit_type: text(Field::UnitType),
            unit_price_dollar: parse_decimal(lookup.get(record, Field::UnitPriceDollar)),
            unit_price_multiplier: parse_decimal(lookup.get(record, Field::UnitPriceMultiplier)),
            owner: text(Field::Owner),
            repository: text(Field::Repository),
            username: text(Field::Username),
            workflow: text(Field::Workflow),
        };

        if row.unit_type != self.unit_type {
            return Err(UsageError::UnexpectedUnitType {
                unit_type: row.unit_type,
                line,
            });
        }

        if row.cost().is_none() {
            return Err(UsageError::CostOutOfRange { line });
        }

        Ok(row)
    }
}

/// Leading number of a cell: optional sign, digits with an optional fraction,
/// and an optional exponent. Empty when the cell does not start with a number.
fn numeric_prefix(value: &str) -> &str {
    let value = value.trim_start();
    let bytes = value.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let whole = digits_from(end);
    end += whole;

    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(end + 1);
        if fraction > 0 {
            end += 1 + fraction;
        }
    }
    if whole + fraction == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent = digits_from(end + 1 + sign);
        if exponent > 0 {
            end += 1 + sign + exponent;
        }
    }

    &value[..end]
}

/// Coerce a decimal cell. Cells without a leading number, or whose number
/// does not fit a [`Decimal`], count as zero.
fn parse_decimal(value: &str) -> Decimal {
    let number = numeric_prefix(value);
    if number.is_empty() {
        return Decimal::ZERO;
    }

    Decimal::from_str(number)
        .or_else(|_| Decimal::from_scientific(number))
        .unwrap_or(Decimal::ZERO)
}

/// Coerce a quantity cell to whole units, truncating any fraction.
///
/// Numbers beyond the `i64` range saturate at its bounds.
fn parse_quantity(value: &str) -> i64 {
    let number = numeric_prefix(value);
    if let Ok(amount) = number.parse::<i64>() {
        return amount;
    }

    let amount = parse_decimal(number).trunc();
    amount.to_i64().unwrap_or(if amount.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}
