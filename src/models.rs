use std::fmt;

use chrono::NaiveDate;
use serde_json::Value;

/// Semantic type of a dataset column, fixed when the dataset is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Date,
    Decimal,
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnKind::Date => "date",
            ColumnKind::Decimal => "decimal",
            ColumnKind::Text => "text",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// One cleaned spacewalk event. `date` and `duration` are guaranteed present;
/// `eva` may be null in the source and stays optional. Any other source
/// fields ride along untouched in `extra`.
#[derive(Debug, Clone)]
pub struct EvaRecord {
    pub eva: Option<f64>,
    pub date: NaiveDate,
    pub duration: String,
    pub extra: serde_json::Map<String, Value>,
}

/// The in-memory table: a declared column schema plus the cleaned records,
/// kept in source order until the plotting stage sorts them by date.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub records: Vec<EvaRecord>,
}

/// One point of the derived cumulative series. Computed for plotting only,
/// never exported.
#[derive(Debug, Clone, Copy)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub duration_hours: f64,
    pub cumulative_hours: f64,
}
