use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::models::{Column, ColumnKind, Dataset, EvaRecord};

const REQUIRED_COLUMNS: [&str; 3] = ["eva", "date", "duration"];

#[derive(Debug, Deserialize)]
struct RawEvent {
    eva: Option<Value>,
    date: Option<Value>,
    duration: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Read a JSON array of spacewalk events into a cleaned [`Dataset`].
///
/// Rows with a null date or null duration are dropped; every other field is
/// carried through unchanged. Any malformed value aborts the whole load.
pub fn read_json_dataset(path: &Path) -> anyhow::Result<Dataset> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if !bytes.is_ascii() {
        bail!(
            "{} contains non-ASCII bytes; input must be 7-bit ASCII",
            path.display()
        );
    }

    let document: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let rows = document
        .as_array()
        .with_context(|| format!("{} must hold a top-level JSON array", path.display()))?;

    if rows.is_empty() {
        return Ok(Dataset {
            columns: required_columns(),
            records: Vec::new(),
        });
    }

    check_schema(rows)?;

    let raw_events: Vec<RawEvent> =
        serde_json::from_value(document).context("failed to decode event objects")?;

    let mut columns = required_columns();
    let mut seen: HashSet<String> = columns.iter().map(|column| column.name.clone()).collect();
    let mut records = Vec::new();

    for (index, raw) in raw_events.into_iter().enumerate() {
        let eva = coerce_eva(raw.eva.as_ref(), index)?;
        let date = parse_date(raw.date.as_ref(), index)?;
        let duration = duration_text(raw.duration.as_ref(), index)?;

        // passthrough columns enter the schema even when the row itself
        // ends up dropped
        for name in raw.extra.keys() {
            if seen.insert(name.clone()) {
                columns.push(Column {
                    name: name.clone(),
                    kind: ColumnKind::Text,
                });
            }
        }

        let (Some(date), Some(duration)) = (date, duration) else {
            continue;
        };

        records.push(EvaRecord {
            eva,
            date,
            duration,
            extra: raw.extra,
        });
    }

    Ok(Dataset { columns, records })
}

fn required_columns() -> Vec<Column> {
    vec![
        Column {
            name: "eva".to_string(),
            kind: ColumnKind::Decimal,
        },
        Column {
            name: "date".to_string(),
            kind: ColumnKind::Date,
        },
        Column {
            name: "duration".to_string(),
            kind: ColumnKind::Text,
        },
    ]
}

/// The mandatory column names must exist somewhere in the input; a name
/// absent from every object is a schema error, unlike a per-row null.
fn check_schema(rows: &[Value]) -> anyhow::Result<()> {
    let mut present: HashSet<&str> = HashSet::new();
    for (index, row) in rows.iter().enumerate() {
        let object = row
            .as_object()
            .with_context(|| format!("row {index} is not a JSON object"))?;
        present.extend(object.keys().map(String::as_str));
    }

    for name in REQUIRED_COLUMNS {
        if !present.contains(name) {
            bail!("required column {name:?} is missing from the input schema");
        }
    }

    Ok(())
}

fn coerce_eva(value: Option<&Value>, index: usize) -> anyhow::Result<Option<f64>> {
    match value {
        None => Ok(None),
        Some(Value::Number(number)) => number
            .as_f64()
            .map(Some)
            .with_context(|| format!("row {index}: eva value {number} does not fit a float")),
        Some(Value::String(text)) => {
            let parsed = text
                .trim()
                .parse::<f64>()
                .with_context(|| format!("row {index}: eva value {text:?} is not numeric"))?;
            Ok(Some(parsed))
        }
        Some(other) => bail!("row {index}: eva value {other} is not numeric"),
    }
}

fn parse_date(value: Option<&Value>, index: usize) -> anyhow::Result<Option<NaiveDate>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let text = value
        .as_str()
        .with_context(|| format!("row {index}: date value {value} is not a string"))?;
    let date = parse_iso_date(text)
        .with_context(|| format!("row {index}: date value {text:?} is not an ISO-8601 date"))?;
    Ok(Some(date))
}

fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(stamp.date());
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|stamp| stamp.date_naive())
}

fn duration_text(value: Option<&Value>, index: usize) -> anyhow::Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => bail!("row {index}: duration value {other} is not text"),
    }
}
