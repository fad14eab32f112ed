use std::path::Path;

use anyhow::Context;
use serde_json::Value;

use crate::models::{Dataset, EvaRecord};

/// Write the dataset as comma-delimited text: one header line, one line per
/// record, exactly as the dataset stands at call time. Overwrites `path`.
pub fn write_csv(dataset: &Dataset, path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open {} for writing", path.display()))?;

    writer.write_record(dataset.columns.iter().map(|column| column.name.as_str()))?;

    for record in &dataset.records {
        let row: Vec<String> = dataset
            .columns
            .iter()
            .map(|column| cell_text(record, &column.name))
            .collect();
        writer.write_record(&row)?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

fn cell_text(record: &EvaRecord, column: &str) -> String {
    match column {
        "eva" => record.eva.map(format_decimal).unwrap_or_default(),
        "date" => record.date.format("%Y-%m-%d").to_string(),
        "duration" => record.duration.clone(),
        name => match record.extra.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        },
    }
}

// integral floats keep a trailing ".0" so the column reads as decimal
fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, ColumnKind};
    use chrono::NaiveDate;
    use serde_json::Map;
    use tempfile::TempDir;

    fn record(eva: Option<f64>, date: &str, duration: &str) -> EvaRecord {
        EvaRecord {
            eva,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            duration: duration.to_string(),
            extra: Map::new(),
        }
    }

    fn sample_dataset() -> Dataset {
        Dataset {
            columns: vec![
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
            ],
            records: vec![
                record(Some(1.0), "2020-01-01", "1:30"),
                record(None, "2020-01-03", "0:45"),
            ],
        }
    }

    #[test]
    fn writes_header_plus_one_line_per_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eva_data.csv");
        let dataset = sample_dataset();

        write_csv(&dataset, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), dataset.records.len() + 1);
        assert_eq!(lines[0], "eva,date,duration");
        assert_eq!(lines[1], "1.0,2020-01-01,1:30");
        assert_eq!(lines[2], ",2020-01-03,0:45");
    }

    #[test]
    fn empty_dataset_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eva_data.csv");
        let mut dataset = sample_dataset();
        dataset.records.clear();

        write_csv(&dataset, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn rewriting_the_same_dataset_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        let dataset = sample_dataset();

        write_csv(&dataset, &first).unwrap();
        write_csv(&dataset, &second).unwrap();

        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }

    #[test]
    fn fields_containing_the_delimiter_are_quoted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eva_data.csv");
        let mut dataset = sample_dataset();
        dataset.columns.push(Column {
            name: "crew".to_string(),
            kind: ColumnKind::Text,
        });
        dataset.records[0]
            .extra
            .insert("crew".to_string(), "Behnken, Hurley".into());

        write_csv(&dataset, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"Behnken, Hurley\""));
    }

    #[test]
    fn round_trip_keeps_row_count_and_mandatory_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eva_data.csv");
        let dataset = sample_dataset();

        write_csv(&dataset, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        let date_at = headers.iter().position(|h| h == "date").unwrap();
        let duration_at = headers.iter().position(|h| h == "duration").unwrap();

        let rows: Vec<csv::StringRecord> =
            reader.records().map(|row| row.unwrap()).collect();
        assert_eq!(rows.len(), dataset.records.len());
        for (row, original) in rows.iter().zip(&dataset.records) {
            assert_eq!(row[date_at], original.date.format("%Y-%m-%d").to_string());
            assert_eq!(row[duration_at], original.duration);
        }
    }

    #[test]
    fn unwritable_destination_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no_such_dir").join("eva_data.csv");

        assert!(write_csv(&sample_dataset(), &path).is_err());
    }
}
