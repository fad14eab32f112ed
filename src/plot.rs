use std::ops::Range;
use std::path::Path;

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use plotters::prelude::*;

use crate::models::{CumulativePoint, Dataset};

const CHART_SIZE: (u32, u32) = (1024, 768);

/// Reorder the records by date ascending. The sort is stable, so records
/// sharing a date keep their load order.
pub fn sort_by_date(dataset: &mut Dataset) {
    dataset.records.sort_by_key(|record| record.date);
}

/// Convert an "H:MM" duration string to decimal hours.
///
/// Minutes of 60 or more simply roll over ("1:90" is 2.5 hours); negative
/// or non-numeric parts are an error.
pub fn duration_to_hours(text: &str) -> anyhow::Result<f64> {
    let (hours, minutes) = text
        .split_once(':')
        .with_context(|| format!("duration {text:?} is not in H:MM form"))?;
    let hours: u32 = hours
        .parse()
        .with_context(|| format!("duration {text:?} has a non-numeric hours part"))?;
    let minutes: u32 = minutes
        .parse()
        .with_context(|| format!("duration {text:?} has a non-numeric minutes part"))?;
    Ok(f64::from(hours) + f64::from(minutes) / 60.0)
}

/// Derive the running total of decimal hours in the dataset's current order.
/// Call [`sort_by_date`] first for a time-ordered series.
pub fn cumulative_series(dataset: &Dataset) -> anyhow::Result<Vec<CumulativePoint>> {
    let mut total = 0.0;
    let mut points = Vec::with_capacity(dataset.records.len());

    for record in &dataset.records {
        let duration_hours = duration_to_hours(&record.duration)
            .with_context(|| format!("record dated {}", record.date))?;
        total += duration_hours;
        points.push(CumulativePoint {
            date: record.date,
            duration_hours,
            cumulative_hours: total,
        });
    }

    Ok(points)
}

/// Render the cumulative series as a black line-and-marker chart and write
/// it to `path` as a PNG. An empty series still produces a chart, just with
/// no data points.
pub fn render_chart(points: &[CumulativePoint], path: &Path) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_range, y_upper) = axis_ranges(points)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0f64..y_upper)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Total time spent in space to date (hours)")
        .draw()?;

    if !points.is_empty() {
        chart.draw_series(LineSeries::new(
            points
                .iter()
                .map(|point| (point.date, point.cumulative_hours)),
            &BLACK,
        ))?;
        chart.draw_series(points.iter().map(|point| {
            Circle::new((point.date, point.cumulative_hours), 3, BLACK.filled())
        }))?;
    }

    root.present()
        .with_context(|| format!("failed to write chart to {}", path.display()))?;
    Ok(())
}

fn axis_ranges(points: &[CumulativePoint]) -> anyhow::Result<(Range<NaiveDate>, f64)> {
    let (first, last) = match points {
        [] => {
            // no data: frame one day and one hour so the axes still draw
            let start = NaiveDate::from_ymd_opt(1970, 1, 1).context("placeholder axis date")?;
            return Ok((start..start + Duration::days(1), 1.0));
        }
        [only] => (only, only),
        [first, .., last] => (first, last),
    };

    let end = if last.date > first.date {
        last.date
    } else {
        first.date + Duration::days(1)
    };
    let y_upper = (last.cumulative_hours * 1.05).max(1.0);

    Ok((first.date..end, y_upper))
}
