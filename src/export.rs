use std::io;

use crate::forecast;
use crate::models::{ForecastPoint, Reading};

/// Write reading history with the spreadsheet column headers the product
/// has always exported.
pub fn write_readings_csv<W: io::Write>(writer: W, readings: &[Reading]) -> anyhow::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        "Date",
        "Current Range",
        "Full Range",
        "Adjusted Full Range",
        "Lost Miles",
        "Battery Health %",
    ])?;

    for reading in readings {
        out.write_record([
            reading.recorded_at.format("%Y-%m-%d %H:%M").to_string(),
            format!("{:.2}", reading.current_range),
            format!("{:.2}", reading.full_range),
            optional_cell(reading.current_full_range),
            optional_cell(reading.lost_miles),
            optional_cell(reading.battery_health),
        ])?;
    }

    out.flush()?;
    Ok(())
}

pub fn write_forecast_csv<W: io::Write>(writer: W, points: &[ForecastPoint]) -> anyhow::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["date", "predictedRange"])?;

    let chart = forecast::chart_series(points);
    for (label, value) in chart.labels.iter().zip(&chart.values) {
        out.write_record([label.clone(), value.to_string()])?;
    }

    out.flush()?;
    Ok(())
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}
