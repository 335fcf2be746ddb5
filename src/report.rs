use std::fmt::Write;

use crate::engine;
use crate::forecast::{self, ForecastSeries};
use crate::models::{Granularity, Metric, Reading, Snapshot, UserProfile};

const FORECAST_WINDOW: usize = 7;

pub fn build_report(
    user: &UserProfile,
    readings: &[Reading],
    series: &ForecastSeries,
    now_year: i32,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Battery Health Report");
    let _ = writeln!(
        output,
        "Generated for {} ({}), {} model year, {:.0} mi rated range",
        user.full_name, user.email, user.model_year, user.full_range
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Reading Summary");

    if readings.is_empty() {
        let _ = writeln!(output, "No readings recorded yet.");
    } else {
        let first = readings[0].recorded_at.format("%Y-%m-%d");
        let last = readings[readings.len() - 1].recorded_at.format("%Y-%m-%d");
        let _ = writeln!(
            output,
            "{} readings between {} and {}.",
            readings.len(),
            first,
            last
        );
        if let Some(health) = readings[readings.len() - 1].battery_health {
            let _ = writeln!(output, "Latest battery health: {health:.2}%.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Range Trend");

    let trend = engine::aggregate_history(readings, Metric::CurrentRange, Granularity::Month);
    if trend.is_empty() {
        let _ = writeln!(output, "No readings recorded for this window.");
    } else {
        for point in &trend {
            let _ = writeln!(output, "- {}: {:.2} mi average range", point.label, point.value);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Degradation Snapshot");

    match readings.last() {
        None => {
            let _ = writeln!(output, "No reading available to evaluate.");
        }
        Some(latest) => {
            let snapshot = Snapshot {
                manufacturer_range: user.full_range,
                current_percent: latest.current_percent,
                current_range: latest.current_range,
                vehicle_year: user.model_year,
            };
            match engine::evaluate_snapshot(&snapshot, now_year) {
                Err(err) => {
                    let _ = writeln!(output, "Snapshot skipped: {err}.");
                }
                Ok(result) => {
                    let _ = writeln!(
                        output,
                        "- Estimated full-charge range: {:.2} mi",
                        result.estimated_full_range
                    );
                    let _ = writeln!(output, "- Range lost: {:.2} mi", result.lost_range);
                    let _ = writeln!(
                        output,
                        "- Degradation: {:.2}% ({})",
                        result.lost_percent, result.health
                    );
                    let _ = writeln!(
                        output,
                        "- Battery age {}: {}",
                        result.battery_age, result.age_comment
                    );
                    let _ = writeln!(
                        output,
                        "- Benchmark: {} for a {}-year-old battery",
                        result.benchmark_note, result.battery_age
                    );
                    let _ = writeln!(output, "- Warranty: {}", result.warranty_note);
                    let _ = writeln!(output, "- Recommendation: {}", result.recommendation);
                }
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Forecast Outlook");

    if series.is_empty() {
        let _ = writeln!(output, "No forecast data imported.");
    } else {
        let _ = writeln!(output, "{} forecast points on file.", series.len());
        let upcoming = forecast::chart_series(series.upcoming(FORECAST_WINDOW));
        for (label, value) in upcoming.labels.iter().zip(&upcoming.values) {
            let _ = writeln!(output, "- {label}: {value:.1} mi predicted");
        }
    }

    output
}
