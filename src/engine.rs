use thiserror::Error;

use crate::bucket;
use crate::degradation;
use crate::forecast::ForecastSeries;
use crate::models::{AggregatedPoint, EvaluationResult, ForecastPoint, Granularity, Metric, Reading, Snapshot};

/// Oldest model year the product accepts, matching the signup form.
pub const EARLIEST_MODEL_YEAR: i32 = 2000;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("manufacturer range must be greater than zero, got {0}")]
    ManufacturerRange(f64),
    #[error("current charge percent must be within (0, 100], got {0}")]
    CurrentPercent(f64),
    #[error("model year {year} must be between {EARLIEST_MODEL_YEAR} and {now_year}")]
    ModelYear { year: i32, now_year: i32 },
}

/// Entry point for history charts and exports.
pub fn aggregate_history(
    readings: &[Reading],
    metric: Metric,
    granularity: Granularity,
) -> Vec<AggregatedPoint> {
    bucket::aggregate(readings, metric, granularity)
}

/// Validate a snapshot, then hand it to the calculator. This is the only
/// gate; past it, division by the checked fields cannot degenerate.
pub fn evaluate_snapshot(
    snapshot: &Snapshot,
    now_year: i32,
) -> Result<EvaluationResult, ValidationError> {
    if snapshot.manufacturer_range <= 0.0 {
        return Err(ValidationError::ManufacturerRange(snapshot.manufacturer_range));
    }
    if snapshot.current_percent <= 0.0 || snapshot.current_percent > 100.0 {
        return Err(ValidationError::CurrentPercent(snapshot.current_percent));
    }
    if snapshot.vehicle_year < EARLIEST_MODEL_YEAR || snapshot.vehicle_year > now_year {
        return Err(ValidationError::ModelYear {
            year: snapshot.vehicle_year,
            now_year,
        });
    }

    Ok(degradation::evaluate(snapshot, now_year))
}

/// Signup-time preconditions, matching the registration form's bounds.
pub fn validate_profile(
    full_range: f64,
    model_year: i32,
    now_year: i32,
) -> Result<(), ValidationError> {
    if full_range <= 0.0 {
        return Err(ValidationError::ManufacturerRange(full_range));
    }
    if model_year < EARLIEST_MODEL_YEAR || model_year > now_year {
        return Err(ValidationError::ModelYear {
            year: model_year,
            now_year,
        });
    }
    Ok(())
}

/// Preconditions shared by reading submission and CSV import.
pub fn validate_reading(full_range: f64, current_percent: f64) -> Result<(), ValidationError> {
    if full_range <= 0.0 {
        return Err(ValidationError::ManufacturerRange(full_range));
    }
    if current_percent <= 0.0 || current_percent > 100.0 {
        return Err(ValidationError::CurrentPercent(current_percent));
    }
    Ok(())
}

/// Wrap a forecast payload for slicing. The prediction service promises
/// ascending dates, but descending or shuffled payloads would silently
/// invert recent/upcoming, so order is restored here instead of trusted.
pub fn view_forecast(mut points: Vec<ForecastPoint>) -> ForecastSeries {
    if !points.windows(2).all(|pair| pair[0].date <= pair[1].date) {
        points.sort_by_key(|point| point.date);
    }
    ForecastSeries::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn snapshot() -> Snapshot {
        Snapshot {
            manufacturer_range: 300.0,
            current_percent: 80.0,
            current_range: 216.0,
            vehicle_year: 2020,
        }
    }

    #[test]
    fn accepts_valid_snapshot() {
        let result = evaluate_snapshot(&snapshot(), 2024).unwrap();
        assert!((result.lost_percent - 10.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_zero_manufacturer_range() {
        let bad = Snapshot {
            manufacturer_range: 0.0,
            ..snapshot()
        };
        assert_eq!(
            evaluate_snapshot(&bad, 2024),
            Err(ValidationError::ManufacturerRange(0.0))
        );
    }

    #[test]
    fn rejects_out_of_bounds_percent() {
        let zero = Snapshot {
            current_percent: 0.0,
            ..snapshot()
        };
        assert_eq!(
            evaluate_snapshot(&zero, 2024),
            Err(ValidationError::CurrentPercent(0.0))
        );

        let overfull = Snapshot {
            current_percent: 100.5,
            ..snapshot()
        };
        assert_eq!(
            evaluate_snapshot(&overfull, 2024),
            Err(ValidationError::CurrentPercent(100.5))
        );
    }

    #[test]
    fn rejects_model_year_outside_window() {
        let vintage = Snapshot {
            vehicle_year: 1998,
            ..snapshot()
        };
        assert!(matches!(
            evaluate_snapshot(&vintage, 2024),
            Err(ValidationError::ModelYear { year: 1998, .. })
        ));

        let future = Snapshot {
            vehicle_year: 2031,
            ..snapshot()
        };
        assert!(evaluate_snapshot(&future, 2024).is_err());
    }

    #[test]
    fn view_forecast_restores_ascending_order() {
        let day = |d: u32, range: f64| ForecastPoint {
            date: Utc.with_ymd_and_hms(2026, 7, d, 0, 0, 0).unwrap(),
            predicted_range: range,
        };

        let series = view_forecast(vec![day(3, 228.0), day(1, 230.0), day(2, 229.0)]);
        let labels: Vec<f64> = series.overall().iter().map(|p| p.predicted_range).collect();
        assert_eq!(labels, vec![230.0, 229.0, 228.0]);
    }

    #[test]
    fn validate_reading_shares_snapshot_rules() {
        assert!(validate_reading(300.0, 85.0).is_ok());
        assert!(validate_reading(0.0, 85.0).is_err());
        assert!(validate_reading(300.0, 101.0).is_err());
    }
}
