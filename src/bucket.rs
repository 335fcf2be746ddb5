use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{AggregatedPoint, Granularity, Metric, Reading};

/// Group readings by calendar bucket and average one metric per bucket.
///
/// Buckets are emitted in the order their keys first appear in the input,
/// which keeps charts stable for already-sorted history while never
/// reordering what the caller handed in.
pub fn aggregate(
    readings: &[Reading],
    metric: Metric,
    granularity: Granularity,
) -> Vec<AggregatedPoint> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(String, f64, usize)> = Vec::new();

    for reading in readings {
        let key = bucket_key(reading.recorded_at, granularity);
        let slot = match slots.get(&key) {
            Some(&slot) => slot,
            None => {
                slots.insert(key.clone(), buckets.len());
                buckets.push((key, 0.0, 0));
                buckets.len() - 1
            }
        };
        buckets[slot].1 += metric.value(reading);
        buckets[slot].2 += 1;
    }

    buckets
        .into_iter()
        .map(|(label, sum, count)| AggregatedPoint {
            label,
            value: sum / count as f64,
        })
        .collect()
}

pub fn bucket_key(recorded_at: DateTime<Utc>, granularity: Granularity) -> String {
    match granularity {
        Granularity::Month => recorded_at.format("%Y-%m").to_string(),
        Granularity::Year => recorded_at.format("%Y").to_string(),
        Granularity::Day | Granularity::All => recorded_at.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn reading_on(year: i32, month: u32, day: u32, current_range: f64) -> Reading {
        Reading {
            id: Uuid::new_v4(),
            recorded_at: Utc.with_ymd_and_hms(year, month, day, 8, 30, 0).unwrap(),
            current_range,
            current_percent: 80.0,
            full_range: 300.0,
            current_full_range: None,
            lost_miles: None,
            battery_health: None,
        }
    }

    #[test]
    fn groups_by_month_and_averages() {
        let readings = vec![
            reading_on(2024, 1, 5, 10.0),
            reading_on(2024, 1, 7, 20.0),
            reading_on(2024, 2, 1, 30.0),
        ];

        let points = aggregate(&readings, Metric::CurrentRange, Granularity::Month);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "2024-01");
        assert!((points[0].value - 15.0).abs() < 1e-9);
        assert_eq!(points[1].label, "2024-02");
        assert!((points[1].value - 30.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let points = aggregate(&[], Metric::LostMiles, Granularity::Year);
        assert!(points.is_empty());
    }

    #[test]
    fn single_reading_day_bucket_is_idempotent() {
        let readings = vec![reading_on(2024, 3, 9, 212.0)];
        let first = aggregate(&readings, Metric::CurrentRange, Granularity::Day);
        assert_eq!(first.len(), 1);
        assert!((first[0].value - 212.0).abs() < 1e-9);

        let rebuilt = vec![reading_on(2024, 3, 9, first[0].value)];
        let second = aggregate(&rebuilt, Metric::CurrentRange, Granularity::Day);
        assert_eq!(second, first);
    }

    #[test]
    fn labels_follow_first_seen_order_not_chronology() {
        let readings = vec![
            reading_on(2024, 2, 10, 1.0),
            reading_on(2024, 1, 2, 2.0),
            reading_on(2024, 2, 20, 3.0),
        ];

        let points = aggregate(&readings, Metric::CurrentRange, Granularity::Month);
        let labels: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-02", "2024-01"]);
        assert!((points[0].value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn all_granularity_aliases_day() {
        let readings = vec![reading_on(2024, 5, 17, 230.0), reading_on(2024, 5, 18, 228.0)];
        let by_day = aggregate(&readings, Metric::CurrentRange, Granularity::Day);
        let by_all = aggregate(&readings, Metric::CurrentRange, Granularity::All);
        assert_eq!(by_day, by_all);
        assert_eq!(by_day[0].label, "2024-05-17");
    }

    #[test]
    fn missing_derived_values_count_as_zero() {
        let readings = vec![reading_on(2024, 6, 1, 240.0), reading_on(2024, 6, 1, 220.0)];
        let points = aggregate(&readings, Metric::BatteryHealth, Granularity::Day);
        assert_eq!(points.len(), 1);
        assert!((points[0].value - 0.0).abs() < 1e-9);
    }
}
