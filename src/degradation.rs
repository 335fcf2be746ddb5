use crate::models::{DerivedReading, EvaluationResult, HealthTier, Snapshot};

/// Evaluate one snapshot against the current calendar year.
///
/// Inputs are assumed to have passed the facade validation gate
/// (`manufacturer_range > 0`, `current_percent` in (0, 100]); values are
/// kept at full precision here and rounded only when printed.
pub fn evaluate(snapshot: &Snapshot, now_year: i32) -> EvaluationResult {
    let estimated_full_range = snapshot.current_range / snapshot.current_percent * 100.0;
    let lost_range = snapshot.manufacturer_range - estimated_full_range;
    let lost_percent = lost_range / snapshot.manufacturer_range * 100.0;
    let battery_age = now_year - snapshot.vehicle_year;
    let health = health_tier(lost_percent);

    EvaluationResult {
        estimated_full_range,
        lost_range,
        lost_percent,
        health,
        battery_age,
        age_comment: age_comment(battery_age).to_string(),
        benchmark_note: benchmark_note(lost_percent, battery_age).to_string(),
        warranty_note: warranty_note(battery_age),
        recommendation: recommendation(health).to_string(),
    }
}

/// Derive the stored per-reading columns from a raw range/percent pair.
/// Battery health is the complement of the lost-range percentage.
pub fn derive_reading(full_range: f64, current_range: f64, current_percent: f64) -> DerivedReading {
    let current_full_range = current_range / current_percent * 100.0;
    let lost_miles = full_range - current_full_range;
    let battery_health = current_full_range / full_range * 100.0;

    DerivedReading {
        current_full_range,
        lost_miles,
        battery_health,
    }
}

pub fn health_tier(lost_percent: f64) -> HealthTier {
    if lost_percent <= 10.0 {
        HealthTier::Good
    } else if lost_percent <= 20.0 {
        HealthTier::Fair
    } else {
        HealthTier::Poor
    }
}

fn age_comment(battery_age: i32) -> &'static str {
    match battery_age {
        i32::MIN..=1 => "very new, minimal degradation expected",
        2..=3 => "should still be in great shape",
        4..=5 => "mild degradation is common",
        _ => "aging may now significantly impact performance",
    }
}

fn benchmark_note(lost_percent: f64, battery_age: i32) -> &'static str {
    if lost_percent > 20.0 && battery_age <= 3 {
        "higher than expected for this age"
    } else if lost_percent < 5.0 && battery_age >= 5 {
        "better than average for its age"
    } else {
        "within the expected range"
    }
}

fn warranty_note(battery_age: i32) -> String {
    if battery_age >= 8 {
        "likely outside the typical 8-year warranty window".to_string()
    } else {
        format!("approximately {battery_age} years old and may still be under warranty")
    }
}

fn recommendation(health: HealthTier) -> &'static str {
    match health {
        HealthTier::Good => "Keep up the good charging habits.",
        HealthTier::Fair => "Consider reducing fast-charging and avoiding deep discharges.",
        HealthTier::Poor => "Schedule a professional battery inspection soon.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(manufacturer_range: f64, current_percent: f64, current_range: f64, vehicle_year: i32) -> Snapshot {
        Snapshot {
            manufacturer_range,
            current_percent,
            current_range,
            vehicle_year,
        }
    }

    #[test]
    fn evaluates_reference_snapshot() {
        let result = evaluate(&snapshot(300.0, 80.0, 216.0, 2020), 2024);

        assert!((result.estimated_full_range - 270.0).abs() < 1e-9);
        assert!((result.lost_range - 30.0).abs() < 1e-9);
        assert!((result.lost_percent - 10.0).abs() < 1e-9);
        assert_eq!(result.health, HealthTier::Good);
        assert_eq!(result.battery_age, 4);
        assert_eq!(result.age_comment, "mild degradation is common");
        assert_eq!(result.benchmark_note, "within the expected range");
        assert_eq!(
            result.warranty_note,
            "approximately 4 years old and may still be under warranty"
        );
    }

    #[test]
    fn tier_boundaries_are_inclusive_at_ten_and_twenty() {
        assert_eq!(health_tier(10.0), HealthTier::Good);
        assert_eq!(health_tier(10.01), HealthTier::Fair);
        assert_eq!(health_tier(20.0), HealthTier::Fair);
        assert_eq!(health_tier(20.01), HealthTier::Poor);
    }

    #[test]
    fn young_battery_with_heavy_loss_flags_benchmark() {
        // 35% lost on a 2-year-old pack.
        let result = evaluate(&snapshot(300.0, 100.0, 195.0, 2024), 2026);
        assert_eq!(result.health, HealthTier::Poor);
        assert_eq!(result.benchmark_note, "higher than expected for this age");
        assert_eq!(
            result.recommendation,
            "Schedule a professional battery inspection soon."
        );
    }

    #[test]
    fn old_battery_with_low_loss_beats_average() {
        // 3% lost on a 6-year-old pack.
        let result = evaluate(&snapshot(300.0, 100.0, 291.0, 2020), 2026);
        assert_eq!(result.health, HealthTier::Good);
        assert_eq!(result.benchmark_note, "better than average for its age");
    }

    #[test]
    fn age_comments_follow_bands() {
        assert_eq!(
            evaluate(&snapshot(300.0, 100.0, 300.0, 2026), 2026).age_comment,
            "very new, minimal degradation expected"
        );
        assert_eq!(
            evaluate(&snapshot(300.0, 100.0, 300.0, 2024), 2026).age_comment,
            "should still be in great shape"
        );
        assert_eq!(
            evaluate(&snapshot(300.0, 100.0, 300.0, 2021), 2026).age_comment,
            "mild degradation is common"
        );
        assert_eq!(
            evaluate(&snapshot(300.0, 100.0, 300.0, 2018), 2026).age_comment,
            "aging may now significantly impact performance"
        );
    }

    #[test]
    fn warranty_note_flips_at_eight_years() {
        let covered = evaluate(&snapshot(300.0, 100.0, 280.0, 2019), 2026);
        assert!(covered.warranty_note.contains("may still be under warranty"));

        let expired = evaluate(&snapshot(300.0, 100.0, 280.0, 2018), 2026);
        assert_eq!(
            expired.warranty_note,
            "likely outside the typical 8-year warranty window"
        );
    }

    #[test]
    fn derives_stored_reading_columns() {
        let derived = derive_reading(300.0, 216.0, 80.0);
        assert!((derived.current_full_range - 270.0).abs() < 1e-9);
        assert!((derived.lost_miles - 30.0).abs() < 1e-9);
        assert!((derived.battery_health - 90.0).abs() < 1e-9);
    }
}
