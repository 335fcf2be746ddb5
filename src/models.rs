use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub full_range: f64,
    pub model_year: i32,
}

/// One daily battery observation. The derived columns are nullable because
/// rows imported from older exports may predate server-side derivation.
#[derive(Debug, Clone)]
pub struct Reading {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub current_range: f64,
    pub current_percent: f64,
    pub full_range: f64,
    pub current_full_range: Option<f64>,
    pub lost_miles: Option<f64>,
    pub battery_health: Option<f64>,
}

/// Fields computed from a raw range/percent pair at submission time.
#[derive(Debug, Clone, Copy)]
pub struct DerivedReading {
    pub current_full_range: f64,
    pub lost_miles: f64,
    pub battery_health: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Metric {
    CurrentRange,
    FullRange,
    CurrentFullRange,
    LostMiles,
    BatteryHealth,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::CurrentRange => "Current Range",
            Metric::FullRange => "Full Range",
            Metric::CurrentFullRange => "Adjusted Full Range",
            Metric::LostMiles => "Lost Miles",
            Metric::BatteryHealth => "Battery Health %",
        }
    }

    /// A missing derived value contributes 0 rather than failing the scan.
    pub fn value(&self, reading: &Reading) -> f64 {
        match self {
            Metric::CurrentRange => reading.current_range,
            Metric::FullRange => reading.full_range,
            Metric::CurrentFullRange => reading.current_full_range.unwrap_or(0.0),
            Metric::LostMiles => reading.lost_miles.unwrap_or(0.0),
            Metric::BatteryHealth => reading.battery_health.unwrap_or(0.0),
        }
    }
}

/// `All` is an alias for `Day`: both emit one bucket per calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Granularity {
    Day,
    Month,
    Year,
    All,
}

impl Granularity {
    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Day | Granularity::All => "day",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedPoint {
    pub label: String,
    pub value: f64,
}

/// A one-off evaluation input, independent of any stored reading.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot {
    pub manufacturer_range: f64,
    pub current_percent: f64,
    pub current_range: f64,
    pub vehicle_year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthTier {
    Good,
    Fair,
    Poor,
}

impl std::fmt::Display for HealthTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            HealthTier::Good => "Good",
            HealthTier::Fair => "Fair",
            HealthTier::Poor => "Poor",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub estimated_full_range: f64,
    pub lost_range: f64,
    pub lost_percent: f64,
    pub health: HealthTier,
    pub battery_age: i32,
    pub age_comment: String,
    pub benchmark_note: String,
    pub warranty_note: String,
    pub recommendation: String,
}

/// One point of the prediction service's payload, e.g.
/// `{"date": "2026-08-07T00:00:00Z", "predictedRange": 231.4}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: DateTime<Utc>,
    pub predicted_range: f64,
}
