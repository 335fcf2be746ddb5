use crate::models::ForecastPoint;

/// Read-only views over an ascending forecast series.
///
/// `recent` mirrors the product's "recent 7 days" card, which takes the head
/// of the series as delivered; `upcoming` takes the tail. Ordering is settled
/// once at the facade boundary, so the views only ever borrow.
#[derive(Debug, Clone)]
pub struct ForecastSeries {
    points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self { points }
    }

    pub fn overall(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn recent(&self, n: usize) -> &[ForecastPoint] {
        &self.points[..n.min(self.points.len())]
    }

    pub fn upcoming(&self, n: usize) -> &[ForecastPoint] {
        &self.points[self.points.len() - n.min(self.points.len())..]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Label/value pairs ready for a chart axis or a CSV body.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

pub fn chart_series(points: &[ForecastPoint]) -> ChartSeries {
    ChartSeries {
        labels: points
            .iter()
            .map(|point| point.date.format("%Y-%m-%d").to_string())
            .collect(),
        values: points.iter().map(|point| point.predicted_range).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn series_of(len: u32) -> ForecastSeries {
        let points = (0..len)
            .map(|day| ForecastPoint {
                date: Utc.with_ymd_and_hms(2026, 6, 1 + day, 0, 0, 0).unwrap(),
                predicted_range: 240.0 - day as f64,
            })
            .collect();
        ForecastSeries::new(points)
    }

    #[test]
    fn recent_takes_the_head() {
        let series = series_of(10);
        let recent = series.recent(7);
        assert_eq!(recent.len(), 7);
        assert_eq!(recent[0].predicted_range, 240.0);
        assert_eq!(recent[6].predicted_range, 234.0);
    }

    #[test]
    fn upcoming_takes_the_tail() {
        let series = series_of(10);
        let upcoming = series.upcoming(7);
        assert_eq!(upcoming.len(), 7);
        assert_eq!(upcoming[0].predicted_range, 237.0);
        assert_eq!(upcoming[6].predicted_range, 231.0);
    }

    #[test]
    fn oversized_window_returns_whole_series() {
        let series = series_of(10);
        assert_eq!(series.recent(20).len(), 10);
        assert_eq!(series.upcoming(20).len(), 10);
        assert_eq!(series.recent(20), series.overall());
    }

    #[test]
    fn empty_series_views_are_empty() {
        let series = ForecastSeries::new(Vec::new());
        assert!(series.is_empty());
        assert!(series.recent(7).is_empty());
        assert!(series.upcoming(7).is_empty());
    }

    #[test]
    fn chart_projection_formats_dates() {
        let series = series_of(2);
        let chart = chart_series(series.overall());
        assert_eq!(chart.labels, vec!["2026-06-01", "2026-06-02"]);
        assert_eq!(chart.values, vec![240.0, 239.0]);
    }
}
