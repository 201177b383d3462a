//! Per-second queue timelines
//!
//! A timeline is a contiguous run of [`TimelineRow`]s, one per integer second,
//! describing who is waiting at a lobby and the wait/transit/travel statistics
//! of that waiting set.
//!
//! - **builder**: discretizes passenger rows into one timeline per lobby
//! - **compiler**: merges timelines across lobbies and runs
//!
//! Rows keep the raw per-instant values in [`KpiRegisters`] so that merged
//! timelines can recompute exact means and downstream threshold counts.

pub mod builder;
pub mod compiler;

pub use builder::*;
pub use compiler::*;

use crate::types::PassengerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A per-passenger KPI carried as a raw per-instant register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterField {
    /// Seconds spent queueing
    WaitTime,
    /// Seconds in the car
    TransitTime,
    /// Wait plus transit
    TravelTime,
}

/// Every register carried by a timeline row
pub const REGISTER_FIELDS: [RegisterField; 3] =
    [RegisterField::WaitTime, RegisterField::TransitTime, RegisterField::TravelTime];

impl fmt::Display for RegisterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterField::WaitTime => write!(f, "wait_time_register"),
            RegisterField::TransitTime => write!(f, "transit_time_register"),
            RegisterField::TravelTime => write!(f, "travel_time_register"),
        }
    }
}

/// Raw KPI values of the passengers waiting at one instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiRegisters {
    /// `wait_time` per waiting passenger
    pub wait_time: Vec<f64>,
    /// `transit_time` per waiting passenger
    pub transit_time: Vec<f64>,
    /// `travel_time` per waiting passenger
    pub travel_time: Vec<f64>,
}

impl KpiRegisters {
    /// Values of one register
    pub fn register(&self, field: RegisterField) -> &[f64] {
        match field {
            RegisterField::WaitTime => &self.wait_time,
            RegisterField::TransitTime => &self.transit_time,
            RegisterField::TravelTime => &self.travel_time,
        }
    }

    /// Append every register of `other` to this one
    pub fn extend_from(&mut self, other: &KpiRegisters) {
        self.wait_time.extend_from_slice(&other.wait_time);
        self.transit_time.extend_from_slice(&other.transit_time);
        self.travel_time.extend_from_slice(&other.travel_time);
    }

    /// Number of values in the wait register
    pub fn len(&self) -> usize {
        self.wait_time.len()
    }

    /// Whether the registers hold no values
    pub fn is_empty(&self) -> bool {
        self.wait_time.is_empty()
    }
}

/// One second of one timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRow {
    /// Integer second
    pub time: i64,
    /// Passengers waiting (the envelope across sources once compiled)
    pub queue_length: usize,
    /// Ids of the waiting passengers
    pub passenger_register: Vec<PassengerId>,
    /// Mean wait time over the waiting set
    pub mean_wait_time: f64,
    /// Max wait time over the waiting set
    pub max_wait_time: f64,
    /// Mean transit time over the waiting set
    pub mean_transit_time: f64,
    /// Max transit time over the waiting set
    pub max_transit_time: f64,
    /// Mean travel time over the waiting set
    pub mean_travel_time: f64,
    /// Max travel time over the waiting set
    pub max_travel_time: f64,
    /// Raw per-instant KPI values
    pub registers: KpiRegisters,
    /// Queue length of every source merged into this row
    pub queue_length_register: Vec<usize>,
}

impl TimelineRow {
    /// Waiting passengers whose wait time exceeds `cutoff` seconds
    pub fn threshold_count(&self, cutoff: f64) -> usize {
        self.registers.wait_time.iter().filter(|&&wait| wait > cutoff).count()
    }

    /// Share of the waiting set above `cutoff`, 0 for an empty set
    pub fn threshold_fraction(&self, cutoff: f64) -> f64 {
        if self.registers.is_empty() {
            0.0
        } else {
            self.threshold_count(cutoff) as f64 / self.registers.len() as f64
        }
    }
}

/// Every `stride`-th point of a timeline's main series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSamples {
    /// Sampled seconds
    pub time: Vec<i64>,
    /// Queue length
    pub queue_length: Vec<usize>,
    /// Mean wait time
    pub mean_wait_time: Vec<f64>,
    /// Mean transit time
    pub mean_transit_time: Vec<f64>,
    /// Mean travel time
    pub mean_travel_time: Vec<f64>,
}

/// A time-ordered series of timeline rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Rows ordered by ascending `time`
    pub rows: Vec<TimelineRow>,
}

impl Timeline {
    /// Wrap rows already sorted by time
    pub fn new(rows: Vec<TimelineRow>) -> Self {
        Self { rows }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the timeline has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row for `time`, if present
    pub fn row_at(&self, time: i64) -> Option<&TimelineRow> {
        self.rows
            .binary_search_by_key(&time, |row| row.time)
            .ok()
            .map(|index| &self.rows[index])
    }

    /// First row with the largest queue
    pub fn peak(&self) -> Option<&TimelineRow> {
        self.rows.iter().fold(None, |best: Option<&TimelineRow>, row| match best {
            Some(best) if best.queue_length >= row.queue_length => Some(best),
            _ => Some(row),
        })
    }

    /// Seconds between the first and last row
    pub fn timespan(&self) -> i64 {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0,
        }
    }

    /// Per-row count of waiting passengers above `cutoff`
    pub fn threshold_series(&self, cutoff: f64) -> Vec<usize> {
        self.rows.iter().map(|row| row.threshold_count(cutoff)).collect()
    }

    /// Sample every `stride`-th row, starting with the first.
    ///
    /// A stride of 0 is treated as 1.
    pub fn chart_samples(&self, stride: usize) -> ChartSamples {
        let mut samples = ChartSamples::default();
        for row in self.rows.iter().step_by(stride.max(1)) {
            samples.time.push(row.time);
            samples.queue_length.push(row.queue_length);
            samples.mean_wait_time.push(row.mean_wait_time);
            samples.mean_transit_time.push(row.mean_transit_time);
            samples.mean_travel_time.push(row.mean_travel_time);
        }
        samples
    }
}

/// Mean of a register, 0 when empty.
///
/// Values are summed in ascending order so the result depends only on the
/// multiset of values, not on the order sources were merged in.
pub fn register_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.iter().sum::<f64>() / sorted.len() as f64
}

/// Max of a register, 0 when empty
pub fn register_max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with_waits(time: i64, waits: Vec<f64>) -> TimelineRow {
        TimelineRow {
            time,
            queue_length: waits.len(),
            passenger_register: (0..waits.len()).map(PassengerId).collect(),
            mean_wait_time: register_mean(&waits),
            max_wait_time: register_max(&waits),
            mean_transit_time: 0.0,
            max_transit_time: 0.0,
            mean_travel_time: 0.0,
            max_travel_time: 0.0,
            registers: KpiRegisters {
                transit_time: vec![0.0; waits.len()],
                travel_time: waits.clone(),
                wait_time: waits.clone(),
            },
            queue_length_register: vec![waits.len()],
        }
    }

    #[test]
    fn test_register_helpers() {
        assert_eq!(register_mean(&[]), 0.0);
        assert_eq!(register_max(&[]), 0.0);
        assert_eq!(register_mean(&[1.0, 2.0, 6.0]), 3.0);
        assert_eq!(register_max(&[-3.0, -1.0]), -1.0);
    }

    #[test]
    fn test_threshold_count_and_fraction() {
        let row = row_with_waits(0, vec![30.0, 61.0, 130.0, 60.0]);
        assert_eq!(row.threshold_count(60.0), 2);
        assert_eq!(row.threshold_fraction(60.0), 0.5);
        assert_eq!(row_with_waits(0, vec![]).threshold_fraction(60.0), 0.0);
    }

    #[test]
    fn test_peak_prefers_first_maximum() {
        let timeline = Timeline::new(vec![
            row_with_waits(0, vec![1.0]),
            row_with_waits(1, vec![1.0, 2.0]),
            row_with_waits(2, vec![1.0, 2.0]),
        ]);
        assert_eq!(timeline.peak().map(|row| row.time), Some(1));
        assert_eq!(timeline.timespan(), 2);
        assert_eq!(timeline.row_at(2).map(|row| row.queue_length), Some(2));
        assert!(timeline.row_at(5).is_none());
    }

    #[test]
    fn test_chart_samples_stride() {
        let timeline = Timeline::new((0..5).map(|t| row_with_waits(t, vec![t as f64])).collect());
        let samples = timeline.chart_samples(2);
        assert_eq!(samples.time, vec![0, 2, 4]);
        assert_eq!(samples.mean_wait_time, vec![0.0, 2.0, 4.0]);
        assert_eq!(timeline.chart_samples(0).time.len(), 5);
    }

    #[test]
    fn test_register_field_names() {
        let names: Vec<String> = REGISTER_FIELDS.iter().map(|f| f.to_string()).collect();
        assert_eq!(names, vec!["wait_time_register", "transit_time_register", "travel_time_register"]);
    }
}
