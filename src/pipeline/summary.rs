//! Scenario summaries
//!
//! Scalar KPIs reduced from passenger tables and timelines, for catalog display.

use crate::logbook::PassengerEventRow;
use crate::timeline::{register_max, register_mean, Timeline};
use crate::types::{defaults, RunId, SimulationId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar KPIs of one run or scenario
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryKpis {
    /// Second at which the longest queue first occurs
    pub peak_time: i64,
    /// Longest queue across the timelines
    pub queue_length: usize,
    /// Mean wait time over all passengers
    pub mean_wait_time: f64,
    /// Mean transit time over all passengers
    pub mean_transit_time: f64,
    /// Mean travel time over all passengers
    pub mean_travel_time: f64,
    /// Max wait time over all passengers
    pub max_wait_time: f64,
    /// Max transit time over all passengers
    pub max_transit_time: f64,
    /// Max travel time over all passengers
    pub max_travel_time: f64,
    /// Passengers across all tables
    pub passenger_count: usize,
    /// Longest timeline span in seconds
    pub timespan: i64,
}

impl fmt::Display for SummaryKpis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "peak {} ({} waiting) | wait {}/{} s | transit {}/{} s | travel {}/{} s | {} passengers",
            format_clock(self.peak_time),
            self.queue_length,
            self.mean_wait_time,
            self.max_wait_time,
            self.mean_transit_time,
            self.max_transit_time,
            self.mean_travel_time,
            self.max_travel_time,
            self.passenger_count
        )
    }
}

/// Summary of a run or a whole scenario, with identifying metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    /// Display name, `<upload>: <lifts> Lift`
    pub name: String,
    /// Simulation id
    pub simulation_id: SimulationId,
    /// Set for run summaries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    /// Set for scenario summaries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_count: Option<usize>,
    /// Lifts in the scenario
    pub lift_count: usize,
    /// Lobbies with passenger traffic
    pub floor_count: usize,
    /// `peak_time` as `HH:MM:SS`
    pub peak_clock: String,
    /// The KPIs
    #[serde(flatten)]
    pub kpis: SummaryKpis,
}

impl ScenarioSummary {
    /// Whether this summarizes one run rather than a scenario
    pub fn is_run_summary(&self) -> bool {
        self.run_id.is_some()
    }
}

/// Display name of a summary
pub fn summary_name(upload: &str, lift_count: usize) -> String {
    format!("{}: {} Lift", upload, lift_count)
}

/// Reduces passenger tables and timelines to rounded KPIs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summarizer {
    decimals: u32,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new(defaults::SUMMARY_DECIMALS)
    }
}

impl Summarizer {
    /// Round time KPIs to `decimals` places
    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    /// Concatenate every table and reduce.
    ///
    /// With no passengers the time KPIs are 0; with no timeline rows the peak
    /// is second 0 with an empty queue.
    pub fn summarize(&self, passenger_tables: &[&[PassengerEventRow]], timelines: &[&Timeline]) -> SummaryKpis {
        let passengers: Vec<&PassengerEventRow> =
            passenger_tables.iter().flat_map(|table| table.iter()).collect();

        let waits: Vec<f64> = passengers.iter().map(|p| p.wait_time).collect();
        let transits: Vec<f64> = passengers.iter().map(|p| p.transit_time).collect();
        let travels: Vec<f64> = passengers.iter().map(|p| p.travel_time).collect();

        let mut peak: Option<(i64, usize)> = None;
        for row in timelines.iter().flat_map(|timeline| timeline.rows.iter()) {
            if peak.map_or(true, |(_, longest)| row.queue_length > longest) {
                peak = Some((row.time, row.queue_length));
            }
        }
        let (peak_time, queue_length) = peak.unwrap_or((0, 0));

        SummaryKpis {
            peak_time,
            queue_length,
            mean_wait_time: self.round(register_mean(&waits)),
            mean_transit_time: self.round(register_mean(&transits)),
            mean_travel_time: self.round(register_mean(&travels)),
            max_wait_time: self.round(register_max(&waits)),
            max_transit_time: self.round(register_max(&transits)),
            max_travel_time: self.round(register_max(&travels)),
            passenger_count: passengers.len(),
            timespan: timelines.iter().map(|timeline| timeline.timespan()).max().unwrap_or(0),
        }
    }

    fn round(&self, value: f64) -> f64 {
        round_to(value, self.decimals)
    }
}

/// Reduce with the default rounding
pub fn summarize(passenger_tables: &[&[PassengerEventRow]], timelines: &[&Timeline]) -> SummaryKpis {
    Summarizer::default().summarize(passenger_tables, timelines)
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Render seconds as `HH:MM:SS`; hours may exceed 23
pub fn format_clock(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60, seconds % 60)
}
