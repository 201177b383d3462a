//! Timeline construction
//!
//! A passenger waits at second `t` when `time_arrived <= t <= adjusted_wait_end`
//! (both ends inclusive). On integer seconds that is the range
//! `ceil(time_arrived)..=floor(adjusted_wait_end)`, so the waiting set can be
//! swept forward with one join and one leave event per passenger instead of
//! testing every passenger at every second.

use super::{register_max, register_mean, KpiRegisters, Timeline, TimelineRow};
use crate::logbook::PassengerEventRow;
use crate::types::LobbyId;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

impl TimelineRow {
    /// Row for second `time` given the passengers waiting then
    pub fn from_waiting(time: i64, waiting: &[&PassengerEventRow]) -> Self {
        let registers = KpiRegisters {
            wait_time: waiting.iter().map(|p| p.wait_time).collect(),
            transit_time: waiting.iter().map(|p| p.transit_time).collect(),
            travel_time: waiting.iter().map(|p| p.travel_time).collect(),
        };

        Self {
            time,
            queue_length: waiting.len(),
            passenger_register: waiting.iter().map(|p| p.passenger_id).collect(),
            mean_wait_time: register_mean(&registers.wait_time),
            max_wait_time: register_max(&registers.wait_time),
            mean_transit_time: register_mean(&registers.transit_time),
            max_transit_time: register_max(&registers.transit_time),
            mean_travel_time: register_mean(&registers.travel_time),
            max_travel_time: register_max(&registers.travel_time),
            registers,
            queue_length_register: vec![waiting.len()],
        }
    }
}

/// One timeline per lobby, keyed by lobby id
pub fn build_timelines(passengers: &[PassengerEventRow]) -> BTreeMap<LobbyId, Timeline> {
    let _span = crate::perf_span!("build_timelines", passengers = passengers.len()).entered();

    let mut by_lobby: BTreeMap<LobbyId, Vec<&PassengerEventRow>> = BTreeMap::new();
    for passenger in passengers {
        by_lobby.entry(passenger.lobby_id).or_default().push(passenger);
    }

    by_lobby
        .into_iter()
        .map(|(lobby_id, group)| {
            let timeline = build_lobby_timeline(&group);
            debug!(lobby_id = %lobby_id, passengers = group.len(), rows = timeline.len(), "Built lobby timeline");
            (lobby_id, timeline)
        })
        .collect()
}

/// Timeline of one lobby's passengers.
///
/// The axis spans `floor(min time_arrived)..ceil(max time_disembarked)`, end
/// exclusive. An empty passenger set gives an empty timeline.
pub fn build_lobby_timeline(passengers: &[&PassengerEventRow]) -> Timeline {
    if passengers.is_empty() {
        return Timeline::default();
    }

    let start = passengers.iter().map(|p| p.time_arrived).fold(f64::INFINITY, f64::min).floor() as i64;
    let finish = passengers
        .iter()
        .map(|p| p.time_disembarked)
        .fold(f64::NEG_INFINITY, f64::max)
        .ceil() as i64;

    let mut joins: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    let mut leaves: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (index, passenger) in passengers.iter().enumerate() {
        let first = passenger.time_arrived.ceil() as i64;
        let last = passenger.adjusted_wait_end().floor() as i64;
        if first > last {
            // waited less than a second and never straddled one
            continue;
        }
        joins.entry(first).or_default().push(index);
        leaves.entry(last + 1).or_default().push(index);
    }

    let mut waiting: BTreeSet<usize> = BTreeSet::new();
    let mut rows = Vec::with_capacity(usize::try_from(finish - start).unwrap_or(0));

    for time in start..finish {
        if let Some(joined) = joins.get(&time) {
            waiting.extend(joined.iter().copied());
        }
        if let Some(left) = leaves.get(&time) {
            for index in left {
                waiting.remove(index);
            }
        }

        let members: Vec<&PassengerEventRow> = waiting.iter().map(|&index| passengers[index]).collect();
        rows.push(TimelineRow::from_waiting(time, &members));
    }

    Timeline::new(rows)
}
