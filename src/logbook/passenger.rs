//! Passenger logbook
//!
//! Typed `Person` rows and the wait/transit/travel KPI derivation.

use super::{check_width, parse_number};
use crate::types::{LiftId, LobbyId, PassengerId};
use serde::{Deserialize, Serialize};

/// Column names of a passenger event row (after the category column)
pub const PASSENGER_FIELDS: [&str; 27] = [
    "time_arrived",
    "lobby_id",
    "index_1",
    "destination_id",
    "weight",
    "capacity_factor",
    "loading_time",
    "unloading_time",
    "time_disembarked",
    "index_2",
    "lift_id",
    "wait_time_end_raw",
    "transit_time_end_raw",
    "index_3",
    "actual_destination_id",
    "index_4",
    "index_5",
    "index_6",
    "index_7",
    "index_8",
    "index_9",
    "index_10",
    "metric_11",
    "metric_12",
    "metric_13",
    "index_14",
    "index_15",
];

/// Raw passenger record as logged, before KPI derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerRecord {
    /// Lobby where the passenger queued
    pub lobby_id: LobbyId,
    /// Requested destination
    pub destination_id: LobbyId,
    /// Lift that served the passenger
    pub lift_id: LiftId,
    /// Time the passenger joined the queue
    pub time_arrived: f64,
    /// Logged end of waiting (may precede arrival through clock noise)
    pub wait_time_end_raw: f64,
    /// Logged end of the ride
    pub transit_time_end_raw: f64,
    /// Time the passenger left the lift
    pub time_disembarked: f64,
}

impl PassengerRecord {
    /// Build a record from the positional fields of a `Person` line
    pub fn from_fields(fields: &[String]) -> Result<Self, String> {
        check_width(fields, &PASSENGER_FIELDS)?;
        let column = |name: &str| -> &str {
            let index = PASSENGER_FIELDS.iter().position(|f| *f == name).unwrap_or(0);
            fields[index].as_str()
        };

        Ok(Self {
            lobby_id: column("lobby_id").parse()?,
            destination_id: column("destination_id").parse()?,
            lift_id: LiftId::new(column("lift_id")),
            time_arrived: parse_number("time_arrived", column("time_arrived"))?,
            wait_time_end_raw: parse_number("wait_time_end_raw", column("wait_time_end_raw"))?,
            transit_time_end_raw: parse_number(
                "transit_time_end_raw",
                column("transit_time_end_raw"),
            )?,
            time_disembarked: parse_number("time_disembarked", column("time_disembarked"))?,
        })
    }

    /// End of waiting, clamped so it never precedes arrival
    pub fn adjusted_wait_end(&self) -> f64 {
        self.wait_time_end_raw.max(self.time_arrived)
    }
}

/// Passenger record with derived KPIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerEventRow {
    /// Sequential id, unique within the run
    pub passenger_id: PassengerId,
    /// Lobby where the passenger queued
    pub lobby_id: LobbyId,
    /// Requested destination
    pub destination_id: LobbyId,
    /// Lift that served the passenger
    pub lift_id: LiftId,
    /// Time the passenger joined the queue
    pub time_arrived: f64,
    /// Logged end of waiting
    pub wait_time_end_raw: f64,
    /// Logged end of the ride
    pub transit_time_end_raw: f64,
    /// Time the passenger left the lift
    pub time_disembarked: f64,
    /// Seconds spent queueing, never negative
    pub wait_time: f64,
    /// Seconds in the car; negative only for corrupt input
    pub transit_time: f64,
    /// `wait_time + transit_time`
    pub travel_time: f64,
}

impl PassengerEventRow {
    /// End of waiting, clamped so it never precedes arrival
    pub fn adjusted_wait_end(&self) -> f64 {
        self.wait_time_end_raw.max(self.time_arrived)
    }
}

/// Derive wait, transit and travel time for every record.
///
/// Passenger ids are assigned 0.. in input order. A wait end that precedes
/// arrival is clamped to the arrival time; negative transit times are kept.
pub fn derive_passenger_kpis(records: &[PassengerRecord]) -> Vec<PassengerEventRow> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let adjusted_wait_end = record.adjusted_wait_end();
            let wait_time = adjusted_wait_end - record.time_arrived;
            let transit_time = record.transit_time_end_raw - adjusted_wait_end;

            PassengerEventRow {
                passenger_id: PassengerId(index),
                lobby_id: record.lobby_id,
                destination_id: record.destination_id,
                lift_id: record.lift_id.clone(),
                time_arrived: record.time_arrived,
                wait_time_end_raw: record.wait_time_end_raw,
                transit_time_end_raw: record.transit_time_end_raw,
                time_disembarked: record.time_disembarked,
                wait_time,
                transit_time,
                travel_time: wait_time + transit_time,
            }
        })
        .collect()
}
