//! Tests for per-lobby timeline construction
//!
//! These tests verify the time axis, inclusive waiting intervals, and the
//! consistency between queue length, the passenger register and the KPI
//! registers.

use elvr_pipeline::logbook::{derive_passenger_kpis, PassengerEventRow, PassengerRecord};
use elvr_pipeline::timeline::{build_timelines, RegisterField, Timeline, REGISTER_FIELDS};
use elvr_pipeline::types::{LiftId, LobbyId, PassengerId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn record(lobby: i64, arrived: f64, wait_end: f64, disembarked: f64) -> PassengerRecord {
    PassengerRecord {
        lobby_id: LobbyId(lobby),
        destination_id: LobbyId(10),
        lift_id: LiftId::new("A"),
        time_arrived: arrived,
        wait_time_end_raw: wait_end,
        transit_time_end_raw: disembarked - 0.5,
        time_disembarked: disembarked,
    }
}

fn lobby_one(passengers: &[PassengerEventRow]) -> Timeline {
    build_timelines(passengers).remove(&LobbyId(1)).unwrap_or_default()
}

/// Arrivals at 0 and 2, wait ends at 5 and 6
#[test]
fn test_two_passenger_reference_scenario() {
    let passengers = derive_passenger_kpis(&[record(1, 0.0, 5.0, 7.0), record(1, 2.0, 6.0, 7.0)]);
    let timeline = lobby_one(&passengers);

    let times: Vec<i64> = timeline.rows.iter().map(|row| row.time).collect();
    assert_eq!(times, vec![0, 1, 2, 3, 4, 5, 6]);

    let queue = |t: i64| timeline.row_at(t).map(|row| row.queue_length);
    assert_eq!(queue(0), Some(1));
    assert_eq!(queue(1), Some(1));
    assert_eq!(queue(2), Some(2));
    assert_eq!(queue(5), Some(2));
    assert_eq!(queue(6), Some(1));
    assert_eq!(queue(7), None);

    let at_six = timeline.row_at(6).unwrap();
    assert_eq!(at_six.passenger_register, vec![PassengerId(1)]);
    assert_eq!(at_six.mean_wait_time, 4.0);
}

/// Lobbies are built independently
#[test]
fn test_one_timeline_per_lobby() {
    let passengers = derive_passenger_kpis(&[
        record(3, 10.0, 12.0, 20.0),
        record(1, 0.0, 2.0, 4.0),
        record(3, 11.0, 15.0, 30.0),
    ]);
    let timelines = build_timelines(&passengers);

    let lobbies: Vec<LobbyId> = timelines.keys().copied().collect();
    assert_eq!(lobbies, vec![LobbyId(1), LobbyId(3)]);
    assert_eq!(timelines[&LobbyId(1)].len(), 4);
    assert_eq!(timelines[&LobbyId(3)].rows[0].time, 10);
    assert_eq!(timelines[&LobbyId(3)].len(), 20);
    assert_eq!(timelines[&LobbyId(3)].peak().map(|row| row.time), Some(11));
}

/// Empty seconds carry zero-valued KPIs
#[test]
fn test_empty_waiting_set_is_zero() {
    let passengers = derive_passenger_kpis(&[record(1, 0.0, 1.0, 10.0)]);
    let timeline = lobby_one(&passengers);

    let quiet = timeline.row_at(5).unwrap();
    assert_eq!(quiet.queue_length, 0);
    assert!(quiet.passenger_register.is_empty());
    assert_eq!(quiet.mean_wait_time, 0.0);
    assert_eq!(quiet.max_travel_time, 0.0);
}

/// Random lobbies keep every row consistent with the passengers it names
#[test]
fn test_timeline_consistency_on_random_passengers() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..20 {
        let records: Vec<PassengerRecord> = (0..rng.gen_range(1..40))
            .map(|_| {
                let arrived: f64 = rng.gen_range(0.0..300.0);
                let wait_end = arrived + rng.gen_range(-5.0..90.0);
                let disembarked = wait_end.max(arrived) + rng.gen_range(1.0..60.0);
                record(1, arrived, wait_end, disembarked)
            })
            .collect();
        let passengers = derive_passenger_kpis(&records);
        let timeline = lobby_one(&passengers);

        let first = passengers.iter().map(|p| p.time_arrived).fold(f64::INFINITY, f64::min).floor() as i64;
        let last = passengers.iter().map(|p| p.time_disembarked).fold(f64::NEG_INFINITY, f64::max).ceil() as i64;
        assert_eq!(timeline.rows.first().map(|row| row.time), Some(first));
        assert_eq!(timeline.len() as i64, last - first);

        for row in &timeline.rows {
            assert_eq!(row.queue_length, row.passenger_register.len());
            for field in REGISTER_FIELDS {
                assert_eq!(row.registers.register(field).len(), row.queue_length);
            }

            for id in &row.passenger_register {
                let passenger = &passengers[id.0];
                let t = row.time as f64;
                assert!(passenger.time_arrived <= t && t <= passenger.adjusted_wait_end());
            }

            let expected = passengers
                .iter()
                .filter(|p| p.time_arrived <= row.time as f64 && row.time as f64 <= p.adjusted_wait_end())
                .count();
            assert_eq!(row.queue_length, expected);
            assert!(row.registers.register(RegisterField::WaitTime).iter().all(|&wait| wait >= 0.0));
        }
    }
}
