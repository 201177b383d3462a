//! Tests for run tables, lift status and passenger KPIs
//!
//! These tests verify table extraction per run, the parity/lookahead lift
//! status labelling, and the wait/transit/travel derivation.

use elvr_pipeline::logbook::{
    build_run_tables, count_lifts, derive_lift_status, derive_passenger_kpis, group_runs, LiftEventRow,
    PassengerRecord,
};
use elvr_pipeline::parser::parse;
use elvr_pipeline::pipeline::PipelineError;
use elvr_pipeline::types::{LiftId, LiftStatus, LobbyId, MissingTable, RunId};

fn lift_row(lift: &str, time: f64, lobby: i64) -> LiftEventRow {
    LiftEventRow {
        lift_id: LiftId::new(lift),
        time,
        lobby_id: LobbyId(lobby),
        load: 0.0,
        area: 2.5,
        status: LiftStatus::Unknown,
    }
}

fn record(arrived: f64, wait_end: f64, transit_end: f64) -> PassengerRecord {
    PassengerRecord {
        lobby_id: LobbyId(1),
        destination_id: LobbyId(4),
        lift_id: LiftId::new("A"),
        time_arrived: arrived,
        wait_time_end_raw: wait_end,
        transit_time_end_raw: transit_end,
        time_disembarked: transit_end + 1.0,
    }
}

fn statuses(rows: &[LiftEventRow], lift: &str) -> Vec<LiftStatus> {
    rows.iter().filter(|row| row.lift_id.as_str() == lift).map(|row| row.status).collect()
}

/// Lift "A" at lobbies [1, 1, 3, 3]
#[test]
fn test_lift_status_reference_scenario() {
    let rows = vec![lift_row("A", 0.0, 1), lift_row("A", 5.0, 1), lift_row("A", 10.0, 3), lift_row("A", 15.0, 3)];
    let labelled = derive_lift_status(rows);

    assert_eq!(
        statuses(&labelled, "A"),
        vec![LiftStatus::Arriving, LiftStatus::Ascending, LiftStatus::Arriving, LiftStatus::Terminating]
    );
}

/// Rows are sorted by time per lift before labelling
#[test]
fn test_lift_status_sorts_each_lift() {
    let rows = vec![
        lift_row("B", 20.0, 2),
        lift_row("A", 10.0, 4),
        lift_row("B", 0.0, 5),
        lift_row("A", 0.0, 4),
        lift_row("B", 10.0, 5),
        lift_row("A", 5.0, 4),
    ];
    let labelled = derive_lift_status(rows);

    let b_times: Vec<f64> = labelled.iter().filter(|r| r.lift_id.as_str() == "B").map(|r| r.time).collect();
    assert_eq!(b_times, vec![0.0, 10.0, 20.0]);
    assert_eq!(statuses(&labelled, "B"), vec![LiftStatus::Arriving, LiftStatus::Descending, LiftStatus::Arriving]);
    // equal next lobby is not higher
    assert_eq!(statuses(&labelled, "A"), vec![LiftStatus::Arriving, LiftStatus::Descending, LiftStatus::Arriving]);
    assert_eq!(count_lifts(&labelled), 2);
}

/// A single-row lift is only an arrival
#[test]
fn test_lift_status_single_row() {
    let labelled = derive_lift_status(vec![lift_row("C", 3.0, 2)]);
    assert_eq!(statuses(&labelled, "C"), vec![LiftStatus::Arriving]);
}

/// Wait time is never negative and travel is the exact sum
#[test]
fn test_passenger_kpi_invariants() {
    let records = vec![record(0.0, 12.0, 30.0), record(5.0, 3.0, 9.0), record(7.5, 7.5, 7.0)];
    let rows = derive_passenger_kpis(&records);

    for row in &rows {
        assert!(row.wait_time >= 0.0);
        assert_eq!(row.travel_time, row.wait_time + row.transit_time);
    }
    assert_eq!(rows[0].wait_time, 12.0);
    assert_eq!(rows[0].transit_time, 18.0);
    assert_eq!(rows[1].wait_time, 0.0);
    assert_eq!(rows[1].transit_time, 4.0);
    assert_eq!(rows[2].transit_time, -0.5);
}

/// A run with both tables yields them; the latest section of a category wins
#[test]
fn test_build_run_tables_takes_last_section() {
    let text = "SimulationID: X, 1
SpatialPlot,A,0,1,0,2
Foo,1
SpatialPlot,A,0,1,0,2
SpatialPlot,B,3,2,0,2
Person,0,1,0,3,70,1,1,1,20,0,A,5,12,0,3,0,0,0,0,0,0,0,0,0,0,0,0
";
    let parsed = parse(text).unwrap();
    let groups = group_runs(&parsed);
    let tables = build_run_tables(&groups[0].runs[0]).unwrap();

    assert_eq!(tables.run_id, RunId::new("1"));
    assert_eq!(tables.lift_events.len(), 2);
    assert_eq!(tables.passengers.len(), 1);
    assert_eq!(tables.lift_count, Some(1));
}

/// Missing tables are named in the error
#[test]
fn test_build_run_tables_reports_missing_table() {
    let parsed = parse("SimulationID: X, 1\nSpatialPlot,A,0,1,0,2\n").unwrap();
    let groups = group_runs(&parsed);

    match build_run_tables(&groups[0].runs[0]) {
        Err(PipelineError::MissingTable { missing, run_id, .. }) => {
            assert_eq!(missing, MissingTable::Passenger);
            assert_eq!(run_id, RunId::new("1"));
        }
        other => panic!("expected missing table, got {:?}", other),
    }
}
