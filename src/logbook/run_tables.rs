//! Per-run table extraction
//!
//! A run is usable only when it has both a lift movement table and a passenger
//! event table. Runs lacking either are reported with [`PipelineError::MissingTable`]
//! and excluded from every downstream aggregate.

use super::{LiftEventRow, PassengerRecord};
use crate::parser::{LogEntry, ParsedLog, SectionTable};
use crate::pipeline::{PipelineError, PipelineResult};
use crate::types::{MissingTable, RunId, SimulationId};
use tracing::debug;

/// The two tables of one usable run
#[derive(Debug, Clone, PartialEq)]
pub struct RunTables {
    /// Simulation the run belongs to
    pub simulation_id: SimulationId,
    /// Run id
    pub run_id: RunId,
    /// Lift count attached by the parser
    pub lift_count: Option<usize>,
    /// Lift movement rows, status not yet derived
    pub lift_events: Vec<LiftEventRow>,
    /// Passenger records, KPIs not yet derived
    pub passengers: Vec<PassengerRecord>,
}

/// Log entries of one run
#[derive(Debug, Clone)]
pub struct RunGroup<'a> {
    /// Simulation id
    pub simulation_id: SimulationId,
    /// Run id
    pub run_id: RunId,
    /// The run's sections in log order
    pub entries: Vec<&'a LogEntry>,
}

/// Runs of one simulation
#[derive(Debug, Clone)]
pub struct SimulationGroup<'a> {
    /// Simulation id
    pub simulation_id: SimulationId,
    /// Runs in first-seen order, including runs without sections
    pub runs: Vec<RunGroup<'a>>,
}

/// Group a parsed log by simulation, then by run, in first-seen order
pub fn group_runs(parsed: &ParsedLog) -> Vec<SimulationGroup<'_>> {
    let mut groups: Vec<SimulationGroup<'_>> = Vec::new();

    for run in &parsed.runs {
        let entries: Vec<&LogEntry> = parsed.entries_for(&run.simulation_id, &run.run_id).collect();
        let run_group = RunGroup {
            simulation_id: run.simulation_id.clone(),
            run_id: run.run_id.clone(),
            entries,
        };

        match groups.iter_mut().find(|g| g.simulation_id == run.simulation_id) {
            Some(group) => group.runs.push(run_group),
            None => groups.push(SimulationGroup {
                simulation_id: run.simulation_id.clone(),
                runs: vec![run_group],
            }),
        }
    }

    groups
}

/// Extract the lift and passenger tables of one run.
///
/// When a run logs a category more than once, the last section wins.
pub fn build_run_tables(group: &RunGroup<'_>) -> PipelineResult<RunTables> {
    let mut lift_events = None;
    let mut passengers = None;
    let mut lift_count = None;

    for entry in &group.entries {
        match &entry.table {
            SectionTable::LiftMovement(rows) => {
                if lift_events.is_some() {
                    debug!(run_id = %group.run_id, "Replacing earlier lift movement section");
                }
                lift_events = Some(rows.clone());
            }
            SectionTable::PassengerEvent(rows) => {
                if passengers.is_some() {
                    debug!(run_id = %group.run_id, "Replacing earlier passenger section");
                }
                passengers = Some(rows.clone());
            }
            SectionTable::Untyped(_) => {}
        }
        lift_count = lift_count.or(entry.lift_count);
    }

    match (lift_events, passengers) {
        (Some(lift_events), Some(passengers)) => Ok(RunTables {
            simulation_id: group.simulation_id.clone(),
            run_id: group.run_id.clone(),
            lift_count,
            lift_events,
            passengers,
        }),
        (lift, passenger) => {
            let missing = match (lift.is_none(), passenger.is_none()) {
                (true, true) => MissingTable::Both,
                (true, false) => MissingTable::Lift,
                _ => MissingTable::Passenger,
            };
            Err(PipelineError::MissingTable {
                simulation_id: group.simulation_id.clone(),
                run_id: group.run_id.clone(),
                missing,
            })
        }
    }
}
