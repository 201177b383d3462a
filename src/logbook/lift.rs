//! Lift movement logbook
//!
//! Typed `SpatialPlot` rows and the motion-state labelling applied per lift.

use super::{check_width, parse_number};
use crate::types::{LiftId, LiftStatus, LobbyId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Column names of a lift movement row (after the category column)
pub const LIFT_FIELDS: [&str; 5] = ["lift_id", "time", "lobby_id", "load", "area"];

/// One lift arrival or departure record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiftEventRow {
    /// Lift car
    pub lift_id: LiftId,
    /// Simulated time in seconds
    pub time: f64,
    /// Lobby the lift is at
    pub lobby_id: LobbyId,
    /// Load carried
    pub load: f64,
    /// Car floor area
    pub area: f64,
    /// Derived motion state
    pub status: LiftStatus,
}

impl LiftEventRow {
    /// Build a row from the positional fields of a `SpatialPlot` line
    pub fn from_fields(fields: &[String]) -> Result<Self, String> {
        check_width(fields, &LIFT_FIELDS)?;

        Ok(Self {
            lift_id: LiftId::new(fields[0].as_str()),
            time: parse_number("time", &fields[1])?,
            lobby_id: fields[2].parse()?,
            load: parse_number("load", &fields[3])?,
            area: parse_number("area", &fields[4])?,
            status: LiftStatus::Unknown,
        })
    }
}

/// Number of distinct lifts in a lift table
pub fn count_lifts(rows: &[LiftEventRow]) -> usize {
    rows.iter().map(|row| &row.lift_id).collect::<BTreeSet<_>>().len()
}

/// Label every row with its lift's motion state.
///
/// Rows are grouped by lift (groups ordered by lift id) and sorted by time
/// within each group. Even positions are arrivals; an odd position is a
/// departure whose direction comes from the next row's lobby, or
/// `Terminating` when it is the lift's last row. The labelling assumes strict
/// arrival/departure alternation and does not detect logs that break it.
pub fn derive_lift_status(rows: Vec<LiftEventRow>) -> Vec<LiftEventRow> {
    let mut by_lift: BTreeMap<LiftId, Vec<LiftEventRow>> = BTreeMap::new();
    for row in rows {
        by_lift.entry(row.lift_id.clone()).or_default().push(row);
    }

    let mut labelled = Vec::new();
    for (_, mut logbook) in by_lift {
        logbook.sort_by(|a, b| a.time.total_cmp(&b.time));

        let statuses: Vec<LiftStatus> = (0..logbook.len())
            .map(|index| status_at(&logbook, index))
            .collect();

        for (row, status) in logbook.iter_mut().zip(statuses) {
            row.status = status;
        }
        labelled.extend(logbook);
    }

    labelled
}

fn status_at(logbook: &[LiftEventRow], index: usize) -> LiftStatus {
    if index % 2 == 0 {
        return LiftStatus::Arriving;
    }

    match logbook.get(index + 1) {
        Some(next) if next.lobby_id > logbook[index].lobby_id => LiftStatus::Ascending,
        Some(_) => LiftStatus::Descending,
        None => LiftStatus::Terminating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(lift: &str, time: f64, lobby: i64) -> LiftEventRow {
        LiftEventRow {
            lift_id: LiftId::new(lift),
            time,
            lobby_id: LobbyId(lobby),
            load: 0.0,
            area: 2.5,
            status: LiftStatus::Unknown,
        }
    }

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_from_fields() {
        let parsed = LiftEventRow::from_fields(&fields(&["A", "12.5", "3", "640", "2.4"])).unwrap();
        assert_eq!(parsed.lift_id, LiftId::new("A"));
        assert_eq!(parsed.time, 12.5);
        assert_eq!(parsed.lobby_id, LobbyId(3));
        assert_eq!(parsed.status, LiftStatus::Unknown);
    }

    #[test]
    fn test_from_fields_rejects_bad_rows() {
        assert!(LiftEventRow::from_fields(&fields(&["A", "12.5", "3"])).is_err());
        assert!(LiftEventRow::from_fields(&fields(&["A", "soon", "3", "0", "0"])).is_err());
        assert!(LiftEventRow::from_fields(&fields(&["A", "1", "roof", "0", "0"])).is_err());
    }

    #[test]
    fn test_single_departure_descends_on_equal_lobby() {
        let labelled = derive_lift_status(vec![row("A", 0.0, 2), row("A", 1.0, 2), row("A", 2.0, 2)]);
        let statuses: Vec<_> = labelled.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![LiftStatus::Arriving, LiftStatus::Descending, LiftStatus::Arriving]);
    }

    #[test]
    fn test_rows_are_sorted_per_lift() {
        let labelled = derive_lift_status(vec![row("B", 5.0, 1), row("A", 3.0, 4), row("A", 1.0, 1)]);
        let order: Vec<_> = labelled.iter().map(|r| (r.lift_id.as_str().to_string(), r.time)).collect();
        assert_eq!(
            order,
            vec![("A".to_string(), 1.0), ("A".to_string(), 3.0), ("B".to_string(), 5.0)]
        );
        assert_eq!(labelled[1].status, LiftStatus::Terminating);
        assert_eq!(labelled[2].status, LiftStatus::Arriving);
    }

    #[test]
    fn test_count_lifts() {
        assert_eq!(count_lifts(&[row("A", 0.0, 1), row("B", 0.0, 1), row("A", 1.0, 1)]), 2);
        assert_eq!(count_lifts(&[]), 0);
    }
}
