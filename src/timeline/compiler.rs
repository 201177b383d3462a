//! Timeline compilation across lobbies and runs
//!
//! Rows are merged by `time` over the union of every input's seconds. Each
//! input is an alternative realization, so `queue_length` is the envelope
//! (max) of the merged sources rather than their sum. Registers are flattened
//! and the means re-derived from them, never averaged from per-source means.

use super::{register_mean, KpiRegisters, Timeline, TimelineRow};
use std::collections::BTreeMap;

/// Accumulated sources for one second
#[derive(Debug, Default)]
struct Bucket {
    queue_length_register: Vec<usize>,
    passenger_register: Vec<crate::types::PassengerId>,
    registers: KpiRegisters,
    max_wait_time: Option<f64>,
    max_transit_time: Option<f64>,
    max_travel_time: Option<f64>,
}

impl Bucket {
    fn absorb(&mut self, row: &TimelineRow) {
        self.queue_length_register.extend_from_slice(&row.queue_length_register);
        self.passenger_register.extend_from_slice(&row.passenger_register);
        self.registers.extend_from(&row.registers);
        self.max_wait_time = Some(envelope(self.max_wait_time, row.max_wait_time));
        self.max_transit_time = Some(envelope(self.max_transit_time, row.max_transit_time));
        self.max_travel_time = Some(envelope(self.max_travel_time, row.max_travel_time));
    }

    fn into_row(self, time: i64) -> TimelineRow {
        TimelineRow {
            time,
            queue_length: self.queue_length_register.iter().copied().max().unwrap_or(0),
            passenger_register: self.passenger_register,
            mean_wait_time: register_mean(&self.registers.wait_time),
            max_wait_time: self.max_wait_time.unwrap_or(0.0),
            mean_transit_time: register_mean(&self.registers.transit_time),
            max_transit_time: self.max_transit_time.unwrap_or(0.0),
            mean_travel_time: register_mean(&self.registers.travel_time),
            max_travel_time: self.max_travel_time.unwrap_or(0.0),
            registers: self.registers,
            queue_length_register: self.queue_length_register,
        }
    }
}

fn envelope(current: Option<f64>, value: f64) -> f64 {
    current.map_or(value, |current| current.max(value))
}

/// Merge timelines into one.
///
/// Compiling is associative and order-independent up to register order:
/// `compile([A, B, C])` equals `compile([compile([A, B]), C])`, and a single
/// timeline compiles to itself.
pub fn compile_timelines<'a, I>(timelines: I) -> Timeline
where
    I: IntoIterator<Item = &'a Timeline>,
{
    let mut buckets: BTreeMap<i64, Bucket> = BTreeMap::new();

    for timeline in timelines {
        for row in &timeline.rows {
            buckets.entry(row.time).or_default().absorb(row);
        }
    }

    Timeline::new(buckets.into_iter().map(|(time, bucket)| bucket.into_row(time)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::register_max;
    use crate::types::PassengerId;

    fn row(time: i64, waits: &[f64]) -> TimelineRow {
        TimelineRow {
            time,
            queue_length: waits.len(),
            passenger_register: (0..waits.len()).map(PassengerId).collect(),
            mean_wait_time: register_mean(waits),
            max_wait_time: register_max(waits),
            mean_transit_time: 0.0,
            max_transit_time: 0.0,
            mean_travel_time: register_mean(waits),
            max_travel_time: register_max(waits),
            registers: KpiRegisters {
                wait_time: waits.to_vec(),
                transit_time: vec![0.0; waits.len()],
                travel_time: waits.to_vec(),
            },
            queue_length_register: vec![waits.len()],
        }
    }

    #[test]
    fn test_queue_length_is_envelope_not_sum() {
        let a = Timeline::new(vec![row(0, &[1.0, 2.0])]);
        let b = Timeline::new(vec![row(0, &[9.0])]);
        let compiled = compile_timelines([&a, &b]);

        let merged = &compiled.rows[0];
        assert_eq!(merged.queue_length, 2);
        assert_eq!(merged.queue_length_register, vec![2, 1]);
        assert_eq!(merged.mean_wait_time, 4.0);
        assert_eq!(merged.max_wait_time, 9.0);
        assert_eq!(merged.registers.wait_time, vec![1.0, 2.0, 9.0]);
    }

    #[test]
    fn test_outer_union_of_times() {
        let a = Timeline::new(vec![row(0, &[1.0]), row(1, &[1.0])]);
        let b = Timeline::new(vec![row(3, &[5.0])]);
        let compiled = compile_timelines([&a, &b]);

        let times: Vec<i64> = compiled.rows.iter().map(|r| r.time).collect();
        assert_eq!(times, vec![0, 1, 3]);
        assert_eq!(compiled.row_at(3).map(|r| r.mean_wait_time), Some(5.0));
    }

    #[test]
    fn test_singleton_compiles_to_itself() {
        let a = Timeline::new(vec![row(0, &[]), row(1, &[3.0, 4.5])]);
        assert_eq!(compile_timelines([&a]), a);
    }

    #[test]
    fn test_empty_input() {
        assert!(compile_timelines(Vec::<&Timeline>::new()).is_empty());
    }
}
