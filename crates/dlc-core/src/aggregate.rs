//! Aggregate progress across all in-flight transfers.

use serde::Serialize;

use crate::table::TransferTable;

/// Single progress value exposed to observers.
///
/// `Success` doubles as "nothing pending": it is emitted whenever the table
/// becomes empty, whether the last transfer succeeded or failed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "state", content = "fraction", rename_all = "snake_case")]
pub enum AggregateState {
    #[default]
    Idle,
    InProgress(f64),
    Success,
}

impl AggregateState {
    /// Fraction complete in `[0.0, 1.0]`; `Idle` reports 0 and `Success` 1.
    pub fn fraction(&self) -> f64 {
        match self {
            AggregateState::Idle => 0.0,
            AggregateState::InProgress(f) => *f,
            AggregateState::Success => 1.0,
        }
    }
}

/// Derives `AggregateState` from the table, never letting the reported
/// fraction move backwards while transfers are in flight.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    last_fraction: f64,
    state: AggregateState,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AggregateState {
        self.state
    }

    /// Recompute after a table mutation and return the new state.
    ///
    /// Non-empty: `InProgress(max(last, min over table))`. Empty: `Success`,
    /// and the floor resets so the next batch starts from its own progress.
    pub fn apply(&mut self, table: &TransferTable) -> AggregateState {
        self.state = match table.min_fraction() {
            Some(min) => {
                self.last_fraction = self.last_fraction.max(min);
                AggregateState::InProgress(self.last_fraction)
            }
            None => {
                self.last_fraction = 0.0;
                AggregateState::Success
            }
        };
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{Destination, TransferKey};

    fn key(name: &str) -> TransferKey {
        TransferKey::derive(
            &format!("https://example.com/{name}"),
            &Destination::new("/tmp/dlc-agg"),
        )
        .unwrap()
    }

    #[test]
    fn starts_idle() {
        assert_eq!(Aggregator::new().state(), AggregateState::Idle);
    }

    #[test]
    fn fraction_of_each_state() {
        assert_eq!(AggregateState::Idle.fraction(), 0.0);
        assert_eq!(AggregateState::InProgress(0.4).fraction(), 0.4);
        assert_eq!(AggregateState::Success.fraction(), 1.0);
    }

    #[test]
    fn new_transfer_does_not_pull_progress_back() {
        let mut agg = Aggregator::new();
        let mut table = TransferTable::new();
        table.put(key("f1"), 0.3);
        assert_eq!(agg.apply(&table), AggregateState::InProgress(0.3));

        table.put(key("f2"), 0.0);
        assert_eq!(agg.apply(&table), AggregateState::InProgress(0.3));
        table.put(key("f2"), 0.1);
        assert_eq!(agg.apply(&table), AggregateState::InProgress(0.3));

        table.put(key("f2"), 0.6);
        assert_eq!(agg.apply(&table), AggregateState::InProgress(0.3));
        table.put(key("f1"), 0.5);
        assert_eq!(agg.apply(&table), AggregateState::InProgress(0.5));
    }

    #[test]
    fn empty_table_is_success_and_resets_floor() {
        let mut agg = Aggregator::new();
        let mut table = TransferTable::new();
        table.put(key("a"), 0.9);
        agg.apply(&table);
        table.remove(&key("a"));
        assert_eq!(agg.apply(&table), AggregateState::Success);

        table.put(key("b"), 0.0);
        assert_eq!(agg.apply(&table), AggregateState::InProgress(0.0));
    }

    #[test]
    fn state_serializes_tagged() {
        let json = serde_json::to_string(&AggregateState::InProgress(0.25)).unwrap();
        assert_eq!(json, r#"{"state":"in_progress","fraction":0.25}"#);
        let json = serde_json::to_string(&AggregateState::Success).unwrap();
        assert_eq!(json, r#"{"state":"success"}"#);
    }
}
