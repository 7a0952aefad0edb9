#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Run statistics system.
//!
//! Bridges door choices to crowd arithmetic and keeps the per-run tallies
//! the presentation layer reports: doors used, the most recent bonus, the
//! mirrored runner count and whether the finish was reached.

use crowd_runner_core::{BonusKind, Command, Event};
use log::debug;

/// Outcome of the most recent door choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordedBonus {
    /// Arithmetic kind the door applied.
    pub kind: BonusKind,
    /// Unsigned magnitude the door applied.
    pub amount: u32,
}

/// Pure system folding world events into per-run statistics.
#[derive(Debug, Default)]
pub struct Stats {
    doors_used: u32,
    last_bonus: Option<RecordedBonus>,
    runner_count: u32,
    finish_reached: bool,
}

impl Stats {
    /// Creates an empty statistics ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a batch of events and emits the crowd arithmetic they imply.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::DoorChosen { kind, amount, .. } => {
                    self.doors_used += 1;
                    self.last_bonus = Some(RecordedBonus {
                        kind: *kind,
                        amount: *amount,
                    });
                    out.push(Command::ApplyBonus {
                        kind: *kind,
                        amount: *amount,
                    });
                }
                Event::CrowdChanged { count } => {
                    debug!("runner count is now {count}");
                    self.runner_count = *count;
                }
                Event::FinishReached { .. } => self.finish_reached = true,
                Event::TrackCleared => self.reset(),
                _ => {}
            }
        }
    }

    fn reset(&mut self) {
        self.doors_used = 0;
        self.last_bonus = None;
        self.finish_reached = false;
    }

    /// Number of doors chosen during the current run.
    #[must_use]
    pub fn doors_used(&self) -> u32 {
        self.doors_used
    }

    /// Kind and magnitude of the most recent door choice, if any.
    #[must_use]
    pub fn last_bonus(&self) -> Option<RecordedBonus> {
        self.last_bonus
    }

    /// Runner count mirrored from the most recent crowd mutation.
    #[must_use]
    pub fn runner_count(&self) -> u32 {
        self.runner_count
    }

    /// Indicates whether the finish unit was reached this run.
    #[must_use]
    pub fn finish_reached(&self) -> bool {
        self.finish_reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowd_runner_core::{DoorSide, UnitId};

    #[test]
    fn door_choices_become_crowd_arithmetic() {
        let mut stats = Stats::new();
        let mut out = Vec::new();
        stats.handle(
            &[Event::DoorChosen {
                unit: UnitId::new(0),
                side: DoorSide::Right,
                kind: BonusKind::Multiplication,
                amount: 3,
            }],
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::ApplyBonus {
                kind: BonusKind::Multiplication,
                amount: 3,
            }]
        );
        assert_eq!(stats.doors_used(), 1);
        assert_eq!(
            stats.last_bonus(),
            Some(RecordedBonus {
                kind: BonusKind::Multiplication,
                amount: 3,
            })
        );
    }

    #[test]
    fn crowd_changes_and_finish_are_mirrored() {
        let mut stats = Stats::new();
        let mut out = Vec::new();
        stats.handle(
            &[
                Event::CrowdChanged { count: 42 },
                Event::FinishReached {
                    unit: UnitId::new(9),
                },
            ],
            &mut out,
        );
        assert!(out.is_empty());
        assert_eq!(stats.runner_count(), 42);
        assert!(stats.finish_reached());
    }

    #[test]
    fn clearing_the_track_resets_the_run_ledger() {
        let mut stats = Stats::new();
        let mut out = Vec::new();
        stats.handle(
            &[
                Event::DoorChosen {
                    unit: UnitId::new(0),
                    side: DoorSide::Left,
                    kind: BonusKind::Addition,
                    amount: 5,
                },
                Event::CrowdChanged { count: 15 },
                Event::TrackCleared,
            ],
            &mut out,
        );
        assert_eq!(stats.doors_used(), 0);
        assert_eq!(stats.last_bonus(), None);
        assert!(!stats.finish_reached());
        // The runner count mirrors the world and survives a rebuild.
        assert_eq!(stats.runner_count(), 15);
    }
}
