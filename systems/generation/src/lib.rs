#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic chunk generation system.
//!
//! Drives the world's streaming cursor through [`Command`] batches: either a
//! fixed-length track terminated by a finish unit, or an endless forward
//! stream windowed around a moving observer. Selection runs over a weighted
//! entry pool with repetition constraints; all randomness comes from one
//! seeded generator owned by the system, so identical seeds replay
//! identical tracks.

use crowd_runner_core::{Command, EntryTable, Event, UnitCategory, UnitDefinition};
use crowd_runner_world::query::TrackWindowView;
use log::{error, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod pool;

pub use pool::select_entry;

/// Iteration ceiling for one-off fixed-length fills.
const FIXED_SAFETY_LIMIT: u32 = 10_000;
/// Iteration ceiling for per-step streaming fills, which run every tick.
const STREAM_SAFETY_LIMIT: u32 = 2_048;

/// Strategies for laying out the track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationMode {
    /// Fill up to a target length and terminate with the finish unit.
    FixedLength,
    /// Stream ahead of the observer forever, despawning behind it.
    Endless,
}

/// Configuration parameters required to construct the generation system.
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    /// Layout strategy to drive.
    pub mode: GenerationMode,
    /// Weighted pool of body unit candidates.
    pub table: EntryTable,
    /// Optional unit placed first at offset zero, bypassing the pool.
    pub start: Option<UnitDefinition>,
    /// Optional unit placed last in fixed-length mode, bypassing the pool.
    pub finish: Option<UnitDefinition>,
    /// Total track length targeted in fixed-length mode.
    pub target_length: f32,
    /// Minimum generated buffer ahead of the observer in endless mode.
    pub keep_ahead_distance: f32,
    /// Distance behind the observer after which units despawn.
    pub despawn_behind_distance: f32,
    /// Seed for the system's random source; rebuilds re-seed from it.
    pub rng_seed: u64,
}

impl GenerationConfig {
    /// Creates a fixed-length configuration with streaming defaults unused.
    #[must_use]
    pub fn fixed(table: EntryTable, target_length: f32, rng_seed: u64) -> Self {
        Self {
            mode: GenerationMode::FixedLength,
            table,
            start: None,
            finish: None,
            target_length,
            keep_ahead_distance: 0.0,
            despawn_behind_distance: 0.0,
            rng_seed,
        }
    }

    /// Creates an endless configuration with the fixed-length target unused.
    #[must_use]
    pub fn endless(
        table: EntryTable,
        keep_ahead_distance: f32,
        despawn_behind_distance: f32,
        rng_seed: u64,
    ) -> Self {
        Self {
            mode: GenerationMode::Endless,
            table,
            start: None,
            finish: None,
            target_length: 0.0,
            keep_ahead_distance,
            despawn_behind_distance,
            rng_seed,
        }
    }
}

#[derive(Debug, Default)]
struct RunState {
    last_entry: Option<usize>,
    last_category: UnitCategory,
    consecutive_category: u32,
}

/// Pure system that emits deterministic track-building command batches.
#[derive(Debug)]
pub struct Generation {
    config: GenerationConfig,
    rng: ChaCha8Rng,
    run: RunState,
}

impl Generation {
    /// Creates a new generation system using the supplied configuration.
    #[must_use]
    pub fn new(config: GenerationConfig) -> Self {
        if let Err(cause) = config.table.validate() {
            warn!("entry table cannot drive generation: {cause}");
        }
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self {
            config,
            rng,
            run: RunState::default(),
        }
    }

    /// Emits the command batch that rebuilds the track from scratch.
    ///
    /// The batch starts with [`Command::ClearTrack`], and the random source
    /// is re-seeded first, so repeated rebuilds replay identical tracks.
    pub fn rebuild(&mut self, observer: f32, out: &mut Vec<Command>) {
        out.push(Command::ClearTrack);
        self.rng = ChaCha8Rng::seed_from_u64(self.config.rng_seed);
        self.run = RunState::default();

        let mut cursor = 0.0;
        if let Some(start) = self.config.start.clone() {
            cursor = place_exact(cursor, start, out);
        }

        match self.config.mode {
            GenerationMode::FixedLength => self.fill_fixed(cursor, out),
            GenerationMode::Endless => self.fill_ahead(cursor, observer, out),
        }
    }

    /// Consumes events and the current window to stream the endless track.
    ///
    /// Fixed-length tracks are fully built by [`Generation::rebuild`], so
    /// this is a no-op outside endless mode or when no time advanced.
    pub fn handle(
        &mut self,
        events: &[Event],
        observer: f32,
        window: TrackWindowView,
        out: &mut Vec<Command>,
    ) {
        if self.config.mode != GenerationMode::Endless {
            return;
        }
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        self.fill_ahead(window.cursor, observer, out);

        let cutoff = observer - self.config.despawn_behind_distance;
        if window.oldest_end.is_some_and(|end| end < cutoff) {
            out.push(Command::ReleaseBehind { cutoff });
        }
    }

    fn fill_fixed(&mut self, mut cursor: f32, out: &mut Vec<Command>) {
        let finish_length = self
            .config
            .finish
            .as_ref()
            .map_or(0.0, UnitDefinition::clamped_length);

        let mut iterations = 0;
        while cursor + finish_length < self.config.target_length {
            if iterations == FIXED_SAFETY_LIMIT {
                error!("safety ceiling hit while filling the fixed-length track");
                break;
            }
            iterations += 1;
            let Some(definition) = self.select_next() else {
                warn!("no spawn candidate available; finishing the fixed-length track early");
                break;
            };
            cursor = place_exact(cursor, definition, out);
        }

        if let Some(finish) = self.config.finish.clone() {
            let _ = place_exact(cursor, finish, out);
        }
    }

    fn fill_ahead(&mut self, mut cursor: f32, observer: f32, out: &mut Vec<Command>) {
        let mut iterations = 0;
        while cursor - observer < self.config.keep_ahead_distance {
            if iterations == STREAM_SAFETY_LIMIT {
                error!("safety ceiling hit while streaming ahead of the observer");
                break;
            }
            iterations += 1;
            let Some(definition) = self.select_next() else {
                warn!("no spawn candidate available; pausing the stream");
                break;
            };
            cursor = place_exact(cursor, definition, out);
        }
    }

    /// Runs one pool selection and folds the pick into the run-state.
    fn select_next(&mut self) -> Option<UnitDefinition> {
        let chosen = pool::select_entry(
            &mut self.rng,
            &self.config.table,
            self.run.last_entry,
            self.run.last_category,
            self.run.consecutive_category,
        )?;
        let definition = self.config.table.entries[chosen]
            .definition
            .clone()
            .expect("selected entries always carry a definition");

        self.run.consecutive_category = if definition.category == self.run.last_category {
            self.run.consecutive_category + 1
        } else {
            1
        };
        self.run.last_category = definition.category;
        self.run.last_entry = Some(chosen);
        Some(definition)
    }
}

/// Plans one placement at the cursor and returns the advanced cursor.
///
/// Mirrors the world's placement arithmetic so the system can keep planning
/// within one batch before the world has applied anything.
fn place_exact(cursor: f32, definition: UnitDefinition, out: &mut Vec<Command>) -> f32 {
    let next = cursor + definition.clamped_length();
    out.push(Command::PlaceUnit { definition });
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowd_runner_core::PoolEntry;

    fn single_unit_table() -> EntryTable {
        EntryTable::new(vec![PoolEntry::new(
            UnitDefinition::new("segment", 10.0, UnitCategory::Generic),
            1.0,
        )])
    }

    #[test]
    fn fixed_mode_ignores_stream_steps() {
        let config = GenerationConfig::fixed(single_unit_table(), 50.0, 1);
        let mut generation = Generation::new(config);
        let mut out = Vec::new();
        generation.handle(
            &[Event::TimeAdvanced {
                dt: std::time::Duration::from_millis(16),
            }],
            0.0,
            TrackWindowView {
                cursor: 0.0,
                oldest_end: None,
            },
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn endless_mode_waits_for_time_to_advance() {
        let config = GenerationConfig::endless(single_unit_table(), 80.0, 40.0, 1);
        let mut generation = Generation::new(config);
        let mut out = Vec::new();
        generation.handle(
            &[Event::ObserverMoved { position: 5.0 }],
            5.0,
            TrackWindowView {
                cursor: 0.0,
                oldest_end: None,
            },
            &mut out,
        );
        assert!(out.is_empty());
    }
}
