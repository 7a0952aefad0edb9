#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Crowd Runner.
//!
//! The world owns the track's active window of placed units, the crowd
//! population, and per-door arming state. All mutation happens through
//! [`apply`], which executes one [`Command`] and broadcasts [`Event`] values;
//! read access goes through the [`query`] module.

use std::time::Duration;

use crowd_runner_core::{
    ActorKind, Command, DoorIgnoreReason, DoorSide, Event, UnitId, WELCOME_BANNER,
};

mod crowd;
mod track;

use crowd::Crowd;
use track::Track;

/// Default spacing between successive spiral rings.
pub const DEFAULT_BASE_SPACING: f32 = 2.0;
/// Golden angle stepped per runner index when laying out the spiral.
pub const GOLDEN_ANGLE_DEGREES: f32 = 137.508;
/// Default crowd radius limit; zero disables compression.
pub const DEFAULT_MAX_WORLD_RADIUS: f32 = 0.0;
/// Default runner cap; zero means unlimited.
pub const DEFAULT_MAX_COUNT: u32 = 0;
/// Number of runners a freshly created world starts with.
pub const DEFAULT_RUNNER_COUNT: u32 = 10;

/// Represents the authoritative Crowd Runner world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    clock: Duration,
    observer: f32,
    track: Track,
    crowd: Crowd,
}

impl World {
    /// Creates a new Crowd Runner world ready for simulation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            clock: Duration::ZERO,
            observer: 0.0,
            track: Track::new(),
            crowd: Crowd::new(
                DEFAULT_BASE_SPACING,
                GOLDEN_ANGLE_DEGREES,
                DEFAULT_MAX_WORLD_RADIUS,
                DEFAULT_MAX_COUNT,
                DEFAULT_RUNNER_COUNT,
            ),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            rearm_due_doors(world, out_events);
            world.crowd.relayout_if_dirty();
        }
        Command::SetObserverPosition { position } => {
            world.observer = position;
            out_events.push(Event::ObserverMoved { position });
        }
        Command::ConfigureCrowd {
            base_spacing,
            angle_step_degrees,
            max_world_radius,
            max_count,
            initial_count,
        } => {
            world.crowd.configure(
                base_spacing,
                angle_step_degrees,
                max_world_radius,
                max_count,
                initial_count,
            );
            out_events.push(Event::CrowdChanged {
                count: world.crowd.count(),
            });
        }
        Command::ClearTrack => {
            world.track.clear();
            out_events.push(Event::TrackCleared);
        }
        Command::PlaceUnit { definition } => {
            let placed = world.track.place(definition);
            out_events.push(Event::UnitPlaced {
                unit: placed.id,
                category: placed.definition.category,
                start: placed.start,
                end: placed.end,
                has_door: placed.door.is_some(),
            });
        }
        Command::ReleaseBehind { cutoff } => {
            for unit in world.track.release_behind(cutoff) {
                out_events.push(Event::UnitReleased { unit });
            }
        }
        Command::EnterDoor {
            unit,
            actor,
            lateral_offset,
        } => enter_door(world, unit, actor, lateral_offset, out_events),
        Command::EnterFinish { unit, actor } => {
            if actor == ActorKind::Player && world.track.contains(unit) {
                out_events.push(Event::FinishReached { unit });
            }
        }
        Command::ApplyBonus { kind, amount } => {
            if let Some(count) = world.crowd.apply_bonus(kind, amount) {
                out_events.push(Event::CrowdChanged { count });
            }
        }
    }
}

/// Fires due re-arm deadlines in ascending unit order.
fn rearm_due_doors(world: &mut World, out_events: &mut Vec<Event>) {
    let now = world.clock;
    let mut rearmed = Vec::new();
    for placed in world.track.iter_mut() {
        if let Some(state) = placed.door.as_mut() {
            if state.rearm_at.is_some_and(|deadline| deadline <= now) {
                state.armed = true;
                state.rearm_at = None;
                rearmed.push(placed.id);
            }
        }
    }
    for unit in rearmed {
        out_events.push(Event::DoorRearmed { unit });
    }
}

fn enter_door(
    world: &mut World,
    unit: UnitId,
    actor: ActorKind,
    lateral_offset: f32,
    out_events: &mut Vec<Event>,
) {
    let now = world.clock;
    let Some(placed) = world.track.unit_mut(unit) else {
        out_events.push(Event::DoorIgnored {
            unit,
            reason: DoorIgnoreReason::UnknownUnit,
        });
        return;
    };
    let Some(config) = placed.door_config().cloned() else {
        out_events.push(Event::DoorIgnored {
            unit,
            reason: DoorIgnoreReason::NoDoor,
        });
        return;
    };
    let Some(state) = placed.door.as_mut() else {
        out_events.push(Event::DoorIgnored {
            unit,
            reason: DoorIgnoreReason::NoDoor,
        });
        return;
    };
    if actor != config.behavior.required_actor {
        out_events.push(Event::DoorIgnored {
            unit,
            reason: DoorIgnoreReason::WrongActor,
        });
        return;
    }
    if !state.armed {
        out_events.push(Event::DoorIgnored {
            unit,
            reason: DoorIgnoreReason::NotArmed,
        });
        return;
    }

    let side = resolve_side(lateral_offset);
    let side_config = config.pair.side(side);
    state.armed = false;

    let mut rearmed_immediately = false;
    if !config.behavior.one_shot {
        if config.behavior.rearm_delay.is_zero() {
            state.armed = true;
            rearmed_immediately = true;
        } else {
            state.rearm_at = Some(now.saturating_add(config.behavior.rearm_delay));
        }
    }

    out_events.push(Event::DoorChosen {
        unit,
        side,
        kind: side_config.kind,
        amount: side_config.magnitude(),
    });
    if rearmed_immediately {
        out_events.push(Event::DoorRearmed { unit });
    }
}

fn resolve_side(lateral_offset: f32) -> DoorSide {
    if lateral_offset > 0.0 {
        DoorSide::Right
    } else {
        DoorSide::Left
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use crowd_runner_core::{DoorPairConfig, UnitCategory, UnitId};
    use glam::Vec3;

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Simulated time accumulated since the world was created.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Last recorded observer position on the generation axis.
    #[must_use]
    pub fn observer_position(world: &World) -> f32 {
        world.observer
    }

    /// Captures the window geometry the generation system steps against.
    #[must_use]
    pub fn track_window(world: &World) -> TrackWindowView {
        TrackWindowView {
            cursor: world.track.cursor(),
            oldest_end: world.track.oldest_end(),
        }
    }

    /// Captures a read-only view of the placed units, ordered by offset.
    #[must_use]
    pub fn track_view(world: &World) -> TrackView {
        let snapshots = world
            .track
            .iter()
            .map(|placed| UnitSnapshot {
                id: placed.id,
                name: placed.definition.name.clone(),
                category: placed.definition.category,
                start: placed.start,
                end: placed.end,
                door: placed.door.as_ref().map(|state| DoorSnapshot {
                    armed: state.armed,
                    pair: placed
                        .door_config()
                        .expect("door state implies a door config")
                        .pair
                        .clone(),
                }),
            })
            .collect();
        TrackView { snapshots }
    }

    /// Number of runners currently in the crowd.
    #[must_use]
    pub fn crowd_count(world: &World) -> u32 {
        world.crowd.count()
    }

    /// Spiral spacing after radius compression.
    #[must_use]
    pub fn effective_spacing(world: &World) -> f32 {
        world.crowd.effective_spacing()
    }

    /// Outer radius currently occupied by the crowd.
    #[must_use]
    pub fn bounding_radius(world: &World) -> f32 {
        world.crowd.bounding_radius()
    }

    /// Cached runner positions from the most recent layout step.
    #[must_use]
    pub fn runner_positions(world: &World) -> &[Vec3] {
        world.crowd.positions()
    }

    /// Lateral interval available to the observer on a road of the given
    /// half width; shrinks as the crowd radius grows and collapses to zero
    /// once the crowd outgrows the road.
    #[must_use]
    pub fn lateral_bounds(world: &World, half_road_width: f32) -> (f32, f32) {
        let margin = (half_road_width - world.crowd.bounding_radius()).max(0.0);
        (-margin, margin)
    }

    /// Window geometry consumed by the streaming generation step.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct TrackWindowView {
        /// Next free offset on the generation axis.
        pub cursor: f32,
        /// End offset of the oldest placed unit, if any.
        pub oldest_end: Option<f32>,
    }

    /// Read-only snapshot describing all placed units.
    #[derive(Clone, Debug)]
    pub struct TrackView {
        snapshots: Vec<UnitSnapshot>,
    }

    impl TrackView {
        /// Iterator over the captured unit snapshots in offset order.
        pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<UnitSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single placed unit.
    #[derive(Clone, Debug)]
    pub struct UnitSnapshot {
        /// Identifier allocated to the unit by the world.
        pub id: UnitId,
        /// Name of the definition the unit was placed from.
        pub name: String,
        /// Category tag of the unit.
        pub category: UnitCategory,
        /// Start offset of the occupied interval.
        pub start: f32,
        /// End offset of the occupied interval.
        pub end: f32,
        /// Door presentation and arming state, when the unit carries one.
        pub door: Option<DoorSnapshot>,
    }

    /// Immutable representation of a placed door.
    #[derive(Clone, Debug)]
    pub struct DoorSnapshot {
        /// Indicates whether the door currently accepts a choice.
        pub armed: bool,
        /// Values and presentation of the two door sides.
        pub pair: DoorPairConfig,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_lateral_offset_resolves_left() {
        assert_eq!(resolve_side(0.0), DoorSide::Left);
        assert_eq!(resolve_side(-0.5), DoorSide::Left);
        assert_eq!(resolve_side(0.5), DoorSide::Right);
    }

    #[test]
    fn lateral_bounds_collapse_for_oversized_crowds() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureCrowd {
                base_spacing: 2.0,
                angle_step_degrees: GOLDEN_ANGLE_DEGREES,
                max_world_radius: 0.0,
                max_count: 0,
                initial_count: 100,
            },
            &mut events,
        );
        let (min, max) = query::lateral_bounds(&world, 5.0);
        assert_eq!((min, max), (0.0, 0.0));
    }
}
