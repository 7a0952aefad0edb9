#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Crowd Runner experience.

use crowd_runner_core::Command;
use crowd_runner_world::{
    query, World, DEFAULT_BASE_SPACING, DEFAULT_MAX_COUNT, DEFAULT_MAX_WORLD_RADIUS,
    DEFAULT_RUNNER_COUNT, GOLDEN_ANGLE_DEGREES,
};

/// Produces data required to greet the player and seed the crowd.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Exposes the current runner count for presentation purposes.
    #[must_use]
    pub fn runner_count(&self, world: &World) -> u32 {
        query::crowd_count(world)
    }

    /// Command that seeds the crowd with the default spiral configuration.
    #[must_use]
    pub fn default_crowd(&self, initial_count: u32) -> Command {
        Command::ConfigureCrowd {
            base_spacing: DEFAULT_BASE_SPACING,
            angle_step_degrees: GOLDEN_ANGLE_DEGREES,
            max_world_radius: DEFAULT_MAX_WORLD_RADIUS,
            max_count: DEFAULT_MAX_COUNT,
            initial_count,
        }
    }

    /// Default number of runners a fresh run starts with.
    #[must_use]
    pub fn default_runner_count(&self) -> u32 {
        DEFAULT_RUNNER_COUNT
    }
}
