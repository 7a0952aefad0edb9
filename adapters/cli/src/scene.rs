//! Projects world snapshots into rendering scene descriptors.

use anyhow::Result;
use crowd_runner_core::DoorSide;
use crowd_runner_rendering::{
    category_color, Color, CounterPresentation, DoorFacePresentation, DoorPresentation,
    RunnerPresentation, Scene, TrackStripPresentation,
};
use crowd_runner_world::{query, World};

const RUNNER_COLOR: Color = Color::from_rgb_u8(240, 220, 130);
const SPENT_DOOR_DIM: f32 = 0.6;

/// Builds the scene for the current world state.
pub(crate) fn build(world: &World) -> Result<Scene> {
    let mut strips = Vec::new();
    let mut doors = Vec::new();
    for snapshot in query::track_view(world).iter() {
        strips.push(TrackStripPresentation::new(
            snapshot.id,
            snapshot.start,
            snapshot.end,
            category_color(snapshot.category),
        )?);
        if let Some(door) = &snapshot.door {
            doors.push(DoorPresentation {
                unit: snapshot.id,
                offset: snapshot.start,
                armed: door.armed,
                left: face(&door.pair, DoorSide::Left, door.armed),
                right: face(&door.pair, DoorSide::Right, door.armed),
            });
        }
    }

    let runners = query::runner_positions(world)
        .iter()
        .map(|position| RunnerPresentation::new(*position, RUNNER_COLOR))
        .collect();

    Ok(Scene::new(
        strips,
        doors,
        runners,
        CounterPresentation::new(query::crowd_count(world)),
        query::observer_position(world),
    ))
}

fn face(
    pair: &crowd_runner_core::DoorPairConfig,
    side: DoorSide,
    armed: bool,
) -> DoorFacePresentation {
    let config = pair.side(side);
    let byte_color = if config.kind.is_bonus() {
        pair.bonus_color
    } else {
        pair.penalty_color
    };
    let mut color = Color::from(byte_color);
    if !armed {
        color = color.dim(SPENT_DOOR_DIM);
    }
    DoorFacePresentation::new(side, config.label(), color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowd_runner_core::{
        BonusKind, Command, DoorBehavior, DoorConfig, DoorPairConfig, DoorSideConfig,
        UnitCategory, UnitDefinition,
    };
    use crowd_runner_world::{self as world};

    #[test]
    fn scenes_carry_strips_doors_and_the_counter() {
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::ConfigureCrowd {
                base_spacing: 2.0,
                angle_step_degrees: 137.508,
                max_world_radius: 0.0,
                max_count: 0,
                initial_count: 5,
            },
            &mut events,
        );
        world::apply(
            &mut world,
            Command::Tick {
                dt: std::time::Duration::from_millis(16),
            },
            &mut events,
        );

        let definition =
            UnitDefinition::new("gate", 12.0, UnitCategory::Generic).with_door(DoorConfig {
                pair: DoorPairConfig::new(
                    DoorSideConfig::new(BonusKind::Addition, 5),
                    DoorSideConfig::new(BonusKind::Division, -2),
                ),
                behavior: DoorBehavior::default(),
            });
        world::apply(&mut world, Command::PlaceUnit { definition }, &mut events);

        let scene = build(&world).expect("scene builds");
        assert_eq!(scene.strips.len(), 1);
        assert_eq!(scene.doors.len(), 1);
        assert_eq!(scene.runners.len(), 5);
        assert_eq!(scene.counter.count, 5);

        let door = &scene.doors[0];
        assert!(door.armed);
        assert_eq!(door.left.label, "+5");
        assert_eq!(door.right.label, "\u{f7}2");
    }
}
