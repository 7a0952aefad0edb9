use std::time::Duration;

use crowd_runner_core::{BonusKind, Command, Event};
use crowd_runner_world::{self as world, query, World};

const GOLDEN_ANGLE: f32 = 137.508;

fn configure(
    world: &mut World,
    base_spacing: f32,
    max_world_radius: f32,
    max_count: u32,
    initial_count: u32,
) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::ConfigureCrowd {
            base_spacing,
            angle_step_degrees: GOLDEN_ANGLE,
            max_world_radius,
            max_count,
            initial_count,
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::CrowdChanged {
            count: query::crowd_count(world)
        }]
    );
}

fn bonus(world: &mut World, kind: BonusKind, amount: u32) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::ApplyBonus { kind, amount }, &mut events);
    events
}

#[test]
fn bonus_arithmetic_chains_with_clamping() {
    let mut world = World::new();
    configure(&mut world, 2.0, 0.0, 0, 10);

    let events = bonus(&mut world, BonusKind::Multiplication, 3);
    assert_eq!(events, vec![Event::CrowdChanged { count: 30 }]);

    let events = bonus(&mut world, BonusKind::Division, 2);
    assert_eq!(events, vec![Event::CrowdChanged { count: 15 }]);

    let events = bonus(&mut world, BonusKind::Subtraction, 100);
    assert_eq!(events, vec![Event::CrowdChanged { count: 0 }]);
}

#[test]
fn addition_clamps_to_remaining_capacity() {
    let mut world = World::new();
    configure(&mut world, 2.0, 0.0, 20, 18);

    let events = bonus(&mut world, BonusKind::Addition, 5);
    assert_eq!(events, vec![Event::CrowdChanged { count: 20 }]);

    let events = bonus(&mut world, BonusKind::Addition, 5);
    assert!(events.is_empty(), "addition at cap must be a no-op");
}

#[test]
fn multiplication_respects_capacity_cap() {
    let mut world = World::new();
    configure(&mut world, 2.0, 0.0, 25, 10);

    let events = bonus(&mut world, BonusKind::Multiplication, 4);
    assert_eq!(events, vec![Event::CrowdChanged { count: 25 }]);
}

#[test]
fn degenerate_amounts_leave_crowd_untouched() {
    let mut world = World::new();
    configure(&mut world, 2.0, 0.0, 0, 12);

    assert!(bonus(&mut world, BonusKind::Addition, 0).is_empty());
    assert!(bonus(&mut world, BonusKind::Subtraction, 0).is_empty());
    assert!(bonus(&mut world, BonusKind::Multiplication, 1).is_empty());
    assert!(bonus(&mut world, BonusKind::Division, 1).is_empty());
    assert_eq!(query::crowd_count(&world), 12);
}

#[test]
fn division_rounds_down() {
    let mut world = World::new();
    configure(&mut world, 2.0, 0.0, 0, 7);

    let events = bonus(&mut world, BonusKind::Division, 2);
    assert_eq!(events, vec![Event::CrowdChanged { count: 3 }]);
}

#[test]
fn radius_compression_holds_the_configured_cap() {
    let mut world = World::new();
    configure(&mut world, 2.0, 4.0, 0, 100);

    // Desired radius 2 * sqrt(100) = 20 compresses spacing to 0.4.
    assert!((query::effective_spacing(&world) - 0.4).abs() < 1e-5);
    assert!((query::bounding_radius(&world) - 4.0).abs() < 1e-4);
}

#[test]
fn uncompressed_radius_uses_base_spacing() {
    let mut world = World::new();
    configure(&mut world, 2.0, 50.0, 0, 100);

    assert!((query::effective_spacing(&world) - 2.0).abs() < f32::EPSILON);
    assert!((query::bounding_radius(&world) - 20.0).abs() < 1e-4);
}

#[test]
fn empty_crowd_has_zero_radius() {
    let mut world = World::new();
    configure(&mut world, 2.0, 4.0, 0, 0);
    assert_eq!(query::bounding_radius(&world), 0.0);
}

#[test]
fn layout_recomputes_once_per_tick() {
    let mut world = World::new();
    configure(&mut world, 2.0, 0.0, 0, 9);
    assert!(
        query::runner_positions(&world).is_empty(),
        "layout stays dirty until the next tick"
    );

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );

    let positions = query::runner_positions(&world);
    assert_eq!(positions.len(), 9);
    assert!(positions[0].length() < 1e-6, "index 0 sits at the origin");

    // Index 1 sits one spacing away from the axis.
    let spacing = query::effective_spacing(&world);
    assert!((positions[1].length() - spacing).abs() < 1e-4);

    // Vogel spiral: radius grows with the square root of the index.
    let expected = spacing * (4.0_f32).sqrt();
    assert!((positions[4].length() - expected).abs() < 1e-4);
    assert_eq!(positions[4].y, 0.0);
}

#[test]
fn shrinking_after_growth_reuses_leading_indices() {
    let mut world = World::new();
    configure(&mut world, 2.0, 0.0, 0, 16);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );
    let before: Vec<_> = query::runner_positions(&world).to_vec();

    assert_eq!(
        bonus(&mut world, BonusKind::Subtraction, 6),
        vec![Event::CrowdChanged { count: 10 }]
    );
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );

    // Removal trims from the end: surviving runners keep their slots.
    let after = query::runner_positions(&world);
    assert_eq!(after.len(), 10);
    for (index, position) in after.iter().enumerate() {
        assert!((before[index] - *position).length() < 1e-6);
    }
}
