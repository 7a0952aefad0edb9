#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives headless Crowd Runner runs.
//!
//! Boots a world, rebuilds the track from a scenario, then advances the
//! observer tick by tick: the player walks through whichever door face
//! grows the crowd, door outcomes feed crowd arithmetic, and endless runs
//! stream new units ahead while releasing the ones left behind.

mod scenario;
mod scene;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use crowd_runner_core::{ActorKind, Command, DoorPairConfig, Event};
use crowd_runner_system_bootstrap::Bootstrap;
use crowd_runner_system_generation::{Generation, GenerationConfig};
use crowd_runner_system_stats::Stats;
use crowd_runner_world::{self as world, query, World};

use crate::scenario::Scenario;

/// Command-line arguments accepted by the simulation driver.
#[derive(Debug, Parser)]
#[command(name = "crowd-runner", about = "Headless Crowd Runner simulation driver")]
struct Args {
    /// Track layout strategy.
    #[arg(long, value_enum, default_value = "fixed")]
    mode: ModeArg,
    /// Seed driving deterministic generation.
    #[arg(long, default_value_t = 12345)]
    seed: u64,
    /// Target track length for fixed runs.
    #[arg(long, default_value_t = 100.0)]
    target_length: f32,
    /// Generated buffer kept ahead of the observer in endless runs.
    #[arg(long, default_value_t = 80.0)]
    keep_ahead: f32,
    /// Distance behind the observer after which units despawn.
    #[arg(long, default_value_t = 40.0)]
    despawn_behind: f32,
    /// Maximum number of simulation ticks to run.
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// Observer speed in world units per second.
    #[arg(long, default_value_t = 8.0)]
    speed: f32,
    /// TOML scenario file replacing the built-in scenario.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Overrides the number of runners the crowd starts with.
    #[arg(long)]
    runners: Option<u32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    /// Build the whole track once and stop at the finish line.
    Fixed,
    /// Stream the track forever around the moving observer.
    Endless,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::built_in(),
    };

    let mut world = World::new();
    let bootstrap = Bootstrap::default();
    println!("{}", bootstrap.welcome_banner(&world));

    let initial_runners = args.runners.unwrap_or_else(|| {
        scenario
            .initial_count()
            .unwrap_or_else(|| bootstrap.default_runner_count())
    });
    let crowd_command = scenario
        .crowd_command(initial_runners)
        .unwrap_or_else(|| bootstrap.default_crowd(initial_runners));

    let mut events = Vec::new();
    world::apply(&mut world, crowd_command, &mut events);

    let mut config = match args.mode {
        ModeArg::Fixed => GenerationConfig::fixed(scenario.table(), args.target_length, args.seed),
        ModeArg::Endless => GenerationConfig::endless(
            scenario.table(),
            args.keep_ahead,
            args.despawn_behind,
            args.seed,
        ),
    };
    config.start = scenario.start.as_ref().map(|spec| spec.definition());
    config.finish = scenario.finish.as_ref().map(|spec| spec.definition());
    let finish_name = match args.mode {
        ModeArg::Fixed => config.finish.as_ref().map(|finish| finish.name.clone()),
        ModeArg::Endless => None,
    };

    let mut generation = Generation::new(config);
    let mut stats = Stats::new();

    let mut commands = Vec::new();
    generation.rebuild(0.0, &mut commands);
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    report(&events);

    let dt = Duration::from_millis(100);
    let step = args.speed * dt.as_secs_f32();
    let mut observer = 0.0_f32;
    let mut elapsed_ticks = 0;

    for _ in 0..args.ticks {
        elapsed_ticks += 1;
        let previous = observer;
        observer += step;

        let mut tick_events = Vec::new();
        world::apply(
            &mut world,
            Command::SetObserverPosition { position: observer },
            &mut tick_events,
        );
        world::apply(&mut world, Command::Tick { dt }, &mut tick_events);

        for command in crossings(&world, previous, observer, finish_name.as_deref()) {
            world::apply(&mut world, command, &mut tick_events);
        }

        let mut bridged = Vec::new();
        stats.handle(&tick_events, &mut bridged);

        let mut follow_events = Vec::new();
        for command in bridged {
            world::apply(&mut world, command, &mut follow_events);
        }
        let mut leftovers = Vec::new();
        stats.handle(&follow_events, &mut leftovers);
        debug_assert!(leftovers.is_empty());

        let mut streamed = Vec::new();
        generation.handle(
            &tick_events,
            observer,
            query::track_window(&world),
            &mut streamed,
        );
        for command in streamed {
            world::apply(&mut world, command, &mut follow_events);
        }

        report(&tick_events);
        report(&follow_events);

        if stats.finish_reached() {
            break;
        }
    }

    let scene = scene::build(&world)?;
    println!("run ended after {elapsed_ticks} ticks");
    println!("runners: {}", scene.counter.label);
    println!("doors used: {}", stats.doors_used());
    if let Some(bonus) = stats.last_bonus() {
        println!("last door: {}", bonus.kind.format_label(bonus.amount));
    }
    println!(
        "track covers {:.1} units across {} strips",
        scene.covered_length(),
        scene.strips.len()
    );
    println!("crowd radius: {:.2}", query::bounding_radius(&world));
    Ok(())
}

/// Commands for doors and the finish line the observer crossed this step.
fn crossings(
    world: &World,
    previous: f32,
    observer: f32,
    finish_name: Option<&str>,
) -> Vec<Command> {
    let mut commands = Vec::new();
    for snapshot in query::track_view(world).iter() {
        if snapshot.start <= previous || snapshot.start > observer {
            continue;
        }
        if let Some(door) = &snapshot.door {
            if door.armed {
                commands.push(Command::EnterDoor {
                    unit: snapshot.id,
                    actor: ActorKind::Player,
                    lateral_offset: preferred_lateral(&door.pair),
                });
            }
        }
        if Some(snapshot.name.as_str()) == finish_name {
            commands.push(Command::EnterFinish {
                unit: snapshot.id,
                actor: ActorKind::Player,
            });
        }
    }
    commands
}

/// Lateral offset steering the player through the friendlier face.
fn preferred_lateral(pair: &DoorPairConfig) -> f32 {
    if pair.right.kind.is_bonus() {
        1.0
    } else if pair.left.kind.is_bonus() {
        -1.0
    } else {
        // Both faces shrink the crowd; default through the left one.
        -1.0
    }
}

fn report(events: &[Event]) {
    for event in events {
        match event {
            Event::DoorChosen {
                side, kind, amount, ..
            } => {
                println!("door {side:?} applied {}", kind.format_label(*amount));
            }
            Event::CrowdChanged { count } => println!("crowd is now {count}"),
            Event::FinishReached { .. } => println!("finish reached"),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowd_runner_core::{BonusKind, DoorSideConfig};

    #[test]
    fn preferred_lateral_steers_towards_growth() {
        let both = DoorPairConfig::new(
            DoorSideConfig::new(BonusKind::Addition, 5),
            DoorSideConfig::new(BonusKind::Multiplication, 2),
        );
        assert!(preferred_lateral(&both) > 0.0);

        let left_only = DoorPairConfig::new(
            DoorSideConfig::new(BonusKind::Addition, 5),
            DoorSideConfig::new(BonusKind::Division, 2),
        );
        assert!(preferred_lateral(&left_only) < 0.0);

        let neither = DoorPairConfig::new(
            DoorSideConfig::new(BonusKind::Subtraction, 3),
            DoorSideConfig::new(BonusKind::Division, 2),
        );
        assert!(preferred_lateral(&neither) < 0.0);
    }
}
