//! Whole-world behaviour: session control, spawning, the tick and its invariants

use std::collections::{HashMap, HashSet};

use intersection_sim::simulation::{
    Direction, Lane, PhasePlan, Position, SignalPhase, SimConfig, SimId, SimStatus, SimWorld,
    SpawnSchedule, Vehicle, VehicleId, VehicleState, CRUISE_SPEED,
};

const FRAME: f32 = 1.0 / 60.0;

fn quiet_world(initial_phase: SignalPhase) -> SimWorld {
    let mut world = SimWorld::new(SimConfig {
        initial_phase,
        ..SimConfig::without_spawners()
    });
    world.start();
    world
}

#[test]
fn test_idle_world_does_nothing() {
    let mut world = SimWorld::default();
    assert_eq!(world.status(), SimStatus::Idle);

    world.tick(1.0);
    assert_eq!(world.time, 0.0);
    assert!(!world.request_phase(SignalPhase::SideGo));
    assert_eq!(world.phase(), SignalPhase::MainGo);
    assert!(world.spawn_vehicle(Lane::MainSouthStraight).is_none());
}

#[test]
fn test_spawners_fire_on_their_interval() {
    let mut world = SimWorld::default();
    world.start();
    assert!(world.is_running());

    world.tick(0.5);
    assert!(world.vehicles.is_empty());

    // Main straight fires at 1s: one vehicle per direction
    world.tick(0.5);
    assert_eq!(world.vehicles.len(), 2);
    let lanes: HashSet<Lane> = world.vehicles.iter().map(|v| v.lane).collect();
    assert_eq!(
        lanes,
        HashSet::from([Lane::MainSouthStraight, Lane::MainNorthStraight])
    );

    // Side straight joins at 2s; the main entries are still occupied
    world.tick(1.0);
    assert_eq!(world.vehicles.len(), 4);
    assert_eq!(world.metrics.spawned, 4);
    assert!(world
        .vehicles
        .iter()
        .any(|v| v.lane == Lane::SideEastStraight));
}

#[test]
fn test_phase_request_runs_full_clearance() {
    let mut world = quiet_world(SignalPhase::MainGo);
    assert!(world.request_phase(SignalPhase::SideGo));

    let mut sequence = vec![SignalPhase::MainGo, world.phase()];
    let mut after_tick = Vec::new();
    for _ in 0..10 {
        world.tick(0.5);
        after_tick.push(world.phase());
        if sequence.last() != Some(&world.phase()) {
            sequence.push(world.phase());
        }
    }

    assert_eq!(
        sequence,
        vec![
            SignalPhase::MainGo,
            SignalPhase::MainYellow,
            SignalPhase::AllRed,
            SignalPhase::SideGo
        ]
    );
    // 3s of yellow, then 1s of all-red
    assert_eq!(after_tick[4], SignalPhase::MainYellow);
    assert_eq!(after_tick[5], SignalPhase::AllRed);
    assert_eq!(after_tick[6], SignalPhase::AllRed);
    assert_eq!(after_tick[7], SignalPhase::SideGo);

    // Requesting mid-transition changes nothing
    assert!(world.request_phase(SignalPhase::MainLeft));
    world.tick(0.5);
    assert!(!world.request_phase(SignalPhase::SideLeft));
    assert_eq!(world.signals.target(), Some(SignalPhase::MainLeft));
}

#[test]
fn test_red_light_vehicle_waits_for_green() {
    let mut world = quiet_world(SignalPhase::SideGo);
    let id = world.spawn_vehicle(Lane::MainSouthStraight).unwrap();

    for _ in 0..200 {
        world.tick(FRAME);
    }
    let held = world.vehicle(id).unwrap().clone();
    assert!(held.is_stopped());
    assert!(held.is_in_stop_window());
    assert_eq!(held.state, VehicleState::Approaching);

    assert!(world.request_phase(SignalPhase::MainGo));

    let mut ticks = 0;
    loop {
        world.tick(FRAME);
        ticks += 1;
        assert!(ticks < 600, "phase never turned green");

        let vehicle = world.vehicle(id).unwrap();
        if world.phase() != SignalPhase::MainGo {
            assert!(vehicle.is_stopped());
            assert_eq!(vehicle.position, held.position);
        } else {
            assert_eq!(vehicle.speed, CRUISE_SPEED);
            assert_eq!(vehicle.state, VehicleState::InIntersectionStraight);
            break;
        }
    }

    // Waiting time is recorded on the vehicle
    assert!(world.vehicle(id).unwrap().wait_secs > 4.0);
}

#[test]
fn test_vehicle_counted_once_and_recorded_on_exit() {
    let mut world = quiet_world(SignalPhase::MainGo);
    world.spawn_vehicle(Lane::MainSouthStraight).unwrap();

    let mut ticks = 0;
    while !world.vehicles.is_empty() {
        world.tick(FRAME);
        ticks += 1;
        assert!(ticks < 1000, "vehicle never left the canvas");
        assert!(world.metrics.throughput <= 1);
    }

    assert_eq!(world.metrics.throughput, 1);
    assert_eq!(world.metrics.completed_trips, 1);
    assert!(world.metrics.average_trip_secs() > 5.0);
    assert_eq!(world.metrics.average_wait_secs(), 0.0);

    for _ in 0..60 {
        world.tick(FRAME);
    }
    assert_eq!(world.metrics.throughput, 1);
    assert_eq!(world.metrics.completed_trips, 1);
}

#[test]
fn test_throughput_counts_before_leaving_bounds() {
    let mut world = quiet_world(SignalPhase::SideGo);
    let id = world.spawn_vehicle(Lane::SideEastStraight).unwrap();

    while !world.vehicle(id).unwrap().counted {
        world.tick(FRAME);
    }

    let vehicle = world.vehicle(id).unwrap();
    assert!(vehicle.has_cleared_intersection());
    assert_eq!(world.metrics.throughput, 1);
    assert_eq!(world.metrics.completed_trips, 0);
}

#[test]
fn test_follower_in_world_stops_behind_queue() {
    let mut world = quiet_world(SignalPhase::MainGo);
    let lane = Lane::MainSouthStraight;
    world
        .vehicles
        .push(Vehicle::at(VehicleId(SimId(100)), lane, Position::new(387.5, 135.0), 0.0));
    world
        .vehicles
        .push(Vehicle::at(VehicleId(SimId(101)), lane, Position::new(387.5, 100.0), 0.0));

    world.tick(FRAME);

    let lead = world.vehicle(VehicleId(SimId(100))).unwrap();
    let follower = world.vehicle(VehicleId(SimId(101))).unwrap();
    assert_eq!(lead.position.y, 137.0);
    // Lookups read tick-start positions, so the follower still saw a 10 unit gap
    assert!(follower.is_stopped());
    assert_eq!(follower.position.y, 100.0);
}

#[test]
fn test_spawn_skips_occupied_entry() {
    let mut world = quiet_world(SignalPhase::MainGo);
    let lane = Lane::SideWestLeft;

    assert!(world.spawn_vehicle(lane).is_some());
    assert!(world.spawn_vehicle(lane).is_none());
    assert!(!world.is_lane_entry_clear(lane));

    // Another lane is unaffected
    assert!(world.spawn_vehicle(Lane::SideWestStraight).is_some());

    for _ in 0..20 {
        world.tick(FRAME);
    }
    assert!(world.is_lane_entry_clear(lane));
    assert!(world.spawn_vehicle(lane).is_some());
}

#[test]
fn test_session_timer_freezes_simulation() {
    let mut world = SimWorld::new(SimConfig {
        session_secs: 10.0,
        ..SimConfig::default()
    });
    world.start();

    for _ in 0..19 {
        world.tick(0.5);
    }
    assert!(world.is_running());
    world.request_phase(SignalPhase::SideGo);

    world.tick(0.5);
    assert_eq!(world.status(), SimStatus::Finished);
    assert!(!world.signals.is_transitioning());

    let frozen: Vec<Position> = world.vehicles.iter().map(|v| v.position).collect();
    let spawned = world.metrics.spawned;
    for _ in 0..10 {
        world.tick(0.5);
    }
    let after: Vec<Position> = world.vehicles.iter().map(|v| v.position).collect();
    assert_eq!(frozen, after);
    assert_eq!(world.metrics.spawned, spawned);
    assert!(!world.request_phase(SignalPhase::MainLeft));
}

#[test]
fn test_reset_clears_state_and_ids_are_not_reused() {
    let mut world = SimWorld::default();
    world.start();
    for _ in 0..8 {
        world.tick(0.5);
    }
    world.request_phase(SignalPhase::SideLeft);
    let highest = world.vehicles.iter().map(|v| v.id).max().unwrap();

    world.reset();
    assert_eq!(world.status(), SimStatus::Idle);
    assert!(world.vehicles.is_empty());
    assert_eq!(world.metrics.spawned, 0);
    assert_eq!(world.metrics.throughput, 0);
    assert_eq!(world.phase(), SignalPhase::MainGo);
    assert!(!world.signals.is_transitioning());
    assert_eq!(world.time, 0.0);

    world.start();
    let id = world.spawn_vehicle(Lane::MainNorthLeft).unwrap();
    assert!(id > highest);
}

#[test]
fn test_stop_cancels_spawners_and_transition() {
    let mut world = SimWorld::default();
    world.start();
    assert!(world.request_phase(SignalPhase::MainLeft));

    world.stop();
    assert_eq!(world.status(), SimStatus::Finished);
    assert!(!world.signals.is_transitioning());

    world.tick(5.0);
    assert!(world.vehicles.is_empty());
    assert_eq!(world.time, 0.0);
}

#[test]
fn test_seeded_jitter_is_reproducible() {
    let config = SimConfig {
        spawn_jitter: 0.5,
        ..SimConfig::default()
    };
    let mut first = SimWorld::new_with_seed(config.clone(), 7);
    let mut second = SimWorld::new_with_seed(config, 7);
    first.start();
    second.start();

    for _ in 0..(30 * 60) {
        first.tick(FRAME);
        second.tick(FRAME);
    }

    assert_eq!(first.metrics, second.metrics);
    assert_eq!(first.vehicles, second.vehicles);
}

#[test]
fn test_config_validation() {
    assert!(SimConfig::default().validate().is_ok());

    let bad_yellow = SimConfig {
        yellow_secs: 0.0,
        ..SimConfig::default()
    };
    assert!(bad_yellow.validate().is_err());

    let bad_initial = SimConfig {
        initial_phase: SignalPhase::AllRed,
        ..SimConfig::default()
    };
    assert!(bad_initial.validate().is_err());

    let bad_jitter = SimConfig {
        spawn_jitter: 0.95,
        ..SimConfig::default()
    };
    assert!(bad_jitter.validate().is_err());

    let bad_spawner = SimConfig {
        spawners: vec![SpawnSchedule::new(SignalPhase::MainGo, f32::NAN)],
        ..SimConfig::default()
    };
    assert!(bad_spawner.validate().is_err());
}

/// Run a busy minute with a rotating plan and check the per-vehicle invariants every tick
#[test]
fn test_vehicle_invariants_hold_over_a_busy_session() {
    let config = SimConfig {
        spawn_jitter: 0.3,
        ..SimConfig::default()
    };
    let mut plan = PhasePlan::cycle(config.initial_phase, 6.0, config.session_secs);
    let mut world = SimWorld::new_with_seed(config, 42);
    world.start();

    let mut lanes: HashMap<VehicleId, Lane> = HashMap::new();
    let mut directions: HashMap<VehicleId, Direction> = HashMap::new();
    let mut turns: HashMap<VehicleId, u32> = HashMap::new();
    let mut committed: HashSet<VehicleId> = HashSet::new();
    let mut counted: HashSet<VehicleId> = HashSet::new();

    for _ in 0..(60 * 60) {
        for phase in plan.due(world.time) {
            world.request_phase(phase);
        }
        world.tick(FRAME);

        for vehicle in &world.vehicles {
            assert!(
                vehicle.speed == 0.0 || vehicle.speed == CRUISE_SPEED,
                "vehicle {} has speed {}",
                vehicle.id,
                vehicle.speed
            );

            let lane = *lanes.entry(vehicle.id).or_insert(vehicle.lane);
            assert_eq!(lane, vehicle.lane);

            let previous = directions.insert(vehicle.id, vehicle.direction);
            if let Some(previous) = previous {
                if previous != vehicle.direction {
                    let count = turns.entry(vehicle.id).or_insert(0);
                    *count += 1;
                    assert_eq!(*count, 1, "vehicle {} turned twice", vehicle.id);
                    assert!(vehicle.lane.is_left_turn());
                    assert_eq!(vehicle.state, VehicleState::InIntersectionTurning);
                    assert_eq!(vehicle.direction, previous.left_turn());
                }
            }

            if vehicle.state == VehicleState::Approaching {
                assert!(
                    !committed.contains(&vehicle.id),
                    "vehicle {} returned to approaching",
                    vehicle.id
                );
            } else {
                committed.insert(vehicle.id);
                let expected = if vehicle.lane.is_left_turn() {
                    VehicleState::InIntersectionTurning
                } else {
                    VehicleState::InIntersectionStraight
                };
                assert_eq!(vehicle.state, expected);
            }

            if counted.contains(&vehicle.id) {
                assert!(vehicle.counted);
            } else if vehicle.counted {
                counted.insert(vehicle.id);
            }
        }

        // Everything that exits has passed through the box first
        assert!(world.metrics.throughput >= world.metrics.completed_trips);
        assert!(world.metrics.throughput <= world.metrics.spawned);
    }

    assert!(world.metrics.completed_trips > 0);
    assert!(world.metrics.average_trip_secs() > 0.0);
    assert!(turns.values().any(|count| *count == 1));
}

#[test]
fn test_huge_tick_spawns_at_most_once_per_movement() {
    let config = SimConfig {
        session_secs: 1.0e9,
        ..SimConfig::default()
    };
    assert!(config.validate().is_ok());
    let mut world = SimWorld::new(config);
    world.start();

    world.tick(1.0e8);
    assert!(world.is_running());
    assert_eq!(world.metrics.spawned, 8);
    for (movement, remaining) in world.next_spawns() {
        let schedule = world
            .config
            .spawners
            .iter()
            .find(|s| s.movement == movement)
            .unwrap();
        assert_eq!(remaining, schedule.interval_secs);
    }

    // Entries are still occupied, so the next long tick adds nobody
    world.tick(1.0e8);
    assert_eq!(world.metrics.spawned, 8);
    assert_eq!(world.next_spawns().len(), 4);
}
