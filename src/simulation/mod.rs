//! Standalone intersection simulation module
//!
//! This module contains the vehicle model, the signal phase controller and the
//! metrics aggregator, tied together by `SimWorld`. Rendering and input are
//! left to the caller, which reads state after each tick.

mod config;
mod geometry;
mod metrics;
mod plan;
mod signal;
mod spawner;
mod types;
mod vehicle;
mod world;

pub use config::{
    SimConfig, DEFAULT_ALL_RED_SECS, DEFAULT_SESSION_SECS, DEFAULT_YELLOW_SECS, MAX_SPAWN_JITTER,
};
pub use geometry::{is_offscreen, IntersectionBox, Lane, CANVAS_HEIGHT, CANVAS_WIDTH, INTERSECTION};
pub use metrics::SimMetrics;
pub use plan::{PhasePlan, PlannedRequest};
pub use signal::{SignalColor, SignalController, SignalPhase};
pub use spawner::{SpawnSchedule, Spawner};
pub use types::{
    Dimensions, Direction, LaneKind, Position, SimId, VehicleColor, VehicleId, VehicleState,
    CRUISE_SPEED, OFFSCREEN_MARGIN, PIXELS_PER_METER, SAFE_GAP, STOP_LINE_WINDOW, VEHICLE_LENGTH,
    VEHICLE_WIDTH,
};
pub use vehicle::Vehicle;
pub use world::{SimStatus, SimWorld};
