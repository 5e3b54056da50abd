//! Core types for the intersection simulation
//!
//! These are standalone types shared by the vehicle, signal and world modules.

use std::fmt;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub SimId);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0 .0)
    }
}

/// A 2D position on the canvas (screen coordinates, y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Coordinate along the axis a vehicle heading in `direction` moves on
    pub fn along(&self, direction: Direction) -> f32 {
        match direction {
            Direction::North | Direction::South => self.y,
            Direction::East | Direction::West => self.x,
        }
    }
}

/// Compass heading of a vehicle on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards smaller y
    North,
    /// Towards larger y
    South,
    /// Towards larger x
    East,
    /// Towards smaller x
    West,
}

impl Direction {
    /// +1.0 when travel increases the coordinate on the travel axis, -1.0 otherwise
    pub fn sign(self) -> f32 {
        match self {
            Direction::South | Direction::East => 1.0,
            Direction::North | Direction::West => -1.0,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }

    /// Heading after a left turn (a fixed 90 degree rotation)
    pub fn left_turn(self) -> Direction {
        match self {
            Direction::South => Direction::East,
            Direction::North => Direction::West,
            Direction::East => Direction::North,
            Direction::West => Direction::South,
        }
    }
}

/// Kinematic state of a vehicle. Transitions only go forward out of `Approaching`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleState {
    /// Before the stop line (initial state)
    Approaching,
    /// Committed to the intersection on a straight lane
    InIntersectionStraight,
    /// Committed to the intersection on a left-turn lane
    InIntersectionTurning,
}

/// Whether a lane continues straight or turns left at the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    Straight,
    Left,
}

/// Paint color, derived from the heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleColor {
    Blue,
    Red,
}

/// Size of a vehicle in canvas units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    /// Tall for north/south travel, wide for east/west travel
    pub fn for_direction(direction: Direction) -> Self {
        if direction.is_vertical() {
            Self {
                width: VEHICLE_WIDTH,
                height: VEHICLE_LENGTH,
            }
        } else {
            Self {
                width: VEHICLE_LENGTH,
                height: VEHICLE_WIDTH,
            }
        }
    }

    /// Half of the extent along the axis of travel
    pub fn half_extent(&self, direction: Direction) -> f32 {
        if direction.is_vertical() {
            self.height / 2.0
        } else {
            self.width / 2.0
        }
    }
}

impl VehicleColor {
    pub fn for_direction(direction: Direction) -> Self {
        if direction.is_vertical() {
            VehicleColor::Blue
        } else {
            VehicleColor::Red
        }
    }
}

/// Canvas units per metre
pub const PIXELS_PER_METER: f32 = 5.0;

/// Vehicle length (5 m) in canvas units
pub const VEHICLE_LENGTH: f32 = 5.0 * PIXELS_PER_METER;

/// Vehicle width (3 m) in canvas units
pub const VEHICLE_WIDTH: f32 = 3.0 * PIXELS_PER_METER;

/// Minimum bumper-to-bumper gap (2.5 m) before a follower must stop
pub const SAFE_GAP: f32 = 2.5 * PIXELS_PER_METER;

/// Distance travelled per tick while moving
pub const CRUISE_SPEED: f32 = 2.0;

/// Width of the detection window immediately behind a stop line
pub const STOP_LINE_WINDOW: f32 = 3.0;

/// Vehicles this far beyond the canvas edge are removed
pub const OFFSCREEN_MARGIN: f32 = 50.0;
