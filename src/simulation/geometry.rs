//! Static intersection geometry and the lane table
//!
//! All coordinates are canvas units with the origin at the top-left corner.

use super::signal::SignalPhase;
use super::types::{Direction, LaneKind, Position, OFFSCREEN_MARGIN, VEHICLE_LENGTH};

/// Canvas width
pub const CANVAS_WIDTH: f32 = 800.0;

/// Canvas height
pub const CANVAS_HEIGHT: f32 = 600.0;

/// Axis-aligned box where the two streets cross
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionBox {
    pub x_start: f32,
    pub x_end: f32,
    pub y_start: f32,
    pub y_end: f32,
}

/// The single intersection of the simulation
pub const INTERSECTION: IntersectionBox = IntersectionBox {
    x_start: 350.0,
    x_end: 450.0,
    y_start: 250.0,
    y_end: 350.0,
};

impl IntersectionBox {
    /// Coordinate of the stop line met by traffic heading in `direction`
    pub fn stop_line(&self, direction: Direction) -> f32 {
        match direction {
            Direction::South => self.y_start,
            Direction::North => self.y_end,
            Direction::East => self.x_start,
            Direction::West => self.x_end,
        }
    }

    /// Coordinate of the edge traffic heading in `direction` leaves through
    pub fn far_edge(&self, direction: Direction) -> f32 {
        match direction {
            Direction::South => self.y_end,
            Direction::North => self.y_start,
            Direction::East => self.x_end,
            Direction::West => self.x_start,
        }
    }
}

/// True once a centre point has left the visible canvas plus the culling margin
pub fn is_offscreen(position: &Position) -> bool {
    position.x < -OFFSCREEN_MARGIN
        || position.x > CANVAS_WIDTH + OFFSCREEN_MARGIN
        || position.y < -OFFSCREEN_MARGIN
        || position.y > CANVAS_HEIGHT + OFFSCREEN_MARGIN
}

/// One of the eight approach lanes: four approaches, each with a straight and a left lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    MainSouthLeft,
    MainSouthStraight,
    MainNorthStraight,
    MainNorthLeft,
    SideWestLeft,
    SideWestStraight,
    SideEastStraight,
    SideEastLeft,
}

impl Lane {
    pub const ALL: [Lane; 8] = [
        Lane::MainSouthLeft,
        Lane::MainSouthStraight,
        Lane::MainNorthStraight,
        Lane::MainNorthLeft,
        Lane::SideWestLeft,
        Lane::SideWestStraight,
        Lane::SideEastStraight,
        Lane::SideEastLeft,
    ];

    /// Centerline offset: an x coordinate for main street lanes, a y coordinate for side street lanes
    pub fn centerline(self) -> f32 {
        match self {
            Lane::MainSouthLeft => 362.5,
            Lane::MainSouthStraight => 387.5,
            Lane::MainNorthStraight => 412.5,
            Lane::MainNorthLeft => 437.5,
            Lane::SideWestLeft => 262.5,
            Lane::SideWestStraight => 287.5,
            Lane::SideEastStraight => 312.5,
            Lane::SideEastLeft => 337.5,
        }
    }

    /// Heading of traffic entering on this lane
    pub fn approach(self) -> Direction {
        match self {
            Lane::MainSouthLeft | Lane::MainSouthStraight => Direction::South,
            Lane::MainNorthStraight | Lane::MainNorthLeft => Direction::North,
            Lane::SideWestLeft | Lane::SideWestStraight => Direction::West,
            Lane::SideEastStraight | Lane::SideEastLeft => Direction::East,
        }
    }

    pub fn kind(self) -> LaneKind {
        match self {
            Lane::MainSouthLeft | Lane::MainNorthLeft | Lane::SideWestLeft | Lane::SideEastLeft => {
                LaneKind::Left
            }
            _ => LaneKind::Straight,
        }
    }

    pub fn is_left_turn(self) -> bool {
        self.kind() == LaneKind::Left
    }

    pub fn is_main_street(self) -> bool {
        self.approach().is_vertical()
    }

    /// The stable phase that gives this lane a green light
    pub fn green_phase(self) -> SignalPhase {
        match (self.is_main_street(), self.kind()) {
            (true, LaneKind::Straight) => SignalPhase::MainGo,
            (true, LaneKind::Left) => SignalPhase::MainLeft,
            (false, LaneKind::Straight) => SignalPhase::SideGo,
            (false, LaneKind::Left) => SignalPhase::SideLeft,
        }
    }

    /// Centre point where new vehicles appear, one vehicle length outside the canvas
    pub fn spawn_position(self) -> Position {
        let c = self.centerline();
        match self.approach() {
            Direction::South => Position::new(c, -VEHICLE_LENGTH),
            Direction::North => Position::new(c, CANVAS_HEIGHT + VEHICLE_LENGTH),
            Direction::East => Position::new(-VEHICLE_LENGTH, c),
            Direction::West => Position::new(CANVAS_WIDTH + VEHICLE_LENGTH, c),
        }
    }

    /// Coordinate along the approach axis where a left-turn vehicle rotates.
    ///
    /// It is the centerline of the inner lane of the receiving direction.
    pub fn turn_point(self) -> Option<f32> {
        match self {
            Lane::MainSouthLeft => Some(Lane::SideEastStraight.centerline()),
            Lane::MainNorthLeft => Some(Lane::SideWestStraight.centerline()),
            Lane::SideEastLeft => Some(Lane::MainNorthStraight.centerline()),
            Lane::SideWestLeft => Some(Lane::MainSouthStraight.centerline()),
            _ => None,
        }
    }

    /// The two lanes (one per opposing approach) served by `phase`
    pub fn served_by(phase: SignalPhase) -> Vec<Lane> {
        Lane::ALL
            .into_iter()
            .filter(|lane| lane.green_phase() == phase)
            .collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            Lane::MainSouthLeft => "main sb left",
            Lane::MainSouthStraight => "main sb straight",
            Lane::MainNorthStraight => "main nb straight",
            Lane::MainNorthLeft => "main nb left",
            Lane::SideWestLeft => "side wb left",
            Lane::SideWestStraight => "side wb straight",
            Lane::SideEastStraight => "side eb straight",
            Lane::SideEastLeft => "side eb left",
        }
    }
}
