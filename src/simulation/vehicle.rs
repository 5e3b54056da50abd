//! Vehicle movement logic for the intersection simulation
//!
//! A vehicle is a plain record. `Vehicle::step` reads the record, a snapshot of
//! every active vehicle and the signal controller, and returns the next record.

use ordered_float::OrderedFloat;

use super::geometry::{Lane, INTERSECTION};
use super::signal::{SignalColor, SignalController};
use super::types::{
    Dimensions, Direction, Position, VehicleColor, VehicleId, VehicleState, CRUISE_SPEED, SAFE_GAP,
    STOP_LINE_WINDOW,
};

/// A car in the intersection simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: VehicleId,
    /// Centre point
    pub position: Position,
    /// Fixed at spawn
    pub lane: Lane,
    /// Changes once, at the turn point, for left-turn lanes
    pub direction: Direction,
    pub state: VehicleState,
    /// Either 0 or `CRUISE_SPEED`
    pub speed: f32,
    /// Simulation time at spawn, in seconds
    pub spawned_at: f32,
    /// Whether this vehicle has been counted towards throughput
    pub counted: bool,
    pub turned: bool,
    /// Simulated seconds spent stationary
    pub wait_secs: f32,
    pub dimensions: Dimensions,
    pub color: VehicleColor,
}

impl Vehicle {
    /// Create a vehicle at the spawn point of `lane`
    pub fn new(id: VehicleId, lane: Lane, spawned_at: f32) -> Self {
        Self::at(id, lane, lane.spawn_position(), spawned_at)
    }

    /// Create a vehicle on `lane` at an arbitrary centre point, heading along the lane
    pub fn at(id: VehicleId, lane: Lane, position: Position, spawned_at: f32) -> Self {
        let direction = lane.approach();
        Self {
            id,
            position,
            lane,
            direction,
            state: VehicleState::Approaching,
            speed: CRUISE_SPEED,
            spawned_at,
            counted: false,
            turned: false,
            wait_secs: 0.0,
            dimensions: Dimensions::for_direction(direction),
            color: VehicleColor::for_direction(direction),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.speed == 0.0
    }

    fn half_extent(&self) -> f32 {
        self.dimensions.half_extent(self.direction)
    }

    /// Coordinate of the front bumper along the axis of travel
    pub fn leading_edge(&self) -> f32 {
        self.position.along(self.direction) + self.direction.sign() * self.half_extent()
    }

    /// Coordinate of the rear bumper along the axis of travel
    pub fn trailing_edge(&self) -> f32 {
        self.position.along(self.direction) - self.direction.sign() * self.half_extent()
    }

    /// Find the nearest vehicle ahead in the same lane and direction
    pub fn find_lead_vehicle<'a>(&self, vehicles: &'a [Vehicle]) -> Option<&'a Vehicle> {
        let sign = self.direction.sign();
        let own = self.position.along(self.direction);

        vehicles
            .iter()
            .filter(|v| v.id != self.id && v.lane == self.lane && v.direction == self.direction)
            .map(|v| (v, (v.position.along(self.direction) - own) * sign))
            .filter(|(_, ahead)| *ahead > 0.0)
            .min_by_key(|(_, ahead)| OrderedFloat(*ahead))
            .map(|(v, _)| v)
    }

    /// Signed bumper-to-bumper gap to `lead` along the travel axis
    ///
    /// Negative for north and west travel; compare its absolute value.
    pub fn calculate_distance_to(&self, lead: &Vehicle) -> f32 {
        let their_rear = lead.position.along(self.direction)
            - self.direction.sign() * lead.dimensions.half_extent(self.direction);
        their_rear - self.leading_edge()
    }

    /// Distance left until the front bumper reaches the stop line (negative once past it)
    fn distance_to_stop_line(&self) -> f32 {
        let stop_line = INTERSECTION.stop_line(self.direction);
        (stop_line - self.leading_edge()) * self.direction.sign()
    }

    /// Front bumper inside the narrow window right behind the stop line
    pub fn is_in_stop_window(&self) -> bool {
        let remaining = self.distance_to_stop_line();
        (0.0..STOP_LINE_WINDOW).contains(&remaining)
    }

    /// Front bumper has reached the stop window or gone beyond the line
    pub fn has_crossed_stop_line(&self) -> bool {
        self.distance_to_stop_line() < STOP_LINE_WINDOW
    }

    /// Rear bumper is beyond the far edge of the intersection box
    pub fn has_cleared_intersection(&self) -> bool {
        let far_edge = INTERSECTION.far_edge(self.direction);
        (self.trailing_edge() - far_edge) * self.direction.sign() > 0.0
    }

    /// Centre point has crossed the lane's turn point
    pub fn reached_turn_point(&self) -> bool {
        match self.lane.turn_point() {
            Some(turn_point) => {
                (self.position.along(self.direction) - turn_point) * self.direction.sign() >= 0.0
            }
            None => false,
        }
    }

    fn is_blocked_by(&self, lead: Option<&Vehicle>) -> bool {
        lead.is_some_and(|lead| self.calculate_distance_to(lead).abs() < SAFE_GAP)
    }

    fn turn_left(&mut self) {
        self.direction = self.direction.left_turn();
        self.dimensions = Dimensions::for_direction(self.direction);
        self.color = VehicleColor::for_direction(self.direction);
        self.turned = true;
    }

    fn advance(&mut self) {
        match self.direction {
            Direction::North => self.position.y -= self.speed,
            Direction::South => self.position.y += self.speed,
            Direction::East => self.position.x += self.speed,
            Direction::West => self.position.x -= self.speed,
        }
    }

    /// Compute this vehicle's record for the next tick
    ///
    /// `snapshot` holds every active vehicle as it was at the start of the tick.
    pub fn step(
        &self,
        snapshot: &[Vehicle],
        signals: &SignalController,
        delta_secs: f32,
    ) -> Vehicle {
        let mut next = self.clone();
        let blocked = self.is_blocked_by(self.find_lead_vehicle(snapshot));

        if self.state != VehicleState::Approaching {
            next.speed = if blocked { 0.0 } else { CRUISE_SPEED };

            if self.state == VehicleState::InIntersectionTurning
                && !self.turned
                && self.reached_turn_point()
            {
                next.turn_left();
            }
        } else {
            let light = signals.status_for(self.lane);
            let at_stop_line = self.is_in_stop_window();

            let must_stop = blocked
                || (at_stop_line && light == SignalColor::Red)
                || (at_stop_line && light == SignalColor::Yellow && self.is_stopped());

            if must_stop {
                next.speed = 0.0;
            } else {
                next.speed = CRUISE_SPEED;
                if self.has_crossed_stop_line() {
                    next.state = if self.lane.is_left_turn() {
                        VehicleState::InIntersectionTurning
                    } else {
                        VehicleState::InIntersectionStraight
                    };
                }
            }
        }

        if next.speed > 0.0 {
            next.advance();
        } else {
            next.wait_secs += delta_secs;
        }

        next
    }
}
