//! Main simulation world that ties everything together
//!
//! `SimWorld` owns the vehicles, the signal controller, the metrics and the
//! spawn timers, and advances them once per `tick`.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use super::config::SimConfig;
use super::geometry::{is_offscreen, Lane, CANVAS_HEIGHT, CANVAS_WIDTH, INTERSECTION};
use super::metrics::SimMetrics;
use super::signal::{SignalColor, SignalController, SignalPhase};
use super::spawner::Spawner;
use super::types::{Direction, SimId, VehicleId, SAFE_GAP, VEHICLE_LENGTH};
use super::vehicle::Vehicle;

/// Lifecycle of a simulation session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStatus {
    /// Ready to start, nothing moving
    Idle,
    Running,
    /// Session over: spawners stopped and vehicles frozen for display
    Finished,
}

/// The main simulation world
pub struct SimWorld {
    pub config: SimConfig,

    /// Active vehicles, in spawn order
    pub vehicles: Vec<Vehicle>,

    pub signals: SignalController,

    pub metrics: SimMetrics,

    /// Armed spawn timers (empty unless running)
    spawners: Vec<Spawner>,

    status: SimStatus,

    /// Next ID to assign. Never reset, so IDs are not reused across sessions.
    next_id: usize,

    /// Simulated seconds since the session started
    pub time: f32,

    /// Optional seeded RNG for reproducible spawn jitter
    rng: Option<StdRng>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl SimWorld {
    fn new_internal(config: SimConfig, rng: Option<StdRng>) -> Self {
        let signals = SignalController::new(
            config.initial_phase,
            config.yellow_secs,
            config.all_red_secs,
        );
        Self {
            config,
            vehicles: Vec::new(),
            signals,
            metrics: SimMetrics::new(),
            spawners: Vec::new(),
            status: SimStatus::Idle,
            next_id: 0,
            time: 0.0,
            rng,
        }
    }

    pub fn new(config: SimConfig) -> Self {
        Self::new_internal(config, None)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(config: SimConfig, seed: u64) -> Self {
        Self::new_internal(config, Some(StdRng::seed_from_u64(seed)))
    }

    fn next_vehicle_id(&mut self) -> VehicleId {
        let id = VehicleId(SimId(self.next_id));
        self.next_id += 1;
        id
    }

    pub fn status(&self) -> SimStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SimStatus::Running
    }

    pub fn phase(&self) -> SignalPhase {
        self.signals.phase()
    }

    /// Light currently shown to `lane`
    pub fn lane_status(&self, lane: Lane) -> SignalColor {
        self.signals.status_for(lane)
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// Seconds until each armed spawner next fires, in configuration order
    pub fn next_spawns(&self) -> Vec<(SignalPhase, f32)> {
        self.spawners
            .iter()
            .map(|spawner| (spawner.schedule.movement, spawner.time_remaining()))
            .collect()
    }

    fn clear_session(&mut self) {
        self.vehicles.clear();
        self.metrics = SimMetrics::new();
        self.spawners.clear();
        self.signals = SignalController::new(
            self.config.initial_phase,
            self.config.yellow_secs,
            self.config.all_red_secs,
        );
        self.time = 0.0;
    }

    /// Re-initialize all state and begin a session with armed spawners
    pub fn start(&mut self) {
        self.clear_session();
        self.spawners = self
            .config
            .spawners
            .iter()
            .copied()
            .map(Spawner::new)
            .collect();
        self.status = SimStatus::Running;
        info!(
            "Simulation started: {} spawners, session {:.1}s, phase {}",
            self.spawners.len(),
            self.config.session_secs,
            self.phase()
        );
    }

    /// End the session: cancel spawners and any in-flight transition, freeze vehicles
    pub fn stop(&mut self) {
        if self.status != SimStatus::Running {
            return;
        }
        self.spawners.clear();
        self.signals.cancel();
        self.status = SimStatus::Finished;
        self.log_completion();
    }

    /// Clear vehicles, metrics, phase and timers and return to idle
    pub fn reset(&mut self) {
        self.clear_session();
        self.status = SimStatus::Idle;
        info!("Simulation reset");
    }

    /// Ask the signal controller for a new green phase
    ///
    /// Dropped while the session is not running, during a transition, or for
    /// the phase already active. Returns true if a transition started.
    pub fn request_phase(&mut self, target: SignalPhase) -> bool {
        if !self.is_running() {
            debug!("Ignoring request for {}: simulation not running", target);
            return false;
        }
        self.signals.request(target)
    }

    /// True if a new vehicle at the lane's spawn point would keep the safe gap
    pub fn is_lane_entry_clear(&self, lane: Lane) -> bool {
        let direction = lane.approach();
        let entry = lane.spawn_position().along(direction);

        !self.vehicles.iter().any(|v| {
            v.lane == lane
                && v.direction == direction
                && (v.position.along(direction) - entry) * direction.sign()
                    < VEHICLE_LENGTH + SAFE_GAP
        })
    }

    /// Spawn one vehicle at the entry of `lane`
    ///
    /// Returns None when the session is not running or the entry is still occupied.
    pub fn spawn_vehicle(&mut self, lane: Lane) -> Option<VehicleId> {
        if !self.is_running() {
            return None;
        }
        if !self.is_lane_entry_clear(lane) {
            debug!("Skipping spawn on {}: entry occupied", lane.label());
            return None;
        }

        let id = self.next_vehicle_id();
        self.vehicles.push(Vehicle::new(id, lane, self.time));
        self.metrics.record_spawn();
        debug!("Spawned vehicle {} on {}", id, lane.label());
        Some(id)
    }

    /// Spawn one vehicle in each lane served by `movement`
    pub fn spawn_movement(&mut self, movement: SignalPhase) -> Vec<VehicleId> {
        Lane::served_by(movement)
            .into_iter()
            .filter_map(|lane| self.spawn_vehicle(lane))
            .collect()
    }

    /// Jittered interval for a re-armed spawner
    fn jittered(rng: &mut Option<StdRng>, jitter: f32, base: f32) -> f32 {
        if jitter <= 0.0 {
            return base;
        }
        let range = (1.0 - jitter)..=(1.0 + jitter);
        let factor = match rng {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        };
        base * factor
    }

    fn update_spawners(&mut self, delta_secs: f32) {
        let jitter = self.config.spawn_jitter;
        let rng = &mut self.rng;
        let mut due = Vec::new();

        for spawner in &mut self.spawners {
            if spawner.advance(delta_secs, |base| Self::jittered(rng, jitter, base)) {
                due.push(spawner.schedule.movement);
            }
        }

        for movement in due {
            self.spawn_movement(movement);
        }
    }

    /// Advance every vehicle against the positions frozen at tick start
    fn update_vehicles(&mut self, delta_secs: f32) {
        let snapshot = std::mem::take(&mut self.vehicles);
        let mut next_vehicles = Vec::with_capacity(snapshot.len());

        for vehicle in &snapshot {
            let mut next = vehicle.step(&snapshot, &self.signals, delta_secs);

            if !next.counted && next.has_cleared_intersection() {
                next.counted = true;
                self.metrics.record_throughput();
            }

            if is_offscreen(&next.position) {
                let trip_secs = self.time - next.spawned_at;
                self.metrics.record_trip(trip_secs, next.wait_secs);
                debug!(
                    "Vehicle {} left the simulation after {:.2}s ({:.2}s waiting)",
                    next.id, trip_secs, next.wait_secs
                );
                continue;
            }

            next_vehicles.push(next);
        }

        self.vehicles = next_vehicles;
    }

    /// Main simulation tick
    pub fn tick(&mut self, delta_secs: f32) {
        if !self.is_running() {
            return;
        }

        self.time += delta_secs;
        if self.time >= self.config.session_secs {
            self.stop();
            return;
        }

        self.signals.advance(delta_secs);
        self.update_spawners(delta_secs);
        self.update_vehicles(delta_secs);
    }

    fn log_completion(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed time: {:.2}s", self.time);
        info!("Total vehicles spawned: {}", self.metrics.spawned);
        info!("Completed trips: {}", self.metrics.completed_trips);
        info!("Throughput: {}", self.metrics.throughput);
        info!("Average trip time: {}s", self.metrics.average_trip_display());
        info!("Average wait time: {}s", self.metrics.average_wait_display());
        info!("Active vehicles: {}", self.vehicles.len());
        info!("Final phase: {}", self.phase());
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Intersection Simulation Summary ===");
        println!("Time: {:.2}s ({:?})", self.time, self.status);
        match (self.signals.target(), self.signals.time_remaining()) {
            (Some(target), Some(remaining)) => println!(
                "Phase: {} -> {} ({:.1}s left in stage)",
                self.phase(),
                target,
                remaining
            ),
            _ => println!("Phase: {}", self.phase()),
        }
        println!("Vehicles: {}", self.vehicles.len());
        println!("{}", self.metrics.summary());
        println!();

        println!("--- Signals ---");
        for lane in Lane::ALL {
            let queued = self
                .vehicles
                .iter()
                .filter(|v| v.lane == lane && v.is_stopped())
                .count();
            println!(
                "  {:<17} {:<6} stopped={}",
                lane.label(),
                format!("{:?}", self.lane_status(lane)),
                queued
            );
        }

        if !self.spawners.is_empty() {
            println!("--- Spawners ---");
            for (movement, remaining) in self.next_spawns() {
                println!("  {:<20} next in {:.1}s", movement.display_name(), remaining);
            }
        }
    }

    /// Draw a visual map of the intersection in the terminal
    pub fn draw_map(&self) {
        // One character covers 10 x 20 canvas units
        const COL_SCALE: f32 = 10.0;
        const ROW_SCALE: f32 = 20.0;
        let width = (CANVAS_WIDTH / COL_SCALE) as usize;
        let height = (CANVAS_HEIGHT / ROW_SCALE) as usize;

        let to_grid = |x: f32, y: f32| -> Option<(usize, usize)> {
            if x < 0.0 || y < 0.0 || x >= CANVAS_WIDTH || y >= CANVAS_HEIGHT {
                return None;
            }
            Some(((y / ROW_SCALE) as usize, (x / COL_SCALE) as usize))
        };

        let mut grid = vec![vec![' '; width]; height];

        for (row, line) in grid.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                let x = (col as f32 + 0.5) * COL_SCALE;
                let y = (row as f32 + 0.5) * ROW_SCALE;
                let on_main = x >= INTERSECTION.x_start && x < INTERSECTION.x_end;
                let on_side = y >= INTERSECTION.y_start && y < INTERSECTION.y_end;
                *cell = match (on_main, on_side) {
                    (true, true) => '+',
                    (true, false) => '|',
                    (false, true) => '-',
                    (false, false) => ' ',
                };
            }
        }

        for vehicle in &self.vehicles {
            if let Some((row, col)) = to_grid(vehicle.position.x, vehicle.position.y) {
                grid[row][col] = match vehicle.direction {
                    Direction::North => '^',
                    Direction::South => 'v',
                    Direction::East => '>',
                    Direction::West => '<',
                };
            }
        }

        println!("\n=== Intersection Map ===");
        println!("Legend: + = Intersection, |/- = Road, ^ v < > = Vehicle heading");
        println!();
        for row in &grid {
            let line: String = row.iter().collect();
            println!("{}", line);
        }
        println!();
    }
}
