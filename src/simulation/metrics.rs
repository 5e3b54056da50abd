//! Metrics for the intersection simulation
//!
//! Read-only outputs: nothing here feeds back into vehicles or signals.

/// Running totals for completed trips and intersection throughput
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimMetrics {
    /// Number of vehicles spawned this session
    pub spawned: u32,
    /// Sum of trip durations of removed vehicles, in seconds
    pub total_trip_secs: f32,
    /// Sum of time removed vehicles spent stationary, in seconds
    pub total_wait_secs: f32,
    /// Number of vehicles that left the simulation bounds
    pub completed_trips: u32,
    /// Number of vehicles that fully cleared the intersection box
    pub throughput: u32,
}

impl SimMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_spawn(&mut self) {
        self.spawned += 1;
    }

    /// Record one vehicle leaving the simulation
    pub fn record_trip(&mut self, trip_secs: f32, wait_secs: f32) {
        self.total_trip_secs += trip_secs;
        self.total_wait_secs += wait_secs;
        self.completed_trips += 1;
    }

    /// Count one vehicle past the far edge of the intersection
    pub fn record_throughput(&mut self) {
        self.throughput += 1;
    }

    /// Historical average trip time, 0.0 before any trip completes
    pub fn average_trip_secs(&self) -> f32 {
        if self.completed_trips == 0 {
            return 0.0;
        }
        self.total_trip_secs / self.completed_trips as f32
    }

    /// Average stationary time per completed trip, 0.0 before any trip completes
    pub fn average_wait_secs(&self) -> f32 {
        if self.completed_trips == 0 {
            return 0.0;
        }
        self.total_wait_secs / self.completed_trips as f32
    }

    /// Average trip time formatted to two decimals
    pub fn average_trip_display(&self) -> String {
        format!("{:.2}", self.average_trip_secs())
    }

    pub fn average_wait_display(&self) -> String {
        format!("{:.2}", self.average_wait_secs())
    }

    /// Get a summary string for display
    pub fn summary(&self) -> String {
        format!(
            "Avg Trip: {}s | Avg Wait: {}s | Completed: {} | Throughput: {}",
            self.average_trip_display(),
            self.average_wait_display(),
            self.completed_trips,
            self.throughput
        )
    }
}
