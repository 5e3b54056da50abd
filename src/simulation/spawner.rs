//! Periodic vehicle spawners
//!
//! Each spawner is a repeating timer with an explicit time-remaining field,
//! advanced by the simulation tick instead of a host timer.

use super::signal::SignalPhase;

/// How often vehicles appear on the lanes served by one green phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnSchedule {
    /// Each firing spawns one vehicle in both lanes this phase serves
    pub movement: SignalPhase,
    pub interval_secs: f32,
}

impl SpawnSchedule {
    pub fn new(movement: SignalPhase, interval_secs: f32) -> Self {
        Self {
            movement,
            interval_secs,
        }
    }

    /// Heavier traffic on the main street, lighter on the left-turn lanes
    pub fn defaults() -> Vec<SpawnSchedule> {
        vec![
            SpawnSchedule::new(SignalPhase::MainGo, 1.0),
            SpawnSchedule::new(SignalPhase::SideGo, 2.0),
            SpawnSchedule::new(SignalPhase::MainLeft, 5.0),
            SpawnSchedule::new(SignalPhase::SideLeft, 7.0),
        ]
    }
}

/// An armed repeating spawn timer
#[derive(Debug, Clone)]
pub struct Spawner {
    pub schedule: SpawnSchedule,
    remaining: f32,
}

impl Spawner {
    /// Arm a spawner; the first firing happens one full interval from now
    pub fn new(schedule: SpawnSchedule) -> Self {
        Self {
            schedule,
            remaining: schedule.interval_secs,
        }
    }

    pub fn time_remaining(&self) -> f32 {
        self.remaining
    }

    /// Advance the timer and return true if it fired
    ///
    /// Fires at most once per call. `rearm` maps the base interval to the
    /// interval used for the next firing; leftover time carries over unless the
    /// step overshot by more than a whole interval, in which case the timer
    /// restarts from the fresh interval.
    pub fn advance(&mut self, delta_secs: f32, mut rearm: impl FnMut(f32) -> f32) -> bool {
        self.remaining -= delta_secs;
        if self.remaining > 0.0 {
            return false;
        }

        let next = rearm(self.schedule.interval_secs).max(f32::EPSILON);
        self.remaining += next;
        if self.remaining <= 0.0 {
            self.remaining = next;
        }
        true
    }
}
