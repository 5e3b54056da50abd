//! Tunable timing for a simulation session

use anyhow::{bail, ensure, Result};

use super::signal::SignalPhase;
use super::spawner::SpawnSchedule;

/// Default yellow interval in seconds
pub const DEFAULT_YELLOW_SECS: f32 = 3.0;

/// Default all-red interval in seconds
pub const DEFAULT_ALL_RED_SECS: f32 = 1.0;

/// Default session length in seconds
pub const DEFAULT_SESSION_SECS: f32 = 120.0;

/// Largest accepted spawn jitter fraction
pub const MAX_SPAWN_JITTER: f32 = 0.9;

/// Timing configuration for a `SimWorld`
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub yellow_secs: f32,
    pub all_red_secs: f32,
    /// The session ends once this much simulated time has passed
    pub session_secs: f32,
    /// Phase shown when a session starts
    pub initial_phase: SignalPhase,
    pub spawners: Vec<SpawnSchedule>,
    /// Fraction by which each re-armed spawn interval may randomly grow or shrink
    pub spawn_jitter: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            yellow_secs: DEFAULT_YELLOW_SECS,
            all_red_secs: DEFAULT_ALL_RED_SECS,
            session_secs: DEFAULT_SESSION_SECS,
            initial_phase: SignalPhase::MainGo,
            spawners: SpawnSchedule::defaults(),
            spawn_jitter: 0.0,
        }
    }
}

impl SimConfig {
    /// Same timing, but no automatic spawning
    pub fn without_spawners() -> Self {
        Self {
            spawners: Vec::new(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("yellow interval", self.yellow_secs)?;
        ensure_positive("all-red interval", self.all_red_secs)?;
        ensure_positive("session length", self.session_secs)?;

        if !self.initial_phase.is_stable() {
            bail!(
                "Initial phase must be a green phase, got {}",
                self.initial_phase
            );
        }

        for schedule in &self.spawners {
            ensure_positive("spawn interval", schedule.interval_secs)?;
        }

        ensure!(
            (0.0..=MAX_SPAWN_JITTER).contains(&self.spawn_jitter),
            "Spawn jitter must be between 0 and {}, got {}",
            MAX_SPAWN_JITTER,
            self.spawn_jitter
        );

        Ok(())
    }
}

fn ensure_positive(name: &str, value: f32) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "The {} must be a positive number of seconds, got {}",
        name,
        value
    );
    Ok(())
}
