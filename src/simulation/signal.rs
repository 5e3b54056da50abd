//! Signal phase controller
//!
//! Holds the current phase and runs the fixed clearance sequence
//! (yellow, then all-red) between any two green phases. Timing is driven by
//! `advance`, so the controller never depends on wall-clock timers.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use log::{debug, info};

use super::geometry::Lane;

/// The set of lanes currently authorized to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalPhase {
    /// Main street straight lanes green
    MainGo,
    /// Main street left lanes green
    MainLeft,
    /// Side street straight lanes green
    SideGo,
    /// Side street left lanes green
    SideLeft,
    /// Vacating a main street phase
    MainYellow,
    /// Vacating a side street phase
    SideYellow,
    /// Every lane red
    AllRed,
}

impl SignalPhase {
    /// Phases that can be requested from outside
    pub const STABLE: [SignalPhase; 4] = [
        SignalPhase::MainGo,
        SignalPhase::MainLeft,
        SignalPhase::SideGo,
        SignalPhase::SideLeft,
    ];

    pub fn is_stable(self) -> bool {
        Self::STABLE.contains(&self)
    }

    /// Yellow phase shown while leaving `self`
    pub fn yellow(self) -> SignalPhase {
        match self {
            SignalPhase::MainGo | SignalPhase::MainLeft => SignalPhase::MainYellow,
            SignalPhase::SideGo | SignalPhase::SideLeft => SignalPhase::SideYellow,
            _ => SignalPhase::AllRed,
        }
    }

    /// The stable phase following `self` in a fixed rotation
    pub fn next_stable(self) -> SignalPhase {
        match self {
            SignalPhase::MainGo => SignalPhase::MainLeft,
            SignalPhase::MainLeft => SignalPhase::SideGo,
            SignalPhase::SideGo => SignalPhase::SideLeft,
            _ => SignalPhase::MainGo,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SignalPhase::MainGo => "Main Street Straight",
            SignalPhase::MainLeft => "Main Street Left",
            SignalPhase::SideGo => "Side Street Straight",
            SignalPhase::SideLeft => "Side Street Left",
            SignalPhase::MainYellow => "Main Street Yellow",
            SignalPhase::SideYellow => "Side Street Yellow",
            SignalPhase::AllRed => "All Red",
        }
    }
}

impl fmt::Display for SignalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SignalPhase {
    type Err = anyhow::Error;

    /// Parse a requestable phase name such as `main-go`, `mainLeft` or `SIDE_GO`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "maingo" | "mainstraight" => Ok(SignalPhase::MainGo),
            "mainleft" => Ok(SignalPhase::MainLeft),
            "sidego" | "sidestraight" => Ok(SignalPhase::SideGo),
            "sideleft" => Ok(SignalPhase::SideLeft),
            _ => bail!(
                "Unknown phase '{}', expected one of main-go, main-left, side-go, side-left",
                s
            ),
        }
    }
}

/// Light shown to a single lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalColor {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClearanceStage {
    Yellow,
    AllRed,
}

/// An in-flight transition towards a requested phase
#[derive(Debug, Clone, Copy)]
struct Clearance {
    vacating: SignalPhase,
    target: SignalPhase,
    stage: ClearanceStage,
    remaining: f32,
}

/// Owns the current phase and sequences green -> yellow -> all-red -> green
#[derive(Debug, Clone)]
pub struct SignalController {
    phase: SignalPhase,
    clearance: Option<Clearance>,
    yellow_secs: f32,
    all_red_secs: f32,
}

impl SignalController {
    pub fn new(initial: SignalPhase, yellow_secs: f32, all_red_secs: f32) -> Self {
        Self {
            phase: initial,
            clearance: None,
            yellow_secs,
            all_red_secs,
        }
    }

    pub fn phase(&self) -> SignalPhase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.clearance.is_some()
    }

    /// Phase the in-flight transition will settle on
    pub fn target(&self) -> Option<SignalPhase> {
        self.clearance.map(|c| c.target)
    }

    /// Seconds left in the current clearance stage
    pub fn time_remaining(&self) -> Option<f32> {
        self.clearance.map(|c| c.remaining)
    }

    /// Request a change to a stable phase
    ///
    /// Returns true if the transition was started. Requests while a transition
    /// is in flight, for the active phase, or for a transient phase are dropped.
    pub fn request(&mut self, target: SignalPhase) -> bool {
        if self.clearance.is_some() {
            debug!("Ignoring request for {}: transition in progress", target);
            return false;
        }
        if target == self.phase {
            debug!("Ignoring request for {}: already active", target);
            return false;
        }
        if !target.is_stable() {
            debug!("Ignoring request for {}: not a requestable phase", target);
            return false;
        }

        let vacating = self.phase;
        self.phase = vacating.yellow();
        self.clearance = Some(Clearance {
            vacating,
            target,
            stage: ClearanceStage::Yellow,
            remaining: self.yellow_secs,
        });
        info!("Phase change {} -> {}: now {}", vacating, target, self.phase);
        true
    }

    /// Advance the clearance timers by `delta_secs`
    ///
    /// Leftover time carries into the next stage, so one long step can
    /// complete the whole sequence.
    pub fn advance(&mut self, delta_secs: f32) {
        let mut budget = delta_secs;
        while let Some(clearance) = self.clearance.as_mut() {
            if budget < clearance.remaining {
                clearance.remaining -= budget;
                return;
            }
            budget -= clearance.remaining;

            match clearance.stage {
                ClearanceStage::Yellow => {
                    clearance.stage = ClearanceStage::AllRed;
                    clearance.remaining = self.all_red_secs;
                    self.phase = SignalPhase::AllRed;
                    info!("Phase now {}", self.phase);
                }
                ClearanceStage::AllRed => {
                    let target = clearance.target;
                    self.clearance = None;
                    self.phase = target;
                    info!("Phase now {}", self.phase);
                }
            }
        }
    }

    /// Drop any in-flight transition, leaving the current phase as is
    pub fn cancel(&mut self) {
        if let Some(clearance) = self.clearance.take() {
            debug!(
                "Cancelled transition to {} during {}",
                clearance.target, self.phase
            );
        }
    }

    /// Light currently shown to `lane`
    pub fn status_for(&self, lane: Lane) -> SignalColor {
        match self.phase {
            SignalPhase::MainYellow | SignalPhase::SideYellow => match self.clearance {
                Some(clearance) if clearance.vacating == lane.green_phase() => {
                    SignalColor::Yellow
                }
                _ => SignalColor::Red,
            },
            SignalPhase::AllRed => SignalColor::Red,
            phase if phase == lane.green_phase() => SignalColor::Green,
            _ => SignalColor::Red,
        }
    }
}
