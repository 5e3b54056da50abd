//! Scripted phase-change requests
//!
//! A plan stands in for the operator pressing phase buttons: a time-ordered
//! list of requests handed to `SimWorld::request_phase` as they fall due.

use anyhow::{Context, Result};

use super::signal::SignalPhase;

/// A single scripted request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedRequest {
    pub at_secs: f32,
    pub phase: SignalPhase,
}

/// Time-ordered phase requests, consumed front to back
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhasePlan {
    requests: Vec<PlannedRequest>,
    next: usize,
}

impl PhasePlan {
    pub fn new(mut requests: Vec<PlannedRequest>) -> Self {
        requests.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
        Self { requests, next: 0 }
    }

    /// Parse `"<secs>:<phase>"` entries separated by commas, e.g. `"10:side-go,25:main-left"`
    pub fn parse(text: &str) -> Result<Self> {
        let mut requests = Vec::new();

        for entry in text.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (time, phase) = entry
                .split_once(':')
                .with_context(|| format!("Plan entry '{}' is missing a ':'", entry))?;

            let at_secs: f32 = time
                .trim()
                .parse()
                .with_context(|| format!("Invalid time in plan entry '{}'", entry))?;
            anyhow::ensure!(
                at_secs.is_finite() && at_secs >= 0.0,
                "Plan entry '{}' has a negative or non-finite time",
                entry
            );

            let phase: SignalPhase = phase
                .trim()
                .parse()
                .with_context(|| format!("Invalid phase in plan entry '{}'", entry))?;

            requests.push(PlannedRequest { at_secs, phase });
        }

        Ok(Self::new(requests))
    }

    /// Request the next stable phase in rotation every `period_secs`, up to `until_secs`
    pub fn cycle(initial: SignalPhase, period_secs: f32, until_secs: f32) -> Self {
        let mut requests = Vec::new();
        if period_secs <= 0.0 || !period_secs.is_finite() {
            return Self::new(requests);
        }

        let mut phase = initial;
        let mut at_secs = period_secs;
        while at_secs < until_secs {
            phase = phase.next_stable();
            requests.push(PlannedRequest { at_secs, phase });
            at_secs += period_secs;
        }

        Self::new(requests)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Requests not yet handed out
    pub fn remaining(&self) -> usize {
        self.requests.len() - self.next
    }

    /// Hand out every request due at or before `now_secs`
    pub fn due(&mut self, now_secs: f32) -> Vec<SignalPhase> {
        let mut due = Vec::new();
        while let Some(request) = self.requests.get(self.next) {
            if request.at_secs > now_secs {
                break;
            }
            due.push(request.phase);
            self.next += 1;
        }
        due
    }
}
