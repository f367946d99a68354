use serde::Serialize;

use crate::hits::HitSummary;
use crate::runtime::PollTimer;
use crate::workout::{Frequencies, WorkoutMode};

/// Body of a start request. Built per start attempt and dropped once sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionConfig {
    /// Fractional minutes.
    pub time: f64,
    pub mode: WorkoutMode,
    pub frequencies: Frequencies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Running,
}

/// Lifecycle state owned by the session controller; nothing else mutates it.
#[derive(Debug)]
pub struct SessionState {
    pub phase: Phase,
    pub poller: PollTimer,
    pub remaining: Option<String>,
    pub summary: HitSummary,
    /// Set while a stop request is outstanding or after one failed.
    pub stop_pending: bool,
}

impl SessionState {
    pub fn new(poller: PollTimer) -> Self {
        Self {
            phase: Phase::Idle,
            poller,
            remaining: None,
            summary: HitSummary::default(),
            stop_pending: false,
        }
    }
}
