use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clock::duration_to_minutes;
use crate::error::ValidationError;
use crate::hits::{Direction, HitEvent};
use crate::session::SessionConfig;
use crate::validation::{check_duration, check_frequencies, Field};

/// Server view of the running workout at one poll instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Server clock seconds at which the workout ends.
    pub deadline: f64,
    /// Server clock seconds when the response was produced.
    pub server_time: f64,
    #[serde(default)]
    pub correct_hits: Vec<HitEvent>,
    #[serde(default)]
    pub incorrect_hits: Vec<HitEvent>,
}

/// How the server picks the next target. The controller only passes it through.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkoutMode {
    /// A random side every round.
    #[default]
    Random,
    /// Right, center, left, repeated.
    Sequence,
}

impl WorkoutMode {
    pub fn next(self) -> Self {
        match self {
            WorkoutMode::Random => WorkoutMode::Sequence,
            WorkoutMode::Sequence => WorkoutMode::Random,
        }
    }
}

/// Percentage weight per direction, as sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequencies {
    pub r: u32,
    pub c: u32,
    pub l: u32,
}

impl Default for Frequencies {
    fn default() -> Self {
        Self { r: 34, c: 33, l: 33 }
    }
}

impl Frequencies {
    pub fn from_map(weights: &BTreeMap<Direction, u32>) -> Self {
        let get = |d| weights.get(&d).copied().unwrap_or_default();
        Self {
            r: get(Direction::Right),
            c: get(Direction::Center),
            l: get(Direction::Left),
        }
    }

    pub fn get(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Right => self.r,
            Direction::Center => self.c,
            Direction::Left => self.l,
        }
    }
}

/// Raw, unvalidated text of the configuration inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutForm {
    pub duration: String,
    pub mode: WorkoutMode,
    pub frequencies: BTreeMap<Direction, String>,
}

impl Default for WorkoutForm {
    fn default() -> Self {
        Self::new("1:00", WorkoutMode::default(), Frequencies::default())
    }
}

impl WorkoutForm {
    pub fn new(duration: &str, mode: WorkoutMode, frequencies: Frequencies) -> Self {
        Self {
            duration: duration.to_string(),
            mode,
            frequencies: Direction::ALL
                .iter()
                .map(|d| (*d, frequencies.get(*d).to_string()))
                .collect(),
        }
    }

    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Duration => &self.duration,
            Field::Frequency(direction) => self
                .frequencies
                .get(&direction)
                .map(String::as_str)
                .unwrap_or_default(),
            Field::FrequencyTotal => "",
        }
    }

    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Duration => Some(&mut self.duration),
            Field::Frequency(direction) => Some(self.frequencies.entry(direction).or_default()),
            Field::FrequencyTotal => None,
        }
    }

    /// Builds the start request body; fails on the first invalid field.
    pub fn to_session_config(&self) -> Result<SessionConfig, ValidationError> {
        check_duration(&self.duration)?;
        let frequencies = check_frequencies(&self.frequencies)?;
        Ok(SessionConfig {
            time: duration_to_minutes(&self.duration)?,
            mode: self.mode,
            frequencies,
        })
    }
}
