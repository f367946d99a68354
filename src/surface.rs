use std::collections::BTreeMap;

use chrono::{DateTime, Local};

use crate::hits::{Direction, DirectionStats};
use crate::validation::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ButtonLabel {
    Start,
    Stop,
    #[strum(to_string = "Stopping…")]
    Stopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A one-line status message for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Local>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            at: Local::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            at: Local::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Everything the controller shows to the user, one setter per output so the
/// presentation can change without touching the controller.
pub trait WorkoutSurface {
    /// `None` clears the countdown.
    fn set_remaining_time(&mut self, text: Option<&str>);
    fn set_direction_stats(&mut self, stats: &DirectionStats);
    fn set_inputs_enabled(&mut self, enabled: bool);
    fn set_field_valid(&mut self, field: Field, valid: bool);
    fn set_button(&mut self, label: ButtonLabel, enabled: bool);
    fn show_notice(&mut self, notice: Notice);
}

/// Latest value of every output, kept for whoever draws the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceState {
    pub remaining: Option<String>,
    pub stats: BTreeMap<Direction, DirectionStats>,
    pub inputs_enabled: bool,
    pub field_valid: BTreeMap<Field, bool>,
    pub button_label: ButtonLabel,
    pub button_enabled: bool,
    pub notice: Option<Notice>,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            remaining: None,
            stats: BTreeMap::new(),
            inputs_enabled: true,
            field_valid: Field::ALL.iter().map(|f| (*f, true)).collect(),
            button_label: ButtonLabel::Start,
            button_enabled: true,
            notice: None,
        }
    }
}

impl SurfaceState {
    pub fn is_field_valid(&self, field: Field) -> bool {
        self.field_valid.get(&field).copied().unwrap_or(true)
    }
}

impl WorkoutSurface for SurfaceState {
    fn set_remaining_time(&mut self, text: Option<&str>) {
        self.remaining = text.map(str::to_string);
    }

    fn set_direction_stats(&mut self, stats: &DirectionStats) {
        self.stats.insert(stats.direction, stats.clone());
    }

    fn set_inputs_enabled(&mut self, enabled: bool) {
        self.inputs_enabled = enabled;
    }

    fn set_field_valid(&mut self, field: Field, valid: bool) {
        self.field_valid.insert(field, valid);
    }

    fn set_button(&mut self, label: ButtonLabel, enabled: bool) {
        self.button_label = label;
        self.button_enabled = enabled;
    }

    fn show_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }
}
