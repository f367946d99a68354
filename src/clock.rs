use crate::error::ValidationError;
use crate::util::pad2;
use crate::validation::Field;

/// Renders the time left until `deadline` as `M:SS`.
///
/// Both readings come from the server clock, so local clock drift never
/// enters the countdown. Minutes and seconds are clamped to zero
/// independently; an overrun renders as `0:00`, never as a negative value.
pub fn remaining_time(deadline: f64, server_time: f64) -> String {
    let total = deadline - server_time;
    let minutes = (total / 60.0).floor().max(0.0) as u64;
    let seconds = (total % 60.0).floor().max(0.0) as u64;
    format!("{minutes}:{}", pad2(seconds))
}

pub fn has_ended(deadline: f64, server_time: f64) -> bool {
    deadline - server_time <= 0.0
}

/// Converts `SS` or `MM:SS` into fractional minutes.
pub fn duration_to_minutes(text: &str) -> Result<f64, ValidationError> {
    let parse = |part: &str| {
        part.trim().parse::<u64>().map_err(|_| ValidationError {
            field: Field::Duration,
            reason: format!("{part:?} is not a number"),
        })
    };

    let (minutes, seconds) = match text.split_once(':') {
        Some((minutes, seconds)) => (parse(minutes)?, parse(seconds)?),
        None => (0, parse(text)?),
    };

    let total = minutes
        .checked_mul(60)
        .and_then(|secs| secs.checked_add(seconds))
        .ok_or_else(|| ValidationError {
            field: Field::Duration,
            reason: format!("{text:?} is too long"),
        })?;

    Ok(total as f64 / 60.0)
}
