use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClassificationError;
use crate::util::mean;

/// Side of the bag a target light was shown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum_macros::Display)]
pub enum Direction {
    #[strum(to_string = "r")]
    Right,
    #[strum(to_string = "c")]
    Center,
    #[strum(to_string = "l")]
    Left,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::Right, Direction::Center, Direction::Left];

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Right => "Right",
            Direction::Center => "Center",
            Direction::Left => "Left",
        }
    }
}

impl FromStr for Direction {
    type Err = ClassificationError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code {
            "r" => Ok(Direction::Right),
            "c" => Ok(Direction::Center),
            "l" => Ok(Direction::Left),
            other => Err(ClassificationError::UnknownDirection(other.to_string())),
        }
    }
}

/// One hit or miss as reported by the server.
///
/// The direction is kept as the raw wire code so that a single unknown code
/// rejects the whole snapshot during classification instead of failing JSON
/// decoding for the entire response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitEvent {
    pub direction: String,
    /// Reaction latency in seconds.
    pub time: f64,
}

impl HitEvent {
    pub fn new(direction: Direction, time: f64) -> Self {
        Self {
            direction: direction.to_string(),
            time,
        }
    }

    pub fn direction(&self) -> Result<Direction, ClassificationError> {
        self.direction.parse()
    }
}

pub type Buckets = BTreeMap<Direction, Vec<HitEvent>>;

/// Stable partition of `events` by direction. Every known direction gets a
/// bucket, even when empty.
pub fn classify(events: &[HitEvent]) -> Result<Buckets, ClassificationError> {
    let mut buckets: Buckets = Direction::ALL.iter().map(|d| (*d, Vec::new())).collect();
    for event in events {
        let direction = event.direction()?;
        buckets.entry(direction).or_default().push(event.clone());
    }
    Ok(buckets)
}

/// Mean reaction time, exactly `0.0` for no events.
pub fn average_time(events: &[HitEvent]) -> f64 {
    let times: Vec<f64> = events.iter().map(|e| e.time).collect();
    mean(&times).unwrap_or(0.0)
}

/// Display form of an average: `"0"` when there were no events, three
/// decimals otherwise.
pub fn format_average(events: &[HitEvent]) -> String {
    if events.is_empty() {
        "0".to_string()
    } else {
        format!("{:.3}", average_time(events))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionStats {
    pub direction: Direction,
    pub hits: usize,
    pub misses: usize,
    pub average_time: f64,
    pub average_label: String,
}

/// Per-direction statistics for one snapshot, recomputed from scratch on
/// every poll.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HitSummary {
    pub rows: Vec<DirectionStats>,
}

impl HitSummary {
    /// One zeroed row per direction.
    pub fn empty() -> Self {
        let rows = Direction::ALL
            .iter()
            .map(|direction| DirectionStats {
                direction: *direction,
                hits: 0,
                misses: 0,
                average_time: 0.0,
                average_label: format_average(&[]),
            })
            .collect();
        Self { rows }
    }

    pub fn from_events(
        correct: &[HitEvent],
        incorrect: &[HitEvent],
    ) -> Result<Self, ClassificationError> {
        let hits = classify(correct)?;
        let misses = classify(incorrect)?;

        let rows = Direction::ALL
            .iter()
            .map(|direction| {
                let landed = hits.get(direction).map(Vec::as_slice).unwrap_or_default();
                let missed = misses.get(direction).map(Vec::len).unwrap_or_default();
                DirectionStats {
                    direction: *direction,
                    hits: landed.len(),
                    misses: missed,
                    average_time: average_time(landed),
                    average_label: format_average(landed),
                }
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn get(&self, direction: Direction) -> Option<&DirectionStats> {
        self.rows.iter().find(|row| row.direction == direction)
    }

    pub fn total_hits(&self) -> usize {
        self.rows.iter().map(|row| row.hits).sum()
    }

    pub fn total_misses(&self) -> usize {
        self.rows.iter().map(|row| row.misses).sum()
    }
}
