use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::hits::Direction;
use crate::workout::{Frequencies, WorkoutForm};

static PATTERNS: OnceLock<InputPatterns> = OnceLock::new();

fn patterns() -> &'static InputPatterns {
    PATTERNS.get_or_init(InputPatterns::new)
}

#[derive(Debug)]
struct InputPatterns {
    /// `SS` or `MM:SS`.
    duration: Regex,
    /// 0..=199, leading zeros allowed.
    frequency: Regex,
}

impl InputPatterns {
    fn new() -> Self {
        Self {
            duration: Regex::new(r"^([0-9]?[0-9])(:[0-9][0-9])?$").expect("duration pattern"),
            frequency: Regex::new(r"^(1?[0-9]?[0-9])$").expect("frequency pattern"),
        }
    }
}

/// Frequencies must add up to exactly this.
pub const FREQUENCY_TOTAL: u32 = 100;

/// An editable configuration field, used to address validity indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Duration,
    Frequency(Direction),
    /// The three frequency fields taken together.
    FrequencyTotal,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Duration,
        Field::Frequency(Direction::Right),
        Field::Frequency(Direction::Center),
        Field::Frequency(Direction::Left),
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Duration => write!(f, "duration"),
            Field::Frequency(direction) => {
                write!(f, "{} frequency", direction.label().to_lowercase())
            }
            Field::FrequencyTotal => write!(f, "frequency total"),
        }
    }
}

/// `SS` or `MM:SS`, each component at most two digits. Format only; `99:99`
/// passes.
pub fn validate_duration(text: &str) -> bool {
    patterns().duration.is_match(text)
}

pub fn check_duration(text: &str) -> Result<(), ValidationError> {
    if validate_duration(text) {
        Ok(())
    } else {
        Err(ValidationError {
            field: Field::Duration,
            reason: format!("{text:?} is not SS or MM:SS"),
        })
    }
}

/// Parses every direction field in order and checks the total.
///
/// The first malformed field stops the check before anything is summed; only
/// that field is reported.
pub fn check_frequencies(
    values: &BTreeMap<Direction, String>,
) -> Result<Frequencies, ValidationError> {
    let mut parsed = BTreeMap::new();
    for direction in Direction::ALL {
        let text = values.get(&direction).map(String::as_str).unwrap_or("");
        let weight = patterns()
            .frequency
            .is_match(text)
            .then(|| text.parse::<u32>().ok())
            .flatten()
            .ok_or_else(|| ValidationError {
                field: Field::Frequency(direction),
                reason: format!("{text:?} is not a whole number between 0 and 199"),
            })?;
        parsed.insert(direction, weight);
    }

    let total: u32 = parsed.values().sum();
    if total != FREQUENCY_TOTAL {
        return Err(ValidationError {
            field: Field::FrequencyTotal,
            reason: format!("frequencies add up to {total}, expected {FREQUENCY_TOTAL}"),
        });
    }

    Ok(Frequencies::from_map(&parsed))
}

pub fn validate_frequencies(values: &BTreeMap<Direction, String>) -> bool {
    check_frequencies(values).is_ok()
}

/// Gate for starting a session.
pub fn validate_input(form: &WorkoutForm) -> bool {
    validate_duration(&form.duration) && validate_frequencies(&form.frequencies)
}

/// Per-field indicator state for the current form contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidity {
    fields: BTreeMap<Field, bool>,
}

impl FieldValidity {
    pub fn of(form: &WorkoutForm) -> Self {
        let mut fields: BTreeMap<Field, bool> = Field::ALL.iter().map(|f| (*f, true)).collect();
        fields.insert(Field::Duration, validate_duration(&form.duration));

        match check_frequencies(&form.frequencies).map_err(|err| err.field) {
            Ok(_) => {}
            Err(Field::FrequencyTotal) => {
                for direction in Direction::ALL {
                    fields.insert(Field::Frequency(direction), false);
                }
            }
            Err(field) => {
                fields.insert(field, false);
            }
        }

        Self { fields }
    }

    pub fn is_valid(&self, field: Field) -> bool {
        self.fields.get(&field).copied().unwrap_or(true)
    }

    pub fn all_valid(&self) -> bool {
        self.fields.values().all(|valid| *valid)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, bool)> + '_ {
        self.fields.iter().map(|(field, valid)| (*field, *valid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freqs(r: &str, c: &str, l: &str) -> BTreeMap<Direction, String> {
        BTreeMap::from([
            (Direction::Right, r.to_string()),
            (Direction::Center, c.to_string()),
            (Direction::Left, l.to_string()),
        ])
    }

    #[test]
    fn test_validate_duration() {
        assert!(validate_duration("5:30"));
        assert!(validate_duration("45"));
        assert!(validate_duration("0"));
        assert!(validate_duration("01:05"));
        assert!(validate_duration("99:99"));
    }

    #[test]
    fn test_validate_duration_rejects() {
        assert!(!validate_duration("100:00"));
        assert!(!validate_duration("5:3"));
        assert!(!validate_duration("5:300"));
        assert!(!validate_duration(""));
        assert!(!validate_duration(":30"));
        assert!(!validate_duration("1m"));
        assert!(!validate_duration(" 5:30"));
    }

    #[test]
    fn test_frequencies_sum_to_hundred() {
        assert!(validate_frequencies(&freqs("40", "30", "30")));
        assert!(validate_frequencies(&freqs("100", "0", "0")));
        assert!(validate_frequencies(&freqs("050", "25", "25")));
    }

    #[test]
    fn test_frequencies_wrong_sum() {
        assert!(!validate_frequencies(&freqs("40", "30", "29")));
        assert!(!validate_frequencies(&freqs("199", "0", "0")));

        let err = check_frequencies(&freqs("40", "30", "29")).unwrap_err();
        assert_eq!(err.field, Field::FrequencyTotal);
        assert_eq!(err.reason, "frequencies add up to 99, expected 100");
    }

    #[test]
    fn test_frequencies_bad_format() {
        assert!(!validate_frequencies(&freqs("200", "0", "0")));
        assert!(!validate_frequencies(&freqs("-1", "51", "50")));
        assert!(!validate_frequencies(&freqs("", "50", "50")));
        assert!(!validate_frequencies(&freqs("4.5", "50", "45")));
    }

    #[test]
    fn test_missing_field_is_invalid() {
        let mut values = freqs("50", "50", "0");
        values.remove(&Direction::Left);
        let err = check_frequencies(&values).unwrap_err();
        assert_eq!(err.field, Field::Frequency(Direction::Left));
    }

    #[test]
    fn test_first_bad_field_is_reported() {
        let err = check_frequencies(&freqs("40", "x", "y")).unwrap_err();
        assert_eq!(err.field, Field::Frequency(Direction::Center));
    }

    #[test]
    fn test_check_frequencies_parses_weights() {
        let parsed = check_frequencies(&freqs("50", "25", "25")).unwrap();
        assert_eq!(parsed, Frequencies { r: 50, c: 25, l: 25 });
    }

    #[test]
    fn test_validate_input_needs_both() {
        let mut form = WorkoutForm::default();
        form.duration = "1:00".into();
        form.frequencies = freqs("50", "25", "25");
        assert!(validate_input(&form));

        form.duration = "1:0".into();
        assert!(!validate_input(&form));

        form.duration = "1:00".into();
        form.frequencies = freqs("50", "25", "24");
        assert!(!validate_input(&form));
    }

    #[test]
    fn test_field_validity_flags_single_bad_field() {
        let mut form = WorkoutForm::default();
        form.duration = "1:00".into();
        form.frequencies = freqs("50", "abc", "25");
        let validity = FieldValidity::of(&form);

        assert!(validity.is_valid(Field::Duration));
        assert!(validity.is_valid(Field::Frequency(Direction::Right)));
        assert!(!validity.is_valid(Field::Frequency(Direction::Center)));
        assert!(validity.is_valid(Field::Frequency(Direction::Left)));
        assert!(!validity.all_valid());
    }

    #[test]
    fn test_field_validity_flags_all_on_bad_sum() {
        let mut form = WorkoutForm::default();
        form.duration = "abc".into();
        form.frequencies = freqs("40", "30", "29");
        let validity = FieldValidity::of(&form);

        assert!(!validity.is_valid(Field::Duration));
        for direction in Direction::ALL {
            assert!(!validity.is_valid(Field::Frequency(direction)));
        }
    }

    #[test]
    fn test_field_display() {
        assert_eq!(Field::Duration.to_string(), "duration");
        assert_eq!(
            Field::Frequency(Direction::Left).to_string(),
            "left frequency"
        );
    }
}
