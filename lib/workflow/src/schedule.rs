//! Cron validation and natural-language schedule conversion.
//!
//! The engine consumes standard 5-field cron expressions. Users type
//! schedules in natural language; conversion is deliberately narrow:
//! only the daily pattern `"<H:MM> tous les jours"` is supported, and
//! anything else is rejected rather than guessed.

use std::fmt;

/// Errors from schedule parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The cron expression does not have the expected shape.
    InvalidCron { expression: String, reason: String },
    /// The natural-language phrase is not a supported pattern.
    UnsupportedPhrase { input: String },
    /// The phrase matched the daily pattern but the time is out of range.
    InvalidTime { time: String },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCron { expression, reason } => {
                write!(f, "invalid cron expression '{expression}': {reason}")
            }
            Self::UnsupportedPhrase { input } => {
                write!(f, "unsupported schedule phrase: '{input}'")
            }
            Self::InvalidTime { time } => {
                write!(f, "invalid time of day: '{time}'")
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Validates a 5-field cron expression.
///
/// # Errors
///
/// Returns an error if the expression does not have exactly five
/// whitespace-separated fields.
pub fn validate_cron(expression: &str) -> Result<(), ScheduleError> {
    let parts: Vec<&str> = expression.split_whitespace().collect();
    if parts.len() != 5 {
        return Err(ScheduleError::InvalidCron {
            expression: expression.to_string(),
            reason: format!("expected 5 fields, got {}", parts.len()),
        });
    }
    Ok(())
}

/// Converts a natural-language schedule phrase to a cron expression.
///
/// Guaranteed support is exactly the daily pattern `"<H:MM> tous les
/// jours"` (e.g. `"9:00 tous les jours"` → `"0 9 * * *"`). Every other
/// phrasing fails with `UnsupportedPhrase`.
///
/// # Errors
///
/// Returns `UnsupportedPhrase` for anything outside the daily pattern and
/// `InvalidTime` when the time of day is out of range.
pub fn daily_phrase_to_cron(input: &str) -> Result<String, ScheduleError> {
    let normalized = input.trim().to_lowercase();

    let Some(time) = normalized
        .strip_suffix("tous les jours")
        .map(str::trim_end)
        .map(str::trim)
    else {
        return Err(ScheduleError::UnsupportedPhrase {
            input: input.to_string(),
        });
    };

    let Some((hour, minute)) = time.split_once(':') else {
        return Err(ScheduleError::UnsupportedPhrase {
            input: input.to_string(),
        });
    };

    let parsed_hour: u32 = hour.parse().map_err(|_| ScheduleError::InvalidTime {
        time: time.to_string(),
    })?;
    let parsed_minute: u32 = minute.parse().map_err(|_| ScheduleError::InvalidTime {
        time: time.to_string(),
    })?;

    if parsed_hour > 23 || parsed_minute > 59 {
        return Err(ScheduleError::InvalidTime {
            time: time.to_string(),
        });
    }

    Ok(format!("{parsed_minute} {parsed_hour} * * *"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cron_validation() {
        assert!(validate_cron("0 9 * * *").is_ok());
        assert!(validate_cron("*/5 0-12 * * 1-5").is_ok());

        assert!(validate_cron("invalid").is_err());
        assert!(validate_cron("0 9 * *").is_err());
        assert!(validate_cron("0 9 * * * *").is_err());
    }

    #[test]
    fn daily_phrase_converts() {
        assert_eq!(
            daily_phrase_to_cron("9:00 tous les jours").expect("should convert"),
            "0 9 * * *"
        );
        assert_eq!(
            daily_phrase_to_cron("18:30 tous les jours").expect("should convert"),
            "30 18 * * *"
        );
    }

    #[test]
    fn daily_phrase_tolerates_case_and_spacing() {
        assert_eq!(
            daily_phrase_to_cron("  7:15 TOUS LES JOURS  ").expect("should convert"),
            "15 7 * * *"
        );
    }

    #[test]
    fn unsupported_phrasing_is_rejected_not_guessed() {
        let err = daily_phrase_to_cron("tous les jours à 9h").unwrap_err();
        assert!(matches!(err, ScheduleError::UnsupportedPhrase { .. }));

        let err = daily_phrase_to_cron("Lundi 10h").unwrap_err();
        assert!(matches!(err, ScheduleError::UnsupportedPhrase { .. }));

        let err = daily_phrase_to_cron("toutes les heures").unwrap_err();
        assert!(matches!(err, ScheduleError::UnsupportedPhrase { .. }));
    }

    #[test]
    fn out_of_range_times_are_rejected() {
        let err = daily_phrase_to_cron("25:00 tous les jours").unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidTime { .. }));

        let err = daily_phrase_to_cron("9:75 tous les jours").unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidTime { .. }));
    }

    #[test]
    fn converted_expressions_validate() {
        let cron = daily_phrase_to_cron("9:00 tous les jours").expect("should convert");
        assert!(validate_cron(&cron).is_ok());
    }
}
