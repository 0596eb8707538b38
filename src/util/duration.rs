use std::time::Duration;
use thiserror::Error;

/// Error raised for any interval string that does not match `<digits><unit>`.
///
/// One error kind covers every malformed shape: missing digits, missing unit,
/// an unrecognized unit suffix, or trailing garbage.
#[derive(Debug, Error)]
pub enum DurationError {
    #[error("invalid duration format: {0:?} (expected <number><ms|s|m|h>, e.g. \"30s\" or \"1h\")")]
    InvalidFormat(String),
}

/// Parses a human interval string like `"500ms"`, `"90s"`, `"15m"`, or `"2h"`
/// into a [`Duration`].
///
/// The accepted grammar is `^(\d+)(ms|s|m|h)$`. Anything else fails with
/// [`DurationError::InvalidFormat`].
///
/// Magnitudes are bounded by `u64` milliseconds: a digit string that does not
/// fit in a `u64` is rejected as [`DurationError::InvalidFormat`], and a value
/// whose unit scaling would overflow saturates at `u64::MAX` milliseconds.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let invalid = || DurationError::InvalidFormat(input.to_string());

    let digits_end = input
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (digits, unit) = input.split_at(digits_end);

    let value: u64 = digits.parse().map_err(|_| invalid())?;

    let millis = match unit {
        "ms" => value,
        "s" => value.saturating_mul(1_000),
        "m" => value.saturating_mul(60_000),
        "h" => value.saturating_mul(3_600_000),
        // Unknown suffixes land here; same error kind as any other malformed input
        _ => return Err(invalid()),
    };

    Ok(Duration::from_millis(millis))
}
