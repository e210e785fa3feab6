//! Booking input validation.

use chrono::{DateTime, Utc};

use super::calculators::compute_duration;
use super::models::DurationType;

/// Units of difference tolerated between a caller's duration and ours
const DURATION_TOLERANCE: i64 = 1;

/// Reasons a proposed booking is rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingValidationError {
    #[error("Check-in date must be in the future")]
    PastCheckIn,

    #[error("Check-out date must be after check-in date")]
    InvertedRange,

    #[error("Duration must be greater than 0")]
    NonPositiveDuration,

    #[error("Duration mismatch: expected {expected} {}, got {actual}", .mode.as_str().to_lowercase())]
    DurationMismatch {
        expected: i64,
        actual: i64,
        mode: DurationType,
    },
}

/// Validate a proposed booking against the current time
pub fn validate_booking(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    duration_units: i64,
    mode: DurationType,
) -> Result<(), BookingValidationError> {
    validate_booking_at(check_in, check_out, duration_units, mode, Utc::now())
}

/// Validate a proposed booking as of `now`.
///
/// A past check-in fails before anything else is looked at.
pub fn validate_booking_at(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    duration_units: i64,
    mode: DurationType,
    now: DateTime<Utc>,
) -> Result<(), BookingValidationError> {
    if check_in < now {
        return Err(BookingValidationError::PastCheckIn);
    }
    validate_schedule(check_in, check_out, duration_units, mode)
}

/// Range and duration checks without the past check-in rule.
///
/// Used when editing a stay that has already started.
pub fn validate_schedule(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    duration_units: i64,
    mode: DurationType,
) -> Result<(), BookingValidationError> {
    if check_out <= check_in {
        return Err(BookingValidationError::InvertedRange);
    }

    if duration_units <= 0 {
        return Err(BookingValidationError::NonPositiveDuration);
    }

    let actual = compute_duration(check_in, check_out, mode);
    if (actual - duration_units).abs() > DURATION_TOLERANCE {
        return Err(BookingValidationError::DurationMismatch {
            expected: duration_units,
            actual,
            mode,
        });
    }

    Ok(())
}
