//! Input validation for submitted forms.
//!
//! Categorical answers are closed enums and need no checks. The numeric
//! measurements use zero as the "not entered" sentinel: the form's number
//! inputs default to 0.0, so a zero cannot be told apart from a blank field.
//! None of the five measurements can be physiologically zero, but the rule is
//! a convention inherited from the form rather than a clinical range check,
//! so it lives in [`is_missing`] alone.

use crate::{CardiorenalError, Result};

use super::patient::{Measurement, RawInput};

/// Whether a measurement value counts as "not entered".
#[must_use]
pub fn is_missing(value: f64) -> bool {
    value == 0.0
}

/// Check every numeric measurement in form order.
///
/// Returns the input unchanged on success so the call can sit inline in the
/// pipeline.
///
/// # Errors
/// Returns `CardiorenalError::InvalidMeasurement` naming the first
/// measurement that was not entered.
pub fn validate(input: &RawInput) -> Result<&RawInput> {
    for m in Measurement::ALL {
        if is_missing(input.measurement(m)) {
            tracing::debug!(field = %m, "Rejected submission with missing measurement");
            return Err(CardiorenalError::InvalidMeasurement(m));
        }
    }
    Ok(input)
}
