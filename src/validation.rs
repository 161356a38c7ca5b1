//! Pay-action validation.
//!
//! Checks run through Stillwater's `Validation`, so a refused pay action
//! reports every problem at once (no provider *and* too few digits) instead
//! of the first one found.

use crate::core::provider::{clean_number, detect_provider};
use crate::error::ValidationError;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

pub type PayValidation = Validation<(), NonEmptyVec<ValidationError>>;

fn check_provider(phone: &str) -> PayValidation {
    if detect_provider(phone).is_some() {
        Validation::success(())
    } else {
        Validation::fail(ValidationError::NoProviderDetected)
    }
}

fn check_length(phone: &str, min_digits: usize) -> PayValidation {
    let digits = clean_number(phone).len();
    if digits >= min_digits {
        Validation::success(())
    } else {
        Validation::fail(ValidationError::PhoneTooShort {
            digits,
            required: min_digits,
        })
    }
}

/// Validate the phone number of a pay action, accumulating all violations.
///
/// The amount is not checked; a pay action is refused only for a missing
/// provider or a number that is too short.
pub fn validate_pay_request(phone: &str, min_digits: usize) -> PayValidation {
    let checks = vec![check_provider(phone), check_length(phone, min_digits)];

    Validation::all_vec(checks).map(|_| ())
}

/// Collapse a validation into a `Result` carrying every violation.
pub fn into_result(validation: PayValidation) -> Result<(), Vec<ValidationError>> {
    match validation {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => Err(errors.iter().cloned().collect()),
    }
}

/// Pay-button predicate: a provider is detected and the number is long enough.
pub fn can_pay(phone: &str, min_digits: usize) -> bool {
    validate_pay_request(phone, min_digits).is_success()
}
