//! Inbound form payloads and their field-level validation.
//!
//! Each form exposes `clean`, which either yields the validated draft the
//! store consumes or a [`FieldErrors`] map to send back with the form.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;
use validator::ValidationErrors;

use crate::models::GeoState;

pub mod account;
pub mod bid;
pub mod event;
pub mod vendor;

pub use account::{LoginForm, RegistrationForm, ValidRegistration};
pub use bid::{BidForm, BidStatusForm};
pub use event::EventForm;
pub use vendor::VendorProfileForm;

pub const REQUIRED: &str = "This field is required.";
/// Key used for errors that belong to the form as a whole.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// Folds derive-generated validator errors in, one message per failure.
    pub fn absorb(&mut self, errors: ValidationErrors) {
        for (field, failures) in errors.field_errors() {
            for failure in failures.iter() {
                let message = failure
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({}).", failure.code));
                self.add(&field.to_string(), message);
            }
        }
    }

    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fields: {}", self.fields().join(", "))
    }
}

/// Adds the required-field error when `value` is blank.
pub(crate) fn require(errors: &mut FieldErrors, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED);
        false
    } else {
        true
    }
}

pub(crate) fn invalid_choice(value: &str) -> String {
    format!("Select a valid choice. {value} is not one of the available choices.")
}

/// State codes a form may reference.
pub(crate) fn known_codes(states: &[GeoState]) -> HashSet<&str> {
    states.iter().map(|state| state.code.as_str()).collect()
}

/// Trims and upper-cases a state code; blank stays blank.
pub(crate) fn normalize_code(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}
