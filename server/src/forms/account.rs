use serde::Deserialize;
use validator::{Validate, ValidateEmail};

use super::{require, FieldErrors, NON_FIELD_ERRORS};
use crate::auth::password::password_policy_violations;

pub const DUPLICATE_USERNAME: &str = "A user with that username already exists.";
pub const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegistrationForm {
    #[serde(default)]
    #[validate(length(
        max = 150,
        message = "Ensure this value has at most 150 characters."
    ))]
    pub username: String,
    #[serde(default)]
    #[validate(length(
        max = 254,
        message = "Ensure this value has at most 254 characters."
    ))]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Registration data that passed every field check. The password is still
/// plain text here; hashing happens in the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegistrationForm {
    pub fn clean(&self) -> Result<ValidRegistration, FieldErrors> {
        let mut errors = FieldErrors::default();
        if let Err(found) = self.validate() {
            errors.absorb(found);
        }

        let username = self.username.trim();
        if require(&mut errors, "username", username) && !is_valid_username(username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        let email = normalize_email(&self.email);
        if require(&mut errors, "email", &email) && !email.validate_email() {
            errors.add("email", "Enter a valid email address.");
        }

        let password1_given = require(&mut errors, "password1", &self.password1);
        let password2_given = require(&mut errors, "password2", &self.password2);
        if password1_given && password2_given {
            if self.password1 != self.password2 {
                errors.add("password2", "The two password fields didn't match.");
            } else {
                for violation in password_policy_violations(&self.password2, username, &email) {
                    errors.add("password2", violation);
                }
            }
        }

        errors.into_result(ValidRegistration {
            username: username.to_string(),
            email,
            password: self.password1.clone(),
        })
    }
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

/// Lower-cases the domain part, leaving the local part as typed.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn clean(&self) -> Result<(&str, &str), FieldErrors> {
        let mut errors = FieldErrors::default();
        let username = self.username.trim();
        require(&mut errors, "username", username);
        require(&mut errors, "password", &self.password);
        errors.into_result((username, self.password.as_str()))
    }
}

pub fn invalid_login() -> FieldErrors {
    FieldErrors::single(NON_FIELD_ERRORS, INVALID_LOGIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, email: &str, password1: &str, password2: &str) -> RegistrationForm {
        RegistrationForm {
            username: username.to_string(),
            email: email.to_string(),
            password1: password1.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn accepts_a_well_formed_registration() {
        let valid = form("stage_crew", "crew@Example.COM", "Tr1cky-Horse", "Tr1cky-Horse")
            .clean()
            .expect("valid form");
        assert_eq!(valid.username, "stage_crew");
        assert_eq!(valid.email, "crew@example.com");
    }

    #[test]
    fn reports_every_missing_field() {
        let errors = RegistrationForm::default().clean().unwrap_err();
        for field in ["username", "email", "password1", "password2"] {
            assert_eq!(errors.get(field), Some(&[super::super::REQUIRED.to_string()][..]));
        }
    }

    #[test]
    fn rejects_mismatched_passwords() {
        let errors = form("dj", "dj@example.com", "Tr1cky-Horse", "Tr1cky-Hors3")
            .clean()
            .unwrap_err();
        assert_eq!(
            errors.get("password2"),
            Some(&["The two password fields didn't match.".to_string()][..])
        );
    }

    #[test]
    fn rejects_weak_passwords_on_the_confirmation_field() {
        let errors = form("dj", "dj@example.com", "12345678", "12345678")
            .clean()
            .unwrap_err();
        let messages = errors.get("password2").expect("password errors");
        assert!(messages.iter().any(|m| m.contains("entirely numeric")));
    }

    #[test]
    fn rejects_bad_username_and_email() {
        let errors = form("no spaces!", "not-an-email", "Tr1cky-Horse", "Tr1cky-Horse")
            .clean()
            .unwrap_err();
        assert!(errors.get("username").is_some());
        assert_eq!(
            errors.get("email"),
            Some(&["Enter a valid email address.".to_string()][..])
        );
    }

    #[test]
    fn rejects_overlong_username() {
        let long = "a".repeat(151);
        let errors = form(&long, "a@example.com", "Tr1cky-Horse", "Tr1cky-Horse")
            .clean()
            .unwrap_err();
        assert_eq!(
            errors.get("username"),
            Some(&["Ensure this value has at most 150 characters.".to_string()][..])
        );
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = LoginForm::default().clean().unwrap_err();
        assert!(errors.get("username").is_some());
        assert!(errors.get("password").is_some());
    }
}
