use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Short list of passwords rejected outright.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwertyuiop",
    "iloveyou",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "welcome1",
    "letmein1",
    "admin123",
    "trustno1",
    "passw0rd",
    "abc12345",
    "11111111",
];

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(argon2::password_hash::Error);

/// Hashes with Argon2id and a fresh random salt into a PHC string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError)
}

/// False for a wrong password and for a malformed stored hash alike.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            tracing::warn!(error = %err, "Stored password hash could not be parsed");
            false
        }
    }
}

/// Messages for every policy rule `password` breaks; empty when acceptable.
pub fn password_policy_violations(password: &str, username: &str, email: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        violations.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        violations.push("This password is too common.".to_string());
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        violations.push("This password is entirely numeric.".to_string());
    }

    let email_local = email.split('@').next().unwrap_or_default();
    for (attribute, value) in [("username", username), ("email address", email_local)] {
        if too_similar(&lowered, &value.to_lowercase()) {
            violations.push(format!("The password is too similar to the {attribute}."));
        }
    }

    violations
}

fn too_similar(password: &str, attribute: &str) -> bool {
    attribute.chars().count() >= 3 && (password.contains(attribute) || attribute.contains(password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_and_salt_differs() {
        let first = hash_password("Tr1cky-Horse").unwrap();
        let second = hash_password("Tr1cky-Horse").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(verify_password("Tr1cky-Horse", &first));
        assert!(!verify_password("tr1cky-horse", &first));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn strong_password_passes_policy() {
        assert!(password_policy_violations("Tr1cky-Horse", "stagehand", "ops@example.com").is_empty());
    }

    #[test]
    fn short_common_and_numeric_passwords_fail() {
        let short = password_policy_violations("Ab1!", "sam", "sam@example.com");
        assert!(short[0].contains("too short"));

        let common = password_policy_violations("Password123", "sam", "sam@example.com");
        assert_eq!(common, vec!["This password is too common.".to_string()]);

        let numeric = password_policy_violations("90817263", "sam", "sam@example.com");
        assert_eq!(numeric, vec!["This password is entirely numeric.".to_string()]);
    }

    #[test]
    fn password_resembling_identity_fails() {
        let violations = password_policy_violations("soundwave2024", "soundwave", "x@example.com");
        assert_eq!(
            violations,
            vec!["The password is too similar to the username.".to_string()]
        );

        let violations = password_policy_violations("gigs-by-maria", "djm", "maria@example.com");
        assert_eq!(
            violations,
            vec!["The password is too similar to the email address.".to_string()]
        );
    }
}
