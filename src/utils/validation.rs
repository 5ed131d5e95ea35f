//! Validation utilities for the sign-up, login and wallet forms

use std::sync::LazyLock;

use regex::Regex;

use crate::types::*;

/// Length of the emailed verification code
pub const VERIFICATION_CODE_LEN: usize = 5;

/// Length of the wallet PIN
pub const WALLET_PIN_LEN: usize = 4;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email pattern"));

/// Character classes a password must each hit at least once (ASCII only)
static PASSWORD_CLASSES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["[a-z]", "[A-Z]", "[0-9]", "[^A-Za-z0-9]"]
        .into_iter()
        .map(|p| Regex::new(p).expect("invalid password pattern"))
        .collect()
});

static PASSWORD_LENGTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.{8,}$").expect("invalid password length pattern"));

/// Validate an email address shape: `local@domain.tld`, no whitespace
pub fn validate_email(email: &str) -> TimelineResult<()> {
    if !EMAIL_PATTERN.is_match(email) {
        return Err(TimelineError::Validation(
            "Email must look like name@example.com".to_string(),
        ));
    }
    Ok(())
}

/// Validate password strength: 8+ characters with lower, upper, digit and symbol
pub fn validate_password(password: &str) -> TimelineResult<()> {
    if !PASSWORD_LENGTH.is_match(password) {
        return Err(TimelineError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if !PASSWORD_CLASSES.iter().all(|class| class.is_match(password)) {
        return Err(TimelineError::Validation(
            "Password needs a lowercase letter, an uppercase letter, a digit and a symbol"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_digits(value: &str, len: usize, what: &str) -> TimelineResult<()> {
    if value.len() != len || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(TimelineError::Validation(format!(
            "{} must be exactly {} digits",
            what, len
        )));
    }
    Ok(())
}

/// Validate the emailed verification code
pub fn validate_verification_code(code: &str) -> TimelineResult<()> {
    validate_digits(code, VERIFICATION_CODE_LEN, "Verification code")
}

/// Validate a wallet PIN
pub fn validate_wallet_pin(pin: &str) -> TimelineResult<()> {
    validate_digits(pin, WALLET_PIN_LEN, "Wallet PIN")
}

/// Validate a phone number: 10 to 15 digits with an optional leading '+'
pub fn validate_phone(phone: &str) -> TimelineResult<()> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);

    if !(10..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(TimelineError::Validation(
            "Phone number must have 10 to 15 digits".to_string(),
        ));
    }

    Ok(())
}
