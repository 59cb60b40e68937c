use lazy_static::lazy_static;
use regex::Regex;

use crate::{error::AppError, otp::CODE_LENGTH};

pub const NAME_MIN_LEN: usize = 2;
pub const PHONE_MIN_LEN: usize = 10;
pub const PHONE_MAX_LEN: usize = 15;
pub const PASSWORD_MIN_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9]+$").unwrap();
}

/// Trimmed phone number, 10-15 characters, digits with an optional `+`.
pub fn phone(raw: &str) -> Result<String, AppError> {
    let phone = raw.trim();
    let len = phone.chars().count();
    if !(PHONE_MIN_LEN..=PHONE_MAX_LEN).contains(&len) {
        return Err(AppError::Validation(format!(
            "Phone number must be {PHONE_MIN_LEN}-{PHONE_MAX_LEN} characters"
        )));
    }
    if !PHONE_RE.is_match(phone) {
        return Err(AppError::Validation(
            "Phone number may contain only digits and a leading +".into(),
        ));
    }
    Ok(phone.to_string())
}

pub fn name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.chars().count() < NAME_MIN_LEN {
        return Err(AppError::Validation(format!(
            "Name must be at least {NAME_MIN_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

pub fn email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    Ok(email)
}

pub fn password(raw: &str) -> Result<&str, AppError> {
    if raw.len() < PASSWORD_MIN_LEN {
        return Err(AppError::Validation("Password too short".into()));
    }
    Ok(raw)
}

pub fn otp(raw: &str) -> Result<String, AppError> {
    let code = raw.trim();
    if code.len() != CODE_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Validation(format!(
            "OTP must be {CODE_LENGTH} digits"
        )));
    }
    Ok(code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_bounds() {
        assert_eq!(phone(" 9876543210 ").unwrap(), "9876543210");
        assert_eq!(phone("+919876543210").unwrap(), "+919876543210");
        assert!(phone("987654321").is_err());
        assert!(phone("1234567890123456").is_err());
        assert!(phone("98765-43210").is_err());
        assert!(phone("98765432+10").is_err());
    }

    #[test]
    fn name_needs_two_characters() {
        assert!(name(" A ").is_err());
        assert_eq!(name("  Asha ").unwrap(), "Asha");
    }

    #[test]
    fn email_is_normalised() {
        assert_eq!(email(" Asha@Example.COM ").unwrap(), "asha@example.com");
        assert!(email("asha@localhost").is_err());
    }

    #[test]
    fn otp_must_be_six_digits() {
        assert_eq!(otp("012345").unwrap(), "012345");
        assert!(otp("12345").is_err());
        assert!(otp("12345a").is_err());
    }
}
