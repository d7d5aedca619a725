use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
});

pub fn validate_credentials(login: &str, password: &str) -> Result<(), String> {
    if login.is_empty() {
        return Err("login is required".to_string());
    }
    if password.is_empty() {
        return Err("password is required".to_string());
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("email is required".to_string());
    }
    if !EMAIL.is_match(email) {
        return Err(format!("invalid email: {email}"));
    }
    Ok(())
}

pub fn validate_non_negative(field: &str, value: Decimal) -> Result<(), String> {
    if value < Decimal::ZERO {
        return Err(format!("{field} must not be negative"));
    }
    Ok(())
}
