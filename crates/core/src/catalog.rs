//! Field validation for customers, products, and user accounts.

use crate::error::CoreError;
use crate::types::Money;

pub const MAX_CODE_LENGTH: usize = 50;
pub const MAX_NAME_LENGTH: usize = 200;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 8;

fn require_non_empty(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {max} characters"
        )));
    }
    Ok(())
}

/// Customer or product code.
pub fn validate_code(field: &str, code: &str) -> Result<(), CoreError> {
    require_non_empty(field, code, MAX_CODE_LENGTH)
}

pub fn validate_name(name: &str) -> Result<(), CoreError> {
    require_non_empty("name", name, MAX_NAME_LENGTH)
}

pub fn validate_price(price: Money) -> Result<(), CoreError> {
    if price < 0 {
        return Err(CoreError::Validation("price must not be negative".to_string()));
    }
    Ok(())
}

pub fn validate_stock_quantity(quantity: i32) -> Result<(), CoreError> {
    if quantity < 0 {
        return Err(CoreError::Validation(
            "stock_quantity must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Optional email: only checked when present.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(CoreError::Validation(format!("Invalid email address '{email}'"))),
    }
}

pub fn validate_username(username: &str) -> Result<(), CoreError> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(CoreError::Validation(format!(
            "username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(
            "username must not contain whitespace".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
