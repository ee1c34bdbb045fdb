use crate::api::{CreateAccountRequest, RegisterRequest, UpdateAccountRequest};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    MissingField { field: &'static str },
    InvalidEmail(String),
    PasswordTooShort { min: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingField { field } => {
                write!(f, "Field '{}' must not be empty", field)
            }
            ValidationError::InvalidEmail(email) => {
                write!(f, "'{}' is not a valid email address", email)
            }
            ValidationError::PasswordTooShort { min } => {
                write!(f, "Password must be at least {} characters long", min)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a registration payload before it reaches the auth service
pub fn validate_registration(req: &RegisterRequest) -> Result<(), ValidationError> {
    validate_new_account(&req.username, &req.email, &req.password)
}

/// Admin-created accounts follow the registration rules
pub fn validate_account_creation(req: &CreateAccountRequest) -> Result<(), ValidationError> {
    validate_new_account(&req.username, &req.email, &req.password)
}

/// Only the fields present in the update are checked
pub fn validate_account_update(req: &UpdateAccountRequest) -> Result<(), ValidationError> {
    if let Some(username) = &req.username {
        validate_username(username)?;
    }

    if let Some(email) = &req.email {
        validate_email(email)?;
    }

    if let Some(role_id) = &req.role_id {
        if role_id.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "role_id" });
        }
    }

    Ok(())
}

fn validate_new_account(username: &str, email: &str, password: &str) -> Result<(), ValidationError> {
    validate_username(username)?;
    validate_email(email)?;

    if password.is_empty() {
        return Err(ValidationError::MissingField { field: "password" });
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "username" });
    }
    Ok(())
}

/// A single `@` with non-empty parts on both sides and no whitespace
fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "email" });
    }

    let invalid = || ValidationError::InvalidEmail(email.to_string());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;

    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }

    Ok(())
}
