use axum::{http::StatusCode, Json};
use chrono::{DateTime, Utc};
use keystone::auth::{Account, AuthError};
use serde::Serialize;
use tracing::error;

/// Error tuple returned by every handler and middleware
pub type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
}

/// Account as exposed to administrators. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role_id: String,
    pub role: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AccountResponse {
    pub fn new(account: Account, role: Option<String>) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            role_id: account.role_id,
            role,
            is_deleted: account.is_deleted,
            created_at: account.created_at,
            updated_at: account.updated_at,
            deleted_at: account.deleted_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListAccountsResponse {
    pub accounts: Vec<AccountResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// 400 with the rejection or validation message
pub fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

/// Map a core error onto its HTTP status
pub fn auth_error(err: AuthError) -> ApiError {
    let status = match &err {
        AuthError::DuplicateCredential | AuthError::RoleAlreadyExists => StatusCode::CONFLICT,
        AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::TokenExpired => {
            StatusCode::UNAUTHORIZED
        }
        AuthError::AccountNotFound | AuthError::RoleNotFound => StatusCode::NOT_FOUND,
        AuthError::MissingDefaultRole(_)
        | AuthError::TokenError(_)
        | AuthError::StorageError(_)
        | AuthError::SerializationError(_)
        | AuthError::PasswordHashError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("Request failed: {}", err);
    }

    (status, Json(ErrorResponse::new(err.to_string())))
}
