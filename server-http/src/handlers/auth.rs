use crate::api::{auth_error, bad_request, ApiError, LoginRequest, RegisterRequest};
use crate::middleware::ValidatedLogin;
use crate::state::AppState;
use crate::validation::validate_registration;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use keystone::auth::{AccountSummary, AuthResponse, Claims, Credentials};
use tracing::info;

/// POST /auth/register
///
/// Create an account with the default role and return it with a signed token.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(req) = body.map_err(|rejection| bad_request(rejection.body_text()))?;
    validate_registration(&req).map_err(|e| bad_request(e.to_string()))?;

    info!("REGISTER: username={}", req.username);

    let response = state
        .auth_service
        .register(req.username, req.email, &req.password)
        .await
        .map_err(auth_error)?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login
///
/// Accepts either:
/// 1. Basic Auth header: Authorization: Basic base64(username:password),
///    already validated by the credentials guard
/// 2. JSON body: {"username": "alice", "password": "secret12"}; `username`
///    may also be an email address
pub async fn login(
    State(state): State<AppState>,
    Extension(ValidatedLogin(validated)): Extension<ValidatedLogin>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let credentials = match (validated, body) {
        (Some(account), _) => Credentials::from(account),
        (None, Ok(Json(req))) => Credentials::Raw {
            identifier: req.username,
            password: req.password,
        },
        (None, Err(_)) => {
            return Err(bad_request(
                "Missing credentials. Provide either JSON body or Basic Auth header",
            ))
        }
    };

    let response = state
        .auth_service
        .login(credentials)
        .await
        .map_err(auth_error)?;

    info!("LOGIN: username={}", response.user.username);

    Ok(Json(response))
}

/// POST /auth/profile
///
/// The caller's identity as carried by their bearer token.
pub async fn profile(Extension(claims): Extension<Claims>) -> Json<AccountSummary> {
    Json(claims.into())
}
