use crate::api::{auth_error, ErrorResponse};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use keystone::auth::{AuthError, AuthenticatedAccount, Claims};

/// Outcome of the login credentials guard, read by the login handler
#[derive(Clone, Debug)]
pub struct ValidatedLogin(pub Option<AuthenticatedAccount>);

/// Extract Basic Auth credentials from Authorization header
pub(crate) fn extract_basic_auth(auth_header: &str) -> Option<(String, String)> {
    // Authorization: Basic <base64>
    let parts: Vec<&str> = auth_header.split_whitespace().collect();

    if parts.len() != 2 || parts[0] != "Basic" {
        return None;
    }

    let decoded = STANDARD.decode(parts[1]).ok()?;
    let decoded_str = String::from_utf8(decoded).ok()?;

    // Split username:password
    let mut parts = decoded_str.splitn(2, ':');
    let username = parts.next()?.to_string();
    let password = parts.next()?.to_string();

    Some((username, password))
}

/// Extract Bearer token from Authorization header
pub(crate) fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    // Authorization: Bearer <token>
    let parts: Vec<&str> = auth_header.split_whitespace().collect();

    if parts.len() != 2 || parts[0] != "Bearer" {
        return None;
    }

    Some(parts[1])
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer realm=\"Keystone\"")],
        Json(ErrorResponse::new(message)),
    )
        .into_response()
}

/// Credentials guard for the login route.
///
/// A Basic Authorization header is validated here and the resulting account
/// handed to the handler, which then logs in without rechecking the password.
/// Requests without a Basic header pass through untouched.
pub async fn credentials_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let basic = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_basic_auth);

    let validated = match basic {
        Some((identifier, password)) => {
            match state
                .auth_service
                .validate_credentials(&identifier, &password)
                .await
            {
                Ok(Some(account)) => Some(account),
                Ok(None) => return Err(auth_error(AuthError::InvalidCredentials).into_response()),
                Err(e) => return Err(auth_error(e).into_response()),
            }
        }
        None => None,
    };

    request.extensions_mut().insert(ValidatedLogin(validated));

    Ok(next.run(request).await)
}

/// Bearer token middleware; attaches the token's [`Claims`] to the request
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let token = extract_bearer_token(auth_header)
        .ok_or_else(|| unauthorized("Invalid Authorization header format. Expected: Bearer <token>"))?;

    let claims = state
        .auth_service
        .verify_token(token)
        .map_err(|e| unauthorized(&e.to_string()))?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Extract the token claims from the request extensions
pub fn get_claims(request: &Request) -> Option<&Claims> {
    request.extensions().get::<Claims>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_basic_auth() {
        let header = format!("Basic {}", STANDARD.encode("alice:secret12"));
        let result = extract_basic_auth(&header);
        assert!(result.is_some());
        let (username, password) = result.unwrap();
        assert_eq!(username, "alice");
        assert_eq!(password, "secret12");

        // Test invalid format
        assert!(extract_basic_auth("Bearer token123").is_none());
        assert!(extract_basic_auth("Basic").is_none());
        assert!(extract_basic_auth("invalid").is_none());
    }

    #[test]
    fn test_extract_basic_auth_with_colon_in_password() {
        // Password can contain colons
        let header = format!("Basic {}", STANDARD.encode("alice:pass:word:123"));
        let (username, password) = extract_basic_auth(&header).unwrap();
        assert_eq!(username, "alice");
        assert_eq!(password, "pass:word:123");
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123def456"), Some("abc123def456"));
        assert!(extract_bearer_token("Basic abc").is_none());
        assert!(extract_bearer_token("Bearer").is_none());
    }
}
