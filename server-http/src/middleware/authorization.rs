use super::authentication::get_claims;
use crate::api::ErrorResponse;
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use keystone::auth::defaults::ADMIN_ROLE_NAME;

/// Only let through requests whose token carries the admin role.
/// Must run after [`require_auth`](super::require_auth).
pub async fn require_admin(request: Request, next: Next) -> Result<Response, Response> {
    let claims = match get_claims(&request) {
        Some(claims) => claims,
        None => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("Authentication required")),
            )
                .into_response())
        }
    };

    if claims.role != ADMIN_ROLE_NAME {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Insufficient permissions")),
        )
            .into_response());
    }

    Ok(next.run(request).await)
}
