use crate::api::{
    auth_error, bad_request, AccountResponse, ApiError, CreateAccountRequest, DeleteAccountQuery,
    ListAccountsQuery, ListAccountsResponse, UpdateAccountRequest,
};
use crate::state::AppState;
use crate::validation::{validate_account_creation, validate_account_update};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use keystone::auth::{defaults::DEFAULT_ROLE_NAME, Account, AuthError, Claims};
use std::collections::HashMap;
use tracing::info;

async fn role_names(state: &AppState) -> Result<HashMap<String, String>, ApiError> {
    let roles = state.role_service.list_roles().await.map_err(auth_error)?;
    Ok(roles.into_iter().map(|r| (r.id, r.name)).collect())
}

/// A dangling role id renders as `role: null`; any other failure is returned
async fn to_response(state: &AppState, account: Account) -> Result<AccountResponse, ApiError> {
    let role = match state.role_service.get_role_by_id(&account.role_id).await {
        Ok(role) => Some(role.name),
        Err(AuthError::RoleNotFound) => None,
        Err(e) => return Err(auth_error(e)),
    };
    Ok(AccountResponse::new(account, role))
}

/// GET /accounts - List accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<ListAccountsResponse>, ApiError> {
    let accounts = state
        .account_service
        .find_all(query.include_deleted)
        .await
        .map_err(auth_error)?;
    let roles = role_names(&state).await?;

    let accounts: Vec<AccountResponse> = accounts
        .into_iter()
        .map(|a| {
            let role = roles.get(&a.role_id).cloned();
            AccountResponse::new(a, role)
        })
        .collect();

    Ok(Json(ListAccountsResponse {
        total: accounts.len(),
        accounts,
    }))
}

/// POST /accounts - Create an account with an explicit or default role
pub async fn create_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let Json(req) = body.map_err(|rejection| bad_request(rejection.body_text()))?;
    validate_account_creation(&req).map_err(|e| bad_request(e.to_string()))?;

    info!(
        "CREATE_ACCOUNT: username={}, requested_by={}",
        req.username, claims.username
    );

    let role_id = match req.role_id {
        Some(role_id) => role_id,
        None => {
            state
                .role_service
                .get_role(DEFAULT_ROLE_NAME)
                .await
                .map_err(|e| match e {
                    AuthError::RoleNotFound => {
                        auth_error(AuthError::MissingDefaultRole(DEFAULT_ROLE_NAME.to_string()))
                    }
                    other => auth_error(other),
                })?
                .id
        }
    };

    let account = state
        .account_service
        .create_account(req.username, req.email, &req.password, role_id)
        .await
        .map_err(auth_error)?;

    Ok((StatusCode::CREATED, Json(to_response(&state, account).await?)))
}

/// GET /accounts/{id}
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.account_service.find_by_id(&id).await.map_err(auth_error)?;
    Ok(Json(to_response(&state, account).await?))
}

/// PATCH /accounts/{id} - Change username, email or role
pub async fn update_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    body: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> Result<Json<AccountResponse>, ApiError> {
    let Json(req) = body.map_err(|rejection| bad_request(rejection.body_text()))?;
    validate_account_update(&req).map_err(|e| bad_request(e.to_string()))?;

    info!("UPDATE_ACCOUNT: id={}, requested_by={}", id, claims.username);

    let account = state
        .account_service
        .update(&id, req.into())
        .await
        .map_err(auth_error)?;
    Ok(Json(to_response(&state, account).await?))
}

/// DELETE /accounts/{id} - Soft delete, or remove with `?hard=true`
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Query(query): Query<DeleteAccountQuery>,
) -> Result<StatusCode, ApiError> {
    info!(
        "DELETE_ACCOUNT: id={}, hard={}, requested_by={}",
        id, query.hard, claims.username
    );

    if query.hard {
        state.account_service.hard_delete(&id).await.map_err(auth_error)?;
    } else {
        state.account_service.soft_delete(&id).await.map_err(auth_error)?;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /accounts/{id}/restore - Undo a soft delete
pub async fn restore_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    info!("RESTORE_ACCOUNT: id={}, requested_by={}", id, claims.username);

    let account = state.account_service.restore(&id).await.map_err(auth_error)?;
    Ok(Json(to_response(&state, account).await?))
}
