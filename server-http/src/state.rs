use keystone::auth::{AccountRepository, AccountService, AuthService, RoleRepository, RoleService};
use shared::config::AuthConfig;
use std::sync::Arc;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub account_service: Arc<AccountService>,
    pub role_service: Arc<RoleService>,
}

impl AppState {
    pub fn new(
        account_repo: Arc<dyn AccountRepository>,
        role_repo: Arc<dyn RoleRepository>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(
                account_repo.clone(),
                role_repo.clone(),
                config,
            )),
            account_service: Arc::new(AccountService::new(
                account_repo,
                role_repo.clone(),
                config,
            )),
            role_service: Arc::new(RoleService::new(role_repo)),
        }
    }
}
