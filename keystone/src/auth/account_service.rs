use super::error::AuthError;
use super::models::{Account, AccountUpdate, AuthenticatedAccount};
use super::password::{BcryptHasher, PasswordHasher};
use super::repository::{AccountRepository, RoleRepository};
use chrono::Utc;
use shared::config::AuthConfig;
use std::sync::Arc;

/// CRUD over accounts with not-found checks.
pub struct AccountService {
    account_repo: Arc<dyn AccountRepository>,
    role_repo: Arc<dyn RoleRepository>,
    hasher: Arc<dyn PasswordHasher>,
    salt_rounds: u32,
}

impl AccountService {
    pub fn new(
        account_repo: Arc<dyn AccountRepository>,
        role_repo: Arc<dyn RoleRepository>,
        config: &AuthConfig,
    ) -> Self {
        Self::with_hasher(account_repo, role_repo, Arc::new(BcryptHasher), config.salt_rounds)
    }

    pub fn with_hasher(
        account_repo: Arc<dyn AccountRepository>,
        role_repo: Arc<dyn RoleRepository>,
        hasher: Arc<dyn PasswordHasher>,
        salt_rounds: u32,
    ) -> Self {
        Self {
            account_repo,
            role_repo,
            hasher,
            salt_rounds,
        }
    }

    /// Create an account with an explicit role
    pub async fn create_account(
        &self,
        username: String,
        email: String,
        password: &str,
        role_id: String,
    ) -> Result<Account, AuthError> {
        self.ensure_role_exists(&role_id).await?;

        let password_hash = self.hasher.hash(password, self.salt_rounds)?;
        let account = Account::new(username, email, password_hash, role_id);

        self.account_repo.create(account).await
    }

    /// List accounts, optionally including soft-deleted ones
    pub async fn find_all(&self, include_deleted: bool) -> Result<Vec<Account>, AuthError> {
        let accounts = self.account_repo.list_all().await?;
        Ok(accounts
            .into_iter()
            .filter(|a| include_deleted || !a.is_deleted)
            .collect())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Account, AuthError> {
        self.account_repo
            .find_by_id(id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    /// Resolve the account's role name, dropping the password hash
    pub async fn with_role(&self, account: Account) -> Result<AuthenticatedAccount, AuthError> {
        let role = self
            .role_repo
            .find_by_id(&account.role_id)
            .await?
            .ok_or(AuthError::RoleNotFound)?;

        Ok(account.with_role(&role))
    }

    pub async fn update(&self, id: &str, changes: AccountUpdate) -> Result<Account, AuthError> {
        let mut account = self.find_by_id(id).await?;

        if let Some(role_id) = changes.role_id {
            self.ensure_role_exists(&role_id).await?;
            account.role_id = role_id;
        }
        if let Some(username) = changes.username {
            account.username = username;
        }
        if let Some(email) = changes.email {
            account.email = email;
        }
        account.updated_at = Utc::now();

        self.account_repo.update(account).await
    }

    pub async fn soft_delete(&self, id: &str) -> Result<Account, AuthError> {
        self.find_by_id(id).await?;
        self.account_repo.soft_delete(id).await
    }

    pub async fn hard_delete(&self, id: &str) -> Result<(), AuthError> {
        self.find_by_id(id).await?;
        self.account_repo.hard_delete(id).await
    }

    pub async fn restore(&self, id: &str) -> Result<Account, AuthError> {
        self.account_repo.restore(id).await
    }

    pub async fn count(&self) -> Result<usize, AuthError> {
        self.account_repo.count().await
    }

    async fn ensure_role_exists(&self, role_id: &str) -> Result<(), AuthError> {
        match self.role_repo.find_by_id(role_id).await? {
            Some(_) => Ok(()),
            None => Err(AuthError::RoleNotFound),
        }
    }
}
