use super::error::AuthError;
use super::models::{Account, Role};
use async_trait::async_trait;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Persist a new account.
    ///
    /// Fails with `DuplicateCredential` when the username or email is already
    /// indexed. Implementations must make this check atomic with the insert.
    async fn create(&self, account: Account) -> Result<Account, AuthError>;

    /// Find the first account whose username equals `username` or whose email equals `email`
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Account>, AuthError>;

    /// Find an account by a single identifier matched against username and email
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, AuthError> {
        self.find_by_username_or_email(identifier, identifier).await
    }

    /// Find an account by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, AuthError>;

    /// List all accounts, soft-deleted ones included
    async fn list_all(&self) -> Result<Vec<Account>, AuthError>;

    /// Replace an existing account, keeping the username and email indexes in sync
    async fn update(&self, account: Account) -> Result<Account, AuthError>;

    /// Flag an account as deleted without removing it
    async fn soft_delete(&self, id: &str) -> Result<Account, AuthError>;

    /// Clear the deletion flag
    async fn restore(&self, id: &str) -> Result<Account, AuthError>;

    /// Remove an account and its index entries
    async fn hard_delete(&self, id: &str) -> Result<(), AuthError>;

    /// Number of stored accounts
    async fn count(&self) -> Result<usize, AuthError>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Create a new role
    async fn create(&self, role: Role) -> Result<Role, AuthError>;

    /// Find a role by name
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AuthError>;

    /// Find a role by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Role>, AuthError>;

    /// List all roles
    async fn list_all(&self) -> Result<Vec<Role>, AuthError>;
}
