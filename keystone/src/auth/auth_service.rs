use super::defaults::DEFAULT_ROLE_NAME;
use super::error::AuthError;
use super::models::{Account, AccountSummary, AuthResponse, AuthenticatedAccount, Credentials};
use super::password::{BcryptHasher, PasswordHasher};
use super::repository::{AccountRepository, RoleRepository};
use super::token::{Claims, TokenIssuer};
use shared::config::AuthConfig;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Registration, credential validation and token issuance.
///
/// Holds no mutable state; every call is an independent request.
pub struct AuthService {
    account_repo: Arc<dyn AccountRepository>,
    role_repo: Arc<dyn RoleRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: TokenIssuer,
    salt_rounds: u32,
}

impl AuthService {
    pub fn new(
        account_repo: Arc<dyn AccountRepository>,
        role_repo: Arc<dyn RoleRepository>,
        config: &AuthConfig,
    ) -> Self {
        Self::with_hasher(account_repo, role_repo, Arc::new(BcryptHasher), config)
    }

    pub fn with_hasher(
        account_repo: Arc<dyn AccountRepository>,
        role_repo: Arc<dyn RoleRepository>,
        hasher: Arc<dyn PasswordHasher>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            account_repo,
            role_repo,
            hasher,
            tokens: TokenIssuer::from_config(config),
            salt_rounds: config.salt_rounds,
        }
    }

    /// Register a new account with the default role and sign a token for it.
    ///
    /// The duplicate lookup here is best-effort: two concurrent registrations
    /// can both pass it. The repository's atomic index claim rejects the loser
    /// with the same `DuplicateCredential` error.
    pub async fn register(
        &self,
        username: String,
        email: String,
        password: &str,
    ) -> Result<AuthResponse, AuthError> {
        if self
            .account_repo
            .find_by_username_or_email(&username, &email)
            .await?
            .is_some()
        {
            debug!("Registration rejected, credentials already in use");
            return Err(AuthError::DuplicateCredential);
        }

        let password_hash = self.hasher.hash(password, self.salt_rounds)?;

        let role = self
            .role_repo
            .find_by_name(DEFAULT_ROLE_NAME)
            .await?
            .ok_or_else(|| {
                error!(
                    "Default role '{}' not found, registration is unavailable until it is seeded",
                    DEFAULT_ROLE_NAME
                );
                AuthError::MissingDefaultRole(DEFAULT_ROLE_NAME.to_string())
            })?;

        let account = self
            .account_repo
            .create(Account::new(username, email, password_hash, role.id.clone()))
            .await?;

        info!(account_id = %account.id, "Registered account '{}'", account.username);

        self.issue(account.with_role(&role).into())
    }

    /// Check an identifier (username or email) and password.
    ///
    /// Returns `None` for an unknown identifier, a wrong password and a
    /// soft-deleted account alike.
    pub async fn validate_credentials(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Option<AuthenticatedAccount>, AuthError> {
        let Some(account) = self.account_repo.find_by_identifier(identifier).await? else {
            return Ok(None);
        };

        if !self.hasher.compare(password, &account.password_hash)? || account.is_deleted {
            return Ok(None);
        }

        let role = self
            .role_repo
            .find_by_id(&account.role_id)
            .await?
            .ok_or(AuthError::RoleNotFound)?;

        Ok(Some(account.with_role(&role)))
    }

    /// Sign a token for raw or already-validated credentials.
    pub async fn login(&self, credentials: Credentials) -> Result<AuthResponse, AuthError> {
        let user = match credentials {
            Credentials::Raw {
                identifier,
                password,
            } => match self.validate_credentials(&identifier, &password).await? {
                Some(account) => AccountSummary::from(account),
                None => {
                    warn!("Failed login attempt for '{}'", identifier);
                    return Err(AuthError::InvalidCredentials);
                }
            },
            Credentials::PreValidated(user) => user,
        };

        debug!(account_id = %user.id, "Issuing token");
        self.issue(user)
    }

    /// Decode a token issued by this service
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.verify(token)
    }

    fn issue(&self, user: AccountSummary) -> Result<AuthResponse, AuthError> {
        let token = self.tokens.issue(&user)?;
        Ok(AuthResponse { user, token })
    }
}
