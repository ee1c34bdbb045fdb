use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Persisted identity record. `password_hash` never leaves the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(username: String, email: String, password_hash: String, role_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            password_hash,
            role_id,
            created_at: now,
            updated_at: now,
            is_deleted: false,
            deleted_at: None,
        }
    }

    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.is_deleted = true;
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    pub fn mark_restored(&mut self) {
        self.is_deleted = false;
        self.deleted_at = None;
        self.updated_at = Utc::now();
    }

    /// Strip the hash and attach the resolved role name.
    pub fn with_role(self, role: &Role) -> AuthenticatedAccount {
        AuthenticatedAccount {
            id: self.id,
            username: self.username,
            email: self.email,
            role_id: self.role_id,
            role: role.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// An account whose credentials have been checked, with its role name resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role_id: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public `{id, username, email, role}` shape of an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<AuthenticatedAccount> for AccountSummary {
    fn from(account: AuthenticatedAccount) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            role: account.role,
        }
    }
}

/// Input of [`AuthService::login`](super::AuthService::login).
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Identifier (username or email) and plaintext password, checked by the service.
    Raw { identifier: String, password: String },
    /// Principal already validated by an upstream guard; the password is not rechecked.
    PreValidated(AccountSummary),
}

impl From<AuthenticatedAccount> for Credentials {
    fn from(account: AuthenticatedAccount) -> Self {
        Credentials::PreValidated(account.into())
    }
}

/// Result of register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: AccountSummary,
    pub token: String,
}

/// Partial update of an account's profile fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<String>,
}
