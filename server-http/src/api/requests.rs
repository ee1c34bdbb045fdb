use keystone::auth::AccountUpdate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for login. `username` also accepts an email address.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Account created by an administrator. Without `role_id` the default role is used.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role_id: Option<String>,
}

impl From<UpdateAccountRequest> for AccountUpdate {
    fn from(req: UpdateAccountRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            role_id: req.role_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListAccountsQuery {
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteAccountQuery {
    /// Remove the record instead of flagging it
    #[serde(default)]
    pub hard: bool,
}
