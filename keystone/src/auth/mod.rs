// Public API
pub mod account_service;
pub mod auth_service;
pub mod defaults;
pub mod error;
pub mod models;
pub mod password;
pub mod repository;
pub mod role_service;
pub mod sled_repository;
pub mod token;

// Re-export commonly used types
pub use account_service::AccountService;
pub use auth_service::AuthService;
pub use error::AuthError;
pub use models::{
    Account, AccountSummary, AccountUpdate, AuthResponse, AuthenticatedAccount, Credentials, Role,
};
pub use password::{BcryptHasher, PasswordHasher};
pub use repository::{AccountRepository, RoleRepository};
pub use role_service::RoleService;
pub use sled_repository::{SledAccountRepository, SledRoleRepository};
pub use token::{Claims, TokenIssuer};
