pub mod accounts;
pub mod auth;
pub mod health;

pub use accounts::{
    create_account, delete_account, get_account, list_accounts, restore_account, update_account,
};
pub use auth::{login, profile, register};
pub use health::health_check;
