pub mod authentication;
pub mod authorization;

pub use authentication::{credentials_guard, require_auth, ValidatedLogin};
pub use authorization::require_admin;
