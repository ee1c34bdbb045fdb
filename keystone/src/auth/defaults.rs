use super::models::Role;

/// Role assigned to every self-registered account
pub const DEFAULT_ROLE_NAME: &str = "user";

/// Role allowed to manage accounts
pub const ADMIN_ROLE_NAME: &str = "admin";

/// Create the default system roles
pub fn create_default_roles() -> Vec<Role> {
    vec![create_admin_role(), create_user_role()]
}

pub fn create_admin_role() -> Role {
    Role::new(ADMIN_ROLE_NAME.to_string())
}

pub fn create_user_role() -> Role {
    Role::new(DEFAULT_ROLE_NAME.to_string())
}
