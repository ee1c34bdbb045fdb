use super::defaults::create_default_roles;
use super::error::AuthError;
use super::models::Role;
use super::repository::RoleRepository;
use std::sync::Arc;
use tracing::info;

pub struct RoleService {
    role_repo: Arc<dyn RoleRepository>,
}

impl RoleService {
    pub fn new(role_repo: Arc<dyn RoleRepository>) -> Self {
        Self { role_repo }
    }

    /// Get a role by name
    pub async fn get_role(&self, name: &str) -> Result<Role, AuthError> {
        self.role_repo
            .find_by_name(name)
            .await?
            .ok_or(AuthError::RoleNotFound)
    }

    /// Get a role by ID
    pub async fn get_role_by_id(&self, id: &str) -> Result<Role, AuthError> {
        self.role_repo
            .find_by_id(id)
            .await?
            .ok_or(AuthError::RoleNotFound)
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, AuthError> {
        self.role_repo.list_all().await
    }

    /// Initialize default system roles if they don't exist
    pub async fn initialize_default_roles(&self) -> Result<Vec<Role>, AuthError> {
        let mut roles = Vec::new();

        for role in create_default_roles() {
            match self.role_repo.find_by_name(&role.name).await? {
                Some(existing) => roles.push(existing),
                None => {
                    info!("Seeding role '{}'", role.name);
                    roles.push(self.role_repo.create(role).await?);
                }
            }
        }

        Ok(roles)
    }
}
