use super::error::AuthError;
use super::models::{Account, Role};
use super::repository::{AccountRepository, RoleRepository};
use async_trait::async_trait;
use sled::{Db, Tree};
use std::path::Path;

const ACCOUNTS_TREE: &str = "accounts";
const ACCOUNTS_BY_USERNAME_TREE: &str = "accounts_by_username";
const ACCOUNTS_BY_EMAIL_TREE: &str = "accounts_by_email";
const ROLES_TREE: &str = "roles";
const ROLES_BY_NAME_TREE: &str = "roles_by_name";

/// Point `key` at `id` only if the key is free.
fn claim_index(tree: &Tree, key: &str, id: &str) -> Result<(), AuthError> {
    tree.compare_and_swap(key.as_bytes(), None as Option<&[u8]>, Some(id.as_bytes()))?
        .map_err(|_| AuthError::DuplicateCredential)
}

/// Clear `key` only while it still points at `id`.
fn release_index(tree: &Tree, key: &str, id: &str) -> Result<(), AuthError> {
    let _ = tree.compare_and_swap(key.as_bytes(), Some(id.as_bytes()), None as Option<&[u8]>)?;
    Ok(())
}

#[derive(Clone)]
pub struct SledAccountRepository {
    db: Db,
}

impl SledAccountRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, AuthError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn accounts_tree(&self) -> Result<Tree, AuthError> {
        Ok(self.db.open_tree(ACCOUNTS_TREE)?)
    }

    fn by_username_tree(&self) -> Result<Tree, AuthError> {
        Ok(self.db.open_tree(ACCOUNTS_BY_USERNAME_TREE)?)
    }

    fn by_email_tree(&self) -> Result<Tree, AuthError> {
        Ok(self.db.open_tree(ACCOUNTS_BY_EMAIL_TREE)?)
    }

    fn load(&self, accounts: &Tree, id: &[u8]) -> Result<Option<Account>, AuthError> {
        match accounts.get(id)? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    fn store(&self, accounts: &Tree, account: &Account) -> Result<(), AuthError> {
        accounts.insert(account.id.as_bytes(), serde_json::to_vec(account)?)?;
        Ok(())
    }

    fn find_via_index(&self, index: &Tree, key: &str) -> Result<Option<Account>, AuthError> {
        match index.get(key.as_bytes())? {
            Some(id) => self.load(&self.accounts_tree()?, &id),
            None => Ok(None),
        }
    }

    /// Reserve the account's username and email. Either both are claimed or neither.
    fn claim_credentials(&self, account: &Account) -> Result<(), AuthError> {
        let username_tree = self.by_username_tree()?;

        claim_index(&username_tree, &account.username, &account.id)?;
        if let Err(e) = claim_index(&self.by_email_tree()?, &account.email, &account.id) {
            release_index(&username_tree, &account.username, &account.id)?;
            return Err(e);
        }

        Ok(())
    }

    /// Drop the index entries that point at this account
    fn release_credentials(&self, account: &Account) -> Result<(), AuthError> {
        release_index(&self.by_username_tree()?, &account.username, &account.id)?;
        release_index(&self.by_email_tree()?, &account.email, &account.id)
    }

    fn set_deleted(&self, id: &str, deleted: bool) -> Result<Account, AuthError> {
        let accounts = self.accounts_tree()?;
        let mut account = self
            .load(&accounts, id.as_bytes())?
            .ok_or(AuthError::AccountNotFound)?;

        if deleted {
            account.mark_deleted();
        } else {
            account.mark_restored();
        }

        self.store(&accounts, &account)?;
        Ok(account)
    }
}

#[async_trait]
impl AccountRepository for SledAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, AuthError> {
        let accounts = self.accounts_tree()?;

        // Index claims are the uniqueness constraint
        self.claim_credentials(&account)?;

        if let Err(e) = self.store(&accounts, &account) {
            self.release_credentials(&account)?;
            return Err(e);
        }

        Ok(account)
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Account>, AuthError> {
        if let Some(account) = self.find_via_index(&self.by_username_tree()?, username)? {
            return Ok(Some(account));
        }

        self.find_via_index(&self.by_email_tree()?, email)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, AuthError> {
        self.load(&self.accounts_tree()?, id.as_bytes())
    }

    async fn list_all(&self) -> Result<Vec<Account>, AuthError> {
        let accounts_tree = self.accounts_tree()?;
        let mut accounts = Vec::new();

        for item in accounts_tree.iter() {
            let (_, data) = item?;
            let account: Account = serde_json::from_slice(&data)?;
            accounts.push(account);
        }

        Ok(accounts)
    }

    async fn update(&self, account: Account) -> Result<Account, AuthError> {
        let accounts = self.accounts_tree()?;
        let username_tree = self.by_username_tree()?;
        let email_tree = self.by_email_tree()?;

        let existing = self
            .load(&accounts, account.id.as_bytes())?
            .ok_or(AuthError::AccountNotFound)?;

        let username_changed = existing.username != account.username;
        let email_changed = existing.email != account.email;

        if username_changed {
            claim_index(&username_tree, &account.username, &account.id)?;
        }
        if email_changed {
            if let Err(e) = claim_index(&email_tree, &account.email, &account.id) {
                if username_changed {
                    username_tree.remove(account.username.as_bytes())?;
                }
                return Err(e);
            }
            email_tree.remove(existing.email.as_bytes())?;
        }
        if username_changed {
            username_tree.remove(existing.username.as_bytes())?;
        }

        self.store(&accounts, &account)?;

        Ok(account)
    }

    async fn soft_delete(&self, id: &str) -> Result<Account, AuthError> {
        self.set_deleted(id, true)
    }

    async fn restore(&self, id: &str) -> Result<Account, AuthError> {
        self.set_deleted(id, false)
    }

    async fn hard_delete(&self, id: &str) -> Result<(), AuthError> {
        let accounts = self.accounts_tree()?;

        let account = self
            .load(&accounts, id.as_bytes())?
            .ok_or(AuthError::AccountNotFound)?;

        self.release_credentials(&account)?;
        accounts.remove(id.as_bytes())?;

        Ok(())
    }

    async fn count(&self) -> Result<usize, AuthError> {
        Ok(self.accounts_tree()?.len())
    }
}

#[derive(Clone)]
pub struct SledRoleRepository {
    db: Db,
}

impl SledRoleRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, AuthError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn roles_tree(&self) -> Result<Tree, AuthError> {
        Ok(self.db.open_tree(ROLES_TREE)?)
    }

    fn roles_by_name_tree(&self) -> Result<Tree, AuthError> {
        Ok(self.db.open_tree(ROLES_BY_NAME_TREE)?)
    }
}

#[async_trait]
impl RoleRepository for SledRoleRepository {
    async fn create(&self, role: Role) -> Result<Role, AuthError> {
        let roles_tree = self.roles_tree()?;
        let name_tree = self.roles_by_name_tree()?;

        name_tree
            .compare_and_swap(
                role.name.as_bytes(),
                None as Option<&[u8]>,
                Some(role.id.as_bytes()),
            )?
            .map_err(|_| AuthError::RoleAlreadyExists)?;

        roles_tree.insert(role.id.as_bytes(), serde_json::to_vec(&role)?)?;

        Ok(role)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AuthError> {
        let name_tree = self.roles_by_name_tree()?;

        match name_tree.get(name.as_bytes())? {
            Some(role_id) => match self.roles_tree()?.get(&role_id)? {
                Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Role>, AuthError> {
        match self.roles_tree()?.get(id.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<Role>, AuthError> {
        let roles_tree = self.roles_tree()?;
        let mut roles = Vec::new();

        for item in roles_tree.iter() {
            let (_, data) = item?;
            let role: Role = serde_json::from_slice(&data)?;
            roles.push(role);
        }

        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn account(username: &str, email: &str) -> Account {
        Account::new(
            username.to_string(),
            email.to_string(),
            "hash123".to_string(),
            "role1".to_string(),
        )
    }

    #[tokio::test]
    async fn test_account_repository() {
        let temp_dir = TempDir::new().unwrap();
        let repo = SledAccountRepository::new(temp_dir.path().join("accounts.sled")).unwrap();

        // Create
        let created = repo.create(account("alice", "alice@x.com")).await.unwrap();
        assert_eq!(created.username, "alice");

        // Lookup by either field
        let by_username = repo.find_by_identifier("alice").await.unwrap();
        assert_eq!(by_username.unwrap().id, created.id);

        let by_email = repo.find_by_identifier("alice@x.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, created.id);

        let by_pair = repo
            .find_by_username_or_email("someone-else", "alice@x.com")
            .await
            .unwrap();
        assert!(by_pair.is_some());

        assert!(repo.find_by_identifier("bob").await.unwrap().is_none());

        // Find by ID
        assert!(repo.find_by_id(&created.id).await.unwrap().is_some());

        // List and count
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
        assert_eq!(repo.count().await.unwrap(), 1);

        // Hard delete releases both indexes
        repo.hard_delete(&created.id).await.unwrap();
        assert!(repo.find_by_identifier("alice").await.unwrap().is_none());
        assert!(repo.find_by_identifier("alice@x.com").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);

        assert!(matches!(
            repo.hard_delete(&created.id).await,
            Err(AuthError::AccountNotFound)
        ));
    }

    #[tokio::test]
    async fn test_store_rejects_duplicate_username_or_email() {
        let temp_dir = TempDir::new().unwrap();
        let repo = SledAccountRepository::new(temp_dir.path().join("accounts.sled")).unwrap();

        repo.create(account("alice", "alice@x.com")).await.unwrap();

        let same_username = repo.create(account("alice", "other@x.com")).await;
        assert!(matches!(same_username, Err(AuthError::DuplicateCredential)));

        let same_email = repo.create(account("alice2", "alice@x.com")).await;
        assert!(matches!(same_email, Err(AuthError::DuplicateCredential)));

        // The failed email claim must not leave "alice2" reserved
        repo.create(account("alice2", "alice2@x.com")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_released_credentials_can_be_claimed_again() {
        let temp_dir = TempDir::new().unwrap();
        let repo = SledAccountRepository::new(temp_dir.path().join("accounts.sled")).unwrap();

        // Claimed but never stored, as when the record write fails
        let orphan = account("alice", "alice@x.com");
        repo.claim_credentials(&orphan).unwrap();
        assert!(matches!(
            repo.create(account("alice", "other@x.com")).await,
            Err(AuthError::DuplicateCredential)
        ));

        repo.release_credentials(&orphan).unwrap();
        let created = repo.create(account("alice", "alice@x.com")).await.unwrap();
        assert_eq!(
            repo.find_by_identifier("alice@x.com").await.unwrap().unwrap().id,
            created.id
        );

        // Releasing a stale record leaves the new owner's claims alone
        repo.release_credentials(&orphan).unwrap();
        assert!(matches!(
            repo.create(account("alice", "third@x.com")).await,
            Err(AuthError::DuplicateCredential)
        ));
    }

    #[tokio::test]
    async fn test_update_moves_indexes() {
        let temp_dir = TempDir::new().unwrap();
        let repo = SledAccountRepository::new(temp_dir.path().join("accounts.sled")).unwrap();

        let mut alice = repo.create(account("alice", "alice@x.com")).await.unwrap();
        repo.create(account("bob", "bob@x.com")).await.unwrap();

        alice.username = "alicia".to_string();
        alice.email = "alicia@x.com".to_string();
        repo.update(alice.clone()).await.unwrap();

        assert!(repo.find_by_identifier("alice").await.unwrap().is_none());
        assert!(repo.find_by_identifier("alice@x.com").await.unwrap().is_none());
        assert_eq!(
            repo.find_by_identifier("alicia@x.com").await.unwrap().unwrap().id,
            alice.id
        );

        // Taking bob's email fails and keeps alicia's username index intact
        let mut clash = alice.clone();
        clash.username = "ally".to_string();
        clash.email = "bob@x.com".to_string();
        assert!(matches!(
            repo.update(clash).await,
            Err(AuthError::DuplicateCredential)
        ));
        assert!(repo.find_by_identifier("ally").await.unwrap().is_none());
        assert!(repo.find_by_identifier("alicia").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_soft_delete_and_restore() {
        let temp_dir = TempDir::new().unwrap();
        let repo = SledAccountRepository::new(temp_dir.path().join("accounts.sled")).unwrap();

        let created = repo.create(account("alice", "alice@x.com")).await.unwrap();

        let deleted = repo.soft_delete(&created.id).await.unwrap();
        assert!(deleted.is_deleted);
        assert!(deleted.deleted_at.is_some());

        // Soft-deleted accounts still hold their username and email
        let found = repo.find_by_identifier("alice").await.unwrap().unwrap();
        assert!(found.is_deleted);
        assert!(matches!(
            repo.create(account("alice", "new@x.com")).await,
            Err(AuthError::DuplicateCredential)
        ));

        let restored = repo.restore(&created.id).await.unwrap();
        assert!(!restored.is_deleted);
        assert!(restored.deleted_at.is_none());

        assert!(matches!(
            repo.soft_delete("missing").await,
            Err(AuthError::AccountNotFound)
        ));
    }

    #[tokio::test]
    async fn test_role_repository() {
        let temp_dir = TempDir::new().unwrap();
        let repo = SledRoleRepository::new(temp_dir.path().join("roles.sled")).unwrap();

        // Create
        let created = repo.create(Role::new("admin".to_string())).await.unwrap();
        assert_eq!(created.name, "admin");

        // Find by name
        let found = repo.find_by_name("admin").await.unwrap();
        assert_eq!(found.unwrap().id, created.id);
        assert!(repo.find_by_name("user").await.unwrap().is_none());

        // Find by ID
        assert!(repo.find_by_id(&created.id).await.unwrap().is_some());

        // Names are unique
        let duplicate = repo.create(Role::new("admin".to_string())).await;
        assert!(matches!(duplicate, Err(AuthError::RoleAlreadyExists)));

        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }
}
