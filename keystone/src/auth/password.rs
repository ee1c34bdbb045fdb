use super::error::AuthError;

/// One-way salted password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash `plaintext` with the given cost factor
    fn hash(&self, plaintext: &str, cost: u32) -> Result<String, AuthError>;

    /// Check `plaintext` against a stored hash using constant-time comparison
    fn compare(&self, plaintext: &str, hash: &str) -> Result<bool, AuthError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptHasher;

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plaintext: &str, cost: u32) -> Result<String, AuthError> {
        Ok(bcrypt::hash(plaintext, cost)?)
    }

    fn compare(&self, plaintext: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(bcrypt::verify(plaintext, hash)?)
    }
}
