use crate::error::AppError;
use bcrypt::{hash, verify};

/// One-way password hashing with a configurable bcrypt cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        Ok(hash(password, self.cost)?)
    }

    pub fn verify_password(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        Ok(verify(password, hashed_password)?)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
