//! Admin password gate for resetting player stats.

use crate::boundary::StoreError;

pub trait AdminGate: Send + Sync {
    fn verify(&self, password: &str) -> bool;
}

/// Compares against a configured password.
pub struct PasswordGate {
    password: String,
}

impl PasswordGate {
    pub fn new(password: impl Into<String>) -> Result<Self, StoreError> {
        let password = password.into();
        if password.is_empty() {
            return Err(StoreError::Configuration("admin password is empty".into()));
        }
        Ok(Self { password })
    }

    /// Read `ADMIN_PASSWORD`.
    pub fn from_env() -> Result<Self, StoreError> {
        let password = std::env::var("ADMIN_PASSWORD")
            .map_err(|_| StoreError::Configuration("ADMIN_PASSWORD is not set".into()))?;
        Self::new(password)
    }
}

impl AdminGate for PasswordGate {
    fn verify(&self, password: &str) -> bool {
        // Length and content compared without early exit.
        let a = self.password.as_bytes();
        let b = password.as_bytes();
        a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }
}
