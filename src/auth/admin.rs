use bcrypt::{hash, verify};
use tokio::sync::RwLock;

use crate::error::ApiError;

/// The single configured administrator.
///
/// The password hash lives in memory only: a change survives until the
/// process restarts, after which the configured credential applies again.
pub struct AdminAccount {
    username: String,
    password_hash: RwLock<String>,
    cost: u32,
}

impl AdminAccount {
    pub fn from_hash(username: impl Into<String>, password_hash: impl Into<String>, cost: u32) -> Self {
        Self {
            username: username.into(),
            password_hash: RwLock::new(password_hash.into()),
            cost,
        }
    }

    pub fn from_plaintext(
        username: impl Into<String>,
        password: &str,
        cost: u32,
    ) -> Result<Self, bcrypt::BcryptError> {
        Ok(Self::from_hash(username, hash(password, cost)?, cost))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// True when both the username and the password match.
    pub async fn check(&self, username: &str, password: &str) -> bool {
        if username != self.username {
            // Still burn a verify so the two failure paths take similar time.
            let _ = self.password_matches(password).await;
            return false;
        }
        self.password_matches(password).await
    }

    /// Replaces the password when `old_password` matches the current one.
    ///
    /// The write lock is held across verify and rehash so two concurrent
    /// changes cannot both succeed against the same old password.
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<(), ApiError> {
        let mut current = self.password_hash.write().await;

        if !verify_blocking(old_password, &current).await {
            return Err(ApiError::WrongOldPassword);
        }

        let new_password = new_password.to_string();
        let cost = self.cost;
        let new_hash = tokio::task::spawn_blocking(move || hash(&new_password, cost))
            .await
            .map_err(|e| {
                tracing::error!("spawn_blocking panic during hash: {}", e);
                ApiError::Internal("password hashing task failed".into())
            })?
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

        *current = new_hash;
        tracing::info!(username = %self.username, "Admin password changed");
        Ok(())
    }

    async fn password_matches(&self, password: &str) -> bool {
        let current = self.password_hash.read().await.clone();
        verify_blocking(password, &current).await
    }
}

// bcrypt is CPU-bound; keep the async executor free.
async fn verify_blocking(password: &str, password_hash: &str) -> bool {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    tokio::task::spawn_blocking(move || verify(&password, &password_hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}
