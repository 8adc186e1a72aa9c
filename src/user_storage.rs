use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::user_models::User;

pub struct UserStorage {
    path: PathBuf,
    users: RwLock<Vec<User>>,
}

impl UserStorage {
    /// Loads the user collection from the given JSON file, starting empty if
    /// the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let users = if Path::new(&path).exists() {
            let data = fs::read_to_string(&path)
                .context("Failed to read users file")?;
            serde_json::from_str(&data)
                .context("Failed to parse users file")?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            users: RwLock::new(users),
        })
    }

    pub async fn register(&self, user: User) -> Result<User, ApiError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.username == user.username) {
            return Err(ApiError::DuplicateUsername);
        }

        users.push(user.clone());
        self.save_to_disk(&users)?;
        Ok(user)
    }

    /// Exact-match lookup on both fields. No normalization, no hashing — the
    /// credential comparison is byte-for-byte against the stored plain text.
    pub async fn find_by_credentials(
        &self,
        username: &str,
        credential: &str,
    ) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.username == username && u.credential == credential)
            .cloned())
    }

    fn save_to_disk(&self, users: &[User]) -> Result<()> {
        let json = serde_json::to_string_pretty(users)
            .context("Failed to serialize users")?;
        fs::write(&self.path, json)
            .context("Failed to write to users file")?;
        Ok(())
    }
}
