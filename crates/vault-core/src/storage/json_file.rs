//! JSON file storage backend
//!
//! Keeps the tables in memory and rewrites the whole file after every
//! mutation. Field values are written exactly as received, so wrap this in
//! [`EncryptedStorage`](super::EncryptedStorage) to keep them encrypted at rest.

use async_trait::async_trait;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

use super::tables::{Tables, TABLES_VERSION};
use super::Storage;
use crate::error::{Result, VaultError};
use crate::model::{Achievement, NewAchievement, NewUser, User};

const STORE_FILE_NAME: &str = "achievements.json";

/// File-backed storage
pub struct JsonFileStorage {
    path: PathBuf,
    tables: RwLock<Tables>,
}

impl JsonFileStorage {
    /// Open the store in the platform data directory
    pub async fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?).await
    }

    /// Open (or create) the store at `path`
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tables = Self::load(&path).await?;

        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    /// Default store location
    pub fn default_path() -> Result<PathBuf> {
        ProjectDirs::from("com", "achievement-vault", "achievement-vault")
            .map(|dirs| dirs.data_dir().join(STORE_FILE_NAME))
            .ok_or_else(|| {
                VaultError::Storage("Could not determine data directory".to_string())
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(path: &Path) -> Result<Tables> {
        if !tokio::fs::try_exists(path).await? {
            debug!("No existing store at {:?}, starting empty", path);
            return Ok(Tables::default());
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let tables: Tables = serde_json::from_str(&contents)?;

        if tables.version != TABLES_VERSION {
            return Err(VaultError::Storage(format!(
                "Unsupported store version {} (expected {})",
                tables.version, TABLES_VERSION
            )));
        }

        debug!("Loaded store from {:?}", path);
        Ok(tables)
    }

    async fn save(&self, tables: &Tables) -> Result<()> {
        let contents = serde_json::to_string_pretty(tables)?;

        // Write atomically using a temp file
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        debug!("Saved store to {:?}", self.path);
        Ok(())
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn get_user(&self, id: i32) -> Result<Option<User>> {
        Ok(self.tables.read().await.get_user(id))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.tables.read().await.get_user_by_username(username))
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let user = staged.create_user(user)?;

        self.save(&staged).await?;
        *tables = staged;
        Ok(user)
    }

    async fn get_achievements(&self, user_id: i32) -> Result<Vec<Achievement>> {
        Ok(self.tables.read().await.achievements_for(user_id))
    }

    async fn create_achievement(
        &self,
        user_id: i32,
        achievement: NewAchievement,
    ) -> Result<Achievement> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let achievement = staged.create_achievement(user_id, achievement)?;

        self.save(&staged).await?;
        *tables = staged;
        Ok(achievement)
    }

    async fn set_coaching_response(
        &self,
        user_id: i32,
        achievement_id: i32,
        response: &str,
    ) -> Result<Option<Achievement>> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let updated = match staged.set_coaching_response(user_id, achievement_id, response) {
            Some(updated) => updated,
            None => return Ok(None),
        };

        self.save(&staged).await?;
        *tables = staged;
        Ok(Some(updated))
    }

    fn backend_name(&self) -> &'static str {
        "JSON File Storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("store.json");

        let storage = JsonFileStorage::open(&path).await.unwrap();
        storage.create_user(NewUser::new("alice", "h")).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");

        {
            let storage = JsonFileStorage::open(&path).await.unwrap();
            let user = storage.create_user(NewUser::new("alice", "h")).await.unwrap();
            let achievement = storage
                .create_achievement(user.id, NewAchievement::new("Ran a 10k"))
                .await
                .unwrap();
            storage
                .set_coaching_response(user.id, achievement.id, "Nice")
                .await
                .unwrap();
        }

        {
            let storage = JsonFileStorage::open(&path).await.unwrap();
            let user = storage.get_user_by_username("alice").await.unwrap().unwrap();
            assert_eq!(user.coaching_count, 1);

            let achievements = storage.get_achievements(user.id).await.unwrap();
            assert_eq!(achievements.len(), 1);
            assert_eq!(achievements[0].title, "Ran a 10k");
            assert_eq!(achievements[0].coaching_response.as_deref(), Some("Nice"));

            // Serial ids continue after reload
            let next = storage
                .create_achievement(user.id, NewAchievement::new("Second"))
                .await
                .unwrap();
            assert_eq!(next.id, 2);
        }
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::open(temp_dir.path().join("store.json"))
            .await
            .unwrap();
        storage.create_user(NewUser::new("alice", "h")).await.unwrap();

        let result = storage.create_user(NewUser::new("alice", "h")).await;
        assert!(result.is_err());

        let bob = storage.create_user(NewUser::new("bob", "h")).await.unwrap();
        assert_eq!(bob.id, 2);
    }

    #[tokio::test]
    async fn test_unsupported_version_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        tokio::fs::write(
            &path,
            r#"{"version":99,"nextUserId":1,"nextAchievementId":1,"users":[],"achievements":[]}"#,
        )
        .await
        .unwrap();

        let result = JsonFileStorage::open(&path).await;
        assert!(matches!(result, Err(VaultError::Storage(_))));
    }
}
