//! In-memory storage backend

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::tables::Tables;
use super::Storage;
use crate::error::Result;
use crate::model::{Achievement, NewAchievement, NewUser, User};

/// Volatile storage, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_user(&self, id: i32) -> Result<Option<User>> {
        Ok(self.tables.read().await.get_user(id))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.tables.read().await.get_user_by_username(username))
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let user = self.tables.write().await.create_user(user)?;
        debug!("Created user {}", user.id);
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
        let achievement = self
            .tables
            .write()
            .await
            .create_achievement(user_id, achievement)?;
        debug!("Created achievement {} for user {}", achievement.id, user_id);
        Ok(achievement)
    }

    async fn set_coaching_response(
        &self,
        user_id: i32,
        achievement_id: i32,
        response: &str,
    ) -> Result<Option<Achievement>> {
        Ok(self
            .tables
            .write()
            .await
            .set_coaching_response(user_id, achievement_id, response))
    }

    fn backend_name(&self) -> &'static str {
        "Memory Storage"
    }
}
