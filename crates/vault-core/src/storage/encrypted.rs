//! Storage decorator that encrypts achievement text at rest
//!
//! `title` and `coaching_response` are encoded before they reach the inner
//! backend and decoded on every read. User records pass through unchanged.

use async_trait::async_trait;
use std::sync::Arc;

use super::Storage;
use crate::crypto::FieldCodec;
use crate::error::Result;
use crate::model::{Achievement, NewAchievement, NewUser, User};

/// Wraps a backend so achievement text is stored through a [`FieldCodec`]
pub struct EncryptedStorage<S> {
    inner: S,
    codec: Arc<FieldCodec>,
}

impl<S: Storage> EncryptedStorage<S> {
    pub fn new(inner: S, codec: Arc<FieldCodec>) -> Self {
        Self { inner, codec }
    }

    pub fn codec(&self) -> &FieldCodec {
        &self.codec
    }

    /// The wrapped backend, which only ever sees stored representations
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn decode_achievement(&self, mut achievement: Achievement) -> Achievement {
        achievement.title = self.codec.decode_to_string(&achievement.title);
        achievement.coaching_response = achievement
            .coaching_response
            .map(|response| self.codec.decode_to_string(&response));
        achievement
    }
}

#[async_trait]
impl<S: Storage> Storage for EncryptedStorage<S> {
    async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.inner.get_user(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.inner.get_user_by_username(username).await
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.inner.create_user(user).await
    }

    async fn get_achievements(&self, user_id: i32) -> Result<Vec<Achievement>> {
        let achievements = self.inner.get_achievements(user_id).await?;
        Ok(achievements
            .into_iter()
            .map(|a| self.decode_achievement(a))
            .collect())
    }

    async fn create_achievement(
        &self,
        user_id: i32,
        achievement: NewAchievement,
    ) -> Result<Achievement> {
        achievement.validate()?;

        let stored = NewAchievement {
            title: self.codec.encode(&achievement.title)?,
        };
        let created = self.inner.create_achievement(user_id, stored).await?;
        Ok(self.decode_achievement(created))
    }

    async fn set_coaching_response(
        &self,
        user_id: i32,
        achievement_id: i32,
        response: &str,
    ) -> Result<Option<Achievement>> {
        let stored = self.codec.encode(response)?;
        let updated = self
            .inner
            .set_coaching_response(user_id, achievement_id, &stored)
            .await?;
        Ok(updated.map(|a| self.decode_achievement(a)))
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
