//! Storage trait definitions

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Achievement, NewAchievement, NewUser, User};

/// Persistence for users and their achievements
#[async_trait]
pub trait Storage: Send + Sync {
    /// Look up a user by id
    async fn get_user(&self, id: i32) -> Result<Option<User>>;

    /// Look up a user by username
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Register a new user. Usernames are unique.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// All achievements for a user, newest first
    async fn get_achievements(&self, user_id: i32) -> Result<Vec<Achievement>>;

    /// Record an achievement for an existing user
    async fn create_achievement(
        &self,
        user_id: i32,
        achievement: NewAchievement,
    ) -> Result<Achievement>;

    /// Attach a coaching response to one of the user's achievements and bump
    /// their coaching count. `None` if the user owns no such achievement.
    async fn set_coaching_response(
        &self,
        user_id: i32,
        achievement_id: i32,
        response: &str,
    ) -> Result<Option<Achievement>>;

    /// Human-readable name for this backend
    fn backend_name(&self) -> &'static str;
}
