//! In-memory tables shared by the memory and JSON file backends

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};
use crate::model::{Achievement, NewAchievement, NewUser, User};

/// Current on-disk table format version
pub(crate) const TABLES_VERSION: u32 = 1;

/// Users and achievements with serial id counters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Tables {
    pub version: u32,
    next_user_id: i32,
    next_achievement_id: i32,
    users: Vec<User>,
    achievements: Vec<Achievement>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            version: TABLES_VERSION,
            next_user_id: 1,
            next_achievement_id: 1,
            users: Vec::new(),
            achievements: Vec::new(),
        }
    }
}

impl Tables {
    pub fn get_user(&self, id: i32) -> Option<User> {
        self.users.iter().find(|u| u.id == id).cloned()
    }

    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.users.iter().find(|u| u.username == username).cloned()
    }

    pub fn create_user(&mut self, new_user: NewUser) -> Result<User> {
        new_user.validate()?;

        if self.users.iter().any(|u| u.username == new_user.username) {
            return Err(VaultError::UsernameTaken(new_user.username));
        }

        let user = User {
            id: self.next_user_id,
            username: new_user.username,
            password: new_user.password,
            coaching_count: 0,
        };
        self.next_user_id += 1;
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn achievements_for(&self, user_id: i32) -> Vec<Achievement> {
        let mut achievements: Vec<Achievement> = self
            .achievements
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        achievements.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        achievements
    }

    pub fn create_achievement(
        &mut self,
        user_id: i32,
        new_achievement: NewAchievement,
    ) -> Result<Achievement> {
        new_achievement.validate()?;

        if !self.users.iter().any(|u| u.id == user_id) {
            return Err(VaultError::UserNotFound(user_id.to_string()));
        }

        let achievement = Achievement {
            id: self.next_achievement_id,
            user_id,
            title: new_achievement.title,
            coaching_response: None,
            created_at: Utc::now(),
        };
        self.next_achievement_id += 1;
        self.achievements.push(achievement.clone());
        Ok(achievement)
    }

    pub fn set_coaching_response(
        &mut self,
        user_id: i32,
        achievement_id: i32,
        response: &str,
    ) -> Option<Achievement> {
        let achievement = self
            .achievements
            .iter_mut()
            .find(|a| a.id == achievement_id && a.user_id == user_id)?;
        achievement.coaching_response = Some(response.to_string());
        let updated = achievement.clone();

        if let Some(user) = self.users.iter_mut().find(|u| u.id == user_id) {
            user.coaching_count += 1;
        }

        Some(updated)
    }
}
