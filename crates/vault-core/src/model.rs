//! User and achievement records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

/// Registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Credential hash supplied by the authentication layer
    pub password: String,
    /// Number of coaching responses attached to this user's achievements
    pub coaching_count: i32,
}

/// Fields required to register a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

/// A recorded accomplishment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: i32,
    pub user_id: i32,
    /// Encrypted at rest
    pub title: String,
    /// Encrypted at rest
    pub coaching_response: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when recording an achievement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAchievement {
    pub title: String,
}

impl NewAchievement {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Titles must contain something other than whitespace
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(VaultError::InvalidInput(
                "Achievement title must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(VaultError::InvalidInput(
                "Username must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_rejected() {
        assert!(NewAchievement::new("   ").validate().is_err());
        assert!(NewAchievement::new("Ran a 10k").validate().is_ok());
    }

    #[test]
    fn test_blank_username_rejected() {
        assert!(NewUser::new("", "hash").validate().is_err());
        assert!(NewUser::new("alice", "hash").validate().is_ok());
    }

    #[test]
    fn test_achievement_serializes_camel_case() {
        let achievement = Achievement {
            id: 1,
            user_id: 2,
            title: "Ran a 10k".to_string(),
            coaching_response: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&achievement).unwrap();
        assert_eq!(json["userId"], 2);
        assert!(json.get("coachingResponse").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
