//! Subcommand definitions and execution

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use vault_core::{
    is_encoded, EncryptedStorage, FieldCodec, JsonFileStorage, NewAchievement, NewUser, Storage,
    User,
};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show whether field encryption is active
    Status,

    /// Encode text into its stored representation
    Encode {
        text: String,
    },

    /// Decode a stored value back to plaintext
    Decode {
        value: String,
    },

    /// Report whether a value has the encoded shape
    Check {
        value: String,
    },

    /// Register a user
    Register {
        username: String,

        /// Credential hash produced by the authentication layer
        #[arg(long)]
        password_hash: String,
    },

    /// Record an achievement
    Add {
        username: String,
        title: String,
    },

    /// Attach a coaching response to an achievement
    Coach {
        username: String,
        achievement_id: i32,
        response: String,
    },

    /// List a user's achievements, newest first
    List {
        username: String,
    },
}

/// Execute a command and return what should be printed to stdout
pub async fn execute(
    command: Command,
    codec: Arc<FieldCodec>,
    store: Option<PathBuf>,
) -> Result<String> {
    match command {
        Command::Status => Ok(if codec.is_active() {
            "encryption: active".to_string()
        } else {
            "encryption: disabled (values stored as plaintext)".to_string()
        }),
        Command::Encode { text } => codec.encode(&text).context("Failed to encode"),
        Command::Decode { value } => Ok(codec.decode_to_string(&value)),
        Command::Check { value } => Ok(if is_encoded(&value) {
            "encoded".to_string()
        } else {
            "plain".to_string()
        }),
        Command::Register {
            username,
            password_hash,
        } => {
            let storage = open_storage(codec, store).await?;
            let user = storage
                .create_user(NewUser::new(username, password_hash))
                .await?;
            info!("Registered user {}", user.id);
            Ok(format!("registered {} (id {})", user.username, user.id))
        }
        Command::Add { username, title } => {
            let storage = open_storage(codec, store).await?;
            let user = find_user(&storage, &username).await?;
            let achievement = storage
                .create_achievement(user.id, NewAchievement::new(title))
                .await?;
            Ok(format!("added achievement {}", achievement.id))
        }
        Command::Coach {
            username,
            achievement_id,
            response,
        } => {
            let storage = open_storage(codec, store).await?;
            let user = find_user(&storage, &username).await?;
            storage
                .set_coaching_response(user.id, achievement_id, &response)
                .await?
                .ok_or_else(|| {
                    anyhow!("{} has no achievement with id {}", username, achievement_id)
                })?;
            Ok(format!("coached achievement {}", achievement_id))
        }
        Command::List { username } => {
            let storage = open_storage(codec, store).await?;
            let user = find_user(&storage, &username).await?;
            let achievements = storage.get_achievements(user.id).await?;

            let lines: Vec<String> = achievements
                .into_iter()
                .map(|achievement| {
                    let mut line = format!(
                        "{}\t{}\t{}",
                        achievement.id,
                        achievement.created_at.format("%Y-%m-%d %H:%M"),
                        achievement.title
                    );
                    if let Some(response) = achievement.coaching_response {
                        line.push_str("\n\tcoach: ");
                        line.push_str(&response);
                    }
                    line
                })
                .collect();
            Ok(lines.join("\n"))
        }
    }
}

async fn open_storage(
    codec: Arc<FieldCodec>,
    store: Option<PathBuf>,
) -> Result<EncryptedStorage<JsonFileStorage>> {
    let backend = match store {
        Some(path) => JsonFileStorage::open(path).await,
        None => JsonFileStorage::open_default().await,
    }
    .context("Failed to open achievement store")?;

    info!("Using {} at {:?}", backend.backend_name(), backend.path());
    Ok(EncryptedStorage::new(backend, codec))
}

async fn find_user<S: Storage>(storage: &S, username: &str) -> Result<User> {
    storage
        .get_user_by_username(username)
        .await?
        .ok_or_else(|| anyhow!("Unknown user: {}", username))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vault_core::crypto::KeyDerivationParams;
    use vault_core::CodecConfig;

    const SECRET: &str = "01234567890123456789012345678901";

    fn codec(secret: Option<&str>) -> Arc<FieldCodec> {
        let config = CodecConfig::new(secret.map(str::to_string), false).with_kdf(
            KeyDerivationParams {
                log_n: 4,
                r: 8,
                p: 1,
            },
        );
        Arc::new(FieldCodec::new(config))
    }

    #[tokio::test]
    async fn test_status() {
        let out = execute(Command::Status, codec(Some(SECRET)), None)
            .await
            .unwrap();
        assert_eq!(out, "encryption: active");

        let out = execute(Command::Status, codec(None), None).await.unwrap();
        assert!(out.contains("disabled"));
    }

    #[tokio::test]
    async fn test_encode_decode_check() {
        let codec = codec(Some(SECRET));

        let encoded = execute(
            Command::Encode {
                text: "Shipped v2 launch".to_string(),
            },
            codec.clone(),
            None,
        )
        .await
        .unwrap();

        let check = execute(
            Command::Check {
                value: encoded.clone(),
            },
            codec.clone(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(check, "encoded");

        let decoded = execute(Command::Decode { value: encoded }, codec.clone(), None)
            .await
            .unwrap();
        assert_eq!(decoded, "Shipped v2 launch");

        let check = execute(
            Command::Check {
                value: "hello world".to_string(),
            },
            codec,
            None,
        )
        .await
        .unwrap();
        assert_eq!(check, "plain");
    }

    #[tokio::test]
    async fn test_store_workflow() {
        let temp_dir = TempDir::new().unwrap();
        let store = Some(temp_dir.path().join("store.json"));
        let codec = codec(Some(SECRET));

        execute(
            Command::Register {
                username: "alice".to_string(),
                password_hash: "hash".to_string(),
            },
            codec.clone(),
            store.clone(),
        )
        .await
        .unwrap();

        for title in ["Ran a 10k", "Shipped v2 launch"] {
            execute(
                Command::Add {
                    username: "alice".to_string(),
                    title: title.to_string(),
                },
                codec.clone(),
                store.clone(),
            )
            .await
            .unwrap();
        }

        execute(
            Command::Coach {
                username: "alice".to_string(),
                achievement_id: 1,
                response: "Strong finish".to_string(),
            },
            codec.clone(),
            store.clone(),
        )
        .await
        .unwrap();

        let listing = execute(
            Command::List {
                username: "alice".to_string(),
            },
            codec.clone(),
            store.clone(),
        )
        .await
        .unwrap();
        let lines: Vec<&str> = listing.lines().collect();
        assert!(lines[0].ends_with("Shipped v2 launch"));
        assert!(lines[1].ends_with("Ran a 10k"));
        assert_eq!(lines[2], "\tcoach: Strong finish");

        let raw = std::fs::read_to_string(temp_dir.path().join("store.json")).unwrap();
        assert!(!raw.contains("Ran a 10k"));
        assert!(!raw.contains("Strong finish"));
    }

    #[tokio::test]
    async fn test_unknown_user_and_achievement() {
        let temp_dir = TempDir::new().unwrap();
        let store = Some(temp_dir.path().join("store.json"));
        let codec = codec(None);

        let result = execute(
            Command::List {
                username: "nobody".to_string(),
            },
            codec.clone(),
            store.clone(),
        )
        .await;
        assert!(result.is_err());

        execute(
            Command::Register {
                username: "alice".to_string(),
                password_hash: "hash".to_string(),
            },
            codec.clone(),
            store.clone(),
        )
        .await
        .unwrap();

        let result = execute(
            Command::Coach {
                username: "alice".to_string(),
                achievement_id: 7,
                response: "?".to_string(),
            },
            codec,
            store,
        )
        .await;
        assert!(result.is_err());
    }
}
