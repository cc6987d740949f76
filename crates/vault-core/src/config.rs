//! Codec configuration
//!
//! Read once from the process environment at startup and injected into
//! [`FieldCodec`](crate::FieldCodec). Immutable afterwards.

use tracing::debug;

use crate::crypto::{KeyDerivationParams, SecretString};

/// Environment variable holding the secret material
pub const ENCRYPTION_KEY_VAR: &str = "ENCRYPTION_KEY";

/// Environment variable naming the deployment environment
pub const ENVIRONMENT_VAR: &str = "APP_ENV";

/// Consulted when [`ENVIRONMENT_VAR`] is unset, so older deployments keep
/// their production flag
pub const LEGACY_ENVIRONMENT_VAR: &str = "NODE_ENV";

const PRODUCTION: &str = "production";

/// Configuration consumed by the field codec
#[derive(Debug, Clone, Default)]
pub struct CodecConfig {
    /// Secret the field key is derived from. `None` disables encryption.
    pub secret_material: Option<SecretString>,
    /// Production mode gates the unencrypted-storage warning
    pub is_production: bool,
    /// scrypt cost parameters
    pub kdf: KeyDerivationParams,
}

impl CodecConfig {
    pub fn new(secret_material: Option<String>, is_production: bool) -> Self {
        Self {
            secret_material: secret_material
                .filter(|s| !s.is_empty())
                .map(SecretString::new),
            is_production,
            kdf: KeyDerivationParams::default(),
        }
    }

    /// Read `ENCRYPTION_KEY` and `APP_ENV` (or `NODE_ENV`) from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(ENCRYPTION_KEY_VAR);
        let is_production = lookup(ENVIRONMENT_VAR)
            .or_else(|| lookup(LEGACY_ENVIRONMENT_VAR))
            .map(|env| is_production_env(&env))
            .unwrap_or(false);

        debug!(
            "Loaded codec config (secret configured: {}, production: {})",
            secret.as_deref().is_some_and(|s| !s.is_empty()),
            is_production
        );

        Self::new(secret, is_production)
    }

    pub fn with_kdf(mut self, kdf: KeyDerivationParams) -> Self {
        self.kdf = kdf;
        self
    }
}

/// Whether an environment name denotes production
pub fn is_production_env(env: &str) -> bool {
    env.trim().eq_ignore_ascii_case(PRODUCTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_empty_environment() {
        let config = CodecConfig::from_lookup(lookup_from(&[]));
        assert!(config.secret_material.is_none());
        assert!(!config.is_production);
        assert_eq!(config.kdf, KeyDerivationParams::default());
    }

    #[test]
    fn test_from_lookup_reads_both_variables() {
        let config = CodecConfig::from_lookup(lookup_from(&[
            (ENCRYPTION_KEY_VAR, "01234567890123456789012345678901"),
            (ENVIRONMENT_VAR, "production"),
        ]));

        assert_eq!(
            config.secret_material.as_ref().map(|s| s.expose()),
            Some("01234567890123456789012345678901")
        );
        assert!(config.is_production);
    }

    #[test]
    fn test_empty_secret_is_treated_as_absent() {
        let config = CodecConfig::from_lookup(lookup_from(&[(ENCRYPTION_KEY_VAR, "")]));
        assert!(config.secret_material.is_none());
    }

    #[test]
    fn test_legacy_environment_variable_fallback() {
        let config =
            CodecConfig::from_lookup(lookup_from(&[(LEGACY_ENVIRONMENT_VAR, "production")]));
        assert!(config.is_production);

        let config = CodecConfig::from_lookup(lookup_from(&[
            (ENVIRONMENT_VAR, "development"),
            (LEGACY_ENVIRONMENT_VAR, "production"),
        ]));
        assert!(!config.is_production);
    }

    #[test]
    fn test_production_detection() {
        assert!(is_production_env("production"));
        assert!(is_production_env("Production "));
        assert!(!is_production_env("development"));
        assert!(!is_production_env("prod"));
    }
}
