use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// The only profile that ever exists
pub const DEFAULT_PROFILE: &str = "default";

/// Environment variable holding the default profile's bearer token
pub const TOKEN_ENV: &str = "API_TOKEN";

/// Named profiles plus the one selected for this run.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub current: String,
    pub profiles: HashMap<String, Profile>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
pub struct Profile {
    /// Unused: the request URL always comes from the command line
    pub base_url: String,
    /// Unused by the client
    pub headers: HashMap<String, String>,
    pub auth: AuthConfig,
    /// Unused: nothing retries
    pub retry: RetryConfig,
}

/// Credentials keyed by a discriminant (`basic`, `bearer`, `apikey`, `oauth2`).
///
/// Only the fields relevant to `kind` are read.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub kind: String,
    pub token: String,
    pub username: String,
    pub password: String,
    /// `None` counts as already expired
    pub expires_at: Option<DateTime<Utc>>,
    pub refresh_token: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub backoff: Duration,
    pub max_duration: Duration,
}

impl Config {
    /// One `default` profile using bearer auth with `token`.
    pub fn new(current: impl Into<String>, token: impl Into<String>) -> Self {
        let profile = Profile {
            auth: AuthConfig {
                kind: "bearer".to_string(),
                token: token.into(),
                ..Default::default()
            },
            ..Default::default()
        };

        Self {
            current: current.into(),
            profiles: HashMap::from([(DEFAULT_PROFILE.to_string(), profile)]),
        }
    }

    /// Same as [`Config::new`], with the token read from `API_TOKEN`.
    pub fn from_env(current: impl Into<String>) -> Self {
        let token = std::env::var(TOKEN_ENV).unwrap_or_default();
        Self::new(current, token)
    }

    /// The profile to authenticate with, or `None` when no profile was selected.
    ///
    /// An unknown name yields an empty profile, whose auth kind is `""`.
    pub fn active_profile(&self) -> Option<Profile> {
        if self.current.is_empty() {
            return None;
        }
        Some(self.profiles.get(&self.current).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_builds_single_bearer_profile() {
        let config = Config::new("default", "abc");
        assert_eq!(config.profiles.len(), 1);
        let profile = &config.profiles[DEFAULT_PROFILE];
        assert_eq!(profile.auth.kind, "bearer");
        assert_eq!(profile.auth.token, "abc");
    }

    #[test]
    fn empty_current_selects_nothing() {
        let config = Config::new("", "abc");
        assert!(config.active_profile().is_none());
    }

    #[test]
    fn unknown_profile_is_empty() {
        let config = Config::new("staging", "abc");
        let profile = config.active_profile().unwrap();
        assert_eq!(profile.auth.kind, "");
        assert_eq!(profile.auth.token, "");
    }

    #[test]
    fn default_profile_is_found() {
        let config = Config::new(DEFAULT_PROFILE, "abc");
        let profile = config.active_profile().unwrap();
        assert_eq!(profile.auth.token, "abc");
    }
}
