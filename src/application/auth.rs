//! Authentication strategies.
//!
//! Each strategy adds credentials to an outgoing request's headers. The
//! strategy is chosen from the profile's auth discriminant by
//! [`get_authenticator`].

use crate::infrastructure::config::AuthConfig;
use base64::Engine;
use chrono::{DateTime, Utc};
use hyper::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unsupported auth type: {0}")]
    UnsupportedType(String),
    #[error("invalid {header} header value: {source}")]
    InvalidHeaderValue {
        header: HeaderName,
        #[source]
        source: hyper::header::InvalidHeaderValue,
    },
}

/// Adds credentials to a request.
pub trait Authenticator: Send {
    fn apply_auth(&mut self, headers: &mut HeaderMap) -> Result<(), AuthError>;
}

/// The closed set of auth discriminants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Basic,
    Bearer,
    ApiKey,
    OAuth2,
}

impl FromStr for AuthKind {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(AuthKind::Basic),
            "bearer" => Ok(AuthKind::Bearer),
            "apikey" => Ok(AuthKind::ApiKey),
            "oauth2" => Ok(AuthKind::OAuth2),
            other => Err(AuthError::UnsupportedType(other.to_string())),
        }
    }
}

/// Picks the strategy named by `config.kind`.
///
/// Fails for any discriminant outside the four known ones, the empty string included.
pub fn get_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    let authenticator: Box<dyn Authenticator> = match config.kind.parse::<AuthKind>()? {
        AuthKind::Basic => Box::new(BasicAuth {
            username: config.username.clone(),
            password: config.password.clone(),
        }),
        AuthKind::Bearer => Box::new(BearerAuth {
            token: config.token.clone(),
        }),
        AuthKind::ApiKey => Box::new(ApiKeyAuth {
            token: config.token.clone(),
        }),
        AuthKind::OAuth2 => Box::new(OAuth2Auth {
            token: config.token.clone(),
            expires_at: config.expires_at,
            refresh_token: config.refresh_token.clone(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }),
    };
    Ok(authenticator)
}

fn set_header(headers: &mut HeaderMap, name: HeaderName, value: String) -> Result<(), AuthError> {
    let value = HeaderValue::try_from(value).map_err(|source| AuthError::InvalidHeaderValue {
        header: name.clone(),
        source,
    })?;
    headers.insert(name, value);
    Ok(())
}

/// `Authorization: Basic base64(username:password)`; empty credentials are encoded as-is.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl Authenticator for BasicAuth {
    fn apply_auth(&mut self, headers: &mut HeaderMap) -> Result<(), AuthError> {
        let credentials = format!("{}:{}", self.username, self.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        set_header(headers, AUTHORIZATION, format!("Basic {}", encoded))
    }
}

#[derive(Debug, Clone)]
pub struct BearerAuth {
    pub token: String,
}

impl Authenticator for BearerAuth {
    fn apply_auth(&mut self, headers: &mut HeaderMap) -> Result<(), AuthError> {
        set_header(headers, AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    pub token: String,
}

impl Authenticator for ApiKeyAuth {
    fn apply_auth(&mut self, headers: &mut HeaderMap) -> Result<(), AuthError> {
        set_header(headers, API_KEY_HEADER, self.token.clone())
    }
}

/// Bearer token with an expiry.
///
/// Refreshing is not implemented: an expired token is sent unchanged.
#[derive(Debug, Clone)]
pub struct OAuth2Auth {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub refresh_token: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl OAuth2Auth {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| now > expires_at)
    }

    // TODO: exchange `refresh_token` at `token_url` using the client credentials.
    fn refresh(&mut self) -> Result<(), AuthError> {
        debug!(
            token_url = %self.token_url,
            client_id = %self.client_id,
            has_refresh_token = !self.refresh_token.is_empty(),
            has_client_secret = !self.client_secret.is_empty(),
            "oauth2 token expired; refresh is a no-op"
        );
        Ok(())
    }
}

impl Authenticator for OAuth2Auth {
    fn apply_auth(&mut self, headers: &mut HeaderMap) -> Result<(), AuthError> {
        if self.is_expired(Utc::now()) {
            self.refresh()?;
        }
        set_header(headers, AUTHORIZATION, format!("Bearer {}", self.token))
    }
}
