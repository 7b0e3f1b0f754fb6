use crate::application::auth::{AuthError, get_authenticator};
use crate::application::builders::request_builder::{RequestBuilder, merge_headers};
use crate::domain::entities::{OutgoingRequest, Request, Response};
use crate::infrastructure::config::Config;
use anyhow::Result;
use async_trait::async_trait;
use hyper::header::HeaderMap;
use thiserror::Error;
use tracing::debug;

/// Everything that can stop a request; nothing is retried.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to create request: {0}")]
    BuildRequest(anyhow::Error),
    #[error("failed to get authenticator: {0}")]
    Authenticator(AuthError),
    #[error("failed to apply authentication: {0}")]
    ApplyAuth(AuthError),
    #[error("failed to execute request: {0}")]
    Execute(String),
    #[error("failed to read response body: {0}")]
    ReadBody(String),
}

/// Trait for HTTP clients to enable mocking and dependency inversion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: OutgoingRequest) -> Result<Response, ClientError>;
}

/// Issues one request: build, authenticate, merge caller headers, send.
pub struct HttpRequestService {
    http_client: Box<dyn HttpClient>,
    config: Config,
}

impl HttpRequestService {
    pub fn new(http_client: Box<dyn HttpClient>, config: Config) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub async fn send_request(&self, request: Request) -> Result<Response, ClientError> {
        let mut outgoing = build_outgoing(&request).map_err(ClientError::BuildRequest)?;

        self.authenticate(&mut outgoing.headers)?;

        // Caller headers go last so they can replace auth headers.
        merge_headers(&mut outgoing.headers, &request.headers)
            .map_err(ClientError::BuildRequest)?;

        debug!(
            pretty = request.pretty,
            parallel = request.parallel,
            retries = request.retries,
            has_body = request.body.is_some(),
            "ignoring parallel, retries and body"
        );
        debug!(method = %outgoing.method, url = %outgoing.url.as_str(), "sending request");

        self.http_client.send(outgoing).await
    }

    fn authenticate(&self, headers: &mut HeaderMap) -> Result<(), ClientError> {
        let Some(profile) = self.config.active_profile() else {
            debug!("no profile selected, skipping authentication");
            return Ok(());
        };

        let mut authenticator =
            get_authenticator(&profile.auth).map_err(ClientError::Authenticator)?;
        authenticator
            .apply_auth(headers)
            .map_err(ClientError::ApplyAuth)?;
        debug!(profile = %self.config.current, kind = %profile.auth.kind, "applied authentication");
        Ok(())
    }
}

fn build_outgoing(request: &Request) -> Result<OutgoingRequest> {
    let outgoing = RequestBuilder::new()
        .method(&request.method)?
        .url(&request.url)?
        .build()?;
    RequestValidator::validate(&outgoing)?;
    Ok(outgoing)
}

/// Domain service for request validation
pub struct RequestValidator;

impl RequestValidator {
    pub fn validate(request: &OutgoingRequest) -> Result<()> {
        Self::validate_url(&request.url)?;
        Ok(())
    }

    fn validate_url(url: &crate::domain::value_objects::Url) -> Result<()> {
        match url.scheme() {
            Some("http" | "https") => {}
            Some(other) => {
                return Err(anyhow::anyhow!("unsupported protocol scheme \"{}\"", other));
            }
            None => return Err(anyhow::anyhow!("URL must start with http:// or https://")),
        }
        if !url.has_authority() {
            return Err(anyhow::anyhow!("URL has no host"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::TimingInfo;
    use crate::infrastructure::config::{AuthConfig, DEFAULT_PROFILE, Profile};
    use hyper::StatusCode;
    use hyper::header::AUTHORIZATION;
    use std::collections::HashMap;

    fn ok_response() -> Response {
        Response {
            status: StatusCode::OK,
            body: b"ok".to_vec(),
            headers: HeaderMap::new(),
            timing: TimingInfo::default(),
        }
    }

    fn request(url: &str) -> Request {
        Request {
            url: url.to_string(),
            ..Default::default()
        }
    }

    fn service(mock: MockHttpClient, config: Config) -> HttpRequestService {
        HttpRequestService::new(Box::new(mock), config)
    }

    #[tokio::test]
    async fn skips_auth_without_profile() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .withf(|req| req.headers.get(AUTHORIZATION).is_none())
            .times(1)
            .returning(|_| Ok(ok_response()));

        let response = service(mock, Config::new("", "abc"))
            .send_request(request("http://example.test"))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn applies_default_profile_bearer() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .withf(|req| req.headers[AUTHORIZATION] == "Bearer abc")
            .times(1)
            .returning(|_| Ok(ok_response()));

        service(mock, Config::new(DEFAULT_PROFILE, "abc"))
            .send_request(request("http://example.test"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn caller_headers_override_auth() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .withf(|req| {
                req.headers.get_all(AUTHORIZATION).iter().count() == 1
                    && req.headers[AUTHORIZATION] == "Custom xyz"
                    && req.headers["x-trace"] == "1"
            })
            .times(1)
            .returning(|_| Ok(ok_response()));

        let mut req = request("http://example.test");
        req.headers = HashMap::from([
            ("Authorization".to_string(), "Custom xyz".to_string()),
            ("X-Trace".to_string(), "1".to_string()),
        ]);
        service(mock, Config::new(DEFAULT_PROFILE, "abc"))
            .send_request(req)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_profile_fails_authenticator_selection() {
        let mut mock = MockHttpClient::new();
        mock.expect_send().times(0);

        let err = service(mock, Config::new("staging", "abc"))
            .send_request(request("http://example.test"))
            .await
            .unwrap_err();
        assert!(matches!(
            &err,
            ClientError::Authenticator(AuthError::UnsupportedType(kind)) if kind.is_empty()
        ));
        assert_eq!(
            err.to_string(),
            "failed to get authenticator: unsupported auth type: "
        );
    }

    #[tokio::test]
    async fn bad_credentials_fail_application() {
        let mut mock = MockHttpClient::new();
        mock.expect_send().times(0);

        let mut config = Config::new(DEFAULT_PROFILE, "");
        config.profiles.insert(
            DEFAULT_PROFILE.to_string(),
            Profile {
                auth: AuthConfig {
                    kind: "apikey".to_string(),
                    token: "line\nbreak".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        let err = service(mock, config)
            .send_request(request("http://example.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ApplyAuth(_)));
    }

    #[tokio::test]
    async fn malformed_method_or_url_fails_before_sending() {
        for (method, url) in [
            ("GE T", "http://example.test"),
            ("GET", "not a url"),
            ("GET", "/relative"),
            ("GET", "ftp://example.test"),
        ] {
            let mut mock = MockHttpClient::new();
            mock.expect_send().times(0);

            let req = Request {
                method: method.to_string(),
                ..request(url)
            };
            let err = service(mock, Config::default())
                .send_request(req)
                .await
                .unwrap_err();
            assert!(matches!(err, ClientError::BuildRequest(_)), "{method} {url}");
            assert!(err.to_string().starts_with("failed to create request: "));
        }
    }

    #[tokio::test]
    async fn transport_errors_are_passed_through() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Err(ClientError::Execute("connection refused".to_string())));

        let err = service(mock, Config::default())
            .send_request(request("http://example.test"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to execute request: connection refused"
        );
    }

    #[test]
    fn validator_accepts_http_and_https() {
        for url in ["http://example.test", "https://example.test:8443/x"] {
            let outgoing = RequestBuilder::new()
                .method("GET")
                .unwrap()
                .url(url)
                .unwrap()
                .build()
                .unwrap();
            assert!(RequestValidator::validate(&outgoing).is_ok());
        }
    }
}
