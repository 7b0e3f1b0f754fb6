use crate::domain::value_objects::Url;
use anyhow::{Result, anyhow};
use hyper::StatusCode;
use hyper::header::HeaderMap;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// HTTP method, upper-cased on parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Connect,
    Trace,
    /// Any other valid token, e.g. `PURGE`
    Extension(String),
}

impl FromStr for Method {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "" => Err(anyhow!("HTTP method cannot be empty")),
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            "CONNECT" => Ok(Method::Connect),
            "TRACE" => Ok(Method::Trace),
            other if other.bytes().all(is_token_char) => Ok(Method::Extension(other.to_string())),
            other => Err(anyhow!("Invalid HTTP method: '{}'", other)),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Connect => "CONNECT",
            Method::Trace => "TRACE",
            Method::Extension(name) => name,
        };
        f.write_str(name)
    }
}

// RFC 7230 tchar
fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// What the caller asked for; one per run
#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub method: String,
    pub pretty: bool,
    /// Accepted, never acted on
    pub parallel: u32,
    /// Accepted, never acted on
    pub retries: u32,
    /// Applied after authentication, so these win over auth headers
    pub headers: HashMap<String, String>,
    /// Never attached to the outgoing request
    pub body: Option<Vec<u8>>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: "GET".to_string(),
            pretty: true,
            parallel: 1,
            retries: 3,
            headers: HashMap::new(),
            body: None,
        }
    }
}

/// The request as it goes on the wire (always bodiless)
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

/// Represents a fully buffered HTTP response
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
    pub timing: TimingInfo,
}

impl Response {
    /// Declared `Content-Type`, if it is valid text
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(hyper::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Only `total_duration` is ever measured; the per-phase fields stay zero.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingInfo {
    pub dns_lookup: Duration,
    pub tls_handshake: Duration,
    pub server_time: Duration,
    pub total_duration: Duration,
}
