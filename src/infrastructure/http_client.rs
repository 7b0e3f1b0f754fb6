use crate::application::services::{ClientError, HttpClient, HttpRequestService};
use crate::domain::entities::{Method as DomainMethod, OutgoingRequest, Response, TimingInfo};
use crate::infrastructure::config::Config;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request as HyperRequest};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::time::{Duration, Instant};
use tracing::debug;

/// Covers sending the request and reading the whole body
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const MAX_IDLE_PER_HOST: usize = 100;

/// Infrastructure implementation of HttpClient using Hyper
/// This is a low-level HTTP transport that the application service uses
pub struct HyperHttpClient {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Duration,
}

impl HyperHttpClient {
    pub fn new() -> Result<Self> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        let tls = tokio_native_tls::native_tls::TlsConnector::new()
            .map_err(|e| anyhow!("Failed to initialise TLS: {}", e))?;
        let connector = HttpsConnector::from((http, tokio_native_tls::TlsConnector::from(tls)));

        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .build::<_, Full<Bytes>>(connector);
        Ok(Self {
            client,
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// Creates a configured HTTP request service using this client
    pub fn create_request_service(self, config: Config) -> HttpRequestService {
        HttpRequestService::new(Box::new(self), config)
    }
}

#[async_trait]
impl HttpClient for HyperHttpClient {
    async fn send(&self, request: OutgoingRequest) -> Result<Response, ClientError> {
        let hyper_request = RequestAdapter::to_hyper_request(request)?;

        let start = Instant::now();
        let (parts, body) = tokio::time::timeout(self.timeout, self.execute(hyper_request))
            .await
            .map_err(|_| {
                ClientError::Execute(format!("timed out after {:?}", self.timeout))
            })??;
        let total_duration = start.elapsed();
        debug!(status = %parts.status, ?total_duration, "response received");

        Ok(Response {
            status: parts.status,
            body,
            headers: parts.headers,
            timing: TimingInfo {
                total_duration,
                ..Default::default()
            },
        })
    }
}

impl HyperHttpClient {
    async fn execute(
        &self,
        request: HyperRequest<Full<Bytes>>,
    ) -> Result<(hyper::http::response::Parts, Vec<u8>), ClientError> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ClientError::Execute(format!("{:#}", anyhow::Error::new(e))))?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| ClientError::ReadBody(e.to_string()))?
            .to_bytes();
        Ok((parts, body.to_vec()))
    }
}

/// Adapter for converting domain requests to Hyper requests
struct RequestAdapter;

impl RequestAdapter {
    fn to_hyper_request(
        domain_request: OutgoingRequest,
    ) -> Result<HyperRequest<Full<Bytes>>, ClientError> {
        let method = MethodAdapter::to_hyper_method(&domain_request.method)
            .map_err(ClientError::BuildRequest)?;

        let mut request = HyperRequest::builder()
            .method(method)
            .uri(domain_request.url.0)
            .body(Full::new(Bytes::new()))
            .map_err(|e| {
                ClientError::BuildRequest(anyhow!("Failed to build HTTP request: {}", e))
            })?;
        *request.headers_mut() = domain_request.headers;
        Ok(request)
    }
}

/// Adapter for converting domain HTTP methods to Hyper methods
struct MethodAdapter;

impl MethodAdapter {
    fn to_hyper_method(domain_method: &DomainMethod) -> Result<Method> {
        Ok(match domain_method {
            DomainMethod::Get => Method::GET,
            DomainMethod::Post => Method::POST,
            DomainMethod::Put => Method::PUT,
            DomainMethod::Delete => Method::DELETE,
            DomainMethod::Patch => Method::PATCH,
            DomainMethod::Head => Method::HEAD,
            DomainMethod::Options => Method::OPTIONS,
            DomainMethod::Connect => Method::CONNECT,
            DomainMethod::Trace => Method::TRACE,
            DomainMethod::Extension(name) => Method::from_bytes(name.as_bytes())
                .map_err(|e| anyhow!("Invalid HTTP method '{}': {}", name, e))?,
        })
    }
}
