use crate::domain::entities::{Method, OutgoingRequest};
use crate::domain::value_objects::Url;
use anyhow::{Result, anyhow};
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::str::FromStr;

/// Builds the bodiless request that goes on the wire
pub struct RequestBuilder {
    method: Option<Method>,
    url: Option<Url>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            url: None,
        }
    }

    pub fn method(mut self, method: &str) -> Result<Self> {
        self.method = Some(Method::from_str(method)?);
        Ok(self)
    }

    pub fn url(mut self, raw_url: &str) -> Result<Self> {
        self.url = Some(Url::new(raw_url)?);
        Ok(self)
    }

    pub fn build(self) -> Result<OutgoingRequest> {
        Ok(OutgoingRequest {
            method: self.method.ok_or_else(|| anyhow!("Method is required"))?,
            url: self.url.ok_or_else(|| anyhow!("URL is required"))?,
            headers: HeaderMap::new(),
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sets every pair on `target`, replacing any value already stored under the same name.
pub fn merge_headers(target: &mut HeaderMap, headers: &HashMap<String, String>) -> Result<()> {
    for (key, value) in headers {
        let name = HeaderName::from_str(key.trim())
            .map_err(|e| anyhow!("Invalid header name '{}': {}", key, e))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| anyhow!("Invalid value for header '{}': {}", key, e))?;
        target.insert(name, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::AUTHORIZATION;

    #[test]
    fn builds_bodiless_request() {
        let request = RequestBuilder::new()
            .method("post")
            .unwrap()
            .url("http://example.test/items")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url.as_str(), "http://example.test/items");
        assert!(request.headers.is_empty());
    }

    #[test]
    fn build_requires_method_and_url() {
        assert!(RequestBuilder::new().build().is_err());
        assert!(
            RequestBuilder::new()
                .method("GET")
                .unwrap()
                .build()
                .is_err()
        );
    }

    #[test]
    fn merge_overrides_same_name() {
        let mut target = HeaderMap::new();
        target.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        let headers = HashMap::from([("authorization".to_string(), "Basic xyz".to_string())]);
        merge_headers(&mut target, &headers).unwrap();
        assert_eq!(target.len(), 1);
        assert_eq!(target[AUTHORIZATION], "Basic xyz");
    }

    #[test]
    fn merge_rejects_invalid_names_and_values() {
        let mut target = HeaderMap::new();
        let bad_name = HashMap::from([("bad name".to_string(), "v".to_string())]);
        assert!(merge_headers(&mut target, &bad_name).is_err());
        let bad_value = HashMap::from([("x-ok".to_string(), "a\r\nb".to_string())]);
        assert!(merge_headers(&mut target, &bad_value).is_err());
    }
}
