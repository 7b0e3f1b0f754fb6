use anyhow::{Result, anyhow};
use hyper::http::Uri;

/// Represents a parsed URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url(pub Uri);

impl Url {
    /// Creates a new Url
    ///
    /// # Arguments
    /// * `url` - The URL string to parse
    ///
    /// # Returns
    /// * `Ok(Url)` - Parsed URL
    /// * `Err(anyhow::Error)` - If the URL is not a valid URI
    pub fn new(url: &str) -> Result<Self> {
        let uri = url.parse::<Uri>().map_err(|e| anyhow!("Invalid URL: {}", e))?;
        Ok(Url(uri))
    }

    /// Returns the URL as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }

    pub fn scheme(&self) -> Option<&str> {
        self.0.scheme_str()
    }

    pub fn has_authority(&self) -> bool {
        self.0.authority().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_absolute_url() {
        let url = Url::new("https://example.test/a?b=1").unwrap();
        assert_eq!(url.scheme(), Some("https"));
        assert!(url.has_authority());
        assert_eq!(url.as_str(), "https://example.test/a?b=1");
    }

    #[test]
    fn rejects_garbage() {
        assert!(Url::new("http://exa mple.test").is_err());
        assert!(Url::new("").is_err());
    }
}
