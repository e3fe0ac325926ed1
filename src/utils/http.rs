//! HTTP client settings shared by all gateway clients.

use crate::errors::ConfigurationError;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use std::time::Duration;
use url::Url;

/// Per-call HTTP limits applied to every gateway client.
///
/// ```rust
/// use sms_dispatch::HttpSettings;
/// use std::time::Duration;
///
/// let settings = HttpSettings::default()
///     .with_timeout(Duration::from_secs(10))
///     .with_connect_timeout(Duration::from_secs(3));
/// assert_eq!(settings.timeout, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Total time allowed for one request (default: 30 seconds).
    pub timeout: Duration,
    /// Time allowed to establish a connection (default: 10 seconds).
    pub connect_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl HttpSettings {
    /// Set the total request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Build a middleware-capable client with these limits.
    pub fn build_client(&self) -> Result<ClientWithMiddleware, ConfigurationError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(ConfigurationError::BuildHttpClient)?;
        Ok(ClientBuilder::new(client).build())
    }
}

/// Parse a base URL, making sure it ends with `/` so relative paths join
/// underneath it instead of replacing its last segment.
pub fn parse_base_url(endpoint: &str) -> Result<Url, ConfigurationError> {
    let trimmed = endpoint.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|source| ConfigurationError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// Join a relative path onto a base URL produced by [`parse_base_url`].
pub(crate) fn join(base: &Url, path: &str) -> Url {
    base.join(path).unwrap_or_else(|_| base.clone())
}

/// Append path segments to a base URL produced by [`parse_base_url`].
///
/// Each segment is percent-encoded, so an id containing `/`, `?` or `#`
/// stays a single segment.
pub(crate) fn join_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = HttpSettings::default();
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_build_client() {
        assert!(HttpSettings::default().build_client().is_ok());
    }

    #[test]
    fn test_parse_base_url_adds_slash() {
        let url = parse_base_url("https://api.bulksms.com/v1").unwrap();
        assert_eq!(join(&url, "messages").as_str(), "https://api.bulksms.com/v1/messages");
    }

    #[test]
    fn test_join_segments_encodes_ids() {
        let url = parse_base_url("https://api.bulksms.com/v1").unwrap();
        assert_eq!(
            join_segments(&url, ["messages", "a/b?c#d"]).as_str(),
            "https://api.bulksms.com/v1/messages/a%2Fb%3Fc%23d"
        );
        assert_eq!(
            join_segments(&url, ["messages", "42"]).as_str(),
            "https://api.bulksms.com/v1/messages/42"
        );
    }

    #[test]
    fn test_parse_base_url_invalid() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ConfigurationError::InvalidEndpoint { .. })
        ));
    }
}
